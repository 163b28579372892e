use std::collections::VecDeque;

use crate::constants::HISTORY_SIZE;

/// Timestamps of the most recent updates, oldest first.
#[derive(Debug, Clone)]
pub struct UpdateHistory {
    stamps: VecDeque<f64>,
    capacity: usize,
}

impl Default for UpdateHistory {
    fn default() -> Self {
        Self::with_capacity(HISTORY_SIZE)
    }
}

impl UpdateHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self { stamps: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn record(&mut self, now: f64) {
        if self.stamps.len() == self.capacity {
            self.stamps.pop_front();
        }
        self.stamps.push_back(now);
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Updates per second over the recorded window, 0 until it spans some time.
    pub fn fps(&self) -> f64 {
        match (self.stamps.front(), self.stamps.back()) {
            (Some(oldest), Some(newest)) if self.stamps.len() >= 2 && newest > oldest => {
                (self.stamps.len() - 1) as f64 / (newest - oldest)
            }
            _ => 0.0,
        }
    }
}
