//! Fade and rotation timing.
//!
//! [`EffectState`] layers two independent timers over one opacity value: a fade
//! that ramps the opacity linearly between 0 and 1 (optionally delayed and
//! optionally cycling in and out forever) and a rotation that asks for the next
//! image at a fixed period. Both are driven purely by the timestamps handed to
//! [`EffectState::tick`], so ticks may arrive at any interval.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::constants::{COMPLETION_EPSILON, MIN_FADE_CYCLE};
use crate::error::{ImageBoxError, Result};
use crate::state::FadePhase;

/// Typed form of an effect request. Every field is in seconds; `None` leaves
/// the corresponding effect untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EffectRequest {
    pub fade_in: Option<f64>,
    pub fade_out: Option<f64>,
    pub fade_cycle: Option<f64>,
    pub fade_delay: Option<f64>,
    pub rotate: Option<f64>,
}

impl EffectRequest {
    /// Keys accepted by [`EffectRequest::from_pairs`].
    pub const KEYS: [&'static str; 5] = ["fadeIn", "fadeOut", "fadeCycle", "fadeDelay", "rotate"];

    /// Builds a request from `key = seconds` pairs.
    ///
    /// Unknown keys, negative or non-finite values and fade cycles shorter than
    /// [`MIN_FADE_CYCLE`] are rejected; a value of zero means the effect is not
    /// requested.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut request = Self::default();
        let mut unknown = Vec::new();
        for (key, seconds) in pairs {
            let slot = match key {
                "fadeIn" => &mut request.fade_in,
                "fadeOut" => &mut request.fade_out,
                "fadeCycle" => &mut request.fade_cycle,
                "fadeDelay" => &mut request.fade_delay,
                "rotate" => &mut request.rotate,
                other => {
                    unknown.push(format!("{other} : {seconds}"));
                    continue;
                }
            };
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(ImageBoxError::configuration(format!(
                    "effect {key} needs a non-negative number of seconds, got {seconds}"
                )));
            }
            if key == "fadeCycle" && seconds > 0.0 && seconds < MIN_FADE_CYCLE {
                return Err(ImageBoxError::configuration(format!(
                    "effect fadeCycle must be at least {MIN_FADE_CYCLE}s, got {seconds}"
                )));
            }
            *slot = (seconds > 0.0).then_some(seconds);
        }
        if !unknown.is_empty() {
            return Err(ImageBoxError::configuration(format!(
                "received unhandled effects key/values: {} (expected one of {})",
                unknown.join(", "),
                Self::KEYS.join(", ")
            )));
        }
        Ok(request)
    }

    pub fn with_fade_in(mut self, seconds: f64) -> Self {
        self.fade_in = Some(seconds);
        self
    }

    pub fn with_fade_out(mut self, seconds: f64) -> Self {
        self.fade_out = Some(seconds);
        self
    }

    pub fn with_fade_cycle(mut self, seconds: f64) -> Self {
        self.fade_cycle = Some(seconds);
        self
    }

    pub fn with_fade_delay(mut self, seconds: f64) -> Self {
        self.fade_delay = Some(seconds);
        self
    }

    pub fn with_rotate(mut self, seconds: f64) -> Self {
        self.rotate = Some(seconds);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Combines two requests, the values of `other` winning.
    pub fn merged(self, other: &EffectRequest) -> Self {
        Self {
            fade_in: other.fade_in.or(self.fade_in),
            fade_out: other.fade_out.or(self.fade_out),
            fade_cycle: other.fade_cycle.or(self.fade_cycle),
            fade_delay: other.fade_delay.or(self.fade_delay),
            rotate: other.rotate.or(self.rotate),
        }
    }
}

/// Parses `fadeIn=1,rotate=3` (commas or whitespace between assignments).
impl FromStr for EffectRequest {
    type Err = ImageBoxError;

    fn from_str(s: &str) -> Result<Self> {
        let mut pairs = Vec::new();
        for assignment in s.split(|c: char| c == ',' || c.is_whitespace()).filter(|a| !a.is_empty()) {
            let (key, value) = assignment.split_once('=').ok_or_else(|| {
                ImageBoxError::configuration(format!("effect {assignment:?} is not of the form key=seconds"))
            })?;
            let seconds = value.trim().parse::<f64>().map_err(|e| {
                ImageBoxError::configuration(format!("effect {key} has an invalid value {value:?}: {e}"))
            })?;
            pairs.push((key.trim(), seconds));
        }
        Self::from_pairs(pairs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeKind {
    In,
    Out,
}

/// What a call to [`EffectState::tick`] changed besides the opacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The rotation interval elapsed: the caller should select the next image.
    pub advanced: bool,
    /// Number of fade direction changes made by a running cycle.
    pub flips: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectState {
    phase: FadePhase,
    fade_cycle: f64,
    fade_delay: f64,
    fade_start_percent: f64,
    fade_start: f64,
    opacity: f64,
    rotate: f64,
    rotate_start: f64,
}

impl Default for EffectState {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectState {
    /// Fully visible, no fade, no rotation.
    pub fn new() -> Self {
        Self {
            phase: FadePhase::Resting,
            fade_cycle: 0.0,
            fade_delay: 0.0,
            fade_start_percent: 0.0,
            fade_start: 0.0,
            opacity: 1.0,
            rotate: 0.0,
            rotate_start: 0.0,
        }
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn phase(&self) -> FadePhase {
        self.phase
    }

    pub fn fade_in_duration(&self) -> f64 {
        match self.phase {
            FadePhase::In(duration) => duration,
            _ => 0.0,
        }
    }

    pub fn fade_out_duration(&self) -> f64 {
        match self.phase {
            FadePhase::Out(duration) => duration,
            _ => 0.0,
        }
    }

    pub fn fade_cycle(&self) -> f64 {
        self.fade_cycle
    }

    pub fn fade_delay(&self) -> f64 {
        self.fade_delay
    }

    pub fn rotate_duration(&self) -> f64 {
        self.rotate
    }

    pub fn is_fading(&self) -> bool {
        self.phase != FadePhase::Resting
    }

    pub fn is_rotating(&self) -> bool {
        self.rotate > 0.0
    }

    /// Applies every effect named by `request` as of `now`.
    pub fn start_effect(&mut self, request: &EffectRequest, now: f64) {
        debug!(?request, now, "starting effects");
        let mut fade = match (request.fade_in, request.fade_out) {
            (Some(duration), _) => Some((FadeKind::In, duration)),
            (None, Some(duration)) => Some((FadeKind::Out, duration)),
            (None, None) => None,
        };
        if let Some(cycle) = request.fade_cycle {
            let cycle = cycle.max(MIN_FADE_CYCLE);
            self.fade_cycle = cycle;
            if self.is_fading() {
                self.stretch_phase(cycle, now);
            } else if fade.is_none() {
                // a cycle needs a direction to begin in
                fade = Some((FadeKind::Out, cycle));
            }
        }
        if let Some(delay) = request.fade_delay {
            self.fade_delay = delay;
        }
        if let Some((kind, duration)) = fade {
            self.start_fade(kind, duration, now);
        }
        if let Some(duration) = request.rotate {
            self.start_rotate(duration, now);
        }
    }

    /// Starts a fresh fade. A fade reversing one already in flight continues
    /// from the current opacity; otherwise it starts from fully transparent
    /// (fade-in) or fully opaque (fade-out). The stored delay is applied.
    pub fn start_fade(&mut self, kind: FadeKind, duration: f64, now: f64) {
        self.opacity = match (kind, self.phase) {
            (FadeKind::In, FadePhase::Out(_)) | (FadeKind::Out, FadePhase::In(_)) => self.opacity_at(now),
            (FadeKind::In, _) => 0.0,
            (FadeKind::Out, _) => 1.0,
        };
        self.phase = match kind {
            FadeKind::In => FadePhase::In(duration),
            FadeKind::Out => FadePhase::Out(duration),
        };
        self.fade_start_percent = self.opacity;
        self.fade_start = now + self.fade_delay;
    }

    pub fn start_rotate(&mut self, duration: f64, now: f64) {
        self.rotate = duration;
        self.rotate_start = now;
    }

    pub fn stop_fade(&mut self) {
        debug!("stopping fade");
        self.phase = FadePhase::Resting;
        self.fade_cycle = 0.0;
        self.fade_delay = 0.0;
        self.fade_start_percent = 0.0;
        self.fade_start = 0.0;
        self.opacity = 1.0;
    }

    pub fn stop_rotate(&mut self) {
        debug!("stopping rotation");
        self.rotate = 0.0;
        self.rotate_start = 0.0;
    }

    pub fn stop_all(&mut self) {
        self.stop_fade();
        self.stop_rotate();
    }

    /// Advances both timers to `now`.
    ///
    /// Completed cycle phases chain into the opposite phase at the scheduled
    /// boundary rather than at `now`, so irregular ticks never accumulate drift.
    /// Whole cycles missed during a long gap are skipped in one step, so a tick
    /// costs the same however late it is. Rotation moves at most one image per
    /// tick.
    pub fn tick(&mut self, now: f64) -> TickReport {
        // complete the running phase, skip whole cycles, then ramp (plus one
        // spare step for a boundary that lands within rounding of `now`)
        const MAX_FADE_STEPS: usize = 4;

        let mut report = TickReport::default();

        for _ in 0..MAX_FADE_STEPS {
            let Some(target) = self.phase.target() else {
                break;
            };
            let elapsed = now - self.fade_start;
            if elapsed < 0.0 {
                break; // delay not met yet
            }
            let duration = self.phase.duration();
            let fraction = if duration > 0.0 { elapsed / duration } else { 1.0 };
            if fraction < 1.0 - COMPLETION_EPSILON {
                self.opacity = self.ramp(fraction);
                break;
            }
            self.opacity = target;
            if self.fade_cycle <= 0.0 {
                self.phase = FadePhase::Resting;
                break;
            }
            let boundary = self.fade_start + duration;
            let skipped = ((now - boundary) / self.fade_cycle).floor().max(0.0);
            let mut phase = self.phase.reversed(self.fade_cycle);
            if skipped % 2.0 == 1.0 {
                phase = phase.reversed(self.fade_cycle);
            }
            self.phase = phase;
            self.opacity = match phase {
                FadePhase::In(_) => 0.0,
                _ => 1.0,
            };
            self.fade_start_percent = self.opacity;
            self.fade_start = boundary + skipped * self.fade_cycle;
            report.flips = report.flips.saturating_add(1).saturating_add(skipped as u32);
            trace!(phase = ?self.phase, boundary, skipped, "fade cycle reversed");
        }

        if self.rotate > 0.0 && now - self.rotate_start >= self.rotate {
            self.rotate_start += self.rotate;
            report.advanced = true;
        }

        report
    }

    /// Keeps the opacity change already made by the running phase and spreads
    /// what remains of it over the matching share of `cycle`.
    fn stretch_phase(&mut self, cycle: f64, now: f64) {
        if now < self.fade_start {
            self.phase = self.phase.with_duration(cycle);
            return;
        }
        let duration = self.phase.duration();
        let fraction = if duration > 0.0 { ((now - self.fade_start) / duration).clamp(0.0, 1.0) } else { 1.0 };
        self.opacity = self.ramp(fraction);
        let remaining = (1.0 - fraction) * cycle;
        self.phase = if remaining > COMPLETION_EPSILON * cycle {
            self.phase.with_duration(remaining)
        } else {
            self.phase.reversed(cycle)
        };
        self.fade_start_percent = self.opacity;
        self.fade_start = now;
    }

    /// Opacity of the running phase at `now`, without completing it.
    fn opacity_at(&self, now: f64) -> f64 {
        let duration = self.phase.duration();
        if self.phase == FadePhase::Resting || now < self.fade_start || duration <= 0.0 {
            return self.opacity;
        }
        self.ramp(((now - self.fade_start) / duration).min(1.0))
    }

    fn ramp(&self, fraction: f64) -> f64 {
        let start = self.fade_start_percent;
        match self.phase {
            FadePhase::Resting => self.opacity,
            FadePhase::In(_) => (start + (1.0 - start) * fraction).min(1.0),
            FadePhase::Out(_) => (start - start * fraction).max(0.0),
        }
    }
}

impl fmt::Display for EffectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.opacity * 100.0)?;
        match self.phase {
            FadePhase::Resting => {}
            FadePhase::In(duration) => write!(f, " fading in over {duration}s")?,
            FadePhase::Out(duration) => write!(f, " fading out over {duration}s")?,
        }
        if self.is_rotating() {
            write!(f, " rotating every {}s", self.rotate)?;
        }
        Ok(())
    }
}
