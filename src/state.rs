/// Direction of the fade currently in effect. Fading in and fading out are
/// mutually exclusive phases of one fade cycle.
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum FadePhase {
    #[default]
    Resting,  // No fade, opacity holds its value
    In(f64),  // Ramping toward fully opaque over the given seconds
    Out(f64), // Ramping toward fully transparent over the given seconds
}

impl FadePhase {
    pub fn duration(self) -> f64 {
        match self {
            FadePhase::Resting => 0.0,
            FadePhase::In(duration) | FadePhase::Out(duration) => duration,
        }
    }

    pub fn target(self) -> Option<f64> {
        match self {
            FadePhase::Resting => None,
            FadePhase::In(_) => Some(1.0),
            FadePhase::Out(_) => Some(0.0),
        }
    }

    pub fn with_duration(self, duration: f64) -> Self {
        match self {
            FadePhase::Resting => FadePhase::Resting,
            FadePhase::In(_) => FadePhase::In(duration),
            FadePhase::Out(_) => FadePhase::Out(duration),
        }
    }

    /// The phase a cycle continues with once this one completes.
    pub fn reversed(self, duration: f64) -> Self {
        match self {
            FadePhase::Resting => FadePhase::Resting,
            FadePhase::In(_) => FadePhase::Out(duration),
            FadePhase::Out(_) => FadePhase::In(duration),
        }
    }
}
