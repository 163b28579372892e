pub const DEFAULT_VIEWPORT: u32 = 225;        // Side of the square viewport when none is configured
pub const HISTORY_SIZE: usize = 100;          // Ticks kept for fps telemetry

pub const COMPLETION_EPSILON: f64 = 1e-9;     // Fraction of a fade phase treated as already done
pub const MIN_FADE_CYCLE: f64 = 1e-3;         // Shortest accepted fade cycle (seconds)

pub const WINDOW_WIDTH: u32 = 800;            // Default window / recording width
pub const WINDOW_HEIGHT: u32 = 600;           // Default window / recording height
pub const FPS: u32 = 60;                      // Default updates per second
pub const RECORD_DURATION: f64 = 10.0;        // Default length of an offline recording (seconds)
