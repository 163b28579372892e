use std::path::PathBuf;

use clap::Parser;
use imagebox::constants::{FPS, RECORD_DURATION, WINDOW_HEIGHT, WINDOW_WIDTH};
use imagebox::{BlendMode, BoxConfig, Color, EffectRequest, Padding, Viewport};

/// Show a rotating, fading set of images.
#[derive(Parser, Debug)]
#[command(name = "imagebox", version, about)]
pub struct Args {
    /// Image files, or directories whose image files are shown in name order
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Initial window (or recording) width in pixels
    #[arg(long, default_value_t = WINDOW_WIDTH)]
    pub width: u32,

    /// Initial window (or recording) height in pixels
    #[arg(long, default_value_t = WINDOW_HEIGHT)]
    pub height: u32,

    /// Horizontal room kept free around the image
    #[arg(long, default_value_t = 0)]
    pub padding_x: u32,

    /// Vertical room kept free around the image
    #[arg(long, default_value_t = 0)]
    pub padding_y: u32,

    /// Background color as #RRGGBB
    #[arg(long, default_value = "#000000")]
    pub background: Color,

    /// Effect to start, e.g. `fadeIn=1` or `fadeCycle=2,rotate=6`
    /// (keys: fadeIn, fadeOut, fadeCycle, fadeDelay, rotate)
    #[arg(short, long = "effect", value_name = "KEY=SECONDS")]
    pub effects: Vec<EffectRequest>,

    /// Fade toward black instead of toward the background color
    #[arg(long)]
    pub fade_to_black: bool,

    /// Show the images in random order
    #[arg(long)]
    pub shuffle: bool,

    /// Updates per second
    #[arg(long, default_value_t = FPS)]
    pub fps: u32,

    /// Render offline into this video file through ffmpeg instead of opening a window
    #[arg(long, value_name = "FILE")]
    pub record: Option<PathBuf>,

    /// Length of the recording in seconds
    #[arg(long, default_value_t = RECORD_DURATION)]
    pub duration: f64,

    /// Log debug details (RUST_LOG overrides)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn config(&self) -> BoxConfig {
        BoxConfig {
            viewport: Viewport::new(self.width.max(1), self.height.max(1)),
            padding: Padding { x: self.padding_x, y: self.padding_y },
            background: self.background,
            blend: if self.fade_to_black { BlendMode::Black } else { BlendMode::Background },
        }
    }

    /// All `--effect` options folded into one request, later ones winning.
    pub fn effect_request(&self) -> EffectRequest {
        self.effects.iter().fold(EffectRequest::default(), |acc, request| acc.merged(request))
    }
}
