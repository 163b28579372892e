use std::io::Write;
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};

use anyhow::{Context, Result};
use imagebox::{Color, Frame, FrameSink, ImageBoxError, Viewport};
use tracing::error;

/// Pipes every frame, letterboxed onto the full viewport, into an ffmpeg encoder.
pub struct Ffmpeg {
    process: Child,
    stdin: Option<ChildStdin>,
    background: Color,
}

impl Ffmpeg {
    pub fn new(viewport: Viewport, fps: u32, video_name: &Path, background: Color) -> Result<Ffmpeg> {
        let mut process = Command::new("ffmpeg")
            .stdin(Stdio::piped())
            .args(["-loglevel", "error"])
            .arg("-y")
            .args(["-f", "rawvideo"])
            .args(["-pixel_format", "rgba"])
            .args(["-video_size", &format!("{}x{}", viewport.width, viewport.height)])
            .args(["-framerate", &format!("{}", fps)])
            .args(["-i", "-"])
            .args(["-c:v", "libx264"])
            .args(["-pix_fmt", "yuv420p"])
            .arg(video_name)
            .spawn()
            .context("Failed to start ffmpeg process")?;
        let stdin = process.stdin.take().context("Failed to open ffmpeg stdin")?;
        Ok(Ffmpeg { process, stdin: Some(stdin), background })
    }
}

impl FrameSink for Ffmpeg {
    fn present(&mut self, frame: &Frame) -> imagebox::Result<()> {
        // fixed-size stream: every frame is padded out to the whole viewport
        let canvas = frame.to_canvas(self.background)?;
        let stdin = self.stdin.as_mut().ok_or_else(|| ImageBoxError::Present {
            details: "ffmpeg stdin already closed".to_string(),
        })?;
        stdin
            .write_all(canvas.as_bytes())
            .map_err(|e| ImageBoxError::Present { details: format!("failed to write to ffmpeg stdin: {e}") })
    }
}

impl Drop for Ffmpeg {
    fn drop(&mut self) {
        // Close stdin pipe and wait for ffmpeg to finish
        self.stdin = None; // force drop
        match self.process.wait() {
            Ok(status) if !status.success() => error!(%status, "ffmpeg exited with an error"),
            Ok(_) => {}
            Err(e) => error!(error = %e, "failed to wait for ffmpeg process"),
        }
    }
}
