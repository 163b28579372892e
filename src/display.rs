use imagebox::{Frame, FrameSink, ImageBoxError, Viewport};
use raylib::prelude::*;

/// Presents frames in a resizable raylib window, centered on the background.
pub struct WindowSink<'a> {
    rl: &'a mut RaylibHandle,
    thread: &'a RaylibThread,
    texture: Option<Texture2D>,
    background: Color,
}

impl<'a> WindowSink<'a> {
    pub fn new(rl: &'a mut RaylibHandle, thread: &'a RaylibThread, background: imagebox::Color) -> Self {
        Self {
            rl,
            thread,
            texture: None,
            background: Color::new(background.r, background.g, background.b, 255),
        }
    }

    pub fn should_close(&self) -> bool {
        self.rl.window_should_close()
    }

    /// Seconds since the window opened, from raylib's monotonic clock.
    pub fn now(&self) -> f64 {
        self.rl.get_time()
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.rl.get_screen_width().max(1) as u32, self.rl.get_screen_height().max(1) as u32)
    }

    /// Clears the window and shows `text`, for ticks with nothing to present.
    pub fn draw_message(&mut self, text: &str) {
        let mut d = self.rl.begin_drawing(self.thread);
        d.clear_background(self.background);
        d.draw_text(text, 20, 20, 20, Color::RED);
    }

    /// Texture matching the frame size, recreated when the size changes.
    fn texture_for(&mut self, width: i32, height: i32) -> imagebox::Result<&mut Texture2D> {
        let stale = self.texture.as_ref().is_none_or(|t| t.width() != width || t.height() != height);
        if stale {
            let blank = Image::gen_image_color(width, height, Color::BLANK);
            let texture = self
                .rl
                .load_texture_from_image(self.thread, &blank)
                .map_err(|e| ImageBoxError::Present { details: format!("failed to create texture: {e}") })?;
            self.texture = Some(texture);
        }
        self.texture
            .as_mut()
            .ok_or_else(|| ImageBoxError::Present { details: "texture unavailable".to_string() })
    }
}

impl FrameSink for WindowSink<'_> {
    fn present(&mut self, frame: &Frame) -> imagebox::Result<()> {
        let rgba = frame.pixels.to_rgba8()?;
        let (width, height) = (rgba.width() as i32, rgba.height() as i32);
        self.texture_for(width, height)?
            .update_texture(rgba.as_raw())
            .map_err(|e| ImageBoxError::Present { details: format!("failed to upload frame: {e}") })?;

        let Some(texture) = self.texture.as_ref() else {
            return Ok(());
        };
        let mut d = self.rl.begin_drawing(self.thread);
        d.clear_background(self.background);
        d.draw_texture(texture, frame.x as i32, frame.y as i32, Color::WHITE);
        Ok(())
    }
}
