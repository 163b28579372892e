//! Fits the selected image into the viewport and applies the fade.

use std::path::PathBuf;

use tracing::trace;

use crate::collection::ImageEntry;
use crate::error::Result;
use crate::pixels::{Color, PixelBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn center(self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

/// Margin kept free inside the viewport when fitting an image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Padding {
    pub x: u32,
    pub y: u32,
}

impl Padding {
    pub const fn uniform(padding: u32) -> Self {
        Self { x: padding, y: padding }
    }
}

/// How a partially faded image is mixed with what lies behind it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Each channel moves toward the matching channel of the background color.
    #[default]
    Background,
    /// Channels are scaled toward black whatever the background color is.
    Black,
}

/// A composited image ready to be presented.
#[derive(Debug, Clone)]
pub struct Frame {
    pub pixels: PixelBuffer,
    /// Top-left corner that centers the frame in the viewport.
    pub x: i64,
    pub y: i64,
    /// Viewport center, where the middle of the frame goes.
    pub anchor: (f32, f32),
    pub viewport: Viewport,
}

impl Frame {
    /// The frame painted in place on a viewport-sized RGBA canvas.
    pub fn to_canvas(&self, background: Color) -> Result<PixelBuffer> {
        self.pixels.onto_canvas(self.viewport.width, self.viewport.height, self.x, self.y, background)
    }
}

/// Size of an `image_width` x `image_height` image scaled by one uniform
/// factor to fit the viewport minus padding. Never smaller than 1x1.
pub fn fit_size(image_width: u32, image_height: u32, viewport: Viewport, padding: Padding) -> (u32, u32) {
    let room_x = f64::from(viewport.width.saturating_sub(padding.x).max(1));
    let room_y = f64::from(viewport.height.saturating_sub(padding.y).max(1));
    let scale = (room_x / f64::from(image_width)).min(room_y / f64::from(image_height));
    let scaled = |dim: u32| ((f64::from(dim) * scale).floor() as u32).max(1);
    (scaled(image_width), scaled(image_height))
}

#[derive(Debug)]
struct CachedResize {
    path: PathBuf,
    revision: u64,
    viewport: Viewport,
    pixels: PixelBuffer,
}

#[derive(Debug, Default)]
pub struct Compositor {
    padding: Padding,
    blend: BlendMode,
    cache: Option<CachedResize>,
}

impl Compositor {
    pub fn new(padding: Padding, blend: BlendMode) -> Self {
        Self { padding, blend, cache: None }
    }

    pub fn render(&mut self, entry: &ImageEntry, viewport: Viewport, opacity: f64, background: Color) -> Result<Frame> {
        let mut pixels = self.resized(entry, viewport)?;
        if opacity < 1.0 {
            let target = match self.blend {
                BlendMode::Background => background,
                BlendMode::Black => Color::BLACK,
            };
            pixels.blend_toward(opacity, target);
        }
        let x = (i64::from(viewport.width) - i64::from(pixels.width())) / 2;
        let y = (i64::from(viewport.height) - i64::from(pixels.height())) / 2;
        Ok(Frame { pixels, x, y, anchor: viewport.center(), viewport })
    }

    /// Resamples only when the image, its revision or the viewport changed.
    fn resized(&mut self, entry: &ImageEntry, viewport: Viewport) -> Result<PixelBuffer> {
        if let Some(cached) = &self.cache {
            if cached.path == entry.path && cached.revision == entry.revision && cached.viewport == viewport {
                return Ok(cached.pixels.clone());
            }
        }
        let (width, height) = fit_size(entry.pixels.width(), entry.pixels.height(), viewport, self.padding);
        trace!(path = %entry.path.display(), width, height, "resizing image");
        let pixels = entry.pixels.resized(width, height)?;
        self.cache = Some(CachedResize {
            path: entry.path.clone(),
            revision: entry.revision,
            viewport,
            pixels: pixels.clone(),
        });
        Ok(pixels)
    }
}
