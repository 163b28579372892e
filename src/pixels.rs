use std::fmt;
use std::str::FromStr;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, Luma, LumaA, Rgb, Rgba, RgbaImage};

use crate::error::{ImageBoxError, Result};

/// Flat background color, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Mean of the three channels, used when blending single-channel images.
    pub fn average(self) -> u8 {
        ((u16::from(self.r) + u16::from(self.g) + u16::from(self.b)) / 3) as u8
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for Color {
    type Err = ImageBoxError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ImageBoxError::configuration(format!("background color {s:?} is not of the form #RRGGBB"));
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Row-major `[height][width][channels]` byte buffer.
///
/// One channel is gray, two are gray + alpha, three are RGB and four RGBA.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ImageBoxError::Pixels { details: format!("empty {width}x{height} buffer") });
        }
        if !(1..=4).contains(&channels) {
            return Err(ImageBoxError::Pixels { details: format!("unsupported channel count {channels}") });
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(ImageBoxError::Pixels {
                details: format!("{width}x{height}x{channels} needs {expected} bytes, got {}", data.len()),
            });
        }
        Ok(Self { width, height, channels, data })
    }

    /// Buffer where every pixel equals `pixel`, whose length gives the channel count.
    pub fn filled(width: u32, height: u32, pixel: &[u8]) -> Result<Self> {
        let count = width as usize * height as usize;
        let channels = u8::try_from(pixel.len())
            .map_err(|_| ImageBoxError::Pixels { details: format!("{} channels", pixel.len()) })?;
        Self::new(width, height, channels, pixel.repeat(count))
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let (channels, data) = match image {
            DynamicImage::ImageLuma8(buf) => (1, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => (2, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (3, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (4, buf.into_raw()),
            other if other.color().has_alpha() => (4, other.to_rgba8().into_raw()),
            other => (3, other.to_rgb8().into_raw()),
        };
        Self { width, height, channels, data }
    }

    pub fn to_dynamic(&self) -> Result<DynamicImage> {
        let (w, h, data) = (self.width, self.height, self.data.clone());
        let image = match self.channels {
            1 => ImageBuffer::<Luma<u8>, _>::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
            2 => ImageBuffer::<LumaA<u8>, _>::from_raw(w, h, data).map(DynamicImage::ImageLumaA8),
            3 => ImageBuffer::<Rgb<u8>, _>::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
            4 => ImageBuffer::<Rgba<u8>, _>::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
            _ => None,
        };
        image.ok_or_else(|| ImageBoxError::Pixels {
            details: format!("{}x{}x{} does not convert", self.width, self.height, self.channels),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let channels = self.channels as usize;
        let start = (y as usize * self.width as usize + x as usize) * channels;
        &self.data[start..start + channels]
    }

    /// Bilinear resample to exactly `width` x `height`.
    pub fn resized(&self, width: u32, height: u32) -> Result<Self> {
        if (width, height) == (self.width, self.height) {
            return Ok(self.clone());
        }
        let resized = self.to_dynamic()?.resize_exact(width, height, FilterType::Triangle);
        Ok(Self::from_dynamic(resized))
    }

    /// `out = src * opacity + background * (1 - opacity)` on the color channels.
    /// Alpha is left alone; gray images blend toward the background's average.
    pub fn blend_toward(&mut self, opacity: f64, background: Color) {
        let opacity = opacity.clamp(0.0, 1.0);
        let (color_channels, target) = match self.channels {
            1 | 2 => (1, [f64::from(background.average()); 3]),
            _ => (3, [f64::from(background.r), f64::from(background.g), f64::from(background.b)]),
        };
        for pixel in self.data.chunks_exact_mut(self.channels as usize) {
            for (value, bg) in pixel.iter_mut().take(color_channels).zip(target) {
                *value = (f64::from(*value) * opacity + bg * (1.0 - opacity)).round() as u8;
            }
        }
    }

    pub fn to_rgba8(&self) -> Result<RgbaImage> {
        Ok(self.to_dynamic()?.to_rgba8())
    }

    /// Paints this buffer onto a `width` x `height` RGBA canvas of `background`,
    /// its top-left corner at `(x, y)`.
    pub fn onto_canvas(&self, width: u32, height: u32, x: i64, y: i64, background: Color) -> Result<Self> {
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([background.r, background.g, background.b, 255]));
        imageops::replace(&mut canvas, &self.to_rgba8()?, x, y);
        Ok(Self::from_dynamic(DynamicImage::ImageRgba8(canvas)))
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PixelBuffer({}x{}x{})", self.width, self.height, self.channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_background_colors() {
        assert_eq!("#FFFFFF".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("#10a0Ff".parse::<Color>().unwrap(), Color::new(0x10, 0xa0, 0xff));
        assert!("FFFFFF".parse::<Color>().is_err());
        assert!("#FFF".parse::<Color>().is_err());
        assert!("#GG0000".parse::<Color>().is_err());
        assert_eq!(Color::new(1, 2, 3).to_string(), "#010203");
    }

    #[test]
    fn rejects_mismatched_buffers() {
        assert!(PixelBuffer::new(2, 2, 3, vec![0; 11]).is_err());
        assert!(PixelBuffer::new(2, 2, 5, vec![0; 20]).is_err());
        assert!(PixelBuffer::new(0, 2, 3, vec![]).is_err());
        assert!(PixelBuffer::new(2, 2, 3, vec![0; 12]).is_ok());
    }

    #[test]
    fn resizes_keep_channel_count() {
        let gray = PixelBuffer::filled(8, 4, &[200]).unwrap();
        let small = gray.resized(4, 2).unwrap();
        assert_eq!((small.width(), small.height(), small.channels()), (4, 2, 1));
        assert_eq!(small.pixel(1, 1), &[200]);

        let rgba = PixelBuffer::filled(3, 3, &[10, 20, 30, 40]).unwrap();
        let big = rgba.resized(6, 9).unwrap();
        assert_eq!((big.width(), big.height(), big.channels()), (6, 9, 4));
        assert_eq!(big.pixel(5, 8), &[10, 20, 30, 40]);
    }

    #[test]
    fn blends_each_channel_toward_background() {
        let mut rgb = PixelBuffer::filled(1, 1, &[200, 100, 0]).unwrap();
        rgb.blend_toward(0.5, Color::new(0, 100, 200));
        assert_eq!(rgb.pixel(0, 0), &[100, 100, 100]);

        let mut rgba = PixelBuffer::filled(1, 1, &[255, 255, 255, 128]).unwrap();
        rgba.blend_toward(0.0, Color::BLACK);
        assert_eq!(rgba.pixel(0, 0), &[0, 0, 0, 128]);

        let mut gray = PixelBuffer::filled(1, 1, &[0, 77]).unwrap();
        gray.blend_toward(0.0, Color::new(30, 60, 90));
        assert_eq!(gray.pixel(0, 0), &[60, 77]);
    }

    #[test]
    fn canvas_centers_frame_on_background() {
        let red = PixelBuffer::filled(2, 2, &[255, 0, 0]).unwrap();
        let canvas = red.onto_canvas(4, 4, 1, 1, Color::WHITE).unwrap();
        assert_eq!(canvas.channels(), 4);
        assert_eq!(canvas.pixel(0, 0), &[255, 255, 255, 255]);
        assert_eq!(canvas.pixel(1, 1), &[255, 0, 0, 255]);
        assert_eq!(canvas.pixel(2, 2), &[255, 0, 0, 255]);
        assert_eq!(canvas.pixel(3, 3), &[255, 255, 255, 255]);
    }
}
