//! The update loop: one call per tick turns a timestamp into a presented frame.

use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::collection::{AddOutcome, ImageCollection};
use crate::compositor::{BlendMode, Compositor, Frame, Padding, Viewport};
use crate::constants::DEFAULT_VIEWPORT;
use crate::effect::{EffectRequest, EffectState};
use crate::engine::FrameSink;
use crate::error::{ImageBoxError, Result};
use crate::history::UpdateHistory;
use crate::pixels::Color;
use crate::texture_loader::ImageLoader;

/// Fixed settings of an [`ImageBox`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxConfig {
    /// Initial size of the displaying surface, and the fixed size of offline
    /// recordings.
    pub viewport: Viewport,
    pub padding: Padding,
    pub background: Color,
    pub blend: BlendMode,
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(DEFAULT_VIEWPORT, DEFAULT_VIEWPORT),
            padding: Padding::default(),
            background: Color::BLACK,
            blend: BlendMode::Background,
        }
    }
}

/// A set of images shown one at a time with fade and rotation effects.
pub struct ImageBox<L> {
    loader: L,
    config: BoxConfig,
    images: ImageCollection,
    effects: EffectState,
    compositor: Compositor,
    history: UpdateHistory,
}

impl<L: ImageLoader> ImageBox<L> {
    pub fn new(loader: L, config: BoxConfig) -> Self {
        Self {
            loader,
            config,
            images: ImageCollection::new(),
            effects: EffectState::new(),
            compositor: Compositor::new(config.padding, config.blend),
            history: UpdateHistory::default(),
        }
    }

    pub fn config(&self) -> &BoxConfig {
        &self.config
    }

    pub fn images(&self) -> &ImageCollection {
        &self.images
    }

    pub fn effects(&self) -> &EffectState {
        &self.effects
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn fps(&self) -> f64 {
        self.history.fps()
    }

    pub fn is_fading(&self) -> bool {
        self.effects.is_fading()
    }

    pub fn is_rotating(&self) -> bool {
        self.effects.is_rotating()
    }

    /// Loads every path. A path that fails is reported and skipped; the
    /// returned errors are the failures, in order.
    pub fn add_images<I, P>(&mut self, paths: I) -> Vec<ImageBoxError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut failures = Vec::new();
        for path in paths {
            let path = path.as_ref();
            match self.images.add(path, &self.loader) {
                Ok(AddOutcome::Appended | AddOutcome::Replaced) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping image");
                    failures.push(e);
                }
            }
        }
        failures
    }

    /// Returns how many of the paths were present.
    pub fn remove_images<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths.into_iter().filter(|path| self.images.remove(path.as_ref())).count()
    }

    pub fn advance_image(&mut self) {
        self.images.advance();
    }

    pub fn start_effect(&mut self, request: &EffectRequest, now: f64) {
        self.effects.start_effect(request, now);
    }

    pub fn stop_effects(&mut self) {
        self.effects.stop_all();
    }

    pub fn stop_fade(&mut self) {
        self.effects.stop_fade();
    }

    pub fn stop_rotate(&mut self) {
        self.effects.stop_rotate();
    }

    /// Runs one tick at `now` and hands the frame to `sink`.
    ///
    /// `request`, when given, is applied before the timers advance so it takes
    /// effect in this very tick. With no images loaded the timers still advance
    /// and [`ImageBoxError::NoImages`] is returned without presenting anything.
    pub fn update(
        &mut self,
        now: f64,
        request: Option<&EffectRequest>,
        viewport: Viewport,
        sink: &mut impl FrameSink,
    ) -> Result<()> {
        let frame = self.render(now, request, viewport)?;
        sink.present(&frame)
    }

    /// [`ImageBox::update`] without a sink: returns the composited frame.
    pub fn render(&mut self, now: f64, request: Option<&EffectRequest>, viewport: Viewport) -> Result<Frame> {
        self.history.record(now);
        if let Some(request) = request.filter(|r| !r.is_empty()) {
            self.effects.start_effect(request, now);
        }
        let report = self.effects.tick(now);
        if report.advanced {
            self.images.advance();
            debug!(cursor = ?self.images.cursor(), now, "rotated to next image");
        }
        let entry = self.images.current()?;
        self.compositor.render(entry, viewport, self.effects.opacity(), self.config.background)
    }
}

impl<L> fmt::Display for ImageBox<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ImageBox ")?;
        match self.images.len() {
            0 => write!(f, "no images")?,
            1 => write!(f, "{}", self.images.iter().next().map_or_else(String::new, |e| e.path.display().to_string()))?,
            n => write!(f, "{n} images")?,
        }
        let fps = self.history.fps();
        if fps > 0.0 {
            write!(f, " {fps:.1} fps")?;
        }
        write!(f, ">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LatestFrame;
    use crate::pixels::PixelBuffer;
    use std::path::PathBuf;

    fn shade_loader(path: &Path) -> Result<PixelBuffer> {
        let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        match name {
            "broken" => Err(ImageBoxError::load(path, "corrupt")),
            _ => PixelBuffer::filled(4, 4, &[name.len() as u8 * 10, 0, 0]),
        }
    }

    fn image_box() -> ImageBox<fn(&Path) -> Result<PixelBuffer>> {
        ImageBox::new(shade_loader as fn(&Path) -> Result<PixelBuffer>, BoxConfig::default())
    }

    #[test]
    fn batch_add_skips_failures() {
        let mut image_box = image_box();
        let failures = image_box.add_images(["/a.png", "/broken.png", "/bb.png", "/a.png"]);
        assert_eq!(failures.len(), 1);
        assert!(matches!(&failures[0], ImageBoxError::Load { path, .. } if path == &PathBuf::from("/broken.png")));
        assert_eq!(image_box.len(), 2);
        assert_eq!(image_box.remove_images(["/a.png", "/zzz.png"]), 1);
    }

    #[test]
    fn empty_box_reports_no_images_but_keeps_time() {
        let mut image_box = image_box();
        let mut sink = LatestFrame::default();
        let request = EffectRequest::default().with_fade_in(2.0);
        let err = image_box.update(0.0, Some(&request), Viewport::new(8, 8), &mut sink).unwrap_err();
        assert!(matches!(err, ImageBoxError::NoImages));
        assert!(matches!(image_box.update(1.0, None, Viewport::new(8, 8), &mut sink), Err(ImageBoxError::NoImages)));
        assert_eq!(sink.presented, 0);
        assert!((image_box.effects().opacity() - 0.5).abs() < 1e-12);

        image_box.add_images(["/a.png"]);
        image_box.update(1.0, None, Viewport::new(8, 8), &mut sink).unwrap();
        assert_eq!(sink.presented, 1);
        assert!(image_box.fps() > 0.0);
    }

    #[test]
    fn requests_apply_before_the_tick() {
        let mut image_box = image_box();
        image_box.add_images(["/a.png"]);
        let frame = image_box
            .render(5.0, Some(&EffectRequest::default().with_fade_out(1.0)), Viewport::new(4, 4))
            .unwrap();
        // fade-out starts fully opaque at this very tick
        assert_eq!(frame.pixels.pixel(0, 0), &[10, 0, 0]);
        let frame = image_box.render(5.5, None, Viewport::new(4, 4)).unwrap();
        assert_eq!(frame.pixels.pixel(0, 0), &[5, 0, 0]);
    }

    #[test]
    fn stop_takes_effect_on_the_next_tick() {
        let mut image_box = image_box();
        image_box.add_images(["/a.png", "/bb.png"]);
        image_box.start_effect(&EffectRequest::default().with_fade_in(10.0).with_rotate(1.0), 0.0);
        image_box.render(0.5, None, Viewport::new(4, 4)).unwrap();
        image_box.stop_effects();
        let frame = image_box.render(3.0, None, Viewport::new(4, 4)).unwrap();
        assert_eq!(frame.pixels.pixel(0, 0), &[10, 0, 0]);
        assert_eq!(image_box.images().cursor(), Some(0));
    }

    #[test]
    fn advancing_by_hand_wraps_around() {
        let mut image_box = image_box();
        image_box.add_images(["/a.png", "/bb.png"]);
        image_box.advance_image();
        let frame = image_box.render(0.0, None, Viewport::new(4, 4)).unwrap();
        assert_eq!(frame.pixels.pixel(0, 0), &[20, 0, 0]);
        image_box.advance_image();
        assert_eq!(image_box.images().cursor(), Some(0));
    }

    #[test]
    fn default_config_is_a_square_viewport() {
        let image_box = image_box();
        assert_eq!(image_box.config().viewport, Viewport::new(DEFAULT_VIEWPORT, DEFAULT_VIEWPORT));
        assert_eq!(image_box.config().blend, BlendMode::Background);
    }

    #[test]
    fn summary_names_the_images() {
        let mut image_box = image_box();
        assert_eq!(image_box.to_string(), "<ImageBox no images>");
        image_box.add_images(["/a.png"]);
        assert_eq!(image_box.to_string(), "<ImageBox /a.png>");
        image_box.add_images(["/bb.png"]);
        image_box.render(0.0, None, Viewport::new(4, 4)).unwrap();
        image_box.render(0.5, None, Viewport::new(4, 4)).unwrap();
        assert_eq!(image_box.to_string(), "<ImageBox 2 images 2.0 fps>");
    }
}
