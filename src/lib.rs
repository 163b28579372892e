//! A viewport that shows a rotating, fading set of images.
//!
//! Every tick turns a monotonic timestamp into a frame: the [`EffectState`]
//! timers advance, the [`ImageCollection`] cursor follows the rotation, and the
//! [`Compositor`] fits the selected image into the viewport and blends it
//! toward the background by the current opacity. [`ImageBox`] ties the pieces
//! together; windowing, decoding and presentation stay behind the
//! [`ImageLoader`] and [`FrameSink`] traits.

pub mod collection;
pub mod compositor;
pub mod constants;
pub mod effect;
pub mod engine;
pub mod error;
pub mod history;
pub mod image_box;
pub mod pixels;
pub mod state;
pub mod texture_loader;

pub use collection::{AddOutcome, ImageCollection, ImageEntry};
pub use compositor::{BlendMode, Compositor, Frame, Padding, Viewport};
pub use effect::{EffectRequest, EffectState, FadeKind, TickReport};
pub use engine::{FrameSink, LatestFrame};
pub use error::{ImageBoxError, Result};
pub use history::UpdateHistory;
pub use image_box::{BoxConfig, ImageBox};
pub use pixels::{Color, PixelBuffer};
pub use state::FadePhase;
pub use texture_loader::{FsLoader, ImageLoader};
