//! Error taxonomy shared by every part of the image box.

use std::path::PathBuf;

use thiserror::Error;

/// Shared `Result` alias for the crate.
pub type Result<T> = std::result::Result<T, ImageBoxError>;

#[derive(Debug, Error)]
pub enum ImageBoxError {
    /// One image could not be read or decoded. Other paths of a batch are unaffected.
    #[error("failed to load image {path}: {details}")]
    Load { path: PathBuf, details: String },

    /// A frame or the current image was requested while no image is loaded.
    #[error("there are no images currently loaded")]
    NoImages,

    /// An effect request or another setting could not be understood.
    #[error("invalid configuration: {details}")]
    Configuration { details: String },

    /// A pixel buffer does not match its own dimensions.
    #[error("malformed pixel buffer: {details}")]
    Pixels { details: String },

    /// A frame sink failed to deliver a frame.
    #[error("failed to present frame: {details}")]
    Present { details: String },
}

impl ImageBoxError {
    pub(crate) fn configuration(details: impl Into<String>) -> Self {
        Self::Configuration { details: details.into() }
    }

    pub(crate) fn load(path: impl Into<PathBuf>, details: impl ToString) -> Self {
        Self::Load { path: path.into(), details: details.to_string() }
    }
}
