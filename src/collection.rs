use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ImageBoxError, Result};
use crate::pixels::PixelBuffer;
use crate::texture_loader::ImageLoader;

#[derive(Debug, Clone)]
pub struct ImageEntry {
    pub path: PathBuf,
    pub pixels: PixelBuffer,
    /// Unique within the owning collection; changes whenever the pixels are replaced.
    pub revision: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Appended,
    Replaced,
}

/// Ordered, path-deduplicated images with a selection cursor.
///
/// The cursor is always a valid index while the collection is non-empty.
#[derive(Debug, Default)]
pub struct ImageCollection {
    entries: Vec<ImageEntry>,
    cursor: usize,
    next_revision: u64,
}

/// Absolute form of `path`, used as the identity of an image.
pub fn image_key(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

impl ImageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageEntry> {
        self.entries.iter()
    }

    /// `None` while the collection is empty.
    pub fn cursor(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.cursor)
    }

    pub fn position(&self, path: &Path) -> Option<usize> {
        let key = image_key(path);
        self.entries.iter().position(|entry| entry.path == key)
    }

    /// Loads `path` and stores it, replacing an earlier load of the same path in place.
    pub fn add(&mut self, path: &Path, loader: &impl ImageLoader) -> Result<AddOutcome> {
        let pixels = loader.load(path)?;
        Ok(self.insert(path, pixels))
    }

    pub fn insert(&mut self, path: &Path, pixels: PixelBuffer) -> AddOutcome {
        let revision = self.next_revision;
        self.next_revision += 1;
        match self.position(path) {
            Some(index) => {
                let entry = &mut self.entries[index];
                entry.pixels = pixels;
                entry.revision = revision;
                debug!(path = %entry.path.display(), index, "replaced image");
                AddOutcome::Replaced
            }
            None => {
                let path = image_key(path);
                debug!(path = %path.display(), index = self.entries.len(), "appended image");
                self.entries.push(ImageEntry { path, pixels, revision });
                AddOutcome::Appended
            }
        }
    }

    /// Removes `path` if present. The cursor keeps pointing at the same image
    /// when an earlier entry is removed; removing the selected image selects
    /// the one that followed it.
    pub fn remove(&mut self, path: &Path) -> bool {
        let Some(index) = self.position(path) else {
            return false;
        };
        let entry = self.entries.remove(index);
        debug!(path = %entry.path.display(), index, "removed image");
        if index < self.cursor {
            self.cursor -= 1;
        }
        if self.cursor >= self.entries.len() {
            self.cursor = 0;
        }
        true
    }

    pub fn advance(&mut self) {
        if !self.entries.is_empty() {
            self.cursor = (self.cursor + 1) % self.entries.len();
        }
    }

    /// Selects `index`, wrapping around the collection.
    pub fn select(&mut self, index: usize) -> Result<()> {
        if self.entries.is_empty() {
            return Err(ImageBoxError::NoImages);
        }
        self.cursor = index % self.entries.len();
        Ok(())
    }

    pub fn current(&self) -> Result<&ImageEntry> {
        self.entries.get(self.cursor).ok_or(ImageBoxError::NoImages)
    }
}
