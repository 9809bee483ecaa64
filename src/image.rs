//! The image source: a file mapped read-only.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use thiserror::Error;

/// Failure to open or map an image, reported on stderr before any
/// check runs. Open, stat, and map failures all share the one fixed
/// diagnostic.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("ERROR: image not found")]
    NotFound(#[source] std::io::Error),

    #[error("ERROR: image not found")]
    Map(#[source] std::io::Error),
}

/// A file-system image mapped read-only for the life of the program.
#[derive(Debug)]
pub struct Image {
    map: Mmap,
}

impl Image {
    /// Open the image at `path` read-only and map it.
    pub fn open(path: impl AsRef<Path>) -> Result<Image, OpenError> {
        let file = File::open(path).map_err(OpenError::NotFound)?;
        // SAFETY: the mapping is private and read-only, and the checker
        // never writes through it.
        let map = unsafe { Mmap::map(&file) }.map_err(OpenError::Map)?;
        Ok(Image { map })
    }

    /// The mapped bytes. Random access at any offset is O(1).
    pub fn bytes(&self) -> &[u8] {
        &self.map
    }
}
