//! File access used when uploading attachments.

use std::fs;
use std::io;
use std::path::Path;

/// Reads files from disk.
pub trait FileSystem {
    /// Read the whole file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}
