//! Batch export into a plain directory.
//!
//! Entries are staged under a `.partial` suffix and renamed into place by
//! [`ArchiveWriter::finish`], so an interrupted export never leaves a set of
//! `card_N.png` files that looks complete.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use card_renderer::ArchiveWriter;

const STAGING_SUFFIX: &str = ".partial";

/// Writes each entry as a file in one directory.
#[derive(Debug)]
pub struct DirectoryArchive {
    dir: PathBuf,
    staged: Vec<String>,
}

impl DirectoryArchive {
    /// Use `dir` as the output directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            staged: Vec::new(),
        })
    }

    /// The output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn staging_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}{STAGING_SUFFIX}"))
    }
}

impl ArchiveWriter for DirectoryArchive {
    fn add_entry(&mut self, name: &str, data: &[u8]) -> io::Result<()> {
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid entry name {name:?}"),
            ));
        }
        fs::write(self.staging_path(name), data)?;
        self.staged.push(name.to_string());
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        for name in self.staged.drain(..) {
            let staged = self.dir.join(format!("{name}{STAGING_SUFFIX}"));
            fs::rename(staged, self.dir.join(&name))?;
        }
        tracing::debug!("Finished archive in {}", self.dir.display());
        Ok(())
    }
}

impl Drop for DirectoryArchive {
    fn drop(&mut self) {
        for name in &self.staged {
            let _ = fs::remove_file(self.staging_path(name));
        }
    }
}
