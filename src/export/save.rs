//! Where downloads end up.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Download, ExportError};

/// Persists a [`Download`] somewhere the user can find it.
pub trait FileSaver {
    fn save(&self, download: &Download) -> Result<PathBuf, ExportError>;
}

/// Writes downloads into a directory, replacing files with the same name.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, download: &Download) -> PathBuf {
        self.dir.join(&download.filename)
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, download: &Download) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(download);
        fs::write(&path, &download.bytes)?;
        debug!(path = %path.display(), "Saved download");
        Ok(path)
    }
}
