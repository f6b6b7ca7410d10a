use std::fs;
use std::path::Path;

use tracing::info;

use crate::app::infrastructure::error::Result;

/// Reads and writes document contents. Path selection is the host's job.
pub trait FileIo {
    fn load(&self, path: &Path) -> Result<String>;

    fn save(&self, path: &Path, text: &str) -> Result<()>;
}

/// UTF-8 files on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileIo;

impl FileIo for LocalFileIo {
    fn load(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path)?;
        info!(path = %path.display(), bytes = content.len(), "file loaded");
        Ok(content)
    }

    fn save(&self, path: &Path, text: &str) -> Result<()> {
        fs::write(path, text)?;
        info!(path = %path.display(), bytes = text.len(), "file saved");
        Ok(())
    }
}
