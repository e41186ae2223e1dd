use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::InvError;

/// The inventory file, read as one piece of text.
#[derive(Debug, Clone)]
pub struct DataSource {
    path: PathBuf,
}

impl DataSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name used as table title.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string()
    }

    pub fn read_text(&self) -> Result<String, InvError> {
        info!("Reading inventory from {}", self.path.display());
        let metadata = fs::metadata(&self.path).map_err(|e| self.map_io_error(e))?;
        if !metadata.is_file() {
            return Err(InvError::NotAFile(self.path.clone()));
        }
        let text = fs::read_to_string(&self.path).map_err(|e| self.map_io_error(e))?;
        debug!("Read {} bytes", text.len());
        Ok(text)
    }

    fn map_io_error(&self, e: std::io::Error) -> InvError {
        match e.kind() {
            ErrorKind::NotFound => InvError::FileNotFound(self.path.clone()),
            ErrorKind::PermissionDenied => InvError::PermissionDenied(self.path.clone()),
            _ => InvError::IoError(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/inventory.csv")
    }

    #[test]
    fn reads_fixture() {
        let source = DataSource::new(fixture());
        let text = source.read_text().unwrap();
        assert!(text.starts_with("id,name,size,quality"));
        assert_eq!(source.name(), "inventory.csv");
    }

    #[test]
    fn missing_file_is_unavailable() {
        let source = DataSource::new(PathBuf::from("does/not/exist.csv"));
        let err = source.read_text().unwrap_err();
        assert!(matches!(err, InvError::FileNotFound(_)));
        assert!(err.is_source_unavailable());
    }

    #[test]
    fn directory_is_not_a_file() {
        let source = DataSource::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")));
        assert!(matches!(source.read_text(), Err(InvError::NotAFile(_))));
    }
}
