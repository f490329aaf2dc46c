use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Locates the assistant's data directory next to the executable (portable
/// install) and creates its layout.
#[derive(Debug, Clone)]
pub struct PortablePathManager {
    data_dir: PathBuf,
}

impl PortablePathManager {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Directory holding the executable, or the working directory when the
    /// executable path is unavailable.
    pub fn root_dir() -> PathBuf {
        match std::env::current_exe() {
            Ok(mut path) => {
                path.pop();
                path
            }
            Err(e) => {
                warn!("Failed to get current exe path: {}. Falling back to current_dir.", e);
                std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
            }
        }
    }

    /// Default data directory (./data next to the executable).
    pub fn default_data_dir() -> PathBuf {
        Self::root_dir().join("data")
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Database directory (./data/db).
    pub fn db_dir(&self) -> PathBuf {
        self.data_dir.join("db")
    }

    /// Creates the data and db directories if they don't exist.
    pub fn init(&self) -> Result<(), std::io::Error> {
        for dir in [self.data_dir.clone(), self.db_dir()] {
            if !dir.exists() {
                info!("Creating directory: {:?}", dir);
                fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}
