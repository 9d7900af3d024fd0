/*
 * Keeps small host preferences that are not part of the outline itself,
 * currently the path of the document last used for import or export. The
 * value lives in a text file in the application's per-user local config
 * directory and is only a convenience: losing it never affects the outline.
 *
 * `ConfigManagerOperations` lets the presenter be tested with a mock;
 * `CoreConfigManager` is the file-backed implementation.
 */
use crate::core::path_utils;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const LAST_DOCUMENT_PATH_FILENAME: &str = "last_document_path.txt";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    NoConfigDirectory,
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
            ConfigError::NoConfigDirectory => {
                write!(f, "Could not determine the configuration directory")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub trait ConfigManagerOperations: Send + Sync {
    fn load_last_document_path(&self) -> Result<Option<PathBuf>>;
    fn save_last_document_path(&self, document_path: &Path) -> Result<()>;
}

pub struct CoreConfigManager {
    config_dir: Option<PathBuf>,
}

impl CoreConfigManager {
    pub fn new(app_name: &str) -> Self {
        CoreConfigManager {
            config_dir: path_utils::get_base_app_config_local_dir(app_name),
        }
    }

    pub fn with_directory(config_dir: PathBuf) -> Self {
        CoreConfigManager {
            config_dir: Some(config_dir),
        }
    }

    fn file_path(&self) -> Result<PathBuf> {
        let dir = self
            .config_dir
            .as_ref()
            .ok_or(ConfigError::NoConfigDirectory)?;
        Ok(dir.join(LAST_DOCUMENT_PATH_FILENAME))
    }
}

impl ConfigManagerOperations for CoreConfigManager {
    fn load_last_document_path(&self) -> Result<Option<PathBuf>> {
        let file_path = self.file_path()?;
        log::trace!("CoreConfigManager: Loading last document path from {file_path:?}");

        if !file_path.exists() {
            log::debug!("CoreConfigManager: Last document file {file_path:?} does not exist.");
            return Ok(None);
        }

        let contents = fs::read_to_string(&file_path)?;
        let path_text = contents.trim();
        if path_text.is_empty() {
            log::debug!("CoreConfigManager: Last document file {file_path:?} is empty.");
            Ok(None)
        } else {
            log::debug!("CoreConfigManager: Loaded last document path '{path_text}'.");
            Ok(Some(PathBuf::from(path_text)))
        }
    }

    fn save_last_document_path(&self, document_path: &Path) -> Result<()> {
        let file_path = self.file_path()?;
        log::trace!("CoreConfigManager: Saving last document path {document_path:?}");
        if let Some(dir) = file_path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&file_path, document_path.to_string_lossy().as_bytes())?;
        log::debug!("CoreConfigManager: Saved last document path to {file_path:?}.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_last_document_path() {
        // Arrange
        let dir = tempdir().unwrap();
        let manager = CoreConfigManager::with_directory(dir.path().to_path_buf());
        let document = PathBuf::from("/tmp/outline-export.json");

        // Act
        manager.save_last_document_path(&document).unwrap();

        // Assert
        match manager.load_last_document_path() {
            Ok(Some(loaded)) => assert_eq!(loaded, document),
            Ok(None) => panic!("Expected a stored document path, but got None."),
            Err(e) => panic!("Failed to load document path: {e:?}"),
        }
    }

    #[test]
    fn test_load_last_document_path_not_exists() {
        let dir = tempdir().unwrap();
        let manager = CoreConfigManager::with_directory(dir.path().to_path_buf());
        assert!(manager.load_last_document_path().unwrap().is_none());
    }

    #[test]
    fn test_load_last_document_path_empty_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(LAST_DOCUMENT_PATH_FILENAME), "  \n").unwrap();
        let manager = CoreConfigManager::with_directory(dir.path().to_path_buf());
        assert!(manager.load_last_document_path().unwrap().is_none());
    }

    #[test]
    fn test_save_last_document_path_overwrites() {
        let dir = tempdir().unwrap();
        let manager = CoreConfigManager::with_directory(dir.path().to_path_buf());
        manager
            .save_last_document_path(Path::new("/tmp/first.json"))
            .unwrap();
        manager
            .save_last_document_path(Path::new("/tmp/second.json"))
            .unwrap();
        assert_eq!(
            manager.load_last_document_path().unwrap(),
            Some(PathBuf::from("/tmp/second.json"))
        );
    }

    #[test]
    fn test_no_config_directory() {
        let manager = CoreConfigManager { config_dir: None };
        assert!(matches!(
            manager.save_last_document_path(Path::new("/tmp/x.json")),
            Err(ConfigError::NoConfigDirectory)
        ));
    }
}
