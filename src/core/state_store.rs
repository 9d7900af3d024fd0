/*
 * Persists the editor state between sessions. The whole state is written as
 * one JSON snapshot under a fixed file name (`outline_state.json`) inside the
 * application's per-user local configuration directory, or inside a directory
 * supplied explicitly by the host.
 *
 * It includes a trait for store operations (`StateStoreOperations`) so the
 * presenter can be tested against a mock, and a concrete implementation
 * (`CoreStateStore`). Loading always goes through `persistence_codec`, so
 * snapshots written by older versions are migrated on the way in.
 */
use super::models::EditorState;
use super::path_utils;
use super::persistence_codec::{self, CodecError};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const STATE_FILE_NAME: &str = "outline_state.json";
pub const UNREADABLE_COPY_EXTENSION: &str = "json.unreadable";

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Codec(CodecError),
    NoStorageDirectory,
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<CodecError> for StoreError {
    fn from(err: CodecError) -> Self {
        StoreError::Codec(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "State storage I/O error: {e}"),
            StoreError::Codec(e) => write!(f, "Stored state is unreadable: {e}"),
            StoreError::NoStorageDirectory => {
                write!(f, "Could not determine a directory for the stored state")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Codec(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

pub trait StateStoreOperations: Send + Sync {
    /*
     * Returns `Ok(None)` when nothing has been stored yet, so the caller can
     * start from a fresh state.
     */
    fn load_state(&self) -> Result<Option<EditorState>>;
    fn save_state(&self, state: &EditorState) -> Result<()>;
    fn storage_path(&self) -> Option<PathBuf>;
}

pub struct CoreStateStore {
    storage_dir: Option<PathBuf>,
}

impl CoreStateStore {
    /// Stores state in the per-user local config directory of `app_name`.
    pub fn new(app_name: &str) -> Self {
        CoreStateStore {
            storage_dir: path_utils::get_base_app_config_local_dir(app_name),
        }
    }

    pub fn with_directory(storage_dir: PathBuf) -> Self {
        CoreStateStore {
            storage_dir: Some(storage_dir),
        }
    }

    fn state_file_path(&self) -> Result<PathBuf> {
        let dir = self
            .storage_dir
            .as_ref()
            .ok_or(StoreError::NoStorageDirectory)?;
        Ok(dir.join(STATE_FILE_NAME))
    }

    /*
     * A failed load makes the session start empty, and its first save would
     * replace the stored file. The unreadable file is copied aside first.
     */
    fn keep_unreadable_copy(file_path: &Path) {
        let copy_path = file_path.with_extension(UNREADABLE_COPY_EXTENSION);
        match fs::copy(file_path, &copy_path) {
            Ok(_) => log::warn!("CoreStateStore: Kept unreadable state as {copy_path:?}."),
            Err(e) => log::error!("CoreStateStore: Could not copy unreadable state: {e}"),
        }
    }

    fn ensure_dir(dir: &Path) -> Result<()> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
            log::debug!("CoreStateStore: Created storage directory {dir:?}");
        }
        Ok(())
    }
}

impl StateStoreOperations for CoreStateStore {
    fn load_state(&self) -> Result<Option<EditorState>> {
        let file_path = self.state_file_path()?;
        log::trace!("CoreStateStore: Loading state from {file_path:?}");
        if !file_path.exists() {
            log::debug!("CoreStateStore: No stored state at {file_path:?}.");
            return Ok(None);
        }

        let text = fs::read_to_string(&file_path)?;
        let state = match persistence_codec::snapshot_from_json(&text)
            .and_then(persistence_codec::deserialize)
        {
            Ok(state) => state,
            Err(e) => {
                Self::keep_unreadable_copy(&file_path);
                return Err(e.into());
            }
        };
        log::debug!(
            "CoreStateStore: Loaded state with {} root node(s) from {file_path:?}.",
            state.nodes.len()
        );
        Ok(Some(state))
    }

    /*
     * Writes the snapshot to a sibling temporary file first and renames it
     * over the previous one, so an interrupted write never leaves a truncated
     * state file behind.
     */
    fn save_state(&self, state: &EditorState) -> Result<()> {
        let file_path = self.state_file_path()?;
        log::trace!("CoreStateStore: Saving state to {file_path:?}");
        if let Some(dir) = file_path.parent() {
            Self::ensure_dir(dir)?;
        }

        let temp_path = file_path.with_extension("json.tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            let json = persistence_codec::snapshot_to_json(&persistence_codec::serialize(state))?;
            writer.write_all(json.as_bytes())?;
            writer.flush()?;
        }
        fs::rename(&temp_path, &file_path)?;
        log::debug!("CoreStateStore: Saved state to {file_path:?}.");
        Ok(())
    }

    fn storage_path(&self) -> Option<PathBuf> {
        self.state_file_path().ok()
    }
}
