//! Filesystem-backed recording repository
//!
//! Recordings live as plain audio files under one root directory; the
//! directory listing is the source of truth. No counters or registries
//! are kept anywhere else.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, warn};

/// File extensions treated as recordings.
pub const AUDIO_EXTENSIONS: &[&str] = &["m4a", "aac", "wav", "mp3", "flac", "ogg"];

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no recording named '{0}'")]
    NotFound(String),
    #[error("a recording named '{0}' already exists")]
    AlreadyExists(String),
    #[error("invalid recording name '{0}'")]
    InvalidName(String),
    #[error("'{0}' is not a supported audio file")]
    UnsupportedExtension(PathBuf),
}

/// Handle to one stored recording.
#[derive(Debug, Clone)]
pub struct Recording {
    /// File name including extension, unique within the store
    pub name: String,
    /// Absolute path to the audio file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Modification time as Unix timestamp seconds
    pub modified_time: u64,
}

/// Repository of recordings rooted at a single directory.
pub struct RecordingStore {
    root: PathBuf,
}

impl RecordingStore {
    /// Open a store at the given directory, creating it if needed.
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Default store location under the platform data directory.
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("remo")
            .join("recordings")
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List all recordings, sorted by name.
    pub fn list(&self) -> Result<Vec<Recording>, StoreError> {
        let mut recordings = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || !has_audio_extension(&path) {
                continue;
            }

            match self.handle_for(&path) {
                Ok(recording) => recordings.push(recording),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable file"),
            }
        }

        recordings.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(recordings)
    }

    /// Look up a single recording by name.
    pub fn get(&self, name: &str) -> Result<Recording, StoreError> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        self.handle_for(&path)
    }

    /// Copy an external audio file into the store under its own file name.
    pub fn import(&self, source: &Path) -> Result<Recording, StoreError> {
        if !has_audio_extension(source) {
            return Err(StoreError::UnsupportedExtension(source.to_path_buf()));
        }

        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StoreError::InvalidName(source.display().to_string()))?
            .to_string();

        let dest = self.path_for(&name)?;
        if dest.exists() {
            return Err(StoreError::AlreadyExists(name));
        }

        fs::copy(source, &dest)?;
        debug!(name, "recording imported");
        self.handle_for(&dest)
    }

    /// Rename a recording. The extension must be preserved by the caller's
    /// choice of new name; names with path separators are rejected.
    pub fn rename(&self, name: &str, new_name: &str) -> Result<Recording, StoreError> {
        let from = self.path_for(name)?;
        if !from.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }

        let to = self.path_for(new_name)?;
        if to.exists() {
            return Err(StoreError::AlreadyExists(new_name.to_string()));
        }

        fs::rename(&from, &to)?;
        debug!(from = name, to = new_name, "recording renamed");
        self.handle_for(&to)
    }

    /// Delete a recording by name.
    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }

        fs::remove_file(&path)?;
        debug!(name, "recording deleted");
        Ok(())
    }

    /// Resolve a name to a path inside the root, rejecting traversal.
    fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        if name.is_empty()
            || name.contains(['/', '\\'])
            || name == "."
            || name == ".."
        {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    fn handle_for(&self, path: &Path) -> Result<Recording, StoreError> {
        let meta = fs::metadata(path)?;
        let modified_time = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StoreError::InvalidName(path.display().to_string()))?
            .to_string();

        Ok(Recording {
            name,
            path: path.to_path_buf(),
            size: meta.len(),
            modified_time,
        })
    }
}

fn has_audio_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}
