//! File-based ReplayRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::replay::ReplayLog;
use crate::repository::traits::check_name;
use crate::repository::{ReplayFormat, ReplayRepository, RepositoryError, Result, StoredReplay};

/// Writes `log` to `path` through a temporary file and an atomic rename.
pub fn write_replay(path: &Path, log: &ReplayLog, format: ReplayFormat) -> Result<()> {
    let bytes = format.encode(&StoredReplay::seal(log.clone())?)?;

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    // Write to temp file
    fs::write(&temp_path, bytes).map_err(RepositoryError::Io)?;

    // Atomic rename
    fs::rename(&temp_path, path).map_err(RepositoryError::Io)?;

    tracing::debug!(
        "Saved replay ({} actions, {}) to {}",
        log.len(),
        format,
        path.display()
    );
    Ok(())
}

/// Reads a replay, picking the format from the file extension.
pub fn read_replay(path: &Path) -> Result<ReplayLog> {
    let format = ReplayFormat::from_path(path)
        .ok_or_else(|| RepositoryError::UnknownFormat(path.display().to_string()))?;
    let bytes = fs::read(path).map_err(RepositoryError::Io)?;
    let log = format.decode(&bytes)?.open()?;

    tracing::debug!("Loaded replay ({} actions) from {}", log.len(), path.display());
    Ok(log)
}

/// File-based implementation of ReplayRepository.
///
/// # File Format
///
/// Replays are stored as `{name}.bin` (bincode) or `{name}.json` depending
/// on the repository's [`ReplayFormat`]. Each file holds a [`StoredReplay`]:
/// the log plus the hex root of its actions.
pub struct FileReplayRepository {
    base_dir: PathBuf,
    format: ReplayFormat,
}

impl FileReplayRepository {
    /// Create a new file-based replay repository.
    pub fn new(base_dir: impl AsRef<Path>, format: ReplayFormat) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir, format })
    }

    pub fn format(&self) -> ReplayFormat {
        self.format
    }

    /// Get the path to a replay file.
    pub fn replay_path(&self, name: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}.{}", name, self.format.extension()))
    }
}

impl ReplayRepository for FileReplayRepository {
    fn save(&self, name: &str, log: &ReplayLog) -> Result<()> {
        check_name(name)?;
        write_replay(&self.replay_path(name), log, self.format)
    }

    fn load(&self, name: &str) -> Result<Option<ReplayLog>> {
        check_name(name)?;
        let path = self.replay_path(name);

        if !path.exists() {
            return Ok(None);
        }
        read_replay(&path).map(Some)
    }

    fn exists(&self, name: &str) -> bool {
        check_name(name).is_ok() && self.replay_path(name).exists()
    }

    fn delete(&self, name: &str) -> Result<()> {
        check_name(name)?;
        let path = self.replay_path(name);

        if path.exists() {
            fs::remove_file(&path).map_err(RepositoryError::Io)?;
            tracing::debug!("Deleted replay {}", name);
        }

        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let suffix = format!(".{}", self.format.extension());

        let entries = fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)?;

        for entry in entries {
            let entry = entry.map_err(RepositoryError::Io)?;
            let path = entry.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(name) = filename.strip_suffix(suffix.as_str())
                && check_name(name).is_ok()
            {
                names.push(name.to_string());
            }
        }

        names.sort_unstable();
        Ok(names)
    }
}
