//! File-backed session storage: one file per key in a session directory.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{SessionBackend, SessionError};

/// Stores each session key as a file under a directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never sees a partially written value.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `dir`. The directory is created lazily on
    /// first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the session files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_error(key: &str, source: std::io::Error) -> SessionError {
    SessionError::Io {
        key: key.to_string(),
        source,
    }
}

impl SessionBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SessionError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error(key, e))?;

        let target = self.path_for(key);
        let staging = self.dir.join(format!(".{key}.tmp"));
        let mut file = fs::File::create(&staging).map_err(|e| io_error(key, e))?;
        file.write_all(value.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| io_error(key, e))?;
        fs::rename(&staging, &target).map_err(|e| io_error(key, e))
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}
