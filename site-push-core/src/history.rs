//! Push history: the set of URLs the indexing service has already accepted.
//!
//! Persisted as plain UTF-8 text, one URL per line, no header.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, error, info};

use crate::error::SitePushError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushHistory {
    urls: BTreeSet<String>,
}

impl PushHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the history file. A missing file is a first run, not an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SitePushError> {
        let path_ref = path.as_ref();
        let content = match fs::read_to_string(path_ref) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(history_path = ?path_ref, "No push history yet, starting empty");
                return Ok(Self::new());
            }
            Err(e) => {
                error!(error = ?e, history_path = ?path_ref, "Failed to read push history");
                return Err(SitePushError::History {
                    path: path_ref.to_path_buf(),
                    source: e,
                });
            }
        };

        let history: PushHistory = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        info!(history_path = ?path_ref, count = history.len(), "Loaded push history");
        Ok(history)
    }

    /// Overwrites `path` with the full history, one URL per line.
    ///
    /// Written through a temp file in the same directory and renamed into place.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SitePushError> {
        let path_ref = path.as_ref();
        let to_history_error = |source: io::Error| {
            error!(error = ?source, history_path = ?path_ref, "Failed to write push history");
            SitePushError::History {
                path: path_ref.to_path_buf(),
                source,
            }
        };

        let dir = match path_ref.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(to_history_error)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(to_history_error)?;
        for url in &self.urls {
            writeln!(tmp, "{url}").map_err(to_history_error)?;
        }
        tmp.flush().map_err(to_history_error)?;
        if let Some(permissions) = history_permissions(path_ref)? {
            tmp.as_file()
                .set_permissions(permissions)
                .map_err(to_history_error)?;
        }
        tmp.persist(path_ref)
            .map_err(|e| to_history_error(e.error))?;

        debug!(history_path = ?path_ref, count = self.urls.len(), "Saved push history");
        Ok(())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Adds one URL; returns false if it was already recorded.
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }
}

/// Permissions for the rewritten file: the existing file's, or 0644 for a new one on unix.
fn history_permissions(path: &Path) -> Result<Option<fs::Permissions>, SitePushError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.permissions())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(new_file_permissions()),
        Err(e) => Err(SitePushError::History {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

impl FromIterator<String> for PushHistory {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        PushHistory {
            urls: iter.into_iter().collect(),
        }
    }
}

impl Extend<String> for PushHistory {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.urls.extend(iter);
    }
}
