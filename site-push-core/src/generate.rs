//! Maps content files to canonical post URLs and drops the ones already pushed.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::error::SitePushError;
use crate::history::PushHistory;
use crate::site_url::SiteUrl;

pub const DEFAULT_CONTENT_EXTENSION: &str = "md";
pub const DEFAULT_URL_PREFIX: &str = "posts";

/// Where content lives and how its paths become URLs.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub content_dir: PathBuf,
    /// File extension without the dot.
    pub extension: String,
    /// Path segment between the site URL and the post path.
    pub url_prefix: String,
}

impl GenerateOptions {
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            extension: DEFAULT_CONTENT_EXTENSION.to_string(),
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
        }
    }
}

/// URLs still to be pushed, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateBatch {
    pub urls: Vec<String>,
    /// Matching content files found under the root.
    pub discovered: usize,
    /// Files skipped because their URL is already in the history.
    pub filtered: usize,
}

impl CandidateBatch {
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Builds `{site}/{prefix}/{relative path without extension}` with `/` separators.
pub fn candidate_url(site_url: &SiteUrl, url_prefix: &str, relative: &Path) -> String {
    let stripped = relative.with_extension("");
    let segments: Vec<String> = stripped
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let prefix = url_prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{}/{}", site_url, segments.join("/"))
    } else {
        format!("{}/{}/{}", site_url, prefix, segments.join("/"))
    }
}

/// Path of a content file relative to `root`, or `None` when nothing is left after stripping.
fn post_path<'a>(root: &Path, path: &'a Path) -> Option<&'a Path> {
    path.strip_prefix(root)
        .ok()
        .filter(|relative| relative.components().next().is_some())
}

/// Walks the content tree and returns every post URL not yet in `history`.
///
/// Reads only; `history` is left untouched.
pub fn generate_candidates(
    options: &GenerateOptions,
    site_url: &SiteUrl,
    history: &PushHistory,
) -> Result<CandidateBatch, SitePushError> {
    let root = &options.content_dir;
    let mut batch = CandidateBatch::default();

    if !root.exists() {
        warn!(content_dir = %root.display(), "Content directory does not exist, nothing to scan");
        return Ok(batch);
    }
    if !root.is_dir() {
        warn!(content_dir = %root.display(), "Content path is not a directory, nothing to scan");
        return Ok(batch);
    }

    info!(content_dir = %root.display(), extension = %options.extension, "Scanning content files");

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            error!(error = ?e, content_dir = %root.display(), "Failed while walking content directory");
            SitePushError::ContentScan {
                path: root.clone(),
                message: e.to_string(),
            }
        })?;

        // symlinked posts count; is_file follows the link
        if !entry.path().is_file() {
            continue;
        }
        let matches_extension = entry
            .path()
            .extension()
            .map(|ext| ext == OsStr::new(&options.extension))
            .unwrap_or(false);
        if !matches_extension {
            continue;
        }

        let relative = match post_path(root, entry.path()) {
            Some(relative) => relative,
            None => {
                debug!(path = %entry.path().display(), "Not below the content root, skipping");
                continue;
            }
        };

        batch.discovered += 1;
        let url = candidate_url(site_url, &options.url_prefix, relative);

        if history.contains(&url) {
            debug!(url = %url, "Already pushed, skipping");
            batch.filtered += 1;
            continue;
        }

        info!(url = %url, "Added URL");
        batch.urls.push(url);
    }

    if batch.filtered > 0 {
        info!(filtered = batch.filtered, "Filtered already pushed URLs");
    }
    info!(
        discovered = batch.discovered,
        candidates = batch.urls.len(),
        "Candidate generation complete"
    );
    Ok(batch)
}
