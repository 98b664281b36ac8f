//! Resolves the canonical site URL from the site's own configuration source.
//!
//! The blog declares its base URL once, e.g. in `globals.js`:
//!
//! ```text
//! export const siteUrl = 'https://example.com/';
//! ```
//!
//! Only the `siteUrl = "<url>"` assignment matters; surrounding keywords and the trailing
//! semicolon are ignored.

use std::fmt;
use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::{error, info};

use crate::error::SitePushError;

const SITE_URL_PATTERN: &str = r#"\bsiteUrl\s*=\s*['"](.*?)['"]"#;

/// Canonical base URL of the site, never ending in `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrl(String);

impl SiteUrl {
    /// Builds a site URL from a raw declaration value, dropping trailing slashes.
    pub fn new(raw: &str) -> Result<Self, SitePushError> {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(SitePushError::Configuration(
                "siteUrl is declared but empty".to_string(),
            ));
        }
        Ok(SiteUrl(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extracts the `siteUrl` declaration from already-loaded source text.
pub fn parse_site_url(source: &str) -> Result<SiteUrl, SitePushError> {
    let pattern = Regex::new(SITE_URL_PATTERN)
        .map_err(|e| SitePushError::Configuration(format!("invalid siteUrl pattern: {e}")))?;

    match pattern.captures(source).and_then(|caps| caps.get(1)) {
        Some(value) => SiteUrl::new(value.as_str()),
        None => Err(SitePushError::Configuration(
            "siteUrl not found in site configuration".to_string(),
        )),
    }
}

/// Reads the site configuration file at `path` and resolves its `siteUrl`.
pub fn resolve_site_url<P: AsRef<Path>>(path: P) -> Result<SiteUrl, SitePushError> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Resolving site URL");

    let source = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to read site configuration");
        SitePushError::Configuration(format!(
            "failed to read site configuration {:?}: {}",
            path_ref, e
        ))
    })?;

    match parse_site_url(&source) {
        Ok(site_url) => {
            info!(site_url = %site_url, "Resolved site URL");
            Ok(site_url)
        }
        Err(e) => {
            error!(error = %e, config_path = ?path_ref, "No usable siteUrl declaration");
            Err(e)
        }
    }
}
