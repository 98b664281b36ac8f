/// `load_config` module: Loads a static YAML run config and injects the push token from the environment.
///
/// This module is the only place where the user-supplied YAML is parsed and mapped to the
/// strongly-typed structs the core crate works with.
///
/// # Responsibilities
/// - Parse the YAML run configuration into type-safe Rust structs
/// - Resolve relative paths against the directory holding the config file
/// - Inject the push token from `SITE_PUSH_TOKEN` (never from YAML)
/// - Fail with clear diagnostics: every failure names the file or variable involved
///
/// # Errors
/// Errors are `anyhow::Error` wrapping a [`SitePushError::Configuration`], so the CLI can still
/// map them to the configuration exit code.
///
/// Accepted YAML:
///
/// ```yaml
/// site:
///   config_path: ../globals.js
///   content_dir: ../src/blogs
///   content_extension: md   # optional
///   url_prefix: posts       # optional
/// history:
///   path: pushed_baidu_urls.txt
/// push:
///   endpoint: http://data.zz.baidu.com/urls   # optional
///   timeout_secs: 30                          # optional, > 0
/// ```
use anyhow::Result;
use serde::Deserialize;
use site_push_core::generate::{GenerateOptions, DEFAULT_CONTENT_EXTENSION, DEFAULT_URL_PREFIX};
use site_push_core::synchronise::SynchroniseConfig;
use site_push_core::SitePushError;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use crate::push_client::{PushSettings, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};

/// Environment variable holding the indexing service token.
pub const TOKEN_ENV: &str = "SITE_PUSH_TOKEN";

#[derive(Debug)]
pub struct CliConfig {
    pub site: SiteSection,
    pub history: HistorySection,
    pub push: PushSection,
    /// Present only when `SITE_PUSH_TOKEN` is set and non-empty.
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SiteSection {
    pub config_path: PathBuf,
    pub content_dir: PathBuf,
    #[serde(default = "default_extension")]
    pub content_extension: String,
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
}

#[derive(Debug, Deserialize)]
pub struct HistorySection {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct PushSection {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PushSection {
    fn default() -> Self {
        PushSection {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_extension() -> String {
    DEFAULT_CONTENT_EXTENSION.to_string()
}

fn default_url_prefix() -> String {
    DEFAULT_URL_PREFIX.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl CliConfig {
    /// Core run configuration; `dry_run` comes from the command line.
    pub fn synchronise_config(&self, dry_run: bool) -> SynchroniseConfig {
        SynchroniseConfig {
            site_config_path: self.site.config_path.clone(),
            generate: GenerateOptions {
                content_dir: self.site.content_dir.clone(),
                extension: self.site.content_extension.clone(),
                url_prefix: self.site.url_prefix.clone(),
            },
            history_path: self.history.path.clone(),
            dry_run,
        }
    }

    /// Client settings for a real push. Fails if no token was provided.
    pub fn push_settings(&self) -> Result<PushSettings, SitePushError> {
        let token = self.token.clone().ok_or_else(|| {
            error!(var = TOKEN_ENV, "Push token environment variable not set");
            SitePushError::Configuration(format!("{TOKEN_ENV} environment variable not set"))
        })?;
        Ok(PushSettings {
            endpoint: self.push.endpoint.clone(),
            token,
            timeout: Duration::from_secs(self.push.timeout_secs),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    site: SiteSection,
    history: HistorySection,
    #[serde(default)]
    push: PushSection,
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Loads a static YAML config file (no secrets) and injects the token from the environment.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(SitePushError::Configuration(format!(
                "Failed to read config file {:?}: {}",
                path_ref, e
            ))
            .into());
        }
    };

    let raw: RawConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(
                SitePushError::Configuration(format!("Failed to parse config YAML: {e}")).into(),
            );
        }
    };

    if raw.push.timeout_secs == 0 {
        error!(config_path = ?path_ref, "push.timeout_secs must be greater than zero");
        return Err(SitePushError::Configuration(
            "push.timeout_secs must be greater than zero".to_string(),
        )
        .into());
    }

    let base = match path_ref.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let token = match std::env::var(TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => {
            info!(var = TOKEN_ENV, "Push token found in env");
            Some(token.trim().to_string())
        }
        _ => {
            info!(var = TOKEN_ENV, "No push token in env; only dry runs will work");
            None
        }
    };

    let config = CliConfig {
        site: SiteSection {
            config_path: resolve_against(&base, &raw.site.config_path),
            content_dir: resolve_against(&base, &raw.site.content_dir),
            content_extension: raw.site.content_extension,
            url_prefix: raw.site.url_prefix,
        },
        history: HistorySection {
            path: resolve_against(&base, &raw.history.path),
        },
        push: raw.push,
        token,
    };

    info!(
        site_config = %config.site.config_path.display(),
        content_dir = %config.site.content_dir.display(),
        history = %config.history.path.display(),
        endpoint = %config.push.endpoint,
        "Config loaded and merged successfully"
    );
    Ok(config)
}
