//! Runtime configuration.
//!
//! Every operation takes its paths and service URL from a [`Config`] instead of
//! module-wide constants. The defaults mirror the layout of the curation
//! repository: a `resources/` directory holding `xrefs.tsv` and an `export/`
//! directory, both next to the crate manifest.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Base URL of the GILDA grounding service.
pub const GILDA_URL: &str = "http://grounding.indra.bio";

/// Default timeout applied to grounding requests.
pub const DEFAULT_GROUNDING_TIMEOUT: Duration = Duration::from_secs(30);

pub const XREFS_FILE_NAME: &str = "xrefs.tsv";

pub const XREFS_PATH_ENV: &str = "XREFS_PATH";
pub const EXPORT_DIRECTORY_ENV: &str = "EXPORT_DIRECTORY";
pub const GILDA_URL_ENV: &str = "GILDA_URL";
pub const GILDA_TIMEOUT_ENV: &str = "GILDA_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct GroundingConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            base_url: GILDA_URL.to_string(),
            timeout: DEFAULT_GROUNDING_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub resources_dir: PathBuf,
    pub export_dir: PathBuf,
    pub xrefs_path: PathBuf,
    pub grounding: GroundingConfig,
}

impl Default for Config {
    fn default() -> Self {
        let here = Path::new(env!("CARGO_MANIFEST_DIR"));
        let resources_dir = here.join("resources");
        Self {
            xrefs_path: resources_dir.join(XREFS_FILE_NAME),
            export_dir: here.join("export"),
            resources_dir,
            grounding: GroundingConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, overridden by any of `XREFS_PATH`, `EXPORT_DIRECTORY`,
    /// `GILDA_URL` and `GILDA_TIMEOUT_SECS` that are set.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = env::var(XREFS_PATH_ENV) {
            config.xrefs_path = PathBuf::from(path);
        }
        if let Ok(dir) = env::var(EXPORT_DIRECTORY_ENV) {
            config.export_dir = PathBuf::from(dir);
        }
        if let Ok(url) = env::var(GILDA_URL_ENV) {
            config.grounding.base_url = url;
        }
        // Unparseable values fall back to the default.
        if let Some(secs) = env::var(GILDA_TIMEOUT_ENV)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
        {
            config.grounding.timeout = Duration::from_secs(secs);
        }

        config
    }

    /// Points the config at a different xrefs file.
    pub fn with_xrefs_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.xrefs_path = path.into();
        self
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn with_grounding_url(mut self, url: impl Into<String>) -> Self {
        self.grounding.base_url = url.into();
        self
    }

    pub fn with_grounding_timeout(mut self, timeout: Duration) -> Self {
        self.grounding.timeout = timeout;
        self
    }
}
