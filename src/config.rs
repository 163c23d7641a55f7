use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ProfileError, Result};

pub const STORAGE_ENV: &str = "QR_PROFILES_STORAGE";
pub const SCAN_BASE_URL_ENV: &str = "QR_PROFILES_SCAN_BASE_URL";
pub const RENDERER_URL_ENV: &str = "QR_PROFILES_RENDERER_URL";

const DEFAULT_STORAGE_ROOT: &str = ".qr-profiles";
const DEFAULT_SCAN_BASE_URL: &str = "http://localhost:8080/qr/";
const DEFAULT_RENDERER_URL: &str =
    "https://api.qrserver.com/v1/create-qr-code/";
const DEFAULT_RENDERER_SIZE: u32 = 200;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Directory of the file store.
    pub storage_root: PathBuf,
    /// Published scan links are `<scan_base_url><code>`.
    pub scan_base_url: Url,
    /// External service that turns a scan link into a code image.
    pub renderer_url: Url,
    /// Edge length of the requested image, in pixels.
    pub renderer_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            scan_base_url: Url::parse(DEFAULT_SCAN_BASE_URL)
                .expect("default scan base URL is valid"),
            renderer_url: Url::parse(DEFAULT_RENDERER_URL)
                .expect("default renderer URL is valid"),
            renderer_size: DEFAULT_RENDERER_SIZE,
        }
    }
}

impl Config {
    /// Read a JSON config file; absent keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            ProfileError::Storage(path.display().to_string(), e.to_string())
        })?;
        log::debug!("loaded config from {}", path.display());
        config.validate()
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("{} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Apply `QR_PROFILES_*` environment variables on top.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        if let Some(root) = lookup(STORAGE_ENV) {
            self.storage_root = PathBuf::from(root);
        }
        if let Some(url) = lookup(SCAN_BASE_URL_ENV) {
            self.scan_base_url = Url::parse(&url)?;
        }
        if let Some(url) = lookup(RENDERER_URL_ENV) {
            self.renderer_url = Url::parse(&url)?;
        }
        self.validate()
    }

    fn validate(mut self) -> Result<Self> {
        if self.scan_base_url.cannot_be_a_base() {
            return Err(ProfileError::validation(format!(
                "scan base URL {} cannot hold a path",
                self.scan_base_url
            )));
        }
        // Without the trailing slash `join` would replace the last segment.
        if !self.scan_base_url.path().ends_with('/') {
            let path = format!("{}/", self.scan_base_url.path());
            self.scan_base_url.set_path(&path);
        }
        if self.renderer_size == 0 {
            return Err(ProfileError::validation(
                "renderer size must be positive",
            ));
        }
        Ok(self)
    }
}
