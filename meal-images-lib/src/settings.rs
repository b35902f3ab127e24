//! Application settings (remote host, image root, repair policy, provider).
//!
//! Stored at `~/.config/meal-images/settings.toml`. Every field has a
//! built-in default, so a missing file or a partial table is fine. CLI flags
//! override whatever is loaded here.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::availability::CheckerConfig;
use crate::repair::{MismatchPolicy, RepairOptions};

pub const DEFAULT_REMOTE_BASE_URL: &str = "https://fitnessappimages.onrender.com/";
pub const DEFAULT_REPORT_PATH: &str = "missing_meal_images.json";
pub const DEFAULT_API_KEY_ENV: &str = "MEAL_IMAGES_API_KEY";
pub const DEFAULT_PROVIDER_ENDPOINT: &str = "https://api.openai.com/v1/images/generations";

/// Errors reading or writing the settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL the app downloads product images from.
    pub remote_base_url: String,
    /// Directory holding the catalog documents and `images_*` folders.
    pub local_root: Option<PathBuf>,
    /// Timeout for a single availability request, in seconds.
    pub request_timeout_secs: u64,
    /// Fill missing slots with a copy of an existing image during repair.
    pub placeholder_repair: bool,
    /// What repair does with a wrong file sitting in a missing slot.
    pub mismatch_policy: MismatchPolicy,
    /// Where `scan` writes and `repair` reads the discrepancy report.
    pub report_path: PathBuf,
    /// Only catalog files whose name contains this (case-insensitive).
    pub document_filter: Option<String>,
    pub provider: ProviderSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            remote_base_url: DEFAULT_REMOTE_BASE_URL.to_string(),
            local_root: None,
            request_timeout_secs: 5,
            placeholder_repair: true,
            mismatch_policy: MismatchPolicy::default(),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            document_filter: None,
            provider: ProviderSettings::default(),
        }
    }
}

/// Text-to-image provider settings. The API key itself is only ever read
/// from the environment variable named by `api_key_env`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub endpoint: String,
    pub model: Option<String>,
    /// Size requested from the provider, e.g. `1024x1024`.
    pub size: String,
    pub api_key_env: String,
    /// Edge length of the stored square JPEG.
    pub output_size: u32,
    pub jpeg_quality: u8,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PROVIDER_ENDPOINT.to_string(),
            model: None,
            size: "1024x1024".to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            output_size: 384,
            jpeg_quality: 70,
        }
    }
}

impl ProviderSettings {
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

/// Canonical path to the settings file: `~/.config/meal-images/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("meal-images").join("settings.toml")
}

impl Settings {
    /// Load from [`settings_path`], falling back to defaults when the file is absent.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&settings_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the settings file atomically, creating its directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = self.to_toml()?;
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, serialized)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolve the working root using a priority chain:
    ///
    /// 1. CLI override (if `Some`)
    /// 2. `local_root` from the settings file
    /// 3. Current working directory
    pub fn resolve_root(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| self.local_root.clone())
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Report path, relative paths resolved against `root`.
    pub fn resolve_report_path(&self, root: &Path, cli_override: Option<PathBuf>) -> PathBuf {
        let path = cli_override.unwrap_or_else(|| self.report_path.clone());
        if path.is_absolute() {
            path
        } else {
            root.join(path)
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn checker_config(&self) -> CheckerConfig {
        CheckerConfig {
            timeout: self.request_timeout(),
        }
    }

    pub fn repair_options(&self) -> RepairOptions {
        RepairOptions {
            placeholders: self.placeholder_repair,
            mismatch_policy: self.mismatch_policy,
        }
    }
}
