//! Image availability checks against a local directory tree or a remote host.
//!
//! Both backends answer the same question: does `<folder>/<filename>` exist?
//! [`probe`] asks it first for the canonical name and then for its
//! all-lowercase variant, which covers hosts that lowercased uploads.

use std::path::{Path, PathBuf};
use std::time::Duration;

use meal_images_core::filename::{is_image_file, position_prefix};
use meal_images_core::{CanonicalFilename, CatalogError};

/// Where stored images live.
pub trait ImageStore {
    /// True only if the file is known to exist. Transport failures count as absent.
    fn exists(&self, folder: &str, filename: &str) -> bool;

    /// Human-readable location of a file (path or URL), used in reports.
    fn locate(&self, folder: &str, filename: &str) -> String;

    /// Stored image files sharing a position prefix in `folder`, sorted.
    ///
    /// Only stores that can list their contents return `Some`.
    fn slot_occupants(&self, _folder: &str, _prefix: &str) -> Option<Vec<String>> {
        None
    }
}

/// Outcome of checking one canonical filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Found under the canonical name.
    Exact,
    /// Found only under the lowercase variant.
    Lowercase,
    Absent,
}

impl Probe {
    pub fn is_present(self) -> bool {
        !matches!(self, Probe::Absent)
    }
}

/// Check a canonical filename, then its lowercase variant.
pub fn probe(store: &dyn ImageStore, folder: &str, filename: &CanonicalFilename) -> Probe {
    let exact = filename.to_string();
    if store.exists(folder, &exact) {
        return Probe::Exact;
    }
    let lower = filename.lowercase();
    if lower != exact && store.exists(folder, &lower) {
        return Probe::Lowercase;
    }
    Probe::Absent
}

/// Images stored under a local root: `<root>/<folder>/<filename>`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, folder: &str, filename: &str) -> PathBuf {
        self.root.join(folder).join(filename)
    }
}

impl ImageStore for LocalStore {
    fn exists(&self, folder: &str, filename: &str) -> bool {
        self.path_of(folder, filename).is_file()
    }

    fn locate(&self, folder: &str, filename: &str) -> String {
        self.path_of(folder, filename).display().to_string()
    }

    fn slot_occupants(&self, folder: &str, prefix: &str) -> Option<Vec<String>> {
        let entries = std::fs::read_dir(self.root.join(folder)).ok()?;
        let mut names: Vec<String> = entries
            .flatten()
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|name| is_image_file(name) && position_prefix(name) == Some(prefix))
            .collect();
        names.sort();
        Some(names)
    }
}

/// Settings for remote checks.
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    pub timeout: Duration,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
        }
    }
}

/// Images served over HTTP at `<base_url><folder>/<filename>`.
///
/// Existence is decided by a HEAD request; any 2xx status counts as present.
pub struct RemoteStore {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl RemoteStore {
    pub fn new(base_url: &str, config: &CheckerConfig) -> Result<Self, CatalogError> {
        if !is_remote(base_url) {
            return Err(CatalogError::config(format!(
                "remote base URL must start with http:// or https://, got {base_url:?}"
            )));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CatalogError::transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Full URL for a stored file, with the folder and filename percent-encoded.
    pub fn url_for(&self, folder: &str, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            urlencoding::encode(folder),
            urlencoding::encode(filename)
        )
    }

    /// HEAD the URL. `Ok(false)` for 404, `Err` for anything else unexpected.
    pub fn head(&self, url: &str) -> Result<bool, CatalogError> {
        let response = self
            .client
            .head(url)
            .send()
            .map_err(|e| CatalogError::transport(format!("HEAD {url}: {e}")))?;
        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Ok(false)
        } else {
            Err(CatalogError::transport(format!("HEAD {url}: HTTP {status}")))
        }
    }
}

impl ImageStore for RemoteStore {
    fn exists(&self, folder: &str, filename: &str) -> bool {
        let url = self.url_for(folder, filename);
        match self.head(&url) {
            Ok(found) => found,
            Err(e) => {
                log::debug!("{e}");
                false
            }
        }
    }

    fn locate(&self, folder: &str, filename: &str) -> String {
        self.url_for(folder, filename)
    }
}

/// Where to check: a local root directory or a remote base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    Local(PathBuf),
    Remote(String),
}

impl StorageLocation {
    /// Anything starting with `http://` or `https://` is remote; the rest is a path.
    pub fn parse(value: &str) -> Self {
        if is_remote(value) {
            StorageLocation::Remote(value.to_string())
        } else {
            StorageLocation::Local(PathBuf::from(value))
        }
    }

    pub fn open(&self, config: &CheckerConfig) -> Result<Box<dyn ImageStore>, CatalogError> {
        Ok(match self {
            StorageLocation::Local(root) => Box::new(LocalStore::new(root)),
            StorageLocation::Remote(url) => Box::new(RemoteStore::new(url, config)?),
        })
    }
}

impl std::fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageLocation::Local(root) => write!(f, "{}", root.display()),
            StorageLocation::Remote(url) => write!(f, "{url}"),
        }
    }
}

fn is_remote(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
#[path = "tests/availability_tests.rs"]
mod tests;
