//! Generating product photos for records that have none.
//!
//! The text-to-image backend sits behind [`ImageProvider`]. Whatever it
//! returns is decoded, resized to a square and re-encoded as JPEG before it
//! is written to the record's canonical slot.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use meal_images_core::{CanonicalFilename, CatalogError, Record};
use serde::{Deserialize, Serialize};

use crate::availability::{LocalStore, probe};
use crate::cancel::CancelFlag;
use crate::catalog::CatalogDocument;
use crate::settings::ProviderSettings;

/// Something that turns a prompt into encoded image bytes.
pub trait ImageProvider {
    fn generate(&self, prompt: &str) -> Result<Vec<u8>, CatalogError>;
}

/// Build the studio product-photo prompt for a record.
pub fn build_prompt(record: &Record) -> String {
    let name = &record.name;
    let containing = if record.ingredients().is_empty() {
        String::new()
    } else {
        format!(" containing {}", record.ingredients().join(", "))
    };
    format!(
        "Ultra-realistic product photography of a single {name}{containing} on a pure white background. \
         The {name} should take up exactly 70% of the frame and be perfectly centered. \
         Shot directly from the front or top (whichever best shows the product), \
         with professional studio lighting. The {name} must be in its natural orientation \
         (not upside down). Style reference: stock photography for grocery stores. \
         Photorealistic, not artistic. The image must be clean, simple, and consistent \
         with standardized product photography.\
         There should be no text nor people in the image."
    )
}

/// Decode provider output and re-encode it as a `size`×`size` JPEG.
pub fn encode_product_image(bytes: &[u8], size: u32, quality: u8) -> Result<Vec<u8>, CatalogError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| CatalogError::image(format!("failed to decode generated image: {e}")))?;
    let resized = decoded.resize_exact(size, size, FilterType::Lanczos3).to_rgb8();

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut out), quality);
    resized
        .write_with_encoder(encoder)
        .map_err(|e| CatalogError::image(format!("failed to encode JPEG: {e}")))?;
    Ok(out)
}

/// Options for [`generate_missing`].
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Edge length of the stored square image.
    pub size: u32,
    pub quality: u8,
    /// Stop after this many provider calls.
    pub limit: Option<usize>,
    /// Skip records before this 1-based position in every document.
    pub start_position: u32,
    /// Minimum time between provider calls.
    pub min_interval: Duration,
    /// Only report what would be generated.
    pub dry_run: bool,
    pub cancel: Option<CancelFlag>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            size: 384,
            quality: 70,
            limit: None,
            start_position: 1,
            min_interval: Duration::from_secs(1),
            dry_run: false,
            cancel: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum GenerateProgress {
    Document {
        name: String,
        record_count: usize,
    },
    Generating {
        name: String,
        position: u32,
        total: usize,
    },
    Done,
}

#[derive(Debug, Default)]
pub struct GenerateSummary {
    pub generated: Vec<PathBuf>,
    pub skipped_existing: usize,
    /// Paths that would be written (dry run only).
    pub planned: Vec<PathBuf>,
    pub failures: Vec<String>,
    pub cancelled: bool,
}

/// Generate, resize and store one image at `target`.
pub fn generate_one(
    record: &Record,
    target: &Path,
    provider: &dyn ImageProvider,
    options: &GenerateOptions,
) -> Result<(), CatalogError> {
    let prompt = build_prompt(record);
    log::debug!("Prompt for {:?}: {}", record.name, prompt);
    let raw = provider.generate(&prompt)?;
    let jpeg = encode_product_image(&raw, options.size, options.quality)?;
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(target, jpeg)?;
    Ok(())
}

/// Fill every empty canonical slot under `root` with a generated image.
///
/// A failure for one record is recorded and the loop moves on.
pub fn generate_missing(
    documents: &[CatalogDocument],
    root: &Path,
    provider: &dyn ImageProvider,
    options: &GenerateOptions,
    progress: &dyn Fn(GenerateProgress),
) -> GenerateSummary {
    let mut summary = GenerateSummary::default();
    let mut calls = 0usize;
    let mut last_call: Option<Instant> = None;
    let store = LocalStore::new(root);

    'documents: for doc in documents {
        let folder_name = doc.folder_name();
        let folder = root.join(&folder_name);
        let total = doc.list.records.len();
        progress(GenerateProgress::Document {
            name: doc.file_name(),
            record_count: total,
        });

        for (position, record) in doc.list.positioned() {
            if position < options.start_position {
                continue;
            }
            if options.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
                summary.cancelled = true;
                break 'documents;
            }

            let filename = match CanonicalFilename::encode(position, &record.name) {
                Ok(f) => f,
                Err(e) => {
                    summary
                        .failures
                        .push(format!("{} record {position}: {e}", doc.file_name()));
                    continue;
                }
            };
            // Same presence rule as a scan: the lowercase variant counts.
            if probe(&store, &folder_name, &filename).is_present() {
                summary.skipped_existing += 1;
                continue;
            }
            let target = folder.join(filename.to_string());
            if options.limit.is_some_and(|limit| calls >= limit) {
                break 'documents;
            }
            calls += 1;

            if options.dry_run {
                summary.planned.push(target);
                continue;
            }

            if let Some(previous) = last_call {
                let elapsed = previous.elapsed();
                if elapsed < options.min_interval {
                    std::thread::sleep(options.min_interval - elapsed);
                }
            }
            progress(GenerateProgress::Generating {
                name: record.name.clone(),
                position,
                total,
            });
            let result = generate_one(record, &target, provider, options);
            last_call = Some(Instant::now());

            match result {
                Ok(()) => summary.generated.push(target),
                Err(e) => {
                    log::warn!("Failed to generate {:?}: {}", record.name, e);
                    summary.failures.push(format!("{}: {}", record.name, e));
                }
            }
        }
    }

    progress(GenerateProgress::Done);
    summary
}

#[derive(Serialize)]
struct ImagesRequest<'a> {
    prompt: &'a str,
    n: u32,
    size: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    #[serde(default)]
    b64_json: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Provider for OpenAI-compatible `/v1/images/generations` endpoints.
pub struct OpenAiImagesProvider {
    endpoint: String,
    model: Option<String>,
    size: String,
    api_key: String,
    http: reqwest::blocking::Client,
}

impl OpenAiImagesProvider {
    pub fn new(settings: &ProviderSettings, api_key: String) -> Result<Self, CatalogError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| CatalogError::transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            size: settings.size.clone(),
            api_key,
            http,
        })
    }

    /// Build from settings, reading the key from the configured environment variable.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, CatalogError> {
        let key = settings.api_key().ok_or_else(|| {
            CatalogError::config(format!(
                "no API key: set the {} environment variable",
                settings.api_key_env
            ))
        })?;
        Self::new(settings, key)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| CatalogError::transport(format!("GET {url}: {e}")))?;
        if !response.status().is_success() {
            return Err(CatalogError::transport(format!(
                "GET {url}: HTTP {}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .map_err(|e| CatalogError::transport(format!("GET {url}: {e}")))?;
        Ok(bytes.to_vec())
    }
}

impl ImageProvider for OpenAiImagesProvider {
    fn generate(&self, prompt: &str) -> Result<Vec<u8>, CatalogError> {
        let request = ImagesRequest {
            prompt,
            n: 1,
            size: &self.size,
            model: self.model.as_deref(),
        };
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| CatalogError::transport(format!("POST {}: {e}", self.endpoint)))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| CatalogError::transport(format!("reading response: {e}")))?;
        if !status.is_success() {
            return Err(CatalogError::transport(format!(
                "image API returned HTTP {status}: {}",
                truncate(&text, 200)
            )));
        }

        let parsed: ImagesResponse = serde_json::from_str(&text).map_err(|e| {
            CatalogError::transport(format!(
                "unexpected image API response: {e}. Response: {}",
                truncate(&text, 200)
            ))
        })?;
        let first = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::transport("image API returned no images"))?;

        match (first.b64_json, first.url) {
            (Some(b64), _) => STANDARD
                .decode(b64.trim())
                .map_err(|e| CatalogError::image(format!("invalid base64 image data: {e}"))),
            (None, Some(url)) => self.download(&url),
            (None, None) => Err(CatalogError::transport(
                "image API response has neither b64_json nor url",
            )),
        }
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

#[cfg(test)]
#[path = "tests/generate_tests.rs"]
mod tests;
