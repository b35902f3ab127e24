//! Catalog documents: discovery, loading, validation and in-place rewrite.
//!
//! A document is a JSON file shaped `{"meals": [...]}` or
//! `{"productlist": [...]}`. The parsed JSON is kept next to the typed
//! [`ProductList`] so that a rewrite only touches record names and leaves
//! every other key, and the key order, as it was.

use std::fs;
use std::path::{Path, PathBuf};

use meal_images_core::{CatalogError, DocumentKey, ProductList, Record, folder_name};
use serde_json::Value;

pub const DOCUMENT_EXTENSION: &str = "json";

/// One loaded catalog document.
#[derive(Debug, Clone)]
pub struct CatalogDocument {
    pub path: PathBuf,
    pub key: DocumentKey,
    pub list: ProductList,
    raw: Value,
}

impl CatalogDocument {
    /// Build a document from parsed JSON, validating every record.
    pub fn from_value(path: impl Into<PathBuf>, raw: Value) -> Result<Self, CatalogError> {
        let path = path.into();
        let base_name = base_name(&path);

        let key = DocumentKey::detect(&raw).ok_or_else(|| {
            CatalogError::format(format!(
                "{}: expected a top-level \"meals\" or \"productlist\" array",
                path.display()
            ))
        })?;

        let items = raw
            .get(key.as_str())
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut records = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            records.push(parse_record(&base_name, i + 1, item)?);
        }

        Ok(Self {
            path,
            key,
            list: ProductList::new(base_name, records),
            raw,
        })
    }

    /// Document base name: the file name without `.json`.
    pub fn base_name(&self) -> &str {
        &self.list.name
    }

    /// The file name including its extension, as shown in reports.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.{DOCUMENT_EXTENSION}", self.list.name))
    }

    /// `images_<base name>`.
    pub fn folder_name(&self) -> String {
        folder_name(self.base_name())
    }

    /// Replace the name of the record at `position` (1-based).
    pub fn rename_record(&mut self, position: u32, new_name: &str) -> Result<(), CatalogError> {
        let index = position
            .checked_sub(1)
            .map(|p| p as usize)
            .filter(|&i| i < self.list.records.len())
            .ok_or_else(|| {
                CatalogError::format(format!(
                    "{} has no record at position {position}",
                    self.base_name()
                ))
            })?;
        if new_name.trim().is_empty() {
            return Err(CatalogError::format("replacement name is empty"));
        }

        let doc_name = self.base_name().to_string();
        let entry = self
            .raw
            .get_mut(self.key.as_str())
            .and_then(|items| items.get_mut(index))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| {
                CatalogError::format(format!("{doc_name}: record {position} is not an object"))
            })?;
        entry.insert("name".to_string(), Value::String(new_name.to_string()));
        self.list.records[index].name = new_name.to_string();
        Ok(())
    }

    /// Pretty JSON (2-space indent, non-ASCII left as-is) with a trailing newline.
    pub fn to_pretty_json(&self) -> Result<String, CatalogError> {
        let mut text = serde_json::to_string_pretty(&self.raw)?;
        text.push('\n');
        Ok(text)
    }
}

fn parse_record(document: &str, position: usize, item: &Value) -> Result<Record, CatalogError> {
    let object = item.as_object().ok_or_else(|| {
        CatalogError::format(format!("{document}: record {position} is not an object"))
    })?;

    let name = match object.get("name") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::String(_)) => {
            return Err(CatalogError::format(format!(
                "{document}: record {position} has an empty name"
            )));
        }
        Some(_) => {
            return Err(CatalogError::format(format!(
                "{document}: record {position} has a non-string name"
            )));
        }
        None => {
            return Err(CatalogError::format(format!(
                "{document}: record {position} has no name"
            )));
        }
    };

    let ingredients = match object.get("ingredients") {
        None | Some(Value::Null) => None,
        Some(Value::Array(values)) => {
            let mut list = Vec::with_capacity(values.len());
            for value in values {
                match value.as_str() {
                    Some(s) => list.push(s.to_string()),
                    None => {
                        return Err(CatalogError::format(format!(
                            "{document}: record {position} ({name}) has a non-string ingredient"
                        )));
                    }
                }
            }
            Some(list)
        }
        Some(_) => {
            return Err(CatalogError::format(format!(
                "{document}: record {position} ({name}) has ingredients that are not a list"
            )));
        }
    };

    Ok(Record { name, ingredients })
}

fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// List the catalog documents directly inside `root`, sorted by file name.
///
/// When `filter` is set, only files whose name contains it (case-insensitive)
/// are returned.
pub fn discover_documents(root: &Path, filter: Option<&str>) -> std::io::Result<Vec<PathBuf>> {
    let filter = filter.map(str::to_lowercase);
    let mut paths: Vec<PathBuf> = fs::read_dir(root)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
        })
        .filter(|path| match &filter {
            Some(f) => path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.to_lowercase().contains(f.as_str())),
            None => true,
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Read and validate a single catalog document.
pub fn load_document(path: &Path) -> Result<CatalogDocument, CatalogError> {
    let contents = fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&contents)?;
    CatalogDocument::from_value(path, raw)
}

/// Documents that loaded, and the ones that didn't with their reason.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub documents: Vec<CatalogDocument>,
    pub failures: Vec<(PathBuf, CatalogError)>,
}

/// Load every path, isolating failures to the document that caused them.
pub fn load_all(paths: &[PathBuf]) -> LoadOutcome {
    let mut outcome = LoadOutcome::default();
    for path in paths {
        match load_document(path) {
            Ok(doc) => {
                log::debug!(
                    "Loaded {} ({} records)",
                    path.display(),
                    doc.list.records.len()
                );
                outcome.documents.push(doc);
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                outcome.failures.push((path.clone(), e));
            }
        }
    }
    outcome
}

/// Write a document back to its own path via a temp file.
pub fn save_document(doc: &CatalogDocument) -> Result<(), CatalogError> {
    let text = doc.to_pretty_json()?;
    let tmp = doc.path.with_extension("json.tmp");
    fs::write(&tmp, text)?;
    fs::rename(&tmp, &doc.path)?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
