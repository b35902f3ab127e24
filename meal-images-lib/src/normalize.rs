//! Record name normalization across catalog documents.
//!
//! A [`ReplacementRule`] turns the current set of record names into a
//! [`NameReplacementMap`]; [`apply_replacements`] then rewrites every
//! occurrence of each old name in every document and saves the documents
//! that changed. Because canonical filenames are derived from names, renaming
//! a record also changes its expected image filename, so the rewrite reports
//! those changes too.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use meal_images_core::{CanonicalFilename, CatalogError};
use serde_json::Value;

use crate::catalog::{CatalogDocument, save_document};

/// How to pick names to replace.
#[derive(Debug, Clone)]
pub enum ReplacementRule {
    /// `(pattern, new name)` pairs. A record whose name contains the pattern
    /// (case-insensitive) gets the new name. The first matching pair wins.
    Fixed(Vec<(String, String)>),
    /// Replace the `count` longest distinct names, longest first, with these names in order.
    Longest {
        count: usize,
        replacements: Vec<String>,
    },
}

/// A single old → new name entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameReplacement {
    pub old: String,
    pub new: String,
}

/// Ordered old → new name mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameReplacementMap {
    entries: Vec<NameReplacement>,
}

impl NameReplacementMap {
    pub fn insert(&mut self, old: impl Into<String>, new: impl Into<String>) {
        let old = old.into();
        let new = new.into();
        match self.entries.iter_mut().find(|e| e.old == old) {
            Some(existing) => existing.new = new,
            None => self.entries.push(NameReplacement { old, new }),
        }
    }

    pub fn get(&self, old: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.old == old)
            .map(|e| e.new.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &NameReplacement> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A distinct record name with its length and the documents it appears in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameLength {
    pub name: String,
    /// Length in characters.
    pub chars: usize,
    pub documents: Vec<String>,
}

/// Distinct record names in first-seen order across documents.
fn distinct_names(documents: &[CatalogDocument]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for doc in documents {
        for record in &doc.list.records {
            if seen.insert(record.name.as_str()) {
                names.push(record.name.as_str());
            }
        }
    }
    names
}

/// The `n` longest distinct names, longest first. Ties keep first-seen order.
pub fn longest_names(documents: &[CatalogDocument], n: usize) -> Vec<NameLength> {
    let mut names = distinct_names(documents);
    names.sort_by_key(|name| std::cmp::Reverse(name.chars().count()));
    names
        .into_iter()
        .take(n)
        .map(|name| NameLength {
            name: name.to_string(),
            chars: name.chars().count(),
            documents: documents
                .iter()
                .filter(|d| d.list.records.iter().any(|r| r.name == name))
                .map(|d| d.base_name().to_string())
                .collect(),
        })
        .collect()
}

/// Build the old → new mapping a rule produces for these documents.
pub fn compute_replacements(
    documents: &[CatalogDocument],
    rule: &ReplacementRule,
) -> Result<NameReplacementMap, CatalogError> {
    let mut map = NameReplacementMap::default();
    match rule {
        ReplacementRule::Fixed(pairs) => {
            if let Some((pattern, _)) = pairs.iter().find(|(p, _)| p.trim().is_empty()) {
                return Err(CatalogError::config(format!(
                    "empty pattern {pattern:?} would match every name"
                )));
            }
            if let Some((pattern, _)) = pairs.iter().find(|(_, n)| n.trim().is_empty()) {
                return Err(CatalogError::config(format!(
                    "pattern {pattern:?} has an empty replacement name"
                )));
            }
            let lowered: Vec<(String, &str)> = pairs
                .iter()
                .map(|(p, n)| (p.to_lowercase(), n.as_str()))
                .collect();
            for name in distinct_names(documents) {
                let lower = name.to_lowercase();
                let matched = lowered.iter().find(|(p, _)| lower.contains(p.as_str()));
                if let Some((_, new)) = matched {
                    if name != *new {
                        map.insert(name, *new);
                    }
                }
            }
        }
        ReplacementRule::Longest {
            count,
            replacements,
        } => {
            if replacements.len() != *count {
                return Err(CatalogError::config(format!(
                    "{count} longest names requested but {} replacement names given",
                    replacements.len()
                )));
            }
            if replacements.iter().any(|n| n.trim().is_empty()) {
                return Err(CatalogError::config("replacement names must not be empty"));
            }
            let longest = longest_names(documents, *count);
            if longest.len() < *count {
                return Err(CatalogError::config(format!(
                    "only {} distinct names available, {count} requested",
                    longest.len()
                )));
            }
            for (old, new) in longest.iter().zip(replacements) {
                if old.name != *new {
                    map.insert(old.name.clone(), new.clone());
                }
            }
        }
    }
    Ok(map)
}

/// A record whose name (and therefore canonical filename) changed.
#[derive(Debug, Clone)]
pub struct RenamedRecord {
    pub document: String,
    pub position: u32,
    pub old_name: String,
    pub new_name: String,
    pub old_filename: Option<String>,
    pub new_filename: Option<String>,
}

/// Outcome of [`apply_replacements`].
#[derive(Debug, Default)]
pub struct ApplySummary {
    pub records_updated: usize,
    /// Documents written back to disk.
    pub documents_updated: Vec<PathBuf>,
    pub renamed: Vec<RenamedRecord>,
    pub errors: Vec<String>,
}

/// Rewrite record names in memory. Returns what changed; nothing is saved.
pub fn rewrite_names(
    documents: &mut [CatalogDocument],
    map: &NameReplacementMap,
) -> Result<Vec<RenamedRecord>, CatalogError> {
    let mut renamed = Vec::new();
    for doc in documents.iter_mut() {
        let changes: Vec<(u32, String, String)> = doc
            .list
            .positioned()
            .filter_map(|(position, record)| {
                map.get(&record.name)
                    .map(|new| (position, record.name.clone(), new.to_string()))
            })
            .collect();

        for (position, old_name, new_name) in changes {
            doc.rename_record(position, &new_name)?;
            renamed.push(RenamedRecord {
                document: doc.base_name().to_string(),
                position,
                old_filename: CanonicalFilename::encode(position, &old_name)
                    .ok()
                    .map(|f| f.to_string()),
                new_filename: CanonicalFilename::encode(position, &new_name)
                    .ok()
                    .map(|f| f.to_string()),
                old_name,
                new_name,
            });
        }
    }
    Ok(renamed)
}

/// Rewrite record names and save every document that changed.
///
/// Documents with no matching record are not written.
pub fn apply_replacements(
    documents: &mut [CatalogDocument],
    map: &NameReplacementMap,
) -> ApplySummary {
    let mut summary = ApplySummary::default();
    for doc in documents.iter_mut() {
        let renamed = match rewrite_names(std::slice::from_mut(&mut *doc), map) {
            Ok(renamed) => renamed,
            Err(e) => {
                summary.errors.push(format!("{}: {}", doc.file_name(), e));
                continue;
            }
        };
        if renamed.is_empty() {
            continue;
        }
        match save_document(doc) {
            Ok(()) => {
                log::debug!("Updated {}", doc.path.display());
                summary.records_updated += renamed.len();
                summary.documents_updated.push(doc.path.clone());
                summary.renamed.extend(renamed);
            }
            Err(e) => summary
                .errors
                .push(format!("Failed to write {}: {}", doc.path.display(), e)),
        }
    }
    summary
}

/// Load `(pattern, new name)` pairs from a JSON object or a TOML table.
///
/// Keys are patterns and values the new names, in file order.
pub fn load_rules(path: &Path) -> Result<Vec<(String, String)>, CatalogError> {
    let text = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

    let pairs: Vec<(String, String)> = if is_toml {
        let table: toml::Table = toml::from_str(&text)
            .map_err(|e| CatalogError::config(format!("{}: {e}", path.display())))?;
        table
            .into_iter()
            .map(|(k, v)| match v {
                toml::Value::String(s) => Ok((k, s)),
                other => Err(CatalogError::config(format!(
                    "{}: value for {k:?} must be a string, got {}",
                    path.display(),
                    other.type_str()
                ))),
            })
            .collect::<Result<_, _>>()?
    } else {
        let value: Value = serde_json::from_str(&text)?;
        let Value::Object(object) = value else {
            return Err(CatalogError::config(format!(
                "{}: expected an object of pattern -> name",
                path.display()
            )));
        };
        object
            .into_iter()
            .map(|(k, v)| match v {
                Value::String(s) => Ok((k, s)),
                _ => Err(CatalogError::config(format!(
                    "{}: value for {k:?} must be a string",
                    path.display()
                ))),
            })
            .collect::<Result<_, _>>()?
    };
    Ok(pairs)
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
