//! Choosing one image per distinct meal and propagating it.
//!
//! The same meal name can occur in many documents, each with its own
//! canonical image slot. A [`SelectionSession`] walks the distinct names,
//! lists the images already stored for any of their instances (plus freshly
//! generated ones), and copies a chosen image into every instance's slot.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use meal_images_core::{CanonicalFilename, CatalogError, Record, folder_name};

use crate::catalog::CatalogDocument;

/// Suffix of the folder generated candidates are written to (`images_<doc>_new`).
pub const GENERATED_FOLDER_SUFFIX: &str = "_new";

/// One occurrence of a meal in one document.
#[derive(Debug, Clone)]
pub struct MealInstance {
    /// Document base name.
    pub document: String,
    pub position: u32,
    pub record: Record,
}

impl MealInstance {
    pub fn filename(&self) -> Result<CanonicalFilename, CatalogError> {
        CanonicalFilename::encode(self.position, &self.record.name)
    }

    /// `<root>/images_<doc>/<canonical filename>`.
    pub fn image_path(&self, root: &Path) -> Result<PathBuf, CatalogError> {
        Ok(root
            .join(folder_name(&self.document))
            .join(self.filename()?.to_string()))
    }

    /// `<root>/images_<doc>_new/<canonical filename>`.
    pub fn generated_path(&self, root: &Path) -> Result<PathBuf, CatalogError> {
        Ok(generated_folder(root, &self.document).join(self.filename()?.to_string()))
    }
}

pub fn generated_folder(root: &Path, document: &str) -> PathBuf {
    root.join(format!(
        "{}{GENERATED_FOLDER_SUFFIX}",
        folder_name(document)
    ))
}

/// A distinct meal name and every place it occurs.
#[derive(Debug, Clone)]
pub struct MealEntry {
    pub name: String,
    pub instances: Vec<MealInstance>,
}

/// Distinct meals in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct MealIndex {
    entries: Vec<MealEntry>,
}

impl MealIndex {
    pub fn build(documents: &[CatalogDocument]) -> Self {
        let mut entries: Vec<MealEntry> = Vec::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            for (position, record) in doc.list.positioned() {
                let instance = MealInstance {
                    document: doc.base_name().to_string(),
                    position,
                    record: record.clone(),
                };
                match by_name.get(&record.name) {
                    Some(&i) => entries[i].instances.push(instance),
                    None => {
                        by_name.insert(record.name.clone(), entries.len());
                        entries.push(MealEntry {
                            name: record.name.clone(),
                            instances: vec![instance],
                        });
                    }
                }
            }
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MealEntry> {
        self.entries.get(index)
    }

    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MealEntry> {
        self.entries.iter()
    }
}

/// An existing image that could be used for a meal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    /// Document whose slot (or generated folder) holds it.
    pub document: String,
    pub generated: bool,
}

/// Result of copying a chosen image to every instance.
#[derive(Debug, Default)]
pub struct PropagateSummary {
    pub copied: Vec<PathBuf>,
    /// Instances whose slot already is the chosen file.
    pub unchanged: usize,
    pub errors: Vec<String>,
}

/// Stateful walk over a [`MealIndex`].
#[derive(Debug)]
pub struct SelectionSession {
    index: MealIndex,
    root: PathBuf,
    cursor: usize,
    selected: Option<Candidate>,
}

impl SelectionSession {
    pub fn new(index: MealIndex, root: impl Into<PathBuf>) -> Self {
        Self {
            index,
            root: root.into(),
            cursor: 0,
            selected: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> &MealIndex {
        &self.index
    }

    pub fn current(&self) -> Option<&MealEntry> {
        self.index.get(self.cursor)
    }

    /// 0-based cursor and the number of meals.
    pub fn progress(&self) -> (usize, usize) {
        (self.cursor, self.index.len())
    }

    /// Advance to the next meal. Returns false (and stays put) at the end.
    pub fn next(&mut self) -> bool {
        if self.cursor + 1 < self.index.len() {
            self.cursor += 1;
            self.selected = None;
            true
        } else {
            false
        }
    }

    /// Go back one meal. Returns false at the start.
    pub fn previous(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.selected = None;
            true
        } else {
            false
        }
    }

    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.index.len() {
            self.cursor = index;
            self.selected = None;
            true
        } else {
            false
        }
    }

    /// Stored images for any instance of `meal`, canonical slots first, then
    /// generated ones. Each path appears once.
    pub fn list_candidates(&self, meal: &MealEntry) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut push = |path: PathBuf, document: &str, generated: bool| {
            if path.is_file() && !candidates.iter().any(|c| c.path == path) {
                candidates.push(Candidate {
                    path,
                    document: document.to_string(),
                    generated,
                });
            }
        };

        for instance in &meal.instances {
            if let Ok(path) = instance.image_path(&self.root) {
                push(path, &instance.document, false);
            }
        }
        for instance in &meal.instances {
            if let Ok(path) = instance.generated_path(&self.root) {
                push(path, &instance.document, true);
            }
        }
        candidates
    }

    /// Mark one of `meal`'s candidates as the chosen image.
    pub fn select(&mut self, meal: &MealEntry, candidate: Candidate) -> Result<(), CatalogError> {
        if !self.list_candidates(meal).contains(&candidate) {
            return Err(CatalogError::format(format!(
                "{} is not a stored image for {:?}",
                candidate.path.display(),
                meal.name
            )));
        }
        self.selected = Some(candidate);
        Ok(())
    }

    pub fn selected(&self) -> Option<&Candidate> {
        self.selected.as_ref()
    }

    /// Copy `candidate` into the canonical slot of every instance of `meal`.
    ///
    /// Slots that already are the candidate file are left alone. Missing
    /// folders are created.
    pub fn apply_to_all_instances(
        &self,
        meal: &MealEntry,
        candidate: &Candidate,
    ) -> PropagateSummary {
        let mut summary = PropagateSummary::default();
        for instance in &meal.instances {
            let target = match instance.image_path(&self.root) {
                Ok(p) => p,
                Err(e) => {
                    summary.errors.push(format!(
                        "{} record {}: {}",
                        instance.document, instance.position, e
                    ));
                    continue;
                }
            };
            if same_file(&target, &candidate.path) {
                summary.unchanged += 1;
                continue;
            }
            if let Some(parent) = target.parent() {
                if let Err(e) = fs::create_dir_all(parent) {
                    summary
                        .errors
                        .push(format!("Failed to create {}: {}", parent.display(), e));
                    continue;
                }
            }
            match fs::copy(&candidate.path, &target) {
                Ok(_) => summary.copied.push(target),
                Err(e) => summary
                    .errors
                    .push(format!("Failed to copy to {}: {}", target.display(), e)),
            }
        }
        summary
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
