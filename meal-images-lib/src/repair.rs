//! Repairing image folders from a list of known-missing filenames.
//!
//! Follows a plan-then-execute pattern: [`plan_repair`] inspects one folder
//! and decides what to delete and which placeholders to write, then
//! [`execute_repair`] carries it out. Planning never touches the disk, so
//! the CLI can show the plan and ask before anything changes.
//!
//! Running a repair twice is a no-op the second time: files already stored
//! under an expected name are kept, and placeholders are only written where
//! nothing exists yet.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use meal_images_core::CatalogError;
use meal_images_core::filename::{is_image_file, is_position_prefixed, position_prefix};
use serde::{Deserialize, Serialize};

use crate::reconcile::KnownMissing;

/// What to do with a differently named file occupying a missing slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Leave it in place and list it in the plan.
    Report,
    /// Delete it so the slot can be refilled under the expected name.
    #[default]
    Replace,
}

/// Options for [`plan_repair`].
#[derive(Debug, Clone)]
pub struct RepairOptions {
    /// Copy an existing image into each empty slot.
    pub placeholders: bool,
    pub mismatch_policy: MismatchPolicy,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            placeholders: true,
            mismatch_policy: MismatchPolicy::Replace,
        }
    }
}

/// Planned work for one image folder.
#[derive(Debug, Clone, Default)]
pub struct RepairPlan {
    pub directory: PathBuf,
    pub create_directory: bool,
    /// Files in missing slots that don't carry the expected name.
    pub deletions: Vec<PathBuf>,
    /// Same as `deletions`, but kept because the policy is `Report`.
    pub flagged: Vec<PathBuf>,
    /// Image copied into each placeholder.
    pub template: Option<PathBuf>,
    pub placeholders: Vec<PathBuf>,
    /// Expected files that already exist; left untouched.
    pub already_present: Vec<PathBuf>,
    /// Expected names that could not be placed (no position prefix).
    pub skipped: Vec<String>,
    /// Placeholders were wanted but no template image is available.
    pub missing_template: bool,
}

impl RepairPlan {
    pub fn has_changes(&self) -> bool {
        self.create_directory || !self.deletions.is_empty() || !self.placeholders.is_empty()
    }
}

/// Outcome of executing a repair.
#[derive(Debug, Default)]
pub struct RepairSummary {
    pub directories_created: usize,
    pub deleted: usize,
    pub placeholders_written: usize,
    pub already_present: usize,
    pub flagged: usize,
    pub errors: Vec<String>,
}

impl RepairSummary {
    pub fn absorb(&mut self, other: RepairSummary) {
        self.directories_created += other.directories_created;
        self.deleted += other.deleted;
        self.placeholders_written += other.placeholders_written;
        self.already_present += other.already_present;
        self.flagged += other.flagged;
        self.errors.extend(other.errors);
    }
}

/// Inspect `directory` and decide how to repair the `expected` filenames.
pub fn plan_repair(
    directory: &Path,
    expected: &[String],
    options: &RepairOptions,
) -> Result<RepairPlan, CatalogError> {
    let mut plan = RepairPlan {
        directory: directory.to_path_buf(),
        ..Default::default()
    };

    let existing = if directory.is_dir() {
        list_images(directory)?
    } else {
        plan.create_directory = true;
        Vec::new()
    };

    let mut expected_names: Vec<&str> = Vec::new();
    let mut slots: HashSet<&str> = HashSet::new();
    for name in expected {
        match position_prefix(name) {
            Some(prefix) => {
                slots.insert(prefix);
                expected_names.push(name);
            }
            None => plan.skipped.push(name.clone()),
        }
    }

    let mut removed: HashSet<&str> = HashSet::new();
    for file in &existing {
        let Some(prefix) = position_prefix(file) else {
            continue;
        };
        if !slots.contains(prefix) {
            continue;
        }
        if expected_names.contains(&file.as_str()) {
            plan.already_present.push(directory.join(file));
            continue;
        }
        match options.mismatch_policy {
            MismatchPolicy::Replace => {
                plan.deletions.push(directory.join(file));
                removed.insert(file);
            }
            MismatchPolicy::Report => plan.flagged.push(directory.join(file)),
        }
    }

    if options.placeholders {
        plan.template = existing
            .iter()
            .filter(|f| is_position_prefixed(f) && !removed.contains(f.as_str()))
            .map(|f| directory.join(f))
            .next();

        let wanted: Vec<PathBuf> = expected_names
            .iter()
            .filter(|name| !existing.iter().any(|f| f == *name))
            .map(|name| directory.join(name))
            .collect();

        if plan.template.is_some() {
            plan.placeholders = wanted;
        } else if !wanted.is_empty() {
            plan.missing_template = true;
        }
    }

    Ok(plan)
}

/// Carry out a plan. Each step that fails is recorded and the rest continue.
pub fn execute_repair(plan: &RepairPlan) -> RepairSummary {
    let mut summary = RepairSummary {
        already_present: plan.already_present.len(),
        flagged: plan.flagged.len(),
        ..Default::default()
    };

    if plan.create_directory {
        if let Err(e) = fs::create_dir_all(&plan.directory) {
            summary.errors.push(format!(
                "Failed to create {}: {}",
                plan.directory.display(),
                e
            ));
            return summary;
        }
        log::info!("Created directory: {}", plan.directory.display());
        summary.directories_created += 1;
    }

    for path in &plan.deletions {
        match fs::remove_file(path) {
            Ok(()) => {
                log::debug!("Deleted {}", path.display());
                summary.deleted += 1;
            }
            Err(e) => summary
                .errors
                .push(format!("Failed to delete {}: {}", path.display(), e)),
        }
    }

    if plan.missing_template {
        summary.errors.push(format!(
            "No template image in {}; placeholders not written",
            plan.directory.display()
        ));
    }

    if let Some(template) = &plan.template {
        for target in &plan.placeholders {
            if target.exists() {
                summary.already_present += 1;
                continue;
            }
            match fs::copy(template, target) {
                Ok(_) => {
                    log::debug!("Wrote placeholder {}", target.display());
                    summary.placeholders_written += 1;
                }
                Err(e) => summary
                    .errors
                    .push(format!("Failed to write {}: {}", target.display(), e)),
            }
        }
    }

    for name in &plan.skipped {
        summary
            .errors
            .push(format!("{name:?} has no position prefix; skipped"));
    }

    summary
}

/// Plan every folder in `missing`, relative to `root`.
///
/// Returns one entry per folder, in folder order.
pub fn plan_repairs(
    root: &Path,
    missing: &KnownMissing,
    options: &RepairOptions,
) -> Vec<(String, Result<RepairPlan, CatalogError>)> {
    missing
        .iter()
        .map(|(folder, names)| {
            (
                folder.clone(),
                plan_repair(&root.join(folder), names, options),
            )
        })
        .collect()
}

/// Plan and execute repairs for every folder in `missing`.
pub fn repair(root: &Path, missing: &KnownMissing, options: &RepairOptions) -> RepairSummary {
    let mut total = RepairSummary::default();
    for (folder, plan) in plan_repairs(root, missing, options) {
        match plan {
            Ok(plan) => total.absorb(execute_repair(&plan)),
            Err(e) => total.errors.push(format!("{folder}: {e}")),
        }
    }
    total
}

/// Image files directly inside `directory`, sorted by name.
fn list_images(directory: &Path) -> Result<Vec<String>, CatalogError> {
    let mut names: Vec<String> = fs::read_dir(directory)?
        .flatten()
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| is_image_file(name))
        .collect();
    names.sort();
    Ok(names)
}

#[cfg(test)]
#[path = "tests/repair_tests.rs"]
mod tests;
