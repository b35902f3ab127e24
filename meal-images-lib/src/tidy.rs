//! Cleaning up stored image filenames.
//!
//! Uploads sometimes keep punctuation the canonical form drops
//! (`011_Chicken_Wrap_(spicy).jpg`). Tidying renames such files to their
//! sanitized form, keeping the position prefix. Files without a prefix are
//! left alone.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use meal_images_core::CatalogError;
use meal_images_core::filename::{FOLDER_PREFIX, is_image_file, sanitize_stored_name};

/// A planned rename inside one image folder.
#[derive(Debug, Clone)]
pub struct TidyAction {
    pub source: PathBuf,
    pub target: PathBuf,
}

#[derive(Debug, Default)]
pub struct TidyPlan {
    pub renames: Vec<TidyAction>,
    pub already_clean: usize,
    pub conflicts: Vec<(PathBuf, String)>,
}

#[derive(Debug, Default)]
pub struct TidySummary {
    pub renamed: usize,
    pub already_clean: usize,
    pub conflicts: Vec<String>,
    pub errors: Vec<String>,
}

/// All `images_*` directories directly under `root`, sorted.
pub fn image_directories(root: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(root)?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(FOLDER_PREFIX))
        })
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// Decide which files in `directory` need renaming.
pub fn plan_tidy(directory: &Path) -> Result<TidyPlan, CatalogError> {
    let mut names: Vec<String> = fs::read_dir(directory)?
        .flatten()
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|n| is_image_file(n))
        .collect();
    names.sort();
    let existing: HashSet<&str> = names.iter().map(String::as_str).collect();

    let mut plan = TidyPlan::default();
    let mut renames = Vec::new();
    for name in &names {
        let Some(clean) = sanitize_stored_name(name) else {
            continue;
        };
        if &clean == name {
            plan.already_clean += 1;
            continue;
        }
        if existing.contains(clean.as_str()) {
            plan.conflicts.push((
                directory.join(name),
                format!("{name:?} would overwrite existing {clean:?}"),
            ));
            continue;
        }
        renames.push(TidyAction {
            source: directory.join(name),
            target: directory.join(clean),
        });
    }

    // Two dirty names collapsing onto the same clean one
    let mut by_target: HashMap<PathBuf, Vec<usize>> = HashMap::new();
    for (i, action) in renames.iter().enumerate() {
        by_target.entry(action.target.clone()).or_default().push(i);
    }
    let mut clashing: HashSet<usize> = HashSet::new();
    for (target, indices) in by_target.iter().filter(|(_, v)| v.len() > 1) {
        let sources: Vec<String> = indices
            .iter()
            .map(|&i| file_name_of(&renames[i].source))
            .collect();
        plan.conflicts.push((
            target.clone(),
            format!(
                "Multiple files map to {:?}: {}",
                file_name_of(target),
                sources.join(", ")
            ),
        ));
        clashing.extend(indices.iter().copied());
    }
    plan.conflicts.sort_by(|a, b| a.0.cmp(&b.0));

    plan.renames = renames
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !clashing.contains(i))
        .map(|(_, r)| r)
        .collect();
    Ok(plan)
}

/// Perform the renames in a plan.
pub fn execute_tidy(plan: &TidyPlan) -> TidySummary {
    let mut summary = TidySummary {
        already_clean: plan.already_clean,
        conflicts: plan.conflicts.iter().map(|(_, msg)| msg.clone()).collect(),
        ..Default::default()
    };

    for action in &plan.renames {
        if action.target.exists() {
            summary.errors.push(format!(
                "Target already exists: {}",
                action.target.display()
            ));
            continue;
        }
        match fs::rename(&action.source, &action.target) {
            Ok(()) => {
                log::debug!(
                    "Renamed {} -> {}",
                    file_name_of(&action.source),
                    file_name_of(&action.target)
                );
                summary.renamed += 1;
            }
            Err(e) => summary.errors.push(format!(
                "Failed to rename {} -> {}: {}",
                file_name_of(&action.source),
                file_name_of(&action.target),
                e
            )),
        }
    }
    summary
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
