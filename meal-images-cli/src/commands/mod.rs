pub(crate) mod config;
pub(crate) mod generate;
pub(crate) mod names;
pub(crate) mod repair;
pub(crate) mod scan;
pub(crate) mod select;
pub(crate) mod tidy;

use std::io::Write;
use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use meal_images_lib::catalog::{CatalogDocument, discover_documents, load_all};

use crate::{CliError, RunContext};

/// Discover and load the catalog documents under the root.
///
/// The CLI filter wins over the settings filter. Paths in `exclude` (the
/// report file) are never treated as documents. Files that fail to load are
/// reported and skipped.
pub(crate) fn load_documents(
    ctx: &RunContext,
    filter: Option<String>,
    exclude: &[PathBuf],
) -> Result<Vec<CatalogDocument>, CliError> {
    let filter = filter.or_else(|| ctx.settings.document_filter.clone());
    let paths: Vec<PathBuf> = discover_documents(&ctx.root, filter.as_deref())?
        .into_iter()
        .filter(|p| !exclude.iter().any(|e| same_path(p, e)))
        .collect();

    if paths.is_empty() {
        return Err(CliError::other(format!(
            "No catalog files found in {}",
            ctx.root.display()
        )));
    }

    let outcome = load_all(&paths);
    for (path, error) in &outcome.failures {
        log::warn!(
            "  {} {}: {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            path.display(),
            error,
        );
    }
    log::debug!(
        "{} catalog files loaded, {} skipped",
        outcome.documents.len(),
        outcome.failures.len()
    );
    Ok(outcome.documents)
}

fn same_path(a: &Path, b: &Path) -> bool {
    a == b
        || match (a.canonicalize(), b.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
}

/// Ask `Proceed with <what>? [y/N]`. Skipped (true) when `yes` is set.
pub(crate) fn confirm(what: &str, yes: bool) -> Result<bool, CliError> {
    if yes {
        return Ok(true);
    }
    print!("\n  Proceed with {what}? [y/N] ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

pub(crate) fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("?")
}

/// Print collected errors, one per line.
pub(crate) fn log_errors(errors: &[String]) {
    for error in errors {
        log::warn!(
            "  {} {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            error,
        );
    }
}
