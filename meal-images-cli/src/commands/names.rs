use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use meal_images_lib::normalize::{
    NameReplacementMap, ReplacementRule, apply_replacements, compute_replacements, load_rules,
    longest_names,
};

use crate::commands::{confirm, load_documents, log_errors};
use crate::{CliError, RunContext};

/// List the longest distinct record names.
pub(crate) fn run_longest(
    ctx: &RunContext,
    count: usize,
    filter: Option<String>,
) -> Result<(), CliError> {
    let report_path = ctx.settings.resolve_report_path(&ctx.root, None);
    let documents = load_documents(ctx, filter, std::slice::from_ref(&report_path))?;

    log::info!(
        "{}",
        format!("{count} longest meal names").if_supports_color(Stdout, |t| t.bold()),
    );
    for (i, entry) in longest_names(&documents, count).iter().enumerate() {
        log::info!(
            "  {:>3}. {} {}",
            i + 1,
            entry.name.if_supports_color(Stdout, |t| t.cyan()),
            format!("({} chars, {})", entry.chars, entry.documents.join(", "))
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    Ok(())
}

/// Rewrite record names across the catalog.
pub(crate) fn run_shorten(
    ctx: &RunContext,
    rules: Option<PathBuf>,
    longest: Option<Vec<String>>,
    filter: Option<String>,
    dry_run: bool,
    yes: bool,
) -> Result<(), CliError> {
    let rule = match (rules, longest) {
        (Some(path), _) => ReplacementRule::Fixed(load_rules(&path)?),
        (None, Some(names)) => {
            let replacements: Vec<String> = names.into_iter().map(|n| n.trim().to_string()).collect();
            ReplacementRule::Longest {
                count: replacements.len(),
                replacements,
            }
        }
        (None, None) => return Err(CliError::config("Either --rules or --longest is required")),
    };

    let report_path = ctx.settings.resolve_report_path(&ctx.root, None);
    let mut documents = load_documents(ctx, filter, std::slice::from_ref(&report_path))?;

    let map = compute_replacements(&documents, &rule)?;
    if map.is_empty() {
        log::info!(
            "  {} {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            "No names to change.",
        );
        return Ok(());
    }

    print_mapping(&map);
    if dry_run {
        log::info!(
            "\n{}",
            "Dry run: no catalog files were changed".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    }
    if !confirm(&format!("{} name replacements", map.len()), yes)? {
        log::info!("  {}", "Skipped".if_supports_color(Stdout, |t| t.dimmed()));
        return Ok(());
    }

    let summary = apply_replacements(&mut documents, &map);
    crate::log_blank();

    if !summary.renamed.is_empty() {
        log::warn!(
            "{}",
            "Image filenames changed; rename or regenerate these images:"
                .if_supports_color(Stdout, |t| t.yellow()),
        );
        for r in &summary.renamed {
            log::info!(
                "  {}: {} {} {}",
                r.document.if_supports_color(Stdout, |t| t.dimmed()),
                r.old_filename.as_deref().unwrap_or("?"),
                "\u{2192}".if_supports_color(Stdout, |t| t.green()),
                r.new_filename
                    .as_deref()
                    .unwrap_or("?")
                    .if_supports_color(Stdout, |t| t.bold()),
            );
        }
        crate::log_blank();
    }

    log::info!("{}", "Summary:".if_supports_color(Stdout, |t| t.bold()));
    log::info!(
        "  {} {} records renamed in {} files",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        summary.records_updated,
        summary.documents_updated.len(),
    );
    log_errors(&summary.errors);
    Ok(())
}

fn print_mapping(map: &NameReplacementMap) {
    for entry in map.iter() {
        log::info!(
            "  {} {} {}",
            entry.old.if_supports_color(Stdout, |t| t.dimmed()),
            "\u{2192}".if_supports_color(Stdout, |t| t.green()),
            entry.new.if_supports_color(Stdout, |t| t.bold()),
        );
    }
}
