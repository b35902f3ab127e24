use std::path::PathBuf;

use log::Level;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use meal_images_lib::reconcile::{known_missing_from_report, load_report};
use meal_images_lib::repair::{
    MismatchPolicy, RepairPlan, RepairSummary, execute_repair, plan_repairs,
};

use crate::commands::{confirm, file_name, log_errors};
use crate::{CliError, RunContext};

/// Run the repair command.
pub(crate) fn run_repair(
    ctx: &RunContext,
    report: Option<PathBuf>,
    no_placeholders: bool,
    keep_mismatched: bool,
    dry_run: bool,
    yes: bool,
) -> Result<(), CliError> {
    let report_path = ctx.settings.resolve_report_path(&ctx.root, report);
    if !report_path.exists() {
        return Err(CliError::config(format!(
            "No report at {}; run `meal-images scan` first",
            report_path.display()
        )));
    }

    let mut options = ctx.settings.repair_options();
    if no_placeholders {
        options.placeholders = false;
    }
    if keep_mismatched {
        options.mismatch_policy = MismatchPolicy::Report;
    }

    log::info!(
        "Repairing image folders in: {}",
        ctx.root.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!(
        "{}",
        format!("Report: {}", report_path.display()).if_supports_color(Stdout, |t| t.dimmed()),
    );
    if dry_run {
        log::info!(
            "{}",
            "Dry run: no files will be modified".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    if !options.placeholders {
        log::info!(
            "{}",
            "Placeholders disabled".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    if options.mismatch_policy == MismatchPolicy::Report {
        log::info!(
            "{}",
            "Differently named files are kept and only listed"
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    crate::log_blank();

    let entries = load_report(&report_path)?;
    let missing = known_missing_from_report(&entries);
    if missing.is_empty() {
        log::info!(
            "  {} {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            "Report lists no missing images. Nothing to repair.",
        );
        return Ok(());
    }

    let mut plans: Vec<RepairPlan> = Vec::new();
    let mut total = RepairSummary::default();

    for (folder, plan) in plan_repairs(&ctx.root, &missing, &options) {
        match plan {
            Ok(plan) => {
                let header_level = if plan.missing_template || !plan.skipped.is_empty() {
                    Level::Warn
                } else {
                    Level::Info
                };
                log::log!(
                    header_level,
                    "{}",
                    folder.if_supports_color(Stdout, |t| t.bold()),
                );
                print_repair_plan(&plan);
                plans.push(plan);
            }
            Err(e) => {
                log::warn!(
                    "  {} {}: {}",
                    "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                    folder,
                    e,
                );
                total.errors.push(format!("{folder}: {e}"));
            }
        }
    }

    let changes = plans.iter().filter(|p| p.has_changes()).count();
    if dry_run || changes == 0 {
        for plan in &plans {
            total.already_present += plan.already_present.len();
            total.flagged += plan.flagged.len();
        }
    } else if confirm(&format!("repairs in {changes} folders"), yes)? {
        for plan in &plans {
            total.absorb(execute_repair(plan));
        }
    } else {
        log::info!("  {}", "Skipped".if_supports_color(Stdout, |t| t.dimmed()));
        return Ok(());
    }
    crate::log_blank();

    print_summary(&total, dry_run);
    Ok(())
}

/// Print the repair plan for a single folder.
fn print_repair_plan(plan: &RepairPlan) {
    if plan.create_directory {
        log::info!(
            "  {} create {}",
            "+".if_supports_color(Stdout, |t| t.green()),
            plan.directory.display(),
        );
    }
    for path in &plan.deletions {
        log::info!(
            "  {} delete {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            file_name(path).if_supports_color(Stdout, |t| t.bold()),
        );
    }
    for path in &plan.flagged {
        log::warn!(
            "  {} {} {}",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            file_name(path).if_supports_color(Stdout, |t| t.bold()),
            "(occupies a missing slot, kept)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    if let Some(template) = &plan.template {
        for path in &plan.placeholders {
            log::info!(
                "  {} {} {} {}",
                file_name(template).if_supports_color(Stdout, |t| t.dimmed()),
                "\u{2192}".if_supports_color(Stdout, |t| t.green()),
                file_name(path).if_supports_color(Stdout, |t| t.bold()),
                "(placeholder)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
    }
    if plan.missing_template {
        log::warn!(
            "  {} {}",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            "No image to copy as a placeholder",
        );
    }
    if !plan.already_present.is_empty() {
        log::info!(
            "  {} {} already present",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            plan.already_present.len(),
        );
    }
    for name in &plan.skipped {
        log::warn!(
            "  {} {} (no position prefix)",
            "?".if_supports_color(Stdout, |t| t.yellow()),
            name.if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
}

fn print_summary(total: &RepairSummary, dry_run: bool) {
    log::info!("{}", "Summary:".if_supports_color(Stdout, |t| t.bold()));
    if dry_run {
        log::info!(
            "  {}",
            "Dry run: nothing was changed".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    let counts = [
        (total.directories_created, "folders created"),
        (total.deleted, "wrong files deleted"),
        (total.placeholders_written, "placeholders written"),
        (total.already_present, "already present"),
    ];
    for (count, what) in counts {
        if count > 0 {
            log::info!(
                "  {} {} {}",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                count,
                what,
            );
        }
    }
    if total.flagged > 0 {
        log::warn!(
            "  {} {} files left in missing slots",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            total.flagged,
        );
    }
    log_errors(&total.errors);
}
