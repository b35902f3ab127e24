use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use meal_images_lib::tidy::{TidyPlan, TidySummary, execute_tidy, image_directories, plan_tidy};

use crate::commands::{confirm, file_name, log_errors};
use crate::{CliError, RunContext};

/// Run the tidy command.
pub(crate) fn run_tidy(ctx: &RunContext, dry_run: bool, yes: bool) -> Result<(), CliError> {
    log::info!(
        "Tidying image filenames in: {}",
        ctx.root.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    if dry_run {
        log::info!(
            "{}",
            "Dry run: no files will be renamed".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    crate::log_blank();

    let directories = image_directories(&ctx.root)?;
    if directories.is_empty() {
        log::info!(
            "{}",
            "No images_* folders found.".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    }

    let mut total = TidySummary::default();
    for dir in &directories {
        let plan = match plan_tidy(dir) {
            Ok(plan) => plan,
            Err(e) => {
                total.errors.push(format!("{}: {}", dir.display(), e));
                continue;
            }
        };
        if plan.renames.is_empty() && plan.conflicts.is_empty() {
            total.already_clean += plan.already_clean;
            continue;
        }

        log::info!("{}", file_name(dir).if_supports_color(Stdout, |t| t.bold()));
        print_tidy_plan(&plan);

        if dry_run || plan.renames.is_empty() {
            total.already_clean += plan.already_clean;
            total
                .conflicts
                .extend(plan.conflicts.iter().map(|(_, msg)| msg.clone()));
        } else if confirm(&format!("{} renames", plan.renames.len()), yes)? {
            let summary = execute_tidy(&plan);
            log::info!(
                "  {} {} files renamed",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                summary.renamed,
            );
            total.renamed += summary.renamed;
            total.already_clean += summary.already_clean;
            total.conflicts.extend(summary.conflicts);
            total.errors.extend(summary.errors);
        } else {
            log::info!("  {}", "Skipped".if_supports_color(Stdout, |t| t.dimmed()));
        }
        crate::log_blank();
    }

    log::info!("{}", "Summary:".if_supports_color(Stdout, |t| t.bold()));
    if total.renamed > 0 {
        log::info!(
            "  {} {} files renamed",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            total.renamed,
        );
    }
    log::info!(
        "  {} {} already clean",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        total.already_clean,
    );
    for conflict in &total.conflicts {
        log::warn!(
            "  {} {}",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            conflict,
        );
    }
    log_errors(&total.errors);
    Ok(())
}

fn print_tidy_plan(plan: &TidyPlan) {
    for action in &plan.renames {
        log::info!(
            "  {} {} {}",
            file_name(&action.source).if_supports_color(Stdout, |t| t.dimmed()),
            "\u{2192}".if_supports_color(Stdout, |t| t.green()),
            file_name(&action.target).if_supports_color(Stdout, |t| t.bold()),
        );
    }
    for (_, msg) in &plan.conflicts {
        log::warn!(
            "  {} {}",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            msg,
        );
    }
}
