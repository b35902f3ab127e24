use std::path::PathBuf;

use log::Level;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use meal_images_lib::availability::{ImageStore, LocalStore, RemoteStore, StorageLocation};
use meal_images_lib::reconcile::{
    DiscrepancyReason, ScanOptions, ScanProgress, ScanReport, scan, write_report,
};

use crate::commands::{load_documents, log_errors};
use crate::spinner::new_spinner;
use crate::{CliError, RunContext};

/// Run the scan command.
pub(crate) fn run_scan(
    ctx: &RunContext,
    remote: Option<String>,
    local: bool,
    filter: Option<String>,
    report: Option<PathBuf>,
    limit: Option<usize>,
) -> Result<(), CliError> {
    let (location, store) = open_store(ctx, remote.as_deref(), local)?;
    let report_path = ctx.settings.resolve_report_path(&ctx.root, report);

    log::info!(
        "Checking images for catalog in: {}",
        ctx.root.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!(
        "Image store: {}",
        location.to_string().if_supports_color(Stdout, |t| t.cyan()),
    );
    if let Some(n) = limit {
        log::info!(
            "{}",
            format!("Limit: {n} records").if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    crate::log_blank();

    let documents = load_documents(ctx, filter, std::slice::from_ref(&report_path))?;

    let pb = new_spinner(ctx.quiet);
    let progress_callback = |progress: ScanProgress| match progress {
        ScanProgress::Document {
            ref name,
            record_count,
        } => {
            pb.set_message(format!("{name}: {record_count} records"));
        }
        ScanProgress::Checking {
            ref name,
            index,
            total,
        } => {
            pb.set_message(format!("[{index}/{total}] Checking {name}"));
        }
        ScanProgress::Done => pb.finish_and_clear(),
    };

    let options = ScanOptions {
        limit,
        cancel: None,
    };
    let result = scan(&documents, store.as_ref(), &options, &progress_callback);
    pb.finish_and_clear();

    print_scan_report(&result);

    write_report(&report_path, &result.report_entries())?;
    log::info!(
        "  {} Report written to {}",
        "\u{2192}".if_supports_color(Stdout, |t| t.cyan()),
        report_path.display(),
    );
    crate::log_blank();

    print_summary(&result);
    Ok(())
}

/// The store to check: the local root with `--local`, otherwise the remote
/// base URL from `--remote` or the settings. A remote value that is not an
/// `http(s)://` URL is a config error, never a local path.
fn open_store(
    ctx: &RunContext,
    remote: Option<&str>,
    local: bool,
) -> Result<(StorageLocation, Box<dyn ImageStore>), CliError> {
    if local {
        let store = LocalStore::new(&ctx.root);
        return Ok((StorageLocation::Local(ctx.root.clone()), Box::new(store)));
    }
    let url = remote.unwrap_or(&ctx.settings.remote_base_url);
    let store = RemoteStore::new(url, &ctx.settings.checker_config())?;
    Ok((StorageLocation::Remote(url.to_string()), Box::new(store)))
}

/// Print every discrepancy, grouped under its catalog file.
fn print_scan_report(report: &ScanReport) {
    let mut current_document: Option<&str> = None;
    for d in &report.discrepancies {
        if current_document != Some(d.document.as_str()) {
            current_document = Some(&d.document);
            log::info!("{}", d.document.if_supports_color(Stdout, |t| t.bold()));
        }
        match &d.reason {
            DiscrepancyReason::Missing => log::info!(
                "  {} {} {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                d.expected.to_string().if_supports_color(Stdout, |t| t.bold()),
                format!("({})", d.record.name).if_supports_color(Stdout, |t| t.dimmed()),
            ),
            DiscrepancyReason::Mismatched { found } => log::info!(
                "  {} {} {} {}",
                "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                d.expected.to_string().if_supports_color(Stdout, |t| t.bold()),
                "found".if_supports_color(Stdout, |t| t.dimmed()),
                found.join(", "),
            ),
        }
    }
    if !report.discrepancies.is_empty() {
        crate::log_blank();
    }
}

fn print_summary(report: &ScanReport) {
    let has_issues = !report.discrepancies.is_empty() || !report.errors.is_empty();
    let level = if has_issues { Level::Warn } else { Level::Info };
    log::log!(level, "{}", "Summary:".if_supports_color(Stdout, |t| t.bold()));
    log::info!(
        "  {} {} of {} records have an image",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        report.found,
        report.checked,
    );
    if report.found_lowercase > 0 {
        log::info!(
            "  {} {} only under a lowercase name",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            report.found_lowercase,
        );
    }
    if report.missing() > 0 {
        log::warn!(
            "  {} {} missing",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            report.missing(),
        );
    }
    if report.mismatched() > 0 {
        log::warn!(
            "  {} {} slots hold a differently named file",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            report.mismatched(),
        );
    }
    if report.cancelled {
        log::warn!(
            "  {} {}",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            "Scan cancelled before finishing",
        );
    }
    log_errors(&report.errors);
}
