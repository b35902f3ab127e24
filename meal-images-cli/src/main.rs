//! meal-images CLI
//!
//! Command-line interface for checking, repairing and curating the product
//! images that belong to meal catalog records.

mod cli_types;
mod commands;
mod error;
mod logger;
mod spinner;

use std::path::PathBuf;

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use meal_images_lib::Settings;

use cli_types::{Cli, Commands, ConfigAction, NamesAction};
pub(crate) use error::CliError;

/// Settings and paths shared by every command.
pub(crate) struct RunContext {
    pub settings: Settings,
    pub root: PathBuf,
    pub quiet: bool,
}

/// Print an empty line through the logger so `--quiet` and `--logfile` see it too.
pub(crate) fn log_blank() {
    log::info!("");
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init(cli.quiet, cli.verbose, cli.logfile.as_deref()) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        log::error!(
            "{} {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            e,
        );
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    // `config` must work even when the settings file is broken.
    if let Commands::Config { action } = &cli.command {
        return match action {
            ConfigAction::Show => commands::config::run_config_show(cli.root),
            ConfigAction::Path => {
                commands::config::run_config_path();
                Ok(())
            }
            ConfigAction::Init { force } => commands::config::run_config_init(*force),
        };
    }

    let settings = Settings::load()?;
    let root = settings.resolve_root(cli.root);
    log::debug!("Catalog root: {}", root.display());
    let ctx = RunContext {
        settings,
        root,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Scan {
            remote,
            local,
            documents,
            report,
            limit,
        } => commands::scan::run_scan(&ctx, remote, local, documents.filter, report, limit),
        Commands::Repair {
            report,
            no_placeholders,
            keep_mismatched,
            dry_run,
            yes,
        } => commands::repair::run_repair(
            &ctx,
            report,
            no_placeholders,
            keep_mismatched,
            dry_run,
            yes,
        ),
        Commands::Tidy { dry_run, yes } => commands::tidy::run_tidy(&ctx, dry_run, yes),
        Commands::Names { action } => match action {
            NamesAction::Longest { count, documents } => {
                commands::names::run_longest(&ctx, count, documents.filter)
            }
            NamesAction::Shorten {
                rules,
                longest,
                documents,
                dry_run,
                yes,
            } => commands::names::run_shorten(&ctx, rules, longest, documents.filter, dry_run, yes),
        },
        Commands::Select { documents, from } => {
            commands::select::run_select(&ctx, documents.filter, from)
        }
        Commands::Generate {
            documents,
            limit,
            start,
            dry_run,
        } => commands::generate::run_generate(&ctx, documents.filter, limit, start, dry_run),
        Commands::Config { .. } => Ok(()),
    }
}
