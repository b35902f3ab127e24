use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use meal_images_lib::generate::{
    GenerateOptions, GenerateProgress, ImageProvider, OpenAiImagesProvider, generate_missing,
};
use meal_images_lib::settings::Settings;
use meal_images_lib::CatalogError;

use crate::commands::{file_name, load_documents, log_errors};
use crate::spinner::new_spinner;
use crate::{CliError, RunContext};

/// Stand-in for dry runs, which never reach the provider.
struct Unconfigured;

impl ImageProvider for Unconfigured {
    fn generate(&self, _prompt: &str) -> Result<Vec<u8>, CatalogError> {
        Err(CatalogError::config("no image provider configured"))
    }
}

/// Options for a generation run, sized from the provider settings.
pub(crate) fn generate_options(settings: &Settings) -> GenerateOptions {
    GenerateOptions {
        size: settings.provider.output_size,
        quality: settings.provider.jpeg_quality,
        ..Default::default()
    }
}

/// Run the generate command.
pub(crate) fn run_generate(
    ctx: &RunContext,
    filter: Option<String>,
    limit: Option<usize>,
    start: u32,
    dry_run: bool,
) -> Result<(), CliError> {
    let provider: Box<dyn ImageProvider> = if dry_run {
        Box::new(Unconfigured)
    } else {
        Box::new(OpenAiImagesProvider::from_settings(&ctx.settings.provider)?)
    };

    log::info!(
        "Generating missing images in: {}",
        ctx.root.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    if dry_run {
        log::info!(
            "{}",
            "Dry run: the image provider will not be called".if_supports_color(Stdout, |t| t.dimmed()),
        );
    } else {
        log::info!(
            "{}",
            format!("Provider: {}", ctx.settings.provider.endpoint)
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    if let Some(n) = limit {
        log::info!(
            "{}",
            format!("Limit: {n} images").if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    if start > 1 {
        log::info!(
            "{}",
            format!("Starting at position {start}").if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    crate::log_blank();

    let report_path = ctx.settings.resolve_report_path(&ctx.root, None);
    let documents = load_documents(ctx, filter, std::slice::from_ref(&report_path))?;

    let options = GenerateOptions {
        limit,
        start_position: start.max(1),
        dry_run,
        ..generate_options(&ctx.settings)
    };

    let pb = new_spinner(ctx.quiet);
    let progress_callback = |progress: GenerateProgress| match progress {
        GenerateProgress::Document {
            ref name,
            record_count,
        } => {
            pb.set_message(format!("{name}: {record_count} records"));
        }
        GenerateProgress::Generating {
            ref name,
            position,
            total,
        } => {
            pb.set_message(format!("[{position}/{total}] Generating {name}"));
        }
        GenerateProgress::Done => pb.finish_and_clear(),
    };

    let summary = generate_missing(
        &documents,
        &ctx.root,
        provider.as_ref(),
        &options,
        &progress_callback,
    );
    pb.finish_and_clear();

    for path in &summary.planned {
        log::info!(
            "  {} {}",
            "\u{2192}".if_supports_color(Stdout, |t| t.cyan()),
            path.display(),
        );
    }
    for path in &summary.generated {
        log::info!(
            "  {} {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            file_name(path),
        );
    }
    crate::log_blank();

    log::info!("{}", "Summary:".if_supports_color(Stdout, |t| t.bold()));
    if dry_run {
        log::info!(
            "  {} {} images would be generated",
            "\u{2192}".if_supports_color(Stdout, |t| t.cyan()),
            summary.planned.len(),
        );
    } else {
        log::info!(
            "  {} {} images generated",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            summary.generated.len(),
        );
    }
    log::info!(
        "  {} {} already had an image",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        summary.skipped_existing,
    );
    if summary.cancelled {
        log::warn!(
            "  {} {}",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            "Generation cancelled before finishing",
        );
    }
    log_errors(&summary.failures);
    Ok(())
}
