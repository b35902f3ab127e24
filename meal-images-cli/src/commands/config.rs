use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use meal_images_lib::settings::{Settings, settings_path};

use crate::CliError;

/// Show the settings file location and the effective values.
pub(crate) fn run_config_show(root: Option<PathBuf>) -> Result<(), CliError> {
    let path = settings_path();

    log::info!(
        "{}",
        "meal-images Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    let settings = Settings::load_from(&path)?;
    log::info!(
        "  Catalog root:  {}",
        settings
            .resolve_root(root)
            .display()
            .if_supports_color(Stdout, |t| t.cyan()),
    );

    let key_env = &settings.provider.api_key_env;
    if settings.provider.api_key().is_some() {
        log::info!(
            "  API key:       {} {}",
            key_env,
            "(set)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  API key:       {} {}",
            key_env,
            "(not set)".if_supports_color(Stdout, |t| t.yellow()),
        );
    }
    crate::log_blank();

    for line in settings.to_toml()?.lines() {
        log::info!("  {}", line.if_supports_color(Stdout, |t| t.dimmed()));
    }
    Ok(())
}

pub(crate) fn run_config_path() {
    log::info!("{}", settings_path().display());
}

/// Write a settings file holding the defaults.
pub(crate) fn run_config_init(force: bool) -> Result<(), CliError> {
    let path = settings_path();
    if path.exists() && !force {
        return Err(CliError::config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    Settings::default().save_to(&path)?;
    log::info!(
        "  {} Wrote {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}
