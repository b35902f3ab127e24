use std::io::Write;
use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use meal_images_lib::CatalogError;
use meal_images_lib::generate::{GenerateOptions, ImageProvider, OpenAiImagesProvider, generate_one};
use meal_images_lib::selection::{Candidate, MealEntry, MealIndex, SelectionSession};

use crate::commands::generate::generate_options;
use crate::commands::{file_name, load_documents, log_errors};
use crate::{CliError, RunContext};

/// One keypress worth of input from the selection prompt.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Pick(usize),
    Apply,
    Generate,
    Next,
    Previous,
    Quit,
    Unknown,
}

fn parse_command(input: &str) -> Command {
    let input = input.trim();
    if let Ok(n) = input.parse::<usize>() {
        return if n >= 1 { Command::Pick(n - 1) } else { Command::Unknown };
    }
    match input.to_ascii_lowercase().as_str() {
        "a" => Command::Apply,
        "g" => Command::Generate,
        "n" | "" => Command::Next,
        "p" => Command::Previous,
        "q" => Command::Quit,
        _ => Command::Unknown,
    }
}

/// Run the interactive select command.
pub(crate) fn run_select(
    ctx: &RunContext,
    filter: Option<String>,
    from: Option<String>,
) -> Result<(), CliError> {
    let report_path = ctx.settings.resolve_report_path(&ctx.root, None);
    let documents = load_documents(ctx, filter, std::slice::from_ref(&report_path))?;
    let index = MealIndex::build(&documents);
    if index.is_empty() {
        log::info!(
            "{}",
            "No meals in the catalog.".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    }

    let mut session = SelectionSession::new(index, ctx.root.clone());
    if let Some(needle) = from {
        let needle = needle.to_lowercase();
        let start = session
            .index()
            .iter()
            .position(|m| m.name.to_lowercase().contains(&needle));
        match start {
            Some(i) => {
                session.go_to(i);
            }
            None => log::warn!(
                "  {} No meal matching {:?}; starting at the first one",
                "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                needle,
            ),
        }
    }

    let mut provider: Option<OpenAiImagesProvider> = None;
    let options = generate_options(&ctx.settings);
    let mut applied = 0usize;

    while let Some(meal) = session.current().cloned() {
        let candidates = session.list_candidates(&meal);
        print_meal(&session, &meal, &candidates);

        print!(
            "  {} ",
            "[1-9] pick, a apply, g generate, n next, p previous, q quit >"
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
        std::io::stdout().flush()?;
        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        match parse_command(&input) {
            Command::Pick(i) => match candidates.get(i) {
                Some(candidate) => {
                    if let Err(e) = session.select(&meal, candidate.clone()) {
                        log::warn!(
                            "  {} {}",
                            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                            e,
                        );
                    }
                }
                None => log::warn!(
                    "  {} No candidate {}",
                    "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                    i + 1,
                ),
            },
            Command::Apply => {
                let Some(candidate) = session.selected().cloned() else {
                    log::warn!(
                        "  {} Pick an image first",
                        "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                    );
                    continue;
                };
                let summary = session.apply_to_all_instances(&meal, &candidate);
                log::info!(
                    "  {} copied to {} slots ({} unchanged)",
                    "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                    summary.copied.len(),
                    summary.unchanged,
                );
                log_errors(&summary.errors);
                applied += 1;
                if !session.next() {
                    break;
                }
            }
            Command::Generate => {
                if provider.is_none() {
                    match OpenAiImagesProvider::from_settings(&ctx.settings.provider) {
                        Ok(p) => provider = Some(p),
                        Err(e) => {
                            log::warn!(
                                "  {} {}",
                                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                                e,
                            );
                            continue;
                        }
                    }
                }
                let Some(p) = provider.as_ref() else {
                    continue;
                };
                match generate_candidate(&meal, session.root(), p, &options) {
                    Ok(target) => log::info!(
                        "  {} {}",
                        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                        target.display(),
                    ),
                    Err(e) => log::warn!(
                        "  {} {}",
                        "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                        e,
                    ),
                }
            }
            Command::Next => {
                if !session.next() {
                    log::info!(
                        "  {}",
                        "Last meal reached".if_supports_color(Stdout, |t| t.dimmed()),
                    );
                    break;
                }
            }
            Command::Previous => {
                session.previous();
            }
            Command::Quit => break,
            Command::Unknown => log::warn!(
                "  {} Unknown command {:?}",
                "?".if_supports_color(Stdout, |t| t.yellow()),
                input.trim(),
            ),
        }
    }

    crate::log_blank();
    log::info!("{}", "Summary:".if_supports_color(Stdout, |t| t.bold()));
    log::info!(
        "  {} {} meals updated",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        applied,
    );
    Ok(())
}

/// Generate a new candidate for `meal` into the first instance's `_new` folder.
fn generate_candidate(
    meal: &MealEntry,
    root: &Path,
    provider: &dyn ImageProvider,
    options: &GenerateOptions,
) -> Result<PathBuf, CatalogError> {
    let instance = meal
        .instances
        .first()
        .ok_or_else(|| CatalogError::format(format!("{:?} has no instances", meal.name)))?;
    let target = instance.generated_path(root).map_err(|e| {
        CatalogError::format(format!("{} #{}: {e}", instance.document, instance.position))
    })?;
    log::info!(
        "  {} Generating {}",
        "\u{2192}".if_supports_color(Stdout, |t| t.cyan()),
        file_name(&target),
    );
    generate_one(&instance.record, &target, provider, options)?;
    Ok(target)
}

fn print_meal(session: &SelectionSession, meal: &MealEntry, candidates: &[Candidate]) {
    let (cursor, total) = session.progress();
    crate::log_blank();
    log::info!(
        "{} {}",
        format!("[{}/{}]", cursor + 1, total).if_supports_color(Stdout, |t| t.dimmed()),
        meal.name.if_supports_color(Stdout, |t| t.bold()),
    );
    for instance in &meal.instances {
        log::info!(
            "  {}",
            format!("{} #{}", instance.document, instance.position)
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    if candidates.is_empty() {
        log::info!(
            "  {}",
            "No stored images yet".if_supports_color(Stdout, |t| t.yellow()),
        );
    }
    for (i, candidate) in candidates.iter().enumerate() {
        let marker = if session.selected() == Some(candidate) {
            "\u{2714}"
        } else {
            " "
        };
        let tag = if candidate.generated { " (generated)" } else { "" };
        log::info!(
            "  {} {:>2}) {}{}",
            marker.if_supports_color(Stdout, |t| t.green()),
            i + 1,
            candidate.path.display(),
            tag.if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
}
