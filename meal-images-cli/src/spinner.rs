//! Single-line progress spinner used by the long-running commands.

use indicatif::{ProgressBar, ProgressStyle};

/// A ticking spinner, or a hidden one when `quiet` is set.
pub(crate) fn new_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .expect("static pattern")
            .tick_chars("/-\\|"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
