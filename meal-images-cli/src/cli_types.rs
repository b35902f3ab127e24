//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "meal-images")]
#[command(about = "Check, repair and curate meal product images", long_about = None)]
pub(crate) struct Cli {
    /// Directory holding the catalog JSON files and images_* folders
    /// (defaults to the settings value, then the current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which catalog documents a command works on.
#[derive(Args, Clone, Default)]
pub(crate) struct DocumentArgs {
    /// Only catalog files whose name contains this text (case-insensitive)
    #[arg(short, long)]
    pub filter: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Check every record for a stored image and write a report of missing ones
    Scan {
        /// Check this remote base URL instead of the configured one
        #[arg(long, conflicts_with = "local")]
        remote: Option<String>,

        /// Check the images_* folders under the root instead of the remote host
        #[arg(long)]
        local: bool,

        #[command(flatten)]
        documents: DocumentArgs,

        /// Where to write the report (default from settings)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Maximum number of records to check
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Fill the slots listed in a scan report with placeholder images
    Repair {
        /// Report to read (default from settings)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Only create folders and clear wrong files; don't copy placeholders
        #[arg(long)]
        no_placeholders: bool,

        /// Leave differently named files in missing slots alone
        #[arg(long)]
        keep_mismatched: bool,

        /// Show planned repairs without executing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Strip disallowed characters from stored image filenames
    Tidy {
        /// Show planned renames without executing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Inspect and shorten record names
    Names {
        #[command(subcommand)]
        action: NamesAction,
    },

    /// Walk distinct meals and choose one image for all of their instances
    Select {
        #[command(flatten)]
        documents: DocumentArgs,

        /// Start at the first meal whose name contains this text
        #[arg(long)]
        from: Option<String>,
    },

    /// Generate images for records that have none, using the configured provider
    Generate {
        #[command(flatten)]
        documents: DocumentArgs,

        /// Maximum number of images to generate
        #[arg(short, long)]
        limit: Option<usize>,

        /// Skip records before this 1-based position in each file
        #[arg(long, default_value_t = 1)]
        start: u32,

        /// Show what would be generated without calling the provider
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Show or initialize the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum NamesAction {
    /// List the longest distinct record names
    Longest {
        /// How many names to show
        #[arg(short, long, default_value_t = 10)]
        count: usize,

        #[command(flatten)]
        documents: DocumentArgs,
    },

    /// Replace record names across every catalog file
    Shorten {
        /// JSON or TOML file mapping name patterns to new names
        #[arg(long, conflicts_with = "longest", required_unless_present = "longest")]
        rules: Option<PathBuf>,

        /// New names for the N longest names, longest first (comma-separated)
        #[arg(long, value_delimiter = ',')]
        longest: Option<Vec<String>>,

        #[command(flatten)]
        documents: DocumentArgs,

        /// Show the mapping without rewriting any file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the effective settings and where they come from
    Show,

    /// Print the settings file path
    Path,

    /// Write a settings file with default values
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
}
