//! Clap derive structures for the `linkwatch` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// linkwatch -- wireless link quality indicator
#[derive(Debug, Parser)]
#[command(
    name = "linkwatch",
    version,
    about = "Watch the wireless link quality reported by a dd-wrt access point",
    long_about = "Polls the access point's status page, extracts signal fields with a\n\
        configurable pattern, and classifies the result into named quality bands.\n\n\
        Without a subcommand, `watch` runs.",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Option<Command>,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Settings file (default: platform config dir)
    #[arg(long, short = 'c', env = "LINKWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Status page URL (overrides settings)
    #[arg(long, short = 'u', global = true)]
    pub url: Option<String>,

    /// Fetch timeout in seconds (overrides settings)
    #[arg(long, short = 't', global = true)]
    pub timeout: Option<u64>,

    /// Seconds between ticks (overrides settings)
    #[arg(long, short = 'i', global = true)]
    pub interval: Option<u64>,

    /// Replay probe results from a TOML file instead of polling the device
    #[arg(long, global = true, conflicts_with = "demo")]
    pub replay: Option<PathBuf>,

    /// Cycle through built-in samples covering every band
    #[arg(long, global = true)]
    pub demo: bool,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll continuously and print one indicator line per tick (default)
    ///
    /// Commands on stdin: empty line or `r` refreshes now, `q` quits.
    #[command(alias = "w")]
    Watch,

    /// Resolve once and print the result
    ///
    /// Exits 0 when a band was classified, 7 on fetch errors or when the
    /// device reports no association.
    Check(CheckArgs),

    /// Print the compiled band table with resolved icons and sounds
    Bands,

    /// Inspect or initialize the settings file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Print the display state as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective settings (defaults, file, environment, flags)
    Show,

    /// Print the settings file path
    Path,

    /// Write the effective settings, keeping only non-default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}
