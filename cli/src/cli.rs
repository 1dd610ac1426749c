use clap::ArgAction;
use clap::Parser;
use clap::ValueEnum;
use std::path::PathBuf;

use crate::text_buffer::LineRange;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Pipe text through a shell command and remember the commands you use most.",
    // If a sub-command is given, ignore requirements of the default args.
    subcommand_negates_reqs = true
)]
pub struct Cli {
    /// Filter command to run, e.g. `sort -u`. When omitted, pick one from the
    /// ranked history or type a new one.
    pub command: Option<String>,

    /// Read the text to filter from FILE instead of stdin.
    #[arg(long, short = 'f', value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Only filter this 1-based, inclusive range of lines, e.g. `3:7`.
    #[arg(long, short = 'l', value_name = "START:END")]
    pub lines: Option<LineRange>,

    /// Write the result back to FILE instead of printing it.
    #[arg(long, short = 'i', requires = "file", default_value_t = false)]
    pub in_place: bool,

    #[clap(flatten)]
    pub config: ConfigArgs,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    ///
    /// The flag may be passed up to three times. Without any -v the CLI only logs errors.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Don't use colored ansi output for verbose logging
    #[arg(long, global = true)]
    pub no_ansi: bool,

    /// Specifies color settings for prompts and messages.
    #[arg(long = "color", value_enum, default_value_t = Color::Auto, global = true)]
    pub color: Color,

    #[command(subcommand)]
    pub subcommand: Option<Subcommand>,
}

/// Flags that override values from `~/.shell-filter.toml`.
#[derive(Debug, Default, clap::Args)]
pub struct ConfigArgs {
    /// Use FILE as the command history instead of ~/.vscode-shell-filter-history.
    #[arg(long, value_name = "FILE", global = true)]
    pub history_file: Option<PathBuf>,

    /// Shell invocation used to run the filter, e.g. "/bin/bash -c".
    #[arg(long, value_name = "SHELL")]
    pub shell: Option<String>,

    /// Rank the command in memory but do not save the history file.
    #[arg(long, default_value_t = false)]
    pub no_history: bool,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    /// Print the saved command history, most used first.
    History(HistoryCommand),
}

#[derive(Debug, Parser)]
pub struct HistoryCommand {
    /// Show at most N entries.
    #[arg(long, short = 'n', value_name = "N")]
    pub limit: Option<usize>,

    /// Print the entries as a JSON array.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Color {
    Always,
    Never,
    #[default]
    Auto,
}
