use std::io::Write;

use shell_filter_core::CommandHistory;
use shell_filter_core::HistoryEntry;
use shell_filter_core::command_history::rank_entries;
use shell_filter_core::config::Config;

use crate::cli::HistoryCommand;

pub(crate) fn run_history_command(cmd: HistoryCommand, config: &Config) -> anyhow::Result<()> {
    let history = CommandHistory::load(config);
    let entries = ranked(history.entries(), cmd.limit);

    let mut stdout = std::io::stdout().lock();
    if cmd.json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&entries)?)?;
    } else {
        stdout.write_all(format_entries(&entries).as_bytes())?;
    }
    stdout.flush()?;
    Ok(())
}

fn ranked(entries: &[HistoryEntry], limit: Option<usize>) -> Vec<HistoryEntry> {
    let mut entries = entries.to_vec();
    rank_entries(&mut entries);
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    entries
}

fn format_entries(entries: &[HistoryEntry]) -> String {
    let width = entries
        .iter()
        .map(|e| e.count.to_string().len())
        .max()
        .unwrap_or(1);
    entries
        .iter()
        .map(|e| format!("{:>width$}  {}\n", e.count, e.command))
        .collect()
}
