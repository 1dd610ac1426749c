//! One end-to-end filter invocation: selection -> command pick -> run ->
//! replace -> history update and save.
//!
//! Each step runs to completion before the next one starts. Any step that
//! comes back empty or fails aborts the chain, and the history is only
//! touched once the filter has succeeded and its output is in the editor.

use tracing::debug;
use tracing::info;

use crate::command_history::CommandHistory;
use crate::config::Config;
use crate::editor::Editor;
use crate::error::FilterErr;
use crate::error::Result;
use crate::exec::run_filter_command;
use crate::picker::CommandPicker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    /// The command that ran, as entered.
    pub command: String,
    /// Trimmed standard output that replaced the selection.
    pub output: String,
}

/// Pipes the editor's selection through a command chosen by `picker` and
/// replaces the selection with the result.
pub async fn run_shell_filter<E, C>(
    editor: &mut E,
    picker: &mut C,
    history: &mut CommandHistory,
    config: &Config,
) -> Result<FilterOutcome>
where
    E: Editor + ?Sized,
    C: CommandPicker + ?Sized,
{
    let selection = match editor.selected_text() {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => return Err(FilterErr::NoSelection),
    };

    let command = match picker.pick_command(history.entries()) {
        Some(command) if !command.is_empty() => command,
        _ => return Err(FilterErr::NoCommandChosen),
    };

    debug!("filtering {} bytes through {command:?}", selection.len());
    let output = run_filter_command(&config.shell, &command, &selection).await?;

    editor.replace_selection(&output)?;

    history.update(&command);
    history.save();
    info!("filter {command:?} succeeded");

    Ok(FilterOutcome { command, output })
}
