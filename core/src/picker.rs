//! Choosing which filter command to run.
//!
//! [`CommandPicker`] is the seam the filter flow depends on. The stock
//! implementation, [`PromptPicker`], drives a host's modal prompts through the
//! [`Prompter`] capability: a free-text box when there is no history yet,
//! otherwise a list of past commands plus a "new command" entry, followed by
//! a free-text box to confirm or edit the choice.

use crate::command_history::HistoryEntry;

pub const NEW_COMMAND_LABEL: &str = "Enter a new command...";
pub const NEW_COMMAND_DESCRIPTION: &str = "Type a new shell command";
pub const QUICK_PICK_PLACEHOLDER: &str = "Search history or type a new command";
pub const FIRST_COMMAND_PROMPT: &str = "No history available. Enter your first shell command";
pub const NEW_COMMAND_PROMPT: &str = "Enter a shell command to run";
pub const EDIT_COMMAND_PROMPT: &str = "Modify the command before executing";
pub const COMMAND_PLACEHOLDER: &str = "e.g., grep -v foobar";

/// Produces the command for one filter run, or `None` when the user backs
/// out.
pub trait CommandPicker {
    fn pick_command(&mut self, history: &[HistoryEntry]) -> Option<String>;
}

impl<C: CommandPicker + ?Sized> CommandPicker for &mut C {
    fn pick_command(&mut self, history: &[HistoryEntry]) -> Option<String> {
        (**self).pick_command(history)
    }
}

/// A request for a single line of free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBoxRequest<'a> {
    pub prompt: &'a str,
    pub placeholder: Option<&'a str>,
    /// Text the box starts with, for editing an existing command.
    pub value: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickPickItem {
    pub label: String,
    pub description: String,
}

/// Modal prompts offered by the host. Both return `None` when dismissed.
pub trait Prompter {
    fn input_box(&mut self, request: InputBoxRequest<'_>) -> Option<String>;

    /// Returns the index into `items` of the chosen entry.
    fn quick_pick(&mut self, items: &[QuickPickItem], placeholder: &str) -> Option<usize>;
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn input_box(&mut self, request: InputBoxRequest<'_>) -> Option<String> {
        (**self).input_box(request)
    }

    fn quick_pick(&mut self, items: &[QuickPickItem], placeholder: &str) -> Option<usize> {
        (**self).quick_pick(items, placeholder)
    }
}

/// [`CommandPicker`] built on a host's [`Prompter`].
#[derive(Debug)]
pub struct PromptPicker<P> {
    prompter: P,
}

impl<P: Prompter> PromptPicker<P> {
    pub fn new(prompter: P) -> Self {
        Self { prompter }
    }

    pub fn into_inner(self) -> P {
        self.prompter
    }
}

impl<P: Prompter> CommandPicker for PromptPicker<P> {
    fn pick_command(&mut self, history: &[HistoryEntry]) -> Option<String> {
        if history.is_empty() {
            return self.prompter.input_box(InputBoxRequest {
                prompt: FIRST_COMMAND_PROMPT,
                placeholder: Some(COMMAND_PLACEHOLDER),
                value: None,
            });
        }

        let items = quick_pick_items(history);
        let picked = self.prompter.quick_pick(&items, QUICK_PICK_PLACEHOLDER)?;

        // The synthetic entry is always last; compare by position so a
        // history command that happens to equal the label still edits.
        match history.get(picked) {
            Some(entry) => self.prompter.input_box(InputBoxRequest {
                prompt: EDIT_COMMAND_PROMPT,
                placeholder: None,
                value: Some(entry.command.as_str()),
            }),
            None if picked == history.len() => self.prompter.input_box(InputBoxRequest {
                prompt: NEW_COMMAND_PROMPT,
                placeholder: Some(COMMAND_PLACEHOLDER),
                value: None,
            }),
            None => {
                tracing::warn!("quick pick returned out-of-range index {picked}");
                None
            }
        }
    }
}

/// One item per history entry, in store order, followed by the "new command"
/// entry.
pub fn quick_pick_items(history: &[HistoryEntry]) -> Vec<QuickPickItem> {
    history
        .iter()
        .map(|entry| QuickPickItem {
            label: entry.command.clone(),
            description: String::new(),
        })
        .chain(std::iter::once(QuickPickItem {
            label: NEW_COMMAND_LABEL.to_string(),
            description: NEW_COMMAND_DESCRIPTION.to_string(),
        }))
        .collect()
}
