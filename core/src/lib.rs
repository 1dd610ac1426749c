//! Root of the `shell-filter-core` library.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output must go through the host or the tracing stack.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod command_history;
pub mod config;
pub mod config_types;
pub mod editor;
pub mod error;
pub mod exec;
pub mod picker;
mod shell_filter;

pub use command_history::CommandHistory;
pub use command_history::HistoryEntry;
pub use command_history::MAX_PERSISTED_ENTRIES;
pub use editor::Editor;
pub use error::FilterErr;
pub use picker::CommandPicker;
pub use picker::PromptPicker;
pub use picker::Prompter;
pub use shell_filter::FilterOutcome;
pub use shell_filter::run_shell_filter;
