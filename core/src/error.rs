use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterErr>;

/// Every way a single filter invocation can stop short of replacing the
/// selection. None of these are fatal to the host: callers surface the message
/// and return to idle.
#[derive(Error, Debug)]
pub enum FilterErr {
    /// The editor had no (or an empty) selection.
    #[error("No text selected.")]
    NoSelection,

    /// The picker was cancelled or produced an empty command.
    #[error("No command selected or entered.")]
    NoCommandChosen,

    /// The filter exited non-zero, was killed, or could not be spawned.
    /// `stderr` holds the trimmed standard error, or the OS error text when
    /// the shell itself could not be started.
    #[error("Error: {stderr}")]
    CommandFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The user pressed Ctrl-C while the filter was running.
    #[error("interrupted (Ctrl-C)")]
    Interrupted,

    // -----------------------------------------------------------------
    // Automatic conversions for common external error types
    // -----------------------------------------------------------------
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl FilterErr {
    /// True for the outcomes where the user simply declined to continue, as
    /// opposed to something going wrong.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            FilterErr::NoSelection | FilterErr::NoCommandChosen | FilterErr::Interrupted
        )
    }
}
