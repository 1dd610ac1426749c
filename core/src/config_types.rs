//! Types used to define the fields of [`crate::config::Config`].

// Note this file should generally be restricted to simple struct/enum
// definitions that do not contain business logic.

use serde::Deserialize;
use serde::Serialize;

/// Settings that govern if the ranked command history is written to disk.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct History {
    /// If `none`, successful commands are still ranked in memory for the
    /// current run but never saved.
    #[serde(default)]
    pub persistence: HistoryPersistence,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryPersistence {
    /// Save the top-ranked commands after every successful run.
    #[default]
    SaveAll,
    /// Do not write history to disk.
    None,
}
