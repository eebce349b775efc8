//! Domain reducers.
//!
//! Each domain owns the messages that concern it.  `update.rs` offers every
//! message to the reducers in turn; the first one that returns `true` has
//! consumed it.

pub mod assistant;
pub mod connection;
pub mod settings;
pub mod stream;
pub mod threads;

use crate::messages::Command;
use crate::state::AppState;

/// Queue a rewrite of the page query string.
pub(crate) fn sync_location(state: &AppState, cmds: &mut Vec<Command>) {
    cmds.push(Command::SyncLocation(state.navigation.clone()));
}

/// Trimmed, or `None` when blank.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
