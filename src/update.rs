// src/update.rs
//
use crate::messages::{Command, Message};
use crate::state::AppState;

pub fn update(state: &mut AppState, msg: Message) -> Vec<Command> {
    let mut commands = Vec::new();

    // ---------------------------------------------------------------
    // Delegate to the domain reducers.  The first one that consumes the
    // message wins.
    // ---------------------------------------------------------------

    if crate::reducers::connection::update(state, &msg, &mut commands) {
        return commands;
    }
    if crate::reducers::assistant::update(state, &msg, &mut commands) {
        return commands;
    }
    if crate::reducers::threads::update(state, &msg, &mut commands) {
        return commands;
    }
    if crate::reducers::stream::update(state, &msg, &mut commands) {
        return commands;
    }
    if crate::reducers::settings::update(state, &msg, &mut commands) {
        return commands;
    }

    crate::warn_log!("Unhandled message: {:?}", msg);
    commands
}
