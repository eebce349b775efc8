//! View preferences: chat config, user settings and sidebar/tool toggles.

use super::sync_location;
use crate::messages::{Command, Message};
use crate::settings::UserSettings;
use crate::state::AppState;

/// Returns `true` when the message was handled by the settings reducer.
pub fn update(state: &mut AppState, msg: &Message, cmds: &mut Vec<Command>) -> bool {
    match msg {
        Message::ChatConfigLoaded(config) => {
            state.settings.config = (**config).clone();
            // Stored values are layered over the new defaults.
            state.settings.user = UserSettings::from_stored(state.settings.stored_raw.as_deref(), &state.settings.config);
            cmds.push(Command::ApplyTheme(state.settings.user));
            true
        }
        Message::UpdateUserSettings(patch) => {
            state.settings.user.apply(*patch);
            persist(state, cmds);
            true
        }
        Message::ResetUserSettings => {
            state.settings.user = UserSettings::defaults_from(&state.settings.config);
            persist(state, cmds);
            true
        }
        Message::SetChatHistoryOpen(open) => {
            state.navigation.chat_history_open = *open;
            sync_location(state, cmds);
            true
        }
        Message::SetHideToolCalls(hide) => {
            state.navigation.hide_tool_calls = *hide;
            sync_location(state, cmds);
            true
        }
        _ => false,
    }
}

fn persist(state: &mut AppState, cmds: &mut Vec<Command>) {
    let user = state.settings.user;
    state.settings.stored_raw = Some(user.to_json());
    cmds.push(Command::PersistUserSettings(user));
    cmds.push(Command::ApplyTheme(user));
}
