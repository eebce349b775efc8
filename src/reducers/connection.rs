//! Connection parameters and the session lifecycle they drive.

use super::{assistant, non_blank, stream, sync_location, threads};
use crate::constants::ASSISTANT_NONE;
use crate::messages::{Bootstrap, Command, Message};
use crate::settings::UserSettings;
use crate::state::AppState;
use crate::toast::Toast;

/// Returns `true` when the message was handled by the connection reducer.
pub fn update(state: &mut AppState, msg: &Message, cmds: &mut Vec<Command>) -> bool {
    match msg {
        Message::Init(boot) => {
            init(state, boot, cmds);
            true
        }
        Message::SetApiUrl(url) => {
            state.navigation.api_url = non_blank(url);
            sync_location(state, cmds);
            reconcile(state, cmds);
            true
        }
        Message::SetAssistantId(value) => {
            select_assistant(state, value, cmds);
            true
        }
        Message::SetApiKey(key) => {
            set_api_key(state, key.as_deref(), cmds);
            reconcile(state, cmds);
            true
        }
        Message::SetConnection {
            api_url,
            assistant_id,
            api_key,
        } => {
            state.navigation.api_url = non_blank(api_url);
            state.navigation.assistant_id = non_blank(assistant_id);
            set_api_key(state, api_key.as_deref(), cmds);
            sync_location(state, cmds);
            reconcile(state, cmds);
            true
        }
        Message::ConnectionProbed { api_url, result } => {
            if *api_url != state.connection.api_url {
                return true;
            }
            match result {
                Ok(()) => crate::debug_log!("Connected to {}", api_url),
                Err(e) => {
                    crate::warn_log!("Connection probe for {} failed: {}", api_url, e);
                    cmds.push(Command::Notify(Toast::connection_failed(api_url)));
                }
            }
            true
        }
        _ => false,
    }
}

fn init(state: &mut AppState, boot: &Bootstrap, cmds: &mut Vec<Command>) {
    state.origin = boot.origin.clone();
    state.env = boot.env.clone();
    state.navigation = boot.navigation.clone();

    // A build-time key is persisted so the setup form shows it.
    let stored = boot.stored_api_key.as_deref().and_then(non_blank);
    let env_key = state.env.api_key.as_deref().and_then(non_blank);
    state.api_key = match (stored, env_key) {
        (Some(key), _) => Some(key),
        (None, Some(key)) => {
            cmds.push(Command::PersistApiKey(Some(key.clone())));
            Some(key)
        }
        (None, None) => None,
    };

    state.settings.stored_raw = boot.stored_settings.clone();
    state.settings.user = UserSettings::from_stored(boot.stored_settings.as_deref(), &state.settings.config);
    cmds.push(Command::ApplyTheme(state.settings.user));
    cmds.push(Command::LoadChatConfig);

    state.connection = state.derive_connection();
    probe(state, cmds);
    assistant::begin_listing(state, cmds);
    assistant::begin_resolution(state, cmds);
    threads::refresh(state, cmds);
    stream::reset_session(state, cmds);
}

fn set_api_key(state: &mut AppState, key: Option<&str>, cmds: &mut Vec<Command>) {
    let key = key.and_then(non_blank);
    if key == state.api_key {
        return;
    }
    state.api_key = key.clone();
    cmds.push(Command::PersistApiKey(key));
}

fn select_assistant(state: &mut AppState, value: &str, cmds: &mut Vec<Command>) {
    if value == ASSISTANT_NONE {
        state.navigation.assistant_id = None;
    } else {
        let trimmed = value.trim();
        let current = state.navigation.assistant_id.as_deref().map(str::trim);
        if trimmed.is_empty() || Some(trimmed) == current {
            return;
        }
        state.navigation.assistant_id = Some(trimmed.to_string());
        cmds.push(Command::Notify(
            Toast::success("Assistant changed").with_description(format!("Selected assistant ID: {}", trimmed)),
        ));
    }

    // A new assistant starts from a blank conversation.
    state.navigation.thread_id = None;
    state.composer.context.clear();
    state.composer.input.clear();
    state.composer.content_blocks.clear();
    state.session.first_token_received = false;

    sync_location(state, cmds);
    reconcile(state, cmds);
}

fn probe(state: &AppState, cmds: &mut Vec<Command>) {
    if state.connection.api_url.is_empty() {
        return;
    }
    cmds.push(Command::ProbeConnection {
        config: state.api_config(),
    });
}

/// Bring registries and the session in line with the current connection
/// parameters and active thread.  Only what changed is refetched: a new
/// endpoint or key reconnects everything, a new assistant re-resolves and
/// re-lists threads, and any change (thread included) rebuilds the session.
pub fn reconcile(state: &mut AppState, cmds: &mut Vec<Command>) {
    let next = state.derive_connection();
    let prev = std::mem::replace(&mut state.connection, next.clone());

    let endpoint_changed = prev.api_url != next.api_url || prev.api_key != next.api_key;
    let assistant_changed = prev.assistant_id != next.assistant_id;

    if endpoint_changed {
        crate::debug_log!("Connection changed: {:?} -> {:?}", prev.api_url, next.api_url);
        probe(state, cmds);
        assistant::begin_listing(state, cmds);
    }
    if endpoint_changed || assistant_changed {
        assistant::begin_resolution(state, cmds);
        threads::refresh(state, cmds);
    }
    if endpoint_changed || assistant_changed || state.session.thread_id != state.navigation.thread_id {
        stream::reset_session(state, cmds);
    }
}
