//! Assistant registry: resolve the configured identifier to an assistant
//! instance, keep its config and schemas, and list assistants for the
//! selector.

use crate::messages::{Command, Message};
use crate::models::{Assistant, AssistantConfig, AssistantUpdateRequest, JsonMap};
use crate::schema_validation::validate_configurable;
use crate::state::AppState;
use crate::toast::Toast;
use crate::utils::is_uuid;

/// Returns `true` when the message was handled by the assistant reducer.
pub fn update(state: &mut AppState, msg: &Message, cmds: &mut Vec<Command>) -> bool {
    match msg {
        Message::AssistantFetched { seq, result } => {
            if *seq != state.assistant.resolve_seq {
                return true;
            }
            match result {
                Ok(assistant) => adopt(state, assistant, cmds),
                Err(e) => {
                    // The id may be a graph name that happens to look like a
                    // UUID, or the instance is gone.
                    crate::debug_log!("Direct assistant lookup failed ({}), searching by graph id", e);
                    cmds.push(Command::SearchAssistantsByGraph {
                        config: state.api_config(),
                        seq: *seq,
                        graph_id: state.connection.assistant_id.clone(),
                    });
                }
            }
            true
        }
        Message::AssistantSearched { seq, result } => {
            if *seq != state.assistant.resolve_seq {
                return true;
            }
            match result {
                Ok(found) => match found.first() {
                    Some(assistant) => adopt(state, assistant, cmds),
                    None => {
                        let msg = format!("No assistant found for graph_id: {}", state.connection.assistant_id);
                        fail(state, msg);
                    }
                },
                Err(e) => fail(state, e.user_message()),
            }
            true
        }
        Message::AssistantSchemasLoaded { seq, result } => {
            if *seq != state.assistant.resolve_seq {
                return true;
            }
            state.assistant.loading = false;
            match result {
                Ok(schemas) => state.assistant.schemas = Some(schemas.clone()),
                Err(e) => {
                    crate::warn_log!("Failed to load assistant schemas: {}", e);
                    state.assistant.schemas = None;
                }
            }
            true
        }
        Message::UpdateAssistantConfig(configurable) => {
            update_config(state, configurable, cmds);
            true
        }
        Message::AssistantConfigUpdated { assistant_id, result } => {
            if state.assistant.resolved_id.as_deref() != Some(assistant_id.as_str()) {
                return true;
            }
            match result {
                Ok(assistant) => {
                    state.assistant.config = Some(assistant.config.clone());
                    cmds.push(Command::Notify(Toast::success("Configuration saved")));
                }
                Err(e) => cmds.push(Command::Notify(
                    Toast::error("Failed to save configuration").with_description(e.user_message()),
                )),
            }
            true
        }
        Message::RefreshAssistantConfig => {
            begin_resolution(state, cmds);
            true
        }
        Message::RefreshAssistants => {
            begin_listing(state, cmds);
            true
        }
        Message::AssistantsListed { seq, result } => {
            if *seq != state.assistant.list_seq {
                return true;
            }
            state.assistant.assistants_loading = false;
            match result {
                Ok(list) => state.assistant.assistants = list.clone(),
                Err(e) => {
                    crate::warn_log!("Failed to list assistants: {}", e);
                    state.assistant.assistants.clear();
                }
            }
            true
        }
        _ => false,
    }
}

/// Start resolving the configured identifier.  Any in-flight resolution is
/// invalidated.
pub fn begin_resolution(state: &mut AppState, cmds: &mut Vec<Command>) {
    let registry = &mut state.assistant;
    registry.resolve_seq += 1;
    registry.clear_resolution();
    registry.error = None;

    let id = state.connection.assistant_id.clone();
    if state.connection.api_url.is_empty() || id.is_empty() {
        registry.loading = false;
        return;
    }
    registry.loading = true;

    let config = state.connection.api_config();
    let seq = registry.resolve_seq;
    if is_uuid(&id) {
        cmds.push(Command::GetAssistant {
            config,
            seq,
            assistant_id: id,
        });
    } else {
        cmds.push(Command::SearchAssistantsByGraph {
            config,
            seq,
            graph_id: id,
        });
    }
}

pub fn begin_listing(state: &mut AppState, cmds: &mut Vec<Command>) {
    let registry = &mut state.assistant;
    registry.list_seq += 1;
    if state.connection.api_url.is_empty() {
        registry.assistants.clear();
        registry.assistants_loading = false;
        return;
    }
    registry.assistants_loading = true;
    cmds.push(Command::ListAssistants {
        config: state.connection.api_config(),
        seq: registry.list_seq,
    });
}

fn adopt(state: &mut AppState, assistant: &Assistant, cmds: &mut Vec<Command>) {
    crate::debug_log!(
        "Resolved {:?} to assistant {}",
        state.connection.assistant_id,
        assistant.assistant_id
    );
    let registry = &mut state.assistant;
    registry.resolved_id = Some(assistant.assistant_id.clone());
    registry.config = Some(assistant.config.clone());
    registry.error = None;
    cmds.push(Command::FetchAssistantSchemas {
        config: state.connection.api_config(),
        seq: registry.resolve_seq,
        assistant_id: assistant.assistant_id.clone(),
    });
}

fn fail(state: &mut AppState, message: String) {
    crate::warn_log!("Assistant resolution failed: {}", message);
    let registry = &mut state.assistant;
    registry.clear_resolution();
    registry.loading = false;
    registry.error = Some(message);
}

fn update_config(state: &mut AppState, configurable: &JsonMap, cmds: &mut Vec<Command>) {
    let assistant_id = match &state.assistant.resolved_id {
        Some(id) => id.clone(),
        None => {
            cmds.push(Command::Notify(
                Toast::error("No assistant selected")
                    .with_description("Connect to an assistant before saving its configuration."),
            ));
            return;
        }
    };

    let schema = state
        .assistant
        .schemas
        .as_ref()
        .and_then(|s| s.config_schema.as_ref());
    if let Some(schema) = schema {
        if let Err(errors) = validate_configurable(schema, configurable) {
            cmds.push(Command::Notify(
                Toast::error("Invalid configuration").with_description(errors.join("\n")),
            ));
            return;
        }
    }

    let extra = state
        .assistant
        .config
        .as_ref()
        .map(|c| c.extra.clone())
        .unwrap_or_default();
    cmds.push(Command::UpdateAssistantConfig {
        config: state.api_config(),
        assistant_id,
        request: AssistantUpdateRequest {
            config: AssistantConfig {
                configurable: configurable.clone(),
                extra,
            },
        },
    });
}
