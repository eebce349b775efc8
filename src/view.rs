// src/view.rs
//
// Serializable projection of `AppState` handed to the host page after every
// dispatch.  The host renders from this alone; it never sees `AppState`.
//
use crate::constants::THREAD_TITLE_MAX_GRAPHEMES;
use crate::models::{AssistantSchemas, ChatMessage, ContentBlock, JsonMap, MessageKind, Thread};
use crate::navigation::NavigationState;
use crate::settings::{ChatConfig, UserSettings};
use crate::state::AppState;
use crate::tool_calls::{format_tool_result, ToolResultDisplay};
use crate::ui_state::UiMessage;
use crate::utils::truncate_graphemes;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub connection: ConnectionView,
    pub navigation: NavigationState,
    pub assistant: AssistantView,
    pub threads: ThreadsView,
    pub chat: ChatView,
    pub settings: UserSettings,
    pub config: ChatConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionView {
    pub api_url: String,
    pub assistant_id: String,
    pub has_api_key: bool,
    /// Setup form is shown until both URL and assistant are known.
    pub configured: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantOption {
    pub assistant_id: String,
    pub graph_id: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantView {
    pub resolved_id: Option<String>,
    pub label: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub configurable: JsonMap,
    pub schemas: Option<AssistantSchemas>,
    pub options: Vec<AssistantOption>,
    pub options_loading: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadItem {
    pub thread_id: String,
    pub title: String,
    pub updated_at: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadsView {
    pub items: Vec<ThreadItem>,
    pub loading: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    #[serde(flatten)]
    pub message: ChatMessage,
    /// Formatted result for tool messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<ToolResultDisplay>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatView {
    pub messages: Vec<MessageView>,
    pub ui: Vec<UiMessage>,
    pub is_loading: bool,
    pub state_loading: bool,
    pub first_token_received: bool,
    pub error: Option<String>,
    pub input: String,
    pub content_blocks: Vec<ContentBlock>,
    pub can_regenerate: bool,
}

/// Title shown in the history sidebar.
pub fn thread_title(thread: &Thread) -> String {
    if let Some(title) = thread.title() {
        return title.to_string();
    }
    match thread.first_human_text() {
        Some(text) => truncate_graphemes(&text, THREAD_TITLE_MAX_GRAPHEMES),
        None => thread.thread_id.clone(),
    }
}

/// Messages the chat list renders: synthesized ones never, tool results only
/// when tool calls are shown.
pub fn visible_messages(messages: &[ChatMessage], hide_tool_calls: bool) -> Vec<MessageView> {
    messages
        .iter()
        .filter(|m| !m.is_hidden())
        .filter(|m| !(hide_tool_calls && m.kind == MessageKind::Tool))
        .map(|m| MessageView {
            tool_result: (m.kind == MessageKind::Tool).then(|| format_tool_result(m)),
            message: m.clone(),
        })
        .collect()
}

impl ViewSnapshot {
    pub fn from_state(state: &AppState) -> Self {
        let registry = &state.assistant;
        let label = registry.resolved_id.as_ref().map(|id| {
            registry
                .assistants
                .iter()
                .find(|a| &a.assistant_id == id)
                .map(|a| a.label().to_string())
                .unwrap_or_else(|| state.connection.assistant_id.clone())
        });

        let active = state.thread_id();
        let session = &state.session;

        ViewSnapshot {
            connection: ConnectionView {
                api_url: state.connection.api_url.clone(),
                assistant_id: state.connection.assistant_id.clone(),
                has_api_key: state.connection.api_key.is_some(),
                configured: state.connection.is_configured(),
            },
            navigation: state.navigation.clone(),
            assistant: AssistantView {
                resolved_id: registry.resolved_id.clone(),
                label,
                loading: registry.loading,
                error: registry.error.clone(),
                configurable: registry.effective_configurable(),
                schemas: registry.schemas.clone(),
                options: registry
                    .assistants
                    .iter()
                    .map(|a| AssistantOption {
                        assistant_id: a.assistant_id.clone(),
                        graph_id: a.graph_id.clone(),
                        label: a.label().to_string(),
                    })
                    .collect(),
                options_loading: registry.assistants_loading,
            },
            threads: ThreadsView {
                items: state
                    .threads
                    .threads
                    .iter()
                    .map(|t| ThreadItem {
                        thread_id: t.thread_id.clone(),
                        title: thread_title(t),
                        updated_at: t.updated_at.map(|d| d.to_rfc3339()),
                        active: active == Some(t.thread_id.as_str()),
                    })
                    .collect(),
                loading: state.threads.loading,
            },
            chat: ChatView {
                messages: visible_messages(&session.values.messages, state.navigation.hide_tool_calls),
                ui: session.values.ui.iter().cloned().collect(),
                is_loading: session.is_loading,
                state_loading: session.state_loading,
                first_token_received: session.first_token_received,
                error: session.error.clone(),
                input: state.composer.input.clone(),
                content_blocks: state.composer.content_blocks.clone(),
                can_regenerate: !session.is_loading
                    && (session.parent_checkpoint.is_some() || session.checkpoint.is_some()),
            },
            settings: state.settings.user,
            config: state.settings.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn thread(v: serde_json::Value) -> Thread {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn title_prefers_metadata() {
        let t = thread(json!({"thread_id": "t1", "metadata": {"title": "Trip plan"}}));
        assert_eq!(thread_title(&t), "Trip plan");
    }

    #[test]
    fn title_falls_back_to_first_human_message() {
        let long = "a".repeat(60);
        let t = thread(json!({
            "thread_id": "t1",
            "values": {"messages": [
                {"type": "ai", "content": "hi"},
                {"type": "human", "content": long}
            ]}
        }));
        let title = thread_title(&t);
        assert!(title.ends_with('…'));
        assert_eq!(title.chars().count(), THREAD_TITLE_MAX_GRAPHEMES + 1);
    }

    #[test]
    fn title_falls_back_to_id() {
        let t = thread(json!({"thread_id": "t1", "metadata": {"title": "  "}}));
        assert_eq!(thread_title(&t), "t1");
    }

    #[test]
    fn hidden_and_tool_messages_are_filtered() {
        let messages: Vec<ChatMessage> = serde_json::from_value(json!([
            {"id": "h", "type": "human", "content": "q"},
            {"id": "do-not-render-x", "type": "tool", "content": "x", "tool_call_id": "c0"},
            {"id": "t", "type": "tool", "content": "{\"ok\":true}", "tool_call_id": "c1"},
            {"id": "a", "type": "ai", "content": "done"}
        ]))
        .unwrap();

        let shown = visible_messages(&messages, false);
        let ids: Vec<_> = shown.iter().map(|m| m.message.id.as_deref().unwrap()).collect();
        assert_eq!(ids, ["h", "t", "a"]);
        assert!(matches!(shown[1].tool_result, Some(ToolResultDisplay::Json(_))));
        assert!(shown[0].tool_result.is_none());

        let without_tools = visible_messages(&messages, true);
        assert_eq!(without_tools.len(), 2);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let state = AppState::new();
        let value = serde_json::to_value(ViewSnapshot::from_state(&state)).unwrap();
        assert_eq!(value["connection"]["configured"], json!(false));
        assert!(value["chat"].get("firstTokenReceived").is_some());
        assert!(value["threads"]["items"].as_array().unwrap().is_empty());
    }
}
