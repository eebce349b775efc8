//! Tool-call bookkeeping for outgoing turns and tool-result display.

use crate::models::{ChatMessage, MessageContent, MessageKind};
use crate::utils::new_message_id;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// Placeholder tool results for every AI tool call that has no later tool
/// message carrying its id.  The agent runtime requires every tool call to
/// be answered before the next human turn; a stream dropped mid-turn would
/// otherwise leave the thread unusable.
///
/// The returned messages are meant to be sent ahead of the new human
/// message.
pub fn ensure_tool_calls_have_responses(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    ensure_with_ids(messages, new_message_id)
}

fn ensure_with_ids(
    messages: &[ChatMessage],
    mut next_id: impl FnMut() -> String,
) -> Vec<ChatMessage> {
    let mut synthesized = Vec::new();

    for (index, message) in messages.iter().enumerate() {
        if message.kind != MessageKind::Ai || message.tool_calls.is_empty() {
            continue;
        }
        let later = &messages[index + 1..];
        let answered: HashSet<&str> = later
            .iter()
            .filter(|m| m.kind == MessageKind::Tool)
            .filter_map(|m| m.tool_call_id.as_deref())
            .collect();
        let followed_by_tool = later.first().is_some_and(|m| m.kind == MessageKind::Tool);

        for call in &message.tool_calls {
            let is_answered = match call.id.as_deref() {
                Some(id) if !id.is_empty() => answered.contains(id),
                // Calls without an id cannot be matched; accept any directly
                // following tool message as their answer.
                _ => followed_by_tool,
            };
            if !is_answered {
                synthesized.push(ChatMessage::placeholder_tool_result(&next_id(), call));
            }
        }
    }

    synthesized
}

/// Tool output prepared for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum ToolResultDisplay {
    /// Structured output, pretty-printed
    Json(String),
    /// Anything else, shown as-is
    Text(String),
}

/// JSON objects and arrays are pretty-printed; scalars, malformed JSON and
/// plain prose fall back to the raw text.
pub fn format_tool_result(message: &ChatMessage) -> ToolResultDisplay {
    match &message.content {
        MessageContent::Text(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed @ (Value::Object(_) | Value::Array(_))) => {
                ToolResultDisplay::Json(serde_json::to_string_pretty(&parsed).unwrap_or_else(|_| raw.clone()))
            }
            _ => ToolResultDisplay::Text(raw.clone()),
        },
        MessageContent::Blocks(blocks) => match serde_json::to_string_pretty(blocks) {
            Ok(pretty) => ToolResultDisplay::Json(pretty),
            Err(_) => ToolResultDisplay::Text(message.text()),
        },
    }
}
