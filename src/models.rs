// src/models.rs
//
// Wire types for the remote execution service.  Everything the service
// owns (assistants, threads, messages) is read and republished, never
// invented, so unknown fields are kept where we echo data back.
//
use crate::constants::{
    ASSISTANT_LIST_LIMIT, DO_NOT_RENDER_ID_PREFIX, PLACEHOLDER_TOOL_RESULT, STREAM_MODES,
    THREAD_SEARCH_LIMIT,
};
use crate::ui_state::UiStateList;
use crate::utils::is_uuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub type JsonMap = Map<String, Value>;

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Assistants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "JsonMap::is_empty")]
    pub configurable: JsonMap,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assistant {
    pub assistant_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub graph_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub config: AssistantConfig,
    #[serde(default, deserialize_with = "null_default")]
    pub metadata: JsonMap,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub context: Option<JsonMap>,
}

impl Assistant {
    /// Label shown in the assistant selector.
    pub fn label(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ if !self.graph_id.is_empty() => &self.graph_id,
            _ => &self.assistant_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantSchemas {
    #[serde(default, deserialize_with = "null_default")]
    pub graph_id: String,
    #[serde(default)]
    pub input_schema: Option<Value>,
    #[serde(default)]
    pub output_schema: Option<Value>,
    #[serde(default)]
    pub state_schema: Option<Value>,
    #[serde(default)]
    pub config_schema: Option<Value>,
    #[serde(default)]
    pub context_schema: Option<Value>,
}

impl AssistantSchemas {
    /// Defaults declared by `config_schema.properties.*.default`.
    pub fn config_defaults(&self) -> JsonMap {
        self.config_schema
            .as_ref()
            .and_then(|schema| schema.get("properties"))
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .filter_map(|(key, prop)| prop.get("default").map(|d| (key.clone(), d.clone())))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistantSortBy {
    AssistantId,
    CreatedAt,
    UpdatedAt,
    Name,
    GraphId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Body of `POST /assistants/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssistantSearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_id: Option<String>,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<AssistantSortBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Vec<String>>,
}

impl AssistantSearchRequest {
    /// Single best match for a graph/template name.
    pub fn by_graph(graph_id: &str) -> Self {
        Self {
            graph_id: Some(graph_id.to_string()),
            limit: 1,
            sort_by: Some(AssistantSortBy::AssistantId),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        }
    }

    /// Lightweight listing used by the assistant selector.
    pub fn listing() -> Self {
        Self {
            limit: ASSISTANT_LIST_LIMIT,
            sort_by: Some(AssistantSortBy::AssistantId),
            sort_order: Some(SortOrder::Asc),
            select: Some(
                ["assistant_id", "graph_id", "name"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
            ..Default::default()
        }
    }
}

/// Body of `PATCH /assistants/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantUpdateRequest {
    pub config: AssistantConfig,
}

// ---------------------------------------------------------------------------
// Threads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub thread_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_default")]
    pub metadata: JsonMap,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub values: Option<Value>,
}

impl Thread {
    pub fn title(&self) -> Option<&str> {
        self.metadata
            .get("title")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
    }

    /// Text of the first human message in the thread's latest values.
    pub fn first_human_text(&self) -> Option<String> {
        let messages = self.values.as_ref()?.get("messages")?.as_array()?;
        messages
            .iter()
            .filter_map(|m| serde_json::from_value::<ChatMessage>(m.clone()).ok())
            .find(|m| m.kind == MessageKind::Human)
            .map(|m| m.text())
            .filter(|t| !t.trim().is_empty())
    }
}

/// Body of `POST /threads/search`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadSearchRequest {
    pub metadata: JsonMap,
    pub limit: u32,
}

impl ThreadSearchRequest {
    /// Threads are tagged with the assistant instance id when configuration
    /// names a UUID, otherwise with the graph/template name.
    pub fn for_assistant(assistant_id: &str) -> Self {
        let key = if is_uuid(assistant_id) {
            "assistant_id"
        } else {
            "graph_id"
        };
        let mut metadata = JsonMap::new();
        metadata.insert(key.to_string(), Value::String(assistant_id.to_string()));
        Self {
            metadata,
            limit: THREAD_SEARCH_LIMIT,
        }
    }
}

/// Body of `POST /threads`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThreadCreateRequest {
    #[serde(skip_serializing_if = "JsonMap::is_empty")]
    pub metadata: JsonMap,
}

/// Body of `PATCH /threads/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadUpdateRequest {
    pub metadata: JsonMap,
}

impl ThreadUpdateRequest {
    pub fn title(title: &str) -> Self {
        let mut metadata = JsonMap::new();
        metadata.insert("title".to_string(), Value::String(title.to_string()));
        Self { metadata }
    }
}

/// Graph state of a thread: the part this client renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadValues {
    #[serde(default, deserialize_with = "null_default")]
    pub messages: Vec<ChatMessage>,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "UiStateList::is_empty")]
    pub ui: UiStateList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<JsonMap>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub checkpoint_ns: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint_map: Option<JsonMap>,
}

/// Response of `GET /threads/{id}/state`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ThreadState {
    #[serde(default, deserialize_with = "null_default")]
    pub values: ThreadValues,
    #[serde(default, deserialize_with = "null_default")]
    pub next: Vec<String>,
    #[serde(default)]
    pub checkpoint: Option<Checkpoint>,
    #[serde(default)]
    pub parent_checkpoint: Option<Checkpoint>,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Human,
    Ai,
    Tool,
    System,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaBlock {
    pub source_type: String,
    pub mime_type: String,
    pub data: String,
    #[serde(default, deserialize_with = "null_default")]
    pub metadata: JsonMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KnownBlock {
    Text { text: String },
    Image(MediaBlock),
    File(MediaBlock),
}

/// One typed piece of message content.  Shapes this client does not know
/// (provider specific blocks, reasoning traces, ...) are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentBlock {
    Known(KnownBlock),
    Other(Value),
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Known(KnownBlock::Text { text: text.into() })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Known(KnownBlock::Text { text }) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Text(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub args: Value,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default, deserialize_with = "null_default")]
    pub content: MessageContent,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl ChatMessage {
    fn bare(kind: MessageKind, id: String, content: MessageContent) -> Self {
        Self {
            id: Some(id),
            kind,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
            status: None,
            extra: JsonMap::new(),
        }
    }

    /// New human turn: typed text first (when non-blank), then attachments.
    pub fn human(id: String, input: &str, blocks: &[ContentBlock]) -> Self {
        let mut content = Vec::with_capacity(blocks.len() + 1);
        if !input.trim().is_empty() {
            content.push(ContentBlock::text(input));
        }
        content.extend(blocks.iter().cloned());
        Self::bare(MessageKind::Human, id, MessageContent::Blocks(content))
    }

    /// Failure result standing in for a tool call that never got answered.
    pub fn placeholder_tool_result(id_suffix: &str, call: &ToolCall) -> Self {
        let mut msg = Self::bare(
            MessageKind::Tool,
            format!("{}{}", DO_NOT_RENDER_ID_PREFIX, id_suffix),
            MessageContent::Text(PLACEHOLDER_TOOL_RESULT.to_string()),
        );
        msg.tool_call_id = Some(call.id.clone().unwrap_or_default());
        msg.name = Some(call.name.clone());
        msg.status = Some("error".to_string());
        msg
    }

    /// Plain text of the message; non-text blocks are skipped.
    pub fn text(&self) -> String {
        match &self.content {
            MessageContent::Text(t) => t.clone(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(ContentBlock::as_text)
                .collect::<Vec<_>>()
                .join(""),
        }
    }

    /// Synthesized bookkeeping messages are never rendered.
    pub fn is_hidden(&self) -> bool {
        self.id
            .as_deref()
            .is_some_and(|id| id.starts_with(DO_NOT_RENDER_ID_PREFIX))
    }
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunInput {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<JsonMap>,
}

/// Body of `POST /threads/{id}/runs/stream`.  `input: null` together with a
/// checkpoint re-runs the graph from that point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRequest {
    pub assistant_id: String,
    pub input: Option<RunInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<Checkpoint>,
    pub stream_mode: Vec<String>,
    pub stream_subgraphs: bool,
    pub stream_resumable: bool,
}

impl RunRequest {
    pub fn new(assistant_id: &str, input: Option<RunInput>) -> Self {
        Self {
            assistant_id: assistant_id.to_string(),
            input,
            checkpoint: None,
            stream_mode: STREAM_MODES.iter().map(|s| s.to_string()).collect(),
            stream_subgraphs: true,
            stream_resumable: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn thread_search_uses_assistant_id_for_uuids() {
        let req = ThreadSearchRequest::for_assistant("11111111-1111-1111-1111-111111111111");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "metadata": {"assistant_id": "11111111-1111-1111-1111-111111111111"},
                "limit": 100
            })
        );
    }

    #[test]
    fn thread_search_uses_graph_id_for_names() {
        let req = ThreadSearchRequest::for_assistant("agent");
        assert_eq!(req.metadata.get("graph_id"), Some(&json!("agent")));
        assert!(req.metadata.get("assistant_id").is_none());
    }

    #[test]
    fn graph_search_is_bounded_and_sorted() {
        let req = AssistantSearchRequest::by_graph("agent-42");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "graph_id": "agent-42",
                "limit": 1,
                "sort_by": "assistant_id",
                "sort_order": "asc"
            })
        );
        let listing = serde_json::to_value(AssistantSearchRequest::listing()).unwrap();
        assert_eq!(listing["limit"], json!(50));
        assert_eq!(listing["select"], json!(["assistant_id", "graph_id", "name"]));
    }

    #[test]
    fn projected_assistant_parses() {
        let a: Assistant = serde_json::from_value(json!({
            "assistant_id": "11111111-1111-1111-1111-111111111111",
            "graph_id": "agent",
            "name": null,
            "config": null
        }))
        .unwrap();
        assert_eq!(a.label(), "agent");
        assert!(a.config.configurable.is_empty());
    }

    #[test]
    fn full_assistant_parses_timestamps_and_config() {
        let a: Assistant = serde_json::from_value(json!({
            "assistant_id": "a1",
            "graph_id": "agent",
            "name": "Planner",
            "config": {"configurable": {"model": "gpt"}, "tags": ["x"]},
            "metadata": {"created_by": "system"},
            "created_at": "2025-01-02T03:04:05.123456+00:00",
            "updated_at": "2025-01-02T03:04:05+00:00",
            "version": 3
        }))
        .unwrap();
        assert_eq!(a.label(), "Planner");
        assert_eq!(a.config.configurable.get("model"), Some(&json!("gpt")));
        assert_eq!(a.config.extra.get("tags"), Some(&json!(["x"])));
        assert!(a.created_at.is_some());
        assert_eq!(a.version, Some(3));
    }

    #[test]
    fn schema_defaults_are_collected() {
        let schemas = AssistantSchemas {
            config_schema: Some(json!({
                "type": "object",
                "properties": {
                    "model": {"type": "string", "default": "small"},
                    "temperature": {"type": "number", "default": 0.2},
                    "prompt": {"type": "string"}
                }
            })),
            ..Default::default()
        };
        let defaults = schemas.config_defaults();
        assert_eq!(defaults.len(), 2);
        assert_eq!(defaults.get("model"), Some(&json!("small")));
    }

    #[test]
    fn server_messages_keep_unknown_fields() {
        let raw = json!({
            "id": "m1",
            "type": "ai",
            "content": [
                {"type": "text", "text": "Hello "},
                {"type": "tool_use", "id": "t", "input": {}},
                {"type": "text", "text": "there"}
            ],
            "tool_calls": [{"id": "call-1", "name": "search", "args": {"q": "x"}, "type": "tool_call"}],
            "response_metadata": {"model": "m"}
        });
        let msg: ChatMessage = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(msg.kind, MessageKind::Ai);
        assert_eq!(msg.text(), "Hello there");
        assert_eq!(msg.tool_calls[0].id.as_deref(), Some("call-1"));
        assert_eq!(serde_json::to_value(&msg).unwrap(), raw);
    }

    #[test]
    fn unknown_message_kinds_do_not_break_state() {
        let values: ThreadValues = serde_json::from_value(json!({
            "messages": [
                {"type": "remove", "id": "x", "content": null},
                {"type": "human", "content": "hi"}
            ],
            "ui": null
        }))
        .unwrap();
        assert_eq!(values.messages[0].kind, MessageKind::Unknown);
        assert_eq!(values.messages[1].text(), "hi");
    }

    #[test]
    fn human_message_puts_text_before_attachments() {
        let pdf = ContentBlock::Known(KnownBlock::File(MediaBlock {
            source_type: "base64".into(),
            mime_type: "application/pdf".into(),
            data: "AAA".into(),
            metadata: JsonMap::new(),
        }));
        let msg = ChatMessage::human("id-1".into(), "read this", &[pdf]);
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["type"], json!("human"));
        assert_eq!(v["content"][0], json!({"type": "text", "text": "read this"}));
        assert_eq!(v["content"][1]["type"], json!("file"));

        let blank = ChatMessage::human("id-2".into(), "   ", &[]);
        assert_eq!(blank.content, MessageContent::Blocks(vec![]));
    }

    #[test]
    fn run_request_sends_null_input_for_regenerate() {
        let mut req = RunRequest::new("a1", None);
        req.checkpoint = Some(Checkpoint {
            checkpoint_id: Some("cp-1".into()),
            ..Default::default()
        });
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["input"], Value::Null);
        assert_eq!(v["stream_mode"], json!(["values", "custom"]));
        assert_eq!(v["checkpoint"], json!({"checkpoint_ns": "", "checkpoint_id": "cp-1"}));
    }

    #[test]
    fn thread_title_prefers_metadata() {
        let t: Thread = serde_json::from_value(json!({
            "thread_id": "t1",
            "metadata": {"title": "Trip to Rome"},
            "values": {"messages": [{"type": "human", "content": "plan a trip"}]}
        }))
        .unwrap();
        assert_eq!(t.title(), Some("Trip to Rome"));
        assert_eq!(t.first_human_text().as_deref(), Some("plan a trip"));
    }
}
