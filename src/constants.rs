// Registry limits - the remote service is never asked for more than this
pub const THREAD_SEARCH_LIMIT: u32 = 100;
pub const ASSISTANT_LIST_LIMIT: u32 = 50;

// Delay before re-listing threads after the server assigns a new thread id.
// The listing endpoint is eventually consistent.
pub const THREAD_FETCH_DELAY_MS: u32 = 4000;

// Local storage keys
pub const STORAGE_KEY_API_KEY: &str = "lg:chat:apiKey";
pub const STORAGE_KEY_USER_SETTINGS: &str = "agent-chat-user-settings";

// Query-string keys (shareable session state)
pub const QUERY_API_URL: &str = "apiUrl";
pub const QUERY_ASSISTANT_ID: &str = "assistantId";
pub const QUERY_THREAD_ID: &str = "threadId";
pub const QUERY_CHAT_HISTORY_OPEN: &str = "chatHistoryOpen";
pub const QUERY_HIDE_TOOL_CALLS: &str = "hideToolCalls";

// Sentinel the assistant selector uses for "no assistant"
pub const ASSISTANT_NONE: &str = "none";

// Synthesized tool results carry this id prefix and are never rendered
pub const DO_NOT_RENDER_ID_PREFIX: &str = "do-not-render-";
pub const PLACEHOLDER_TOOL_RESULT: &str =
    "Tool call did not return a result before the next message was sent.";

// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-Api-Key";

// Streaming run defaults
pub const STREAM_MODES: [&str; 2] = ["values", "custom"];

// Thread list titles are cut to this many grapheme clusters
pub const THREAD_TITLE_MAX_GRAPHEMES: usize = 40;

// Toast durations
pub const TOAST_DEFAULT_MS: i32 = 4000;
pub const TOAST_CONNECTION_ERROR_MS: i32 = 10000;

// Static configuration files served next to the app
pub const CONFIG_FILES: [&str; 2] = ["/settings.yaml", "/chat-config.yaml"];
pub const CHAT_OPENERS_FILE: &str = "/chat-openers.yaml";

// Default values for the chat configuration - single source of truth
pub const DEFAULT_APP_NAME: &str = "Agent Chat";
pub const DEFAULT_LOGO_PATH: &str = "/logo.png";
pub const DEFAULT_LOGO_SIZE: u32 = 32;
pub const DEFAULT_DESCRIPTION: &str = "Start a conversation with your assistant";
pub const DEFAULT_FULL_DESCRIPTION_PATH: &str = "/full-description.md";
pub const DEFAULT_INPUT_PLACEHOLDER: &str = "Ask anything";
pub const DEFAULT_CHAT_OPENERS: [&str; 3] = [
    "What can you help me with?",
    "Summarize our last conversation",
    "Show me an example",
];
