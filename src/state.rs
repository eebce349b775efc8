// src/state.rs
//
// Application state and the global dispatch loop.
//
use crate::messages::{Command, Message};
use crate::models::{
    Assistant, AssistantConfig, AssistantSchemas, Checkpoint, ContentBlock, JsonMap, Thread, ThreadValues,
};
use crate::navigation::NavigationState;
use crate::network::config::{first_non_blank, normalize_api_url};
use crate::network::{ApiConfig, EnvDefaults};
use crate::settings::{ChatConfig, UserSettings};
use crate::update::update;
use std::cell::RefCell;

/// Resolved connection parameters.  Query values win over build defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub api_url: String,
    pub assistant_id: String,
    pub api_key: Option<String>,
}

impl ConnectionState {
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(&self.api_url, self.api_key.as_deref())
    }

    pub fn is_configured(&self) -> bool {
        !self.api_url.is_empty() && !self.assistant_id.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThreadRegistry {
    pub threads: Vec<Thread>,
    pub loading: bool,
    pub request_seq: u64,
}

#[derive(Debug, Clone, Default)]
pub struct AssistantRegistry {
    /// Instance id the configured identifier resolved to
    pub resolved_id: Option<String>,
    pub config: Option<AssistantConfig>,
    pub schemas: Option<AssistantSchemas>,
    pub loading: bool,
    pub error: Option<String>,
    pub resolve_seq: u64,

    /// Selector listing
    pub assistants: Vec<Assistant>,
    pub assistants_loading: bool,
    pub list_seq: u64,
}

impl AssistantRegistry {
    /// Stored `configurable`, or the schema defaults when it is empty.
    pub fn effective_configurable(&self) -> JsonMap {
        match &self.config {
            Some(config) if !config.configurable.is_empty() => config.configurable.clone(),
            _ => self
                .schemas
                .as_ref()
                .map(AssistantSchemas::config_defaults)
                .unwrap_or_default(),
        }
    }

    pub(crate) fn clear_resolution(&mut self) {
        self.resolved_id = None;
        self.config = None;
        self.schemas = None;
    }
}

#[derive(Debug, Clone, Default)]
pub struct StreamSession {
    /// Bumped whenever the (url, assistant, key, thread) session is rebuilt
    pub generation: u64,
    /// Bumped for every run and on every rebuild
    pub run: u64,
    /// Thread this session was built for, or adopted from the server
    pub thread_id: Option<String>,
    pub values: ThreadValues,
    /// Pre-submit values, restored when a run fails before any `values`
    pub snapshot: Option<ThreadValues>,
    pub received_values: bool,
    pub is_loading: bool,
    pub state_loading: bool,
    pub error: Option<String>,
    pub last_toasted_error: Option<String>,
    pub first_token_received: bool,
    pub prev_message_len: usize,
    pub checkpoint: Option<Checkpoint>,
    pub parent_checkpoint: Option<Checkpoint>,
    pub run_id: Option<String>,
}

impl StreamSession {
    /// Set the first-token flag when the message count moved and the newest
    /// message comes from the model.
    pub fn track_first_token(&mut self) {
        let messages = &self.values.messages;
        if messages.is_empty() {
            self.prev_message_len = 0;
            return;
        }
        if messages.len() != self.prev_message_len
            && messages.last().is_some_and(|m| m.kind == crate::models::MessageKind::Ai)
        {
            self.first_token_received = true;
        }
        self.prev_message_len = messages.len();
    }
}

#[derive(Debug, Clone, Default)]
pub struct Composer {
    pub input: String,
    pub content_blocks: Vec<ContentBlock>,
    /// Artifact context sent along with the next submit
    pub context: JsonMap,
}

#[derive(Debug, Clone, Default)]
pub struct SettingsState {
    pub config: ChatConfig,
    pub user: UserSettings,
    /// Last persisted blob; re-read against new config defaults
    pub stored_raw: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub origin: Option<String>,
    pub env: EnvDefaults,
    pub navigation: NavigationState,
    pub api_key: Option<String>,
    pub connection: ConnectionState,
    pub threads: ThreadRegistry,
    pub assistant: AssistantRegistry,
    pub session: StreamSession,
    pub composer: Composer,
    pub settings: SettingsState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connection parameters implied by navigation, build defaults and the
    /// API key.
    pub fn derive_connection(&self) -> ConnectionState {
        let raw_url = first_non_blank([self.navigation.api_url.as_deref(), self.env.api_url.as_deref()]);
        ConnectionState {
            api_url: normalize_api_url(raw_url.as_deref(), self.origin.as_deref()),
            assistant_id: first_non_blank([
                self.navigation.assistant_id.as_deref(),
                self.env.assistant_id.as_deref(),
            ])
            .unwrap_or_default(),
            api_key: self.api_key.clone().filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.navigation.thread_id.as_deref()
    }

    pub fn api_config(&self) -> ApiConfig {
        self.connection.api_config()
    }

    pub fn dispatch(&mut self, msg: Message) -> Vec<Command> {
        update(self, msg)
    }
}

// We use thread_local to store our app state
thread_local! {
    pub static APP_STATE: RefCell<AppState> = RefCell::new(AppState::new());
}

/// Run a message through the reducers, notify subscribers, then execute the
/// resulting commands once the state borrow is released.
pub fn dispatch_global_message(msg: Message) {
    let commands = APP_STATE.with(|state| {
        let mut state = crate::mut_borrow!(state);
        state.dispatch(msg)
    });

    crate::bindings::notify_subscribers();

    for cmd in commands {
        crate::command_executors::execute(cmd);
    }
}
