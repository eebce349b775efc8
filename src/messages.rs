// src/messages.rs
//
// Every input to the app is a `Message`; every side effect the reducers ask
// for is a `Command`.  Results of side effects come back as new messages.
//
use crate::error::ClientResult;
use crate::models::{
    Assistant, AssistantSchemas, AssistantUpdateRequest, Checkpoint, ContentBlock, JsonMap, RunRequest,
    Thread, ThreadSearchRequest, ThreadState,
};
use crate::navigation::NavigationState;
use crate::network::{ApiConfig, EnvDefaults, StreamEvent};
use crate::settings::{ChatConfig, UserSettings, UserSettingsPatch};
use crate::toast::Toast;

/// Everything read from the page and the build at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bootstrap {
    pub navigation: NavigationState,
    pub origin: Option<String>,
    pub env: EnvDefaults,
    pub stored_api_key: Option<String>,
    pub stored_settings: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Init(Box<Bootstrap>),

    // Connection
    SetApiUrl(String),
    /// Assistant selector; `"none"` clears the explicit choice.
    SetAssistantId(String),
    SetApiKey(Option<String>),
    /// Setup form: all three connection parameters at once.
    SetConnection {
        api_url: String,
        assistant_id: String,
        api_key: Option<String>,
    },
    ConnectionProbed {
        api_url: String,
        result: ClientResult<()>,
    },

    // Assistant registry
    AssistantFetched {
        seq: u64,
        result: ClientResult<Assistant>,
    },
    AssistantSearched {
        seq: u64,
        result: ClientResult<Vec<Assistant>>,
    },
    AssistantSchemasLoaded {
        seq: u64,
        result: ClientResult<AssistantSchemas>,
    },
    UpdateAssistantConfig(JsonMap),
    AssistantConfigUpdated {
        assistant_id: String,
        result: ClientResult<Assistant>,
    },
    /// Resolve the configured assistant again and reload its config and
    /// schemas.
    RefreshAssistantConfig,
    RefreshAssistants,
    AssistantsListed {
        seq: u64,
        result: ClientResult<Vec<Assistant>>,
    },

    // Thread registry
    RefreshThreads,
    ThreadsLoaded {
        seq: u64,
        result: ClientResult<Vec<Thread>>,
    },
    SelectThread(Option<String>),
    DeleteThread(String),
    ThreadDeleted {
        thread_id: String,
        result: ClientResult<()>,
    },
    DeleteThreads(Vec<String>),
    ThreadsDeleted {
        thread_ids: Vec<String>,
        result: ClientResult<()>,
    },
    RenameThread {
        thread_id: String,
        title: String,
    },
    ThreadRenamed {
        thread_id: String,
        result: ClientResult<Thread>,
    },

    // Composer
    SetInput(String),
    SetContentBlocks(Vec<ContentBlock>),
    AddContentBlock(ContentBlock),
    RemoveContentBlock(usize),
    SetArtifactContext(JsonMap),

    // Streaming session
    Submit,
    /// Re-run from a checkpoint; `None` uses the parent of the latest one.
    Regenerate(Option<Checkpoint>),
    StopStream,
    ThreadStateLoaded {
        generation: u64,
        result: ClientResult<ThreadState>,
    },
    /// The server created a thread for the running submit.
    ThreadIdAssigned {
        generation: u64,
        thread_id: String,
    },
    StreamEvent {
        run: u64,
        event: StreamEvent,
    },
    StreamFinished {
        run: u64,
        result: ClientResult<()>,
    },

    // View settings
    ChatConfigLoaded(Box<ChatConfig>),
    UpdateUserSettings(UserSettingsPatch),
    ResetUserSettings,
    SetChatHistoryOpen(bool),
    SetHideToolCalls(bool),
}

/// Side effects requested by the reducers.  Network commands carry the
/// `ApiConfig` in effect when they were issued.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Chain another message to be processed
    SendMessage(Message),
    Notify(Toast),

    ProbeConnection {
        config: ApiConfig,
    },
    GetAssistant {
        config: ApiConfig,
        seq: u64,
        assistant_id: String,
    },
    SearchAssistantsByGraph {
        config: ApiConfig,
        seq: u64,
        graph_id: String,
    },
    FetchAssistantSchemas {
        config: ApiConfig,
        seq: u64,
        assistant_id: String,
    },
    UpdateAssistantConfig {
        config: ApiConfig,
        assistant_id: String,
        request: AssistantUpdateRequest,
    },
    ListAssistants {
        config: ApiConfig,
        seq: u64,
    },

    SearchThreads {
        config: ApiConfig,
        seq: u64,
        request: ThreadSearchRequest,
    },
    DeleteThread {
        config: ApiConfig,
        thread_id: String,
    },
    DeleteThreads {
        config: ApiConfig,
        thread_ids: Vec<String>,
    },
    UpdateThreadTitle {
        config: ApiConfig,
        thread_id: String,
        title: String,
    },
    /// Re-list threads after a delay.
    ScheduleThreadRefresh {
        delay_ms: u32,
    },

    LoadThreadState {
        config: ApiConfig,
        generation: u64,
        thread_id: String,
    },
    /// Stream a run; creates the thread first when `thread_id` is `None`.
    StartRun {
        config: ApiConfig,
        generation: u64,
        run: u64,
        thread_id: Option<String>,
        request: RunRequest,
    },
    AbortStream,

    PersistApiKey(Option<String>),
    PersistUserSettings(UserSettings),
    ApplyTheme(UserSettings),
    SyncLocation(NavigationState),
    LoadChatConfig,
}
