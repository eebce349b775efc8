use crate::error::ClientError;
use crate::messages::{Command, Message};
use crate::models::{AssistantSearchRequest, RunRequest, ThreadCreateRequest, ThreadUpdateRequest};
use crate::network::api_client::{delete_all, ApiClient};
use crate::network::ApiConfig;
use crate::state::dispatch_global_message;
use crate::debug_log;
use std::cell::RefCell;
use web_sys::AbortController;

thread_local! {
    /// Controller of the run currently streaming, if any.
    static ACTIVE_STREAM: RefCell<Option<AbortController>> = RefCell::new(None);
}

pub fn execute(cmd: Command) {
    match cmd {
        Command::SendMessage(msg) => dispatch_global_message(msg),
        Command::Notify(toast) => crate::toast::show(&toast),

        Command::ProbeConnection { config } => {
            let client = ApiClient::new(config);
            wasm_bindgen_futures::spawn_local(async move {
                let result = client.info().await.map(|_| ());
                dispatch_global_message(Message::ConnectionProbed {
                    api_url: client.config().base_url().to_string(),
                    result,
                });
            });
        }

        // ---------------- Assistants ----------------
        Command::GetAssistant {
            config,
            seq,
            assistant_id,
        } => {
            let client = ApiClient::new(config);
            wasm_bindgen_futures::spawn_local(async move {
                let result = client.assistants_get(&assistant_id).await;
                dispatch_global_message(Message::AssistantFetched { seq, result });
            });
        }
        Command::SearchAssistantsByGraph { config, seq, graph_id } => {
            let client = ApiClient::new(config);
            wasm_bindgen_futures::spawn_local(async move {
                let result = client
                    .assistants_search(&AssistantSearchRequest::by_graph(&graph_id))
                    .await;
                dispatch_global_message(Message::AssistantSearched { seq, result });
            });
        }
        Command::FetchAssistantSchemas {
            config,
            seq,
            assistant_id,
        } => {
            let client = ApiClient::new(config);
            wasm_bindgen_futures::spawn_local(async move {
                let result = client.assistants_get_schemas(&assistant_id).await;
                dispatch_global_message(Message::AssistantSchemasLoaded { seq, result });
            });
        }
        Command::UpdateAssistantConfig {
            config,
            assistant_id,
            request,
        } => {
            let client = ApiClient::new(config);
            wasm_bindgen_futures::spawn_local(async move {
                let result = client.assistants_update(&assistant_id, &request).await;
                dispatch_global_message(Message::AssistantConfigUpdated { assistant_id, result });
            });
        }
        Command::ListAssistants { config, seq } => {
            let client = ApiClient::new(config);
            wasm_bindgen_futures::spawn_local(async move {
                let result = client.assistants_search(&AssistantSearchRequest::listing()).await;
                dispatch_global_message(Message::AssistantsListed { seq, result });
            });
        }

        // ---------------- Threads ----------------
        Command::SearchThreads { config, seq, request } => {
            let client = ApiClient::new(config);
            wasm_bindgen_futures::spawn_local(async move {
                let result = client.threads_search(&request).await;
                dispatch_global_message(Message::ThreadsLoaded { seq, result });
            });
        }
        Command::DeleteThread { config, thread_id } => {
            let client = ApiClient::new(config);
            wasm_bindgen_futures::spawn_local(async move {
                let result = client.threads_delete(&thread_id).await;
                dispatch_global_message(Message::ThreadDeleted { thread_id, result });
            });
        }
        Command::DeleteThreads { config, thread_ids } => {
            let client = ApiClient::new(config);
            wasm_bindgen_futures::spawn_local(async move {
                let result = delete_all(&thread_ids, |id| {
                    let client = client.clone();
                    async move { client.threads_delete(&id).await }
                })
                .await;
                dispatch_global_message(Message::ThreadsDeleted { thread_ids, result });
            });
        }
        Command::UpdateThreadTitle {
            config,
            thread_id,
            title,
        } => {
            let client = ApiClient::new(config);
            wasm_bindgen_futures::spawn_local(async move {
                let result = client
                    .threads_update(&thread_id, &ThreadUpdateRequest::title(&title))
                    .await;
                dispatch_global_message(Message::ThreadRenamed { thread_id, result });
            });
        }
        Command::ScheduleThreadRefresh { delay_ms } => {
            wasm_bindgen_futures::spawn_local(async move {
                gloo_timers::future::TimeoutFuture::new(delay_ms).await;
                dispatch_global_message(Message::RefreshThreads);
            });
        }

        // ---------------- Session ----------------
        Command::LoadThreadState {
            config,
            generation,
            thread_id,
        } => {
            let client = ApiClient::new(config);
            wasm_bindgen_futures::spawn_local(async move {
                let result = client.threads_get_state(&thread_id).await;
                dispatch_global_message(Message::ThreadStateLoaded { generation, result });
            });
        }
        Command::StartRun {
            config,
            generation,
            run,
            thread_id,
            request,
        } => start_run(config, generation, run, thread_id, request),
        Command::AbortStream => abort_active_stream(),

        // ---------------- Browser ----------------
        Command::PersistApiKey(key) => {
            if let Err(e) = crate::storage::save_api_key(key.as_deref()) {
                crate::warn_log!("Failed to persist API key: {}", e);
            }
        }
        Command::PersistUserSettings(settings) => {
            if let Err(e) = crate::storage::save_user_settings(&settings) {
                crate::warn_log!("Failed to persist user settings: {}", e);
            }
        }
        Command::ApplyTheme(settings) => crate::settings::apply_to_document(&settings),
        Command::SyncLocation(nav) => {
            if let Err(e) = crate::navigation::sync_location(&nav) {
                crate::warn_log!("Failed to update page URL: {:?}", e);
            }
        }
        Command::LoadChatConfig => {
            wasm_bindgen_futures::spawn_local(async move {
                let config = crate::settings::load_chat_config().await;
                dispatch_global_message(Message::ChatConfigLoaded(Box::new(config)));
            });
        }
    }
}

fn abort_active_stream() {
    ACTIVE_STREAM.with(|slot| {
        if let Some(controller) = slot.borrow_mut().take() {
            debug_log!("Aborting active stream");
            controller.abort();
        }
    });
}

fn start_run(config: ApiConfig, generation: u64, run: u64, thread_id: Option<String>, request: RunRequest) {
    // One stream at a time.
    abort_active_stream();
    let controller = match AbortController::new() {
        Ok(c) => c,
        Err(e) => {
            dispatch_global_message(Message::StreamFinished {
                run,
                result: Err(ClientError::from(e)),
            });
            return;
        }
    };
    let signal = controller.signal();
    ACTIVE_STREAM.with(|slot| *slot.borrow_mut() = Some(controller));

    let client = ApiClient::new(config);
    wasm_bindgen_futures::spawn_local(async move {
        let thread_id = match thread_id {
            Some(id) => id,
            None => match client.threads_create(&ThreadCreateRequest::default()).await {
                Ok(thread) => {
                    dispatch_global_message(Message::ThreadIdAssigned {
                        generation,
                        thread_id: thread.thread_id.clone(),
                    });
                    thread.thread_id
                }
                Err(e) => {
                    dispatch_global_message(Message::StreamFinished { run, result: Err(e) });
                    return;
                }
            },
        };

        let result = client
            .stream_run(&thread_id, &request, &signal, |event| {
                dispatch_global_message(Message::StreamEvent { run, event });
            })
            .await;
        let result = match result {
            Err(_) if signal.aborted() => Err(ClientError::Aborted),
            other => other,
        };
        dispatch_global_message(Message::StreamFinished { run, result });
    });
}
