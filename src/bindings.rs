//! Host-page API.
//!
//! Every user operation is exported as a plain function that dispatches a
//! `Message`.  The page registers a callback with [`subscribe`] and
//! re-renders from the `ViewSnapshot` it receives after each dispatch.

use crate::messages::Message;
use crate::models::{Checkpoint, ContentBlock, JsonMap};
use crate::settings::UserSettingsPatch;
use crate::state::{dispatch_global_message, APP_STATE};
use crate::view::ViewSnapshot;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

thread_local! {
    static SUBSCRIBERS: RefCell<Vec<js_sys::Function>> = RefCell::new(Vec::new());
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(JsValue::from)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    // Plain objects rather than ES `Map`s for JSON maps.
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

fn current_snapshot() -> Result<JsValue, JsValue> {
    let snapshot = APP_STATE.with(|state| ViewSnapshot::from_state(&state.borrow()));
    to_js(&snapshot)
}

/// Push the current snapshot to every subscriber.
pub fn notify_subscribers() {
    let subscribers = SUBSCRIBERS.with(|s| s.borrow().clone());
    if subscribers.is_empty() {
        return;
    }
    let snapshot = match current_snapshot() {
        Ok(s) => s,
        Err(e) => {
            crate::error_log!("Failed to serialize view snapshot: {:?}", e);
            return;
        }
    };
    for callback in subscribers {
        if let Err(e) = callback.call1(&JsValue::NULL, &snapshot) {
            crate::error_log!("View subscriber threw: {:?}", e);
        }
    }
}

/// Register a render callback.  It is invoked once right away.
#[wasm_bindgen]
pub fn subscribe(callback: js_sys::Function) -> Result<(), JsValue> {
    let snapshot = current_snapshot()?;
    callback.call1(&JsValue::NULL, &snapshot)?;
    SUBSCRIBERS.with(|s| s.borrow_mut().push(callback));
    Ok(())
}

#[wasm_bindgen]
pub fn snapshot() -> Result<JsValue, JsValue> {
    current_snapshot()
}

// ---------------- Connection ----------------

#[wasm_bindgen(js_name = setApiUrl)]
pub fn set_api_url(url: String) {
    dispatch_global_message(Message::SetApiUrl(url));
}

#[wasm_bindgen(js_name = setAssistantId)]
pub fn set_assistant_id(assistant_id: String) {
    dispatch_global_message(Message::SetAssistantId(assistant_id));
}

#[wasm_bindgen(js_name = setApiKey)]
pub fn set_api_key(api_key: Option<String>) {
    dispatch_global_message(Message::SetApiKey(api_key));
}

#[wasm_bindgen(js_name = setConnection)]
pub fn set_connection(api_url: String, assistant_id: String, api_key: Option<String>) {
    dispatch_global_message(Message::SetConnection {
        api_url,
        assistant_id,
        api_key,
    });
}

// ---------------- Assistants ----------------

/// Reload the resolved assistant's config and schemas from the server.
#[wasm_bindgen(js_name = refreshAssistantConfig)]
pub fn refresh_assistant_config() {
    dispatch_global_message(Message::RefreshAssistantConfig);
}

#[wasm_bindgen(js_name = refreshAssistants)]
pub fn refresh_assistants() {
    dispatch_global_message(Message::RefreshAssistants);
}

/// Save a new `configurable` object for the resolved assistant.
#[wasm_bindgen(js_name = updateAssistantConfig)]
pub fn update_assistant_config(configurable: JsValue) -> Result<(), JsValue> {
    let configurable: JsonMap = from_js(configurable)?;
    dispatch_global_message(Message::UpdateAssistantConfig(configurable));
    Ok(())
}

// ---------------- Threads ----------------

#[wasm_bindgen(js_name = refreshThreads)]
pub fn refresh_threads() {
    dispatch_global_message(Message::RefreshThreads);
}

/// `None` starts a new conversation.
#[wasm_bindgen(js_name = selectThread)]
pub fn select_thread(thread_id: Option<String>) {
    dispatch_global_message(Message::SelectThread(thread_id));
}

#[wasm_bindgen(js_name = deleteThread)]
pub fn delete_thread(thread_id: String) {
    dispatch_global_message(Message::DeleteThread(thread_id));
}

#[wasm_bindgen(js_name = deleteThreads)]
pub fn delete_threads(thread_ids: JsValue) -> Result<(), JsValue> {
    let thread_ids: Vec<String> = from_js(thread_ids)?;
    dispatch_global_message(Message::DeleteThreads(thread_ids));
    Ok(())
}

#[wasm_bindgen(js_name = renameThread)]
pub fn rename_thread(thread_id: String, title: String) {
    dispatch_global_message(Message::RenameThread { thread_id, title });
}

// ---------------- Composer ----------------

#[wasm_bindgen(js_name = setInput)]
pub fn set_input(text: String) {
    dispatch_global_message(Message::SetInput(text));
}

#[wasm_bindgen(js_name = setContentBlocks)]
pub fn set_content_blocks(blocks: JsValue) -> Result<(), JsValue> {
    let blocks: Vec<ContentBlock> = from_js(blocks)?;
    dispatch_global_message(Message::SetContentBlocks(blocks));
    Ok(())
}

#[wasm_bindgen(js_name = addContentBlock)]
pub fn add_content_block(block: JsValue) -> Result<(), JsValue> {
    let block: ContentBlock = from_js(block)?;
    dispatch_global_message(Message::AddContentBlock(block));
    Ok(())
}

#[wasm_bindgen(js_name = removeContentBlock)]
pub fn remove_content_block(index: usize) {
    dispatch_global_message(Message::RemoveContentBlock(index));
}

#[wasm_bindgen(js_name = setArtifactContext)]
pub fn set_artifact_context(context: JsValue) -> Result<(), JsValue> {
    let context: JsonMap = if context.is_null() || context.is_undefined() {
        JsonMap::new()
    } else {
        from_js(context)?
    };
    dispatch_global_message(Message::SetArtifactContext(context));
    Ok(())
}

// ---------------- Runs ----------------

#[wasm_bindgen]
pub fn submit() {
    dispatch_global_message(Message::Submit);
}

/// Re-run from `checkpoint`, or from the parent of the latest checkpoint
/// when none is given.
#[wasm_bindgen]
pub fn regenerate(checkpoint: JsValue) -> Result<(), JsValue> {
    let checkpoint: Option<Checkpoint> = if checkpoint.is_null() || checkpoint.is_undefined() {
        None
    } else {
        Some(from_js(checkpoint)?)
    };
    dispatch_global_message(Message::Regenerate(checkpoint));
    Ok(())
}

#[wasm_bindgen]
pub fn stop() {
    dispatch_global_message(Message::StopStream);
}

// ---------------- View settings ----------------

#[wasm_bindgen(js_name = updateUserSettings)]
pub fn update_user_settings(patch: JsValue) -> Result<(), JsValue> {
    let patch: UserSettingsPatch = from_js(patch)?;
    dispatch_global_message(Message::UpdateUserSettings(patch));
    Ok(())
}

#[wasm_bindgen(js_name = resetUserSettings)]
pub fn reset_user_settings() {
    dispatch_global_message(Message::ResetUserSettings);
}

#[wasm_bindgen(js_name = setChatHistoryOpen)]
pub fn set_chat_history_open(open: bool) {
    dispatch_global_message(Message::SetChatHistoryOpen(open));
}

#[wasm_bindgen(js_name = setHideToolCalls)]
pub fn set_hide_tool_calls(hide: bool) {
    dispatch_global_message(Message::SetHideToolCalls(hide));
}
