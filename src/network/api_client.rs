use super::config::ApiConfig;
use super::sse::{SseDecoder, SseFrame, StreamEvent};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    Assistant, AssistantSchemas, AssistantSearchRequest, AssistantUpdateRequest, RunRequest, Thread,
    ThreadCreateRequest, ThreadSearchRequest, ThreadState, ThreadUpdateRequest,
};
use crate::constants::API_KEY_HEADER;
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

// REST + streaming client for one connection.  Cheap to clone; every
// executor takes its own copy.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    // ---------------- Connectivity ----------------

    /// Server info; used as a reachability probe.
    pub async fn info(&self) -> ClientResult<Value> {
        self.get_json(&encode_path(&["info"])).await
    }

    // ---------------- Threads ----------------

    pub async fn threads_search(&self, request: &ThreadSearchRequest) -> ClientResult<Vec<Thread>> {
        self.send_json("POST", &encode_path(&["threads", "search"]), request).await
    }

    pub async fn threads_create(&self, request: &ThreadCreateRequest) -> ClientResult<Thread> {
        self.send_json("POST", &encode_path(&["threads"]), request).await
    }

    pub async fn threads_get_state(&self, thread_id: &str) -> ClientResult<ThreadState> {
        self.get_json(&encode_path(&["threads", thread_id, "state"])).await
    }

    pub async fn threads_update(&self, thread_id: &str, request: &ThreadUpdateRequest) -> ClientResult<Thread> {
        self.send_json("PATCH", &encode_path(&["threads", thread_id]), request).await
    }

    pub async fn threads_delete(&self, thread_id: &str) -> ClientResult<()> {
        let _ = self.fetch_text("DELETE", &encode_path(&["threads", thread_id]), None).await?;
        Ok(())
    }

    // ---------------- Assistants ----------------

    pub async fn assistants_get(&self, assistant_id: &str) -> ClientResult<Assistant> {
        self.get_json(&encode_path(&["assistants", assistant_id])).await
    }

    pub async fn assistants_search(&self, request: &AssistantSearchRequest) -> ClientResult<Vec<Assistant>> {
        self.send_json("POST", &encode_path(&["assistants", "search"]), request).await
    }

    pub async fn assistants_get_schemas(&self, assistant_id: &str) -> ClientResult<AssistantSchemas> {
        self.get_json(&encode_path(&["assistants", assistant_id, "schemas"])).await
    }

    pub async fn assistants_update(
        &self,
        assistant_id: &str,
        request: &AssistantUpdateRequest,
    ) -> ClientResult<Assistant> {
        self.send_json("PATCH", &encode_path(&["assistants", assistant_id]), request).await
    }

    // ---------------- Runs ----------------

    /// Start a streaming run and feed every decoded event to `on_event`
    /// until the server ends the stream.  A server `error` event ends the
    /// run with [`ClientError::Rejected`]; firing `signal` ends it with
    /// [`ClientError::Aborted`].
    pub async fn stream_run(
        &self,
        thread_id: &str,
        request: &RunRequest,
        signal: &web_sys::AbortSignal,
        mut on_event: impl FnMut(StreamEvent),
    ) -> ClientResult<()> {
        let body = serde_json::to_string(request)?;
        let path = encode_path(&["threads", thread_id, "runs", "stream"]);
        let resp = self
            .send_request("POST", &path, Some(&body), Some(signal), "text/event-stream")
            .await?;

        let stream: JsValue = resp
            .body()
            .map(JsValue::from)
            .ok_or_else(|| ClientError::Decode("stream response has no body".into()))?;
        let reader = call_method(&stream, "getReader")?;

        match read_events(&reader, &mut on_event).await {
            Ok(true) => Ok(()),
            other => {
                // Stopped before the body was drained: unlock it and let the
                // browser close the connection.
                cancel_reader(&reader).await;
                other.map(|_| ())
            }
        }
    }

    // ---------------- Plumbing ----------------

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let text = self.fetch_text("GET", path, None).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(&self, method: &str, path: &str, body: &B) -> ClientResult<T> {
        let body = serde_json::to_string(body)?;
        let text = self.fetch_text(method, path, Some(&body)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Perform a request and return the body as text.  Non-2xx statuses
    /// become [`ClientError::Http`] carrying the response body.
    pub async fn fetch_text(&self, method: &str, path: &str, body: Option<&str>) -> ClientResult<String> {
        let resp = self.send_request(method, path, body, None, "application/json").await?;
        let text = JsFuture::from(resp.text()?).await?;
        Ok(text.as_string().unwrap_or_default())
    }

    async fn send_request(
        &self,
        method: &str,
        path: &str,
        body: Option<&str>,
        signal: Option<&web_sys::AbortSignal>,
        accept: &str,
    ) -> ClientResult<web_sys::Response> {
        use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

        if !self.config.is_configured() {
            return Err(ClientError::NotConfigured("API URL is not set".into()));
        }

        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);
        opts.set_signal(signal);

        let headers = Headers::new()?;
        headers.append("Accept", accept)?;
        if let Some(key) = self.config.api_key() {
            headers.append(API_KEY_HEADER, key)?;
        }
        if let Some(data) = body {
            opts.set_body(&JsValue::from_str(data));
            headers.append("Content-Type", "application/json")?;
        }
        opts.set_headers(&headers);

        let url = self.config.url(path);
        let request = Request::new_with_str_and_init(&url, &opts)?;
        let window = web_sys::window().ok_or_else(|| ClientError::Js("no global window".into()))?;
        let resp: Response = JsFuture::from(window.fetch_with_request(&request)).await?.dyn_into()?;

        if !resp.ok() {
            let status = resp.status();
            let body = match resp.text() {
                Ok(promise) => JsFuture::from(promise)
                    .await
                    .ok()
                    .and_then(|v| v.as_string())
                    .unwrap_or_default(),
                Err(_) => String::new(),
            };
            crate::warn_log!("{} {} failed: {}", method, url, status);
            return Err(ClientError::Http { status, body });
        }
        Ok(resp)
    }
}

/// Hand one frame to the caller.  `Ok(true)` once the server ended the run.
/// Pump the body reader through the SSE decoder.  `Ok(true)` means the
/// body was read to the end; `Ok(false)` means an `end` event came first.
async fn read_events(reader: &JsValue, on_event: &mut impl FnMut(StreamEvent)) -> ClientResult<bool> {
    let mut decoder = SseDecoder::new();
    loop {
        let chunk = JsFuture::from(call_method(reader, "read")?.dyn_into::<js_sys::Promise>()?).await?;
        let done = js_sys::Reflect::get(&chunk, &JsValue::from_str("done"))?
            .as_bool()
            .unwrap_or(true);
        if done {
            break;
        }
        let value = js_sys::Reflect::get(&chunk, &JsValue::from_str("value"))?;
        let bytes = js_sys::Uint8Array::new(&value).to_vec();

        for frame in decoder.push(&bytes) {
            if route_frame(&frame, on_event)? {
                return Ok(false);
            }
        }
    }

    if let Some(frame) = decoder.finish() {
        route_frame(&frame, on_event)?;
    }
    Ok(true)
}

async fn cancel_reader(reader: &JsValue) {
    let released: ClientResult<()> = async {
        let promise: js_sys::Promise = call_method(reader, "cancel")?.dyn_into()?;
        JsFuture::from(promise).await?;
        Ok(())
    }
    .await;
    if let Err(e) = released {
        crate::debug_log!("Stream reader cancel failed: {}", e);
    }
}

fn route_frame(frame: &SseFrame, on_event: &mut impl FnMut(StreamEvent)) -> ClientResult<bool> {
    match StreamEvent::from_frame(frame)? {
        StreamEvent::End => Ok(true),
        StreamEvent::Error { message } => Err(ClientError::Rejected(message)),
        event => {
            on_event(event);
            Ok(false)
        }
    }
}

/// Invoke a zero-argument method by name.  The typed `ReadableStream`
/// reader bindings differ between web-sys releases, so the stream reader is
/// driven dynamically.
fn call_method(target: &JsValue, name: &str) -> ClientResult<JsValue> {
    let method: js_sys::Function = js_sys::Reflect::get(target, &JsValue::from_str(name))?.dyn_into()?;
    Ok(method.call0(target)?)
}

/// `/seg/seg/...` with every segment percent-encoded.
pub fn encode_path(segments: &[&str]) -> String {
    match Url::parse("http://localhost/") {
        Ok(mut scratch) => {
            if let Ok(mut path) = scratch.path_segments_mut() {
                path.clear().extend(segments);
            }
            scratch.path().to_string()
        }
        Err(_) => format!("/{}", segments.join("/")),
    }
}

/// Run every deletion concurrently.  All of them are awaited even when one
/// fails; the first failure (in input order) is returned.
pub async fn delete_all<F, Fut>(ids: &[String], delete: F) -> ClientResult<()>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = ClientResult<()>>,
{
    let results = join_all(ids.iter().cloned().map(delete)).await;
    match results.into_iter().find_map(Result::err) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
