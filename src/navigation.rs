//! Shareable session state kept in the page's query string.
//!
//! Only the keys below are owned here; any other parameters on the page URL
//! are preserved when the query is rewritten.

use crate::constants::{
    QUERY_API_URL, QUERY_ASSISTANT_ID, QUERY_CHAT_HISTORY_OPEN, QUERY_HIDE_TOOL_CALLS,
    QUERY_THREAD_ID,
};
use serde::Serialize;
use url::form_urlencoded;
use wasm_bindgen::JsValue;

const OWNED_KEYS: [&str; 5] = [
    QUERY_API_URL,
    QUERY_ASSISTANT_ID,
    QUERY_THREAD_ID,
    QUERY_CHAT_HISTORY_OPEN,
    QUERY_HIDE_TOOL_CALLS,
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub api_url: Option<String>,
    pub assistant_id: Option<String>,
    pub thread_id: Option<String>,
    pub chat_history_open: bool,
    pub hide_tool_calls: bool,
}

impl NavigationState {
    /// Parse a `location.search` string (leading `?` optional).  Blank
    /// values count as absent; booleans are `true` only for `"true"`.
    pub fn from_query(query: &str) -> Self {
        let mut nav = Self::default();
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            let text = value.trim();
            let non_blank = (!text.is_empty()).then(|| text.to_string());
            match &*key {
                QUERY_API_URL => nav.api_url = non_blank,
                QUERY_ASSISTANT_ID => nav.assistant_id = non_blank,
                QUERY_THREAD_ID => nav.thread_id = non_blank,
                QUERY_CHAT_HISTORY_OPEN => nav.chat_history_open = text == "true",
                QUERY_HIDE_TOOL_CALLS => nav.hide_tool_calls = text == "true",
                _ => {}
            }
        }
        nav
    }

    /// Rewrite `existing` with this state.  Foreign keys keep their order;
    /// absent values and `false` flags are dropped from the URL.
    pub fn to_query(&self, existing: &str) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        for (key, value) in form_urlencoded::parse(existing.trim_start_matches('?').as_bytes()) {
            if !OWNED_KEYS.contains(&&*key) {
                out.append_pair(&key, &value);
            }
        }

        let flag = |on: bool| on.then_some("true");
        let owned = [
            (QUERY_API_URL, self.api_url.as_deref()),
            (QUERY_ASSISTANT_ID, self.assistant_id.as_deref()),
            (QUERY_THREAD_ID, self.thread_id.as_deref()),
            (QUERY_CHAT_HISTORY_OPEN, flag(self.chat_history_open)),
            (QUERY_HIDE_TOOL_CALLS, flag(self.hide_tool_calls)),
        ];
        for (key, value) in owned {
            if let Some(value) = value {
                out.append_pair(key, value);
            }
        }
        out.finish()
    }
}

/// Read the navigation state from the current page URL.
pub fn read_location() -> NavigationState {
    let search = web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default();
    NavigationState::from_query(&search)
}

/// Write the navigation state back with `history.replaceState`, so the
/// back button is not flooded with intermediate states.
pub fn sync_location(nav: &NavigationState) -> Result<(), JsValue> {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return Ok(()),
    };
    let location = window.location();
    let current = location.search()?;
    let query = nav.to_query(&current);
    if query == current.trim_start_matches('?') {
        return Ok(());
    }

    let mut target = location.pathname()?;
    if !query.is_empty() {
        target.push('?');
        target.push_str(&query);
    }
    target.push_str(&location.hash()?);
    window
        .history()?
        .replace_state_with_url(&JsValue::NULL, "", Some(&target))
}
