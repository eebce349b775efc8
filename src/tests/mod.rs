//! Scenario tests driving `update` end to end with plain messages.
//!
//! Reducers never touch the browser, so these run natively.

mod session_flow;

use crate::messages::{Bootstrap, Command, Message};
use crate::models::{Assistant, ChatMessage};
use crate::navigation::NavigationState;
use crate::state::AppState;
use serde_json::{json, Value};

pub(crate) const API_URL: &str = "http://localhost:2024";
pub(crate) const UUID_1: &str = "11111111-1111-1111-1111-111111111111";

/// Fresh state after `Init` with the given query parameters.
pub(crate) fn boot(assistant_id: Option<&str>, thread_id: Option<&str>) -> (AppState, Vec<Command>) {
    let mut state = AppState::new();
    let cmds = state.dispatch(Message::Init(Box::new(Bootstrap {
        navigation: NavigationState {
            api_url: Some(API_URL.to_string()),
            assistant_id: assistant_id.map(str::to_string),
            thread_id: thread_id.map(str::to_string),
            ..Default::default()
        },
        ..Default::default()
    })));
    (state, cmds)
}

pub(crate) fn assistant(id: &str, graph_id: &str) -> Assistant {
    serde_json::from_value(json!({
        "assistant_id": id,
        "graph_id": graph_id,
        "config": {"configurable": {}},
        "metadata": {}
    }))
    .unwrap()
}

pub(crate) fn messages(v: Value) -> Vec<ChatMessage> {
    serde_json::from_value(v).unwrap()
}

pub(crate) fn notifications(cmds: &[Command]) -> Vec<&crate::toast::Toast> {
    cmds.iter()
        .filter_map(|c| match c {
            Command::Notify(t) => Some(t),
            _ => None,
        })
        .collect()
}
