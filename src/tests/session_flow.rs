use super::{boot, messages, notifications};
use crate::constants::{DO_NOT_RENDER_ID_PREFIX, THREAD_FETCH_DELAY_MS};
use crate::error::ClientError;
use crate::messages::{Command, Message};
use crate::models::{ContentBlock, MessageKind, RunRequest, ThreadValues};
use crate::network::StreamEvent;
use serde_json::json;

fn started_run(cmds: &[Command]) -> (u64, Option<String>, RunRequest) {
    cmds.iter()
        .find_map(|c| match c {
            Command::StartRun {
                run,
                thread_id,
                request,
                ..
            } => Some((*run, thread_id.clone(), request.clone())),
            _ => None,
        })
        .expect("a run was started")
}

fn history_with_orphaned_call() -> Vec<crate::models::ChatMessage> {
    messages(json!([
        {"id": "m1", "type": "human", "content": "find flights"},
        {"id": "m2", "type": "ai", "content": "", "tool_calls": [{"id": "call-1", "name": "search", "args": {}}]}
    ]))
}

#[test]
fn submit_answers_orphaned_tool_calls_before_the_human_turn() {
    let (mut state, _) = boot(Some("agent"), Some("t1"));
    state.session.values.messages = history_with_orphaned_call();
    state.dispatch(Message::SetInput("try again".into()));

    let cmds = state.dispatch(Message::Submit);
    let (_, thread_id, request) = started_run(&cmds);
    assert_eq!(thread_id.as_deref(), Some("t1"));
    assert_eq!(request.assistant_id, "agent");
    assert_eq!(request.stream_mode, ["values", "custom"]);

    let sent = &request.input.expect("input").messages;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].kind, MessageKind::Tool);
    assert_eq!(sent[0].tool_call_id.as_deref(), Some("call-1"));
    assert!(sent[0].id.as_deref().unwrap_or_default().starts_with(DO_NOT_RENDER_ID_PREFIX));
    assert_eq!(sent[1].kind, MessageKind::Human);
    assert_eq!(sent[1].text(), "try again");

    // Optimistic append, composer cleared.
    let shown: Vec<_> = state.session.values.messages.iter().map(|m| m.kind).collect();
    assert_eq!(shown, [MessageKind::Human, MessageKind::Ai, MessageKind::Tool, MessageKind::Human]);
    assert!(state.composer.input.is_empty());
    assert!(state.session.is_loading);
}

#[test]
fn submit_requires_an_assistant_and_some_input() {
    let (mut state, _) = boot(None, None);
    state.dispatch(Message::SetInput("hello".into()));
    let cmds = state.dispatch(Message::Submit);
    assert!(!cmds.iter().any(|c| matches!(c, Command::StartRun { .. })));
    assert_eq!(notifications(&cmds)[0].title, "Please select an assistant first");

    let (mut state, _) = boot(Some("agent"), None);
    state.dispatch(Message::SetInput("   ".into()));
    assert!(state.dispatch(Message::Submit).is_empty());

    // Attachments alone are enough.
    state.dispatch(Message::AddContentBlock(ContentBlock::Other(json!({
        "type": "image", "source_type": "base64", "mime_type": "image/png", "data": "AAAA"
    }))));
    let cmds = state.dispatch(Message::Submit);
    started_run(&cmds);
    assert!(state.composer.content_blocks.is_empty());

    // Nothing new while a run is streaming.
    state.dispatch(Message::SetInput("again".into()));
    assert!(state.dispatch(Message::Submit).is_empty());
}

#[test]
fn failed_run_restores_the_previous_messages_and_toasts_once_per_run() {
    let (mut state, _) = boot(Some("agent"), Some("t1"));
    state.session.values.messages = messages(json!([{"id": "m1", "type": "human", "content": "hi"}]));

    state.dispatch(Message::SetInput("second".into()));
    let (run, _, _) = started_run(&state.dispatch(Message::Submit));
    assert_eq!(state.session.values.messages.len(), 2);

    let cmds = state.dispatch(Message::StreamFinished {
        run,
        result: Err(ClientError::Network("boom".into())),
    });
    assert_eq!(state.session.values.messages.len(), 1);
    assert!(!state.session.is_loading);
    assert_eq!(state.session.error.as_deref(), Some("Network error: boom"));
    assert_eq!(notifications(&cmds).len(), 1);

    // A repeated finish for the same run stays quiet.
    let cmds = state.dispatch(Message::StreamFinished {
        run,
        result: Err(ClientError::Network("boom".into())),
    });
    assert!(notifications(&cmds).is_empty());

    // A separate run that fails the same way is reported again.
    state.dispatch(Message::SetInput("third".into()));
    let (run, _, _) = started_run(&state.dispatch(Message::Submit));
    let cmds = state.dispatch(Message::StreamFinished {
        run,
        result: Err(ClientError::Network("boom".into())),
    });
    assert_eq!(notifications(&cmds).len(), 1);
    assert_eq!(state.session.values.messages.len(), 1);
}

#[test]
fn values_replace_state_and_custom_events_update_ui() {
    let (mut state, _) = boot(Some("agent"), Some("t1"));
    state.dispatch(Message::SetInput("hi".into()));
    let (run, _, _) = started_run(&state.dispatch(Message::Submit));

    let values: ThreadValues = serde_json::from_value(json!({
        "messages": [
            {"id": "m1", "type": "human", "content": "hi"},
            {"id": "m2", "type": "ai", "content": "hello"}
        ]
    }))
    .unwrap();
    state.dispatch(Message::StreamEvent {
        run,
        event: StreamEvent::Values(Box::new(values)),
    });
    assert!(state.session.first_token_received);
    assert_eq!(state.session.values.messages.len(), 2);

    for payload in [
        json!({"type": "ui", "id": "card", "name": "weather", "props": {"temp": 20}}),
        json!({"type": "ui", "id": "map", "name": "map", "props": {}}),
        json!({"type": "remove-ui", "id": "card"}),
        json!({"type": "remove-ui", "id": "card"}),
    ] {
        state.dispatch(Message::StreamEvent {
            run,
            event: StreamEvent::Custom { payload, namespace: None },
        });
    }
    let ids: Vec<_> = state.session.values.ui.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["map"]);

    // A failure after values keeps what was streamed.
    state.dispatch(Message::StreamFinished {
        run,
        result: Err(ClientError::Rejected("graph crashed".into())),
    });
    assert_eq!(state.session.values.messages.len(), 2);
}

#[test]
fn stop_drops_everything_still_in_flight() {
    let (mut state, _) = boot(Some("agent"), Some("t1"));
    state.dispatch(Message::SetInput("hi".into()));
    let (run, _, _) = started_run(&state.dispatch(Message::Submit));

    let cmds = state.dispatch(Message::StopStream);
    assert!(cmds.contains(&Command::AbortStream));
    assert!(!state.session.is_loading);

    state.dispatch(Message::StreamEvent {
        run,
        event: StreamEvent::Values(Box::default()),
    });
    let cmds = state.dispatch(Message::StreamFinished {
        run,
        result: Err(ClientError::Aborted),
    });
    assert!(cmds.is_empty());
    assert_eq!(state.session.values.messages.len(), 1);
    assert!(state.session.error.is_none());
}

#[test]
fn new_thread_id_is_adopted_without_rebuilding_the_session() {
    let (mut state, _) = boot(Some("agent"), None);
    state.dispatch(Message::SetInput("hi".into()));
    let (run, thread_id, _) = started_run(&state.dispatch(Message::Submit));
    assert!(thread_id.is_none());

    let generation = state.session.generation;
    let cmds = state.dispatch(Message::ThreadIdAssigned {
        generation,
        thread_id: "t-new".into(),
    });
    assert_eq!(state.navigation.thread_id.as_deref(), Some("t-new"));
    assert_eq!(state.session.generation, generation);
    assert!(state.session.is_loading);
    assert!(cmds.contains(&Command::ScheduleThreadRefresh {
        delay_ms: THREAD_FETCH_DELAY_MS
    }));
    assert!(cmds.iter().any(|c| matches!(c, Command::SyncLocation(nav) if nav.thread_id.as_deref() == Some("t-new"))));
    assert!(!cmds.iter().any(|c| matches!(c, Command::AbortStream | Command::LoadThreadState { .. })));

    // Success reloads state for fresh checkpoints.
    let cmds = state.dispatch(Message::StreamFinished { run, result: Ok(()) });
    assert!(cmds
        .iter()
        .any(|c| matches!(c, Command::LoadThreadState { thread_id, .. } if thread_id == "t-new")));
}

#[test]
fn switching_assistant_resets_the_conversation() {
    let (mut state, _) = boot(Some("agent"), Some("t1"));
    state.session.first_token_received = true;
    state.dispatch(Message::SetInput("draft".into()));
    state.dispatch(Message::AddContentBlock(ContentBlock::text("note")));
    let generation = state.session.generation;

    let cmds = state.dispatch(Message::SetAssistantId("planner".into()));

    assert!(state.navigation.thread_id.is_none());
    assert!(state.composer.input.is_empty());
    assert!(state.composer.content_blocks.is_empty());
    assert!(!state.session.first_token_received);
    assert!(state.session.generation > generation);
    assert_eq!(state.connection.assistant_id, "planner");
    assert_eq!(notifications(&cmds)[0].title, "Assistant changed");
    assert!(cmds
        .iter()
        .any(|c| matches!(c, Command::SearchAssistantsByGraph { graph_id, .. } if graph_id == "planner")));

    // Selecting the same assistant again changes nothing.
    assert!(state.dispatch(Message::SetAssistantId("planner".into())).is_empty());
}

#[test]
fn regenerate_reruns_from_the_parent_checkpoint() {
    let (mut state, _) = boot(Some("agent"), Some("t1"));
    let generation = state.session.generation;
    state.dispatch(Message::ThreadStateLoaded {
        generation,
        result: Ok(serde_json::from_value(json!({
            "values": {"messages": [
                {"id": "m1", "type": "human", "content": "hi"},
                {"id": "m2", "type": "ai", "content": "hello"}
            ]},
            "next": [],
            "checkpoint": {"thread_id": "t1", "checkpoint_ns": "", "checkpoint_id": "c2"},
            "parent_checkpoint": {"thread_id": "t1", "checkpoint_ns": "", "checkpoint_id": "c1"}
        }))
        .unwrap()),
    });
    assert_eq!(state.session.prev_message_len, 2);

    let (_, _, request) = started_run(&state.dispatch(Message::Regenerate(None)));
    assert!(request.input.is_none());
    assert_eq!(
        request.checkpoint.and_then(|c| c.checkpoint_id).as_deref(),
        Some("c1")
    );
    assert_eq!(state.session.prev_message_len, 1);
    assert!(!state.session.first_token_received);
}

#[test]
fn thread_state_for_an_old_session_is_ignored() {
    let (mut state, _) = boot(Some("agent"), Some("t1"));
    let old = state.session.generation;
    state.dispatch(Message::SelectThread(Some("t2".into())));

    state.dispatch(Message::ThreadStateLoaded {
        generation: old,
        result: Ok(serde_json::from_value(json!({
            "values": {"messages": [{"id": "m1", "type": "human", "content": "old"}]}
        }))
        .unwrap()),
    });
    assert!(state.session.values.messages.is_empty());
    assert!(state.session.state_loading);
}
