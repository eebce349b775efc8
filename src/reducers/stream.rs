//! Streaming session: composer, submit/regenerate/stop and the run stream.

use super::sync_location;
use crate::constants::THREAD_FETCH_DELAY_MS;
use crate::error::ClientError;
use crate::messages::{Command, Message};
use crate::models::{ChatMessage, Checkpoint, RunInput, RunRequest};
use crate::network::StreamEvent;
use crate::state::{AppState, StreamSession};
use crate::toast::Toast;
use crate::tool_calls::ensure_tool_calls_have_responses;
use crate::ui_state::UiEvent;
use crate::utils::new_message_id;

/// Returns `true` when the message was handled by the stream reducer.
pub fn update(state: &mut AppState, msg: &Message, cmds: &mut Vec<Command>) -> bool {
    match msg {
        // Composer
        Message::SetInput(text) => {
            state.composer.input = text.clone();
            true
        }
        Message::SetContentBlocks(blocks) => {
            state.composer.content_blocks = blocks.clone();
            true
        }
        Message::AddContentBlock(block) => {
            state.composer.content_blocks.push(block.clone());
            true
        }
        Message::RemoveContentBlock(index) => {
            if *index < state.composer.content_blocks.len() {
                state.composer.content_blocks.remove(*index);
            }
            true
        }
        Message::SetArtifactContext(context) => {
            state.composer.context = context.clone();
            true
        }

        Message::Submit => {
            submit(state, cmds);
            true
        }
        Message::Regenerate(checkpoint) => {
            regenerate(state, checkpoint.as_ref(), cmds);
            true
        }
        Message::StopStream => {
            let session = &mut state.session;
            if session.is_loading {
                cmds.push(Command::AbortStream);
                session.is_loading = false;
                // Anything still in flight for this run is now stale.
                session.run += 1;
                session.snapshot = None;
            }
            true
        }
        Message::StreamEvent { run, event } => {
            if *run == state.session.run {
                apply_event(&mut state.session, event);
            }
            true
        }
        Message::StreamFinished { run, result } => {
            if *run == state.session.run {
                finish_run(state, result, cmds);
            }
            true
        }
        Message::ThreadStateLoaded { generation, result } => {
            if *generation != state.session.generation {
                return true;
            }
            let session = &mut state.session;
            session.state_loading = false;
            match result {
                Ok(thread_state) => {
                    // A running stream owns the values.
                    if !session.is_loading {
                        session.values = thread_state.values.clone();
                        session.track_first_token();
                    }
                    session.checkpoint = thread_state.checkpoint.clone();
                    session.parent_checkpoint = thread_state.parent_checkpoint.clone();
                }
                Err(e) => {
                    crate::warn_log!("Failed to load thread state: {}", e);
                    session.error = Some(e.user_message());
                    cmds.push(Command::Notify(
                        Toast::error("Failed to load thread").with_description(e.user_message()),
                    ));
                }
            }
            true
        }
        Message::ThreadIdAssigned { generation, thread_id } => {
            if *generation != state.session.generation || state.session.thread_id.is_some() {
                return true;
            }
            state.session.thread_id = Some(thread_id.clone());
            state.navigation.thread_id = Some(thread_id.clone());
            sync_location(state, cmds);
            // The search index lags behind thread creation.
            cmds.push(Command::ScheduleThreadRefresh {
                delay_ms: THREAD_FETCH_DELAY_MS,
            });
            true
        }
        _ => false,
    }
}

/// Throw the current session away and start one for the active thread.
/// A running stream is aborted; its late events are dropped by the epoch
/// checks.
pub fn reset_session(state: &mut AppState, cmds: &mut Vec<Command>) {
    if state.session.is_loading {
        cmds.push(Command::AbortStream);
    }
    let thread_id = state.navigation.thread_id.clone();
    state.session = StreamSession {
        generation: state.session.generation + 1,
        run: state.session.run + 1,
        thread_id: thread_id.clone(),
        ..Default::default()
    };

    if let Some(thread_id) = thread_id {
        if !state.connection.api_url.is_empty() {
            state.session.state_loading = true;
            cmds.push(Command::LoadThreadState {
                config: state.api_config(),
                generation: state.session.generation,
                thread_id,
            });
        }
    }
}

fn can_start(state: &AppState, cmds: &mut Vec<Command>) -> bool {
    if state.connection.assistant_id.is_empty() {
        cmds.push(Command::Notify(
            Toast::error("Please select an assistant first")
                .with_description("Choose an assistant in the selector before sending a message."),
        ));
        return false;
    }
    if state.session.is_loading {
        return false;
    }
    true
}

fn submit(state: &mut AppState, cmds: &mut Vec<Command>) {
    if !can_start(state, cmds) {
        return;
    }
    let composer = &state.composer;
    if composer.input.trim().is_empty() && composer.content_blocks.is_empty() {
        return;
    }
    if state.connection.api_url.is_empty() {
        cmds.push(Command::Notify(
            Toast::error("No server configured").with_description("Set the deployment URL before sending a message."),
        ));
        return;
    }

    state.session.first_token_received = false;

    let human = ChatMessage::human(new_message_id(), &composer.input, &composer.content_blocks);
    let mut outgoing = ensure_tool_calls_have_responses(&state.session.values.messages);
    outgoing.push(human);
    let context = (!composer.context.is_empty()).then(|| composer.context.clone());

    start_run(
        state,
        Some(RunInput {
            messages: outgoing.clone(),
            context: context.clone(),
        }),
        None,
        cmds,
    );

    // Show the turn right away; the first `values` event replaces it.
    let session = &mut state.session;
    session.values.messages.extend(outgoing);
    if context.is_some() {
        session.values.context = context;
    }
    session.track_first_token();

    state.composer.input.clear();
    state.composer.content_blocks.clear();
}

fn regenerate(state: &mut AppState, checkpoint: Option<&Checkpoint>, cmds: &mut Vec<Command>) {
    if !can_start(state, cmds) {
        return;
    }
    let session = &mut state.session;
    session.prev_message_len = session.prev_message_len.saturating_sub(1);
    session.first_token_received = false;
    let checkpoint = checkpoint.cloned().or_else(|| session.parent_checkpoint.clone());
    start_run(state, None, checkpoint, cmds);
}

fn start_run(state: &mut AppState, input: Option<RunInput>, checkpoint: Option<Checkpoint>, cmds: &mut Vec<Command>) {
    let session = &mut state.session;
    session.run += 1;
    session.is_loading = true;
    session.error = None;
    session.last_toasted_error = None;
    session.received_values = false;
    session.run_id = None;
    session.snapshot = Some(session.values.clone());

    let mut request = RunRequest::new(&state.connection.assistant_id, input);
    request.checkpoint = checkpoint;

    cmds.push(Command::StartRun {
        config: state.connection.api_config(),
        generation: session.generation,
        run: session.run,
        thread_id: session.thread_id.clone(),
        request,
    });
}

fn apply_event(session: &mut StreamSession, event: &StreamEvent) {
    match event {
        StreamEvent::Metadata { run_id } => session.run_id = run_id.clone(),
        StreamEvent::Values(values) => {
            session.values = (**values).clone();
            session.received_values = true;
            session.snapshot = None;
            session.track_first_token();
        }
        StreamEvent::Custom { payload, .. } => match UiEvent::from_custom(payload) {
            Some(ui) => session.values.ui.apply(ui),
            None => crate::debug_log!("Ignoring custom event: {}", payload),
        },
        // `error` and `end` are turned into the run result by the stream
        // driver.
        StreamEvent::Error { .. } | StreamEvent::End | StreamEvent::Other { .. } => {}
    }
}

fn finish_run(state: &mut AppState, result: &Result<(), ClientError>, cmds: &mut Vec<Command>) {
    let session = &mut state.session;
    session.is_loading = false;
    match result {
        Ok(()) => {
            session.snapshot = None;
            session.error = None;
            // Pick up the checkpoints of the run that just finished.
            if let Some(thread_id) = session.thread_id.clone() {
                cmds.push(Command::LoadThreadState {
                    config: state.connection.api_config(),
                    generation: session.generation,
                    thread_id,
                });
            }
        }
        Err(ClientError::Aborted) => session.snapshot = None,
        Err(e) => {
            crate::error_log!("Run failed: {}", e);
            if !session.received_values {
                if let Some(snapshot) = session.snapshot.take() {
                    session.values = snapshot;
                    session.prev_message_len = session.values.messages.len();
                }
            }
            session.snapshot = None;
            let message = e.user_message();
            session.error = Some(message.clone());
            // Once per run, however often the failure is reported.
            if session.last_toasted_error.as_deref() != Some(message.as_str()) {
                cmds.push(Command::Notify(Toast {
                    closable: true,
                    ..Toast::error("An error occurred. Please try again.").with_description(message.clone())
                }));
                session.last_toasted_error = Some(message);
            }
        }
    }
}
