//! Thread history: listing, selection, rename and delete.

use super::{connection, non_blank, sync_location};
use crate::messages::{Command, Message};
use crate::models::ThreadSearchRequest;
use crate::state::AppState;
use crate::toast::Toast;

/// Returns `true` when the message was handled by the threads reducer.
pub fn update(state: &mut AppState, msg: &Message, cmds: &mut Vec<Command>) -> bool {
    match msg {
        Message::RefreshThreads => {
            refresh(state, cmds);
            true
        }
        Message::ThreadsLoaded { seq, result } => {
            if *seq != state.threads.request_seq {
                return true;
            }
            state.threads.loading = false;
            match result {
                Ok(threads) => state.threads.threads = threads.clone(),
                // Keep showing what we had.
                Err(e) => crate::warn_log!("Failed to list threads: {}", e),
            }
            true
        }
        Message::SelectThread(thread_id) => {
            let next = thread_id.as_deref().and_then(non_blank);
            if next == state.navigation.thread_id {
                return true;
            }
            set_active_thread(state, next, cmds);
            true
        }
        Message::DeleteThread(thread_id) => {
            cmds.push(Command::DeleteThread {
                config: state.api_config(),
                thread_id: thread_id.clone(),
            });
            true
        }
        Message::ThreadDeleted { thread_id, result } => {
            match result {
                Ok(()) => {
                    cmds.push(Command::Notify(Toast::success("Thread deleted")));
                    if state.thread_id() == Some(thread_id.as_str()) {
                        set_active_thread(state, None, cmds);
                    }
                }
                Err(e) => cmds.push(Command::Notify(
                    Toast::error("Failed to delete thread").with_description(e.user_message()),
                )),
            }
            refresh(state, cmds);
            true
        }
        Message::DeleteThreads(thread_ids) => {
            if thread_ids.is_empty() {
                return true;
            }
            cmds.push(Command::DeleteThreads {
                config: state.api_config(),
                thread_ids: thread_ids.clone(),
            });
            true
        }
        Message::ThreadsDeleted { thread_ids, result } => {
            match result {
                Ok(()) => {
                    let title = match thread_ids.len() {
                        1 => "Deleted 1 thread".to_string(),
                        n => format!("Deleted {} threads", n),
                    };
                    cmds.push(Command::Notify(Toast::success(title)));
                    let active_deleted = state
                        .thread_id()
                        .is_some_and(|active| thread_ids.iter().any(|id| id == active));
                    if active_deleted {
                        set_active_thread(state, None, cmds);
                    }
                }
                Err(e) => cmds.push(Command::Notify(
                    Toast::error("Failed to delete threads").with_description(e.user_message()),
                )),
            }
            refresh(state, cmds);
            true
        }
        Message::RenameThread { thread_id, title } => {
            match non_blank(title) {
                Some(title) => cmds.push(Command::UpdateThreadTitle {
                    config: state.api_config(),
                    thread_id: thread_id.clone(),
                    title,
                }),
                None => cmds.push(Command::Notify(Toast::error("Thread title cannot be empty"))),
            }
            true
        }
        Message::ThreadRenamed { thread_id, result } => {
            match result {
                Ok(thread) => {
                    if let Some(slot) = state.threads.threads.iter_mut().find(|t| t.thread_id == *thread_id) {
                        *slot = thread.clone();
                    }
                    cmds.push(Command::Notify(Toast::success("Thread title updated")));
                    refresh(state, cmds);
                }
                Err(e) => cmds.push(Command::Notify(
                    Toast::error("Failed to update thread title").with_description(e.user_message()),
                )),
            }
            true
        }
        _ => false,
    }
}

/// Re-list threads for the current assistant.  Without a full connection the
/// list is simply emptied.
pub fn refresh(state: &mut AppState, cmds: &mut Vec<Command>) {
    let registry = &mut state.threads;
    registry.request_seq += 1;
    if !state.connection.is_configured() {
        registry.threads.clear();
        registry.loading = false;
        return;
    }
    registry.loading = true;
    cmds.push(Command::SearchThreads {
        config: state.connection.api_config(),
        seq: registry.request_seq,
        request: ThreadSearchRequest::for_assistant(&state.connection.assistant_id),
    });
}

fn set_active_thread(state: &mut AppState, thread_id: Option<String>, cmds: &mut Vec<Command>) {
    state.navigation.thread_id = thread_id;
    state.composer.context.clear();
    sync_location(state, cmds);
    connection::reconcile(state, cmds);
}
