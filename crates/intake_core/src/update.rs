use crate::{AppState, ChatMessage, Effect, Msg, Panel, Role, CANCELLED_CAUSE};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesSelected(files) => {
            if files.is_empty() {
                return (state, Vec::new());
            }
            // A re-submitted name is a new attempt; its old summary is stale.
            state.forget_summaries(files.iter().map(|file| file.name.as_str()));
            vec![Effect::StartIngest { files }]
        }
        Msg::RecordsUpdated(records) => {
            let outcome = state.merge_records(&records);
            if outcome.batch_ready {
                state.bind_completed_files();
                state.set_panel(Panel::Chat);
            }
            Vec::new()
        }
        Msg::SummaryReady { name, summary } => {
            state.set_summary(name, summary);
            Vec::new()
        }
        Msg::SelectionToggled(name) => {
            state.toggle_selection(&name);
            Vec::new()
        }
        Msg::NewChatClicked => {
            state.start_new_session();
            Vec::new()
        }
        Msg::SessionActivated(id) => {
            state.activate_session(id);
            Vec::new()
        }
        Msg::QuerySubmitted(query) => {
            let Some(session_id) = state.active_session() else {
                return (state, Vec::new());
            };
            if query.trim().is_empty() || state.query_pending() {
                return (state, Vec::new());
            }
            let files = state.selected_names();
            state.append_message(session_id, ChatMessage::user(query.clone(), files.clone()));
            state.set_query_pending(true);
            vec![Effect::SubmitQuery {
                session_id,
                query,
                files,
            }]
        }
        Msg::AnswerReceived {
            session_id,
            content,
        } => {
            let files = state
                .session(session_id)
                .and_then(|session| {
                    session
                        .messages()
                        .iter()
                        .rev()
                        .find(|message| message.role == Role::User)
                        .map(|message| message.files.clone())
                })
                .unwrap_or_default();
            let appended = state.append_message(session_id, ChatMessage::assistant(content, files));
            if appended && state.active_session() == Some(session_id) {
                state.set_query_pending(false);
            }
            Vec::new()
        }
        Msg::PanelChanged(panel) => {
            state.set_panel(panel);
            Vec::new()
        }
        Msg::Teardown => {
            let abandoned = state.store().cancellation_updates(CANCELLED_CAUSE);
            state.merge_records(&abandoned);
            state.set_query_pending(false);
            vec![Effect::CancelUploads]
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
