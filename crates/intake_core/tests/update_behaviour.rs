use std::sync::Once;

use intake_core::{
    update, AppState, Effect, FileDescriptor, FileRecord, FileStatus, Msg, Panel, Role,
    CANCELLED_CAUSE,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(intake_logging::initialize_for_tests);
}

fn descriptor(name: &str) -> FileDescriptor {
    FileDescriptor::new(name, 1536, "text/plain")
}

fn record(name: &str) -> FileRecord {
    FileRecord::admitted(&descriptor(name))
}

fn apply(state: AppState, records: Vec<FileRecord>) -> AppState {
    let (state, effects) = update(state, Msg::RecordsUpdated(records));
    assert!(effects.is_empty());
    state
}

/// State with the given files uploaded and completed in one batch.
fn completed_state(names: &[&str]) -> AppState {
    let state = apply(AppState::new(), names.iter().map(|n| record(n)).collect());
    apply(state, names.iter().map(|n| record(n).completed()).collect())
}

#[test]
fn files_selected_emits_ingest_effect() {
    init_logging();
    let files = vec![descriptor("a.txt"), descriptor("b.txt")];

    let (mut state, effects) = update(AppState::new(), Msg::FilesSelected(files.clone()));
    assert_eq!(effects, vec![Effect::StartIngest { files }]);
    assert!(state.records().is_empty());
    assert!(!state.consume_dirty());

    let (_state, effects) = update(state, Msg::FilesSelected(Vec::new()));
    assert!(effects.is_empty());
}

#[test]
fn progress_updates_are_merged_and_mark_dirty() {
    init_logging();
    let mut state = apply(AppState::new(), vec![record("a.txt")]);
    assert!(state.consume_dirty());

    let mut state = apply(state, vec![record("a.txt").uploading(50)]);
    assert!(state.consume_dirty());
    let view = state.view();
    assert_eq!(view.files.len(), 1);
    assert_eq!(view.files[0].status, FileStatus::Uploading);
    assert_eq!(view.files[0].progress, Some(50));
    assert_eq!(view.files[0].size_label, "1.5 KB");
    assert_eq!(view.files[0].caption(), "Uploading...");

    // Echo of the same delta changes nothing.
    let mut state = apply(state, vec![record("a.txt").uploading(50)]);
    assert!(!state.consume_dirty());
}

#[test]
fn completion_binds_session_and_switches_to_chat() {
    init_logging();
    let state = apply(AppState::new(), vec![record("a.txt"), record("b.txt")]);
    assert_eq!(state.panel(), Panel::Upload);
    assert_eq!(state.active_session(), None);

    let state = apply(state, vec![record("a.txt").completed()]);
    assert_eq!(state.panel(), Panel::Chat);
    let session = state.active_session().expect("session created on completion");
    let active: Vec<_> = state.active_files().into_iter().map(|r| r.name).collect();
    assert_eq!(active, vec!["a.txt"]);

    let state = apply(state, vec![record("b.txt").completed()]);
    assert_eq!(state.active_session(), Some(session));
    let active: Vec<_> = state.active_files().into_iter().map(|r| r.name).collect();
    assert_eq!(active, vec!["a.txt", "b.txt"]);
    assert_eq!(state.view().session_count, 1);
}

#[test]
fn rebinding_clears_selection_but_progress_does_not() {
    init_logging();
    let state = completed_state(&["a.txt"]);
    let state = apply(state, vec![record("b.txt")]);

    let (state, _) = update(state, Msg::SelectionToggled("a.txt".to_string()));
    let (state, _) = update(state, Msg::SelectionToggled("b.txt".to_string()));
    assert!(state.is_selected("a.txt"));
    assert!(state.is_selected("b.txt"));

    // Unrelated progress on a selected file keeps the selection.
    let state = apply(state, vec![record("b.txt").uploading(80)]);
    assert!(state.is_selected("b.txt"));
    assert_eq!(state.selected_records().len(), 2);

    // Completion changes the bound set and resets the selection.
    let state = apply(state, vec![record("b.txt").completed()]);
    assert!(state.selected_records().is_empty());
}

#[test]
fn toggling_unknown_file_is_ignored() {
    init_logging();
    let (mut state, effects) = update(AppState::new(), Msg::SelectionToggled("x".to_string()));
    assert!(effects.is_empty());
    assert!(!state.is_selected("x"));
    assert!(!state.consume_dirty());
}

#[test]
fn query_carries_selected_files_and_blocks_until_answered() {
    init_logging();
    let state = completed_state(&["a.txt", "b.txt"]);
    let session_id = state.active_session().unwrap();
    let (state, _) = update(state, Msg::SelectionToggled("b.txt".to_string()));

    let (state, effects) = update(state, Msg::QuerySubmitted("Q3 revenue?".to_string()));
    assert_eq!(
        effects,
        vec![Effect::SubmitQuery {
            session_id,
            query: "Q3 revenue?".to_string(),
            files: vec!["b.txt".to_string()],
        }]
    );
    assert!(state.query_pending());

    let (state, effects) = update(state, Msg::QuerySubmitted("again".to_string()));
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::AnswerReceived {
            session_id,
            content: "Up 12%".to_string(),
        },
    );
    assert!(!state.query_pending());
    let messages = state.view().messages;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].files, vec!["b.txt".to_string()]);
}

#[test]
fn blank_query_or_missing_session_is_ignored() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::QuerySubmitted("hello".to_string()));
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::NewChatClicked);
    let (state, effects) = update(state, Msg::QuerySubmitted("   ".to_string()));
    assert!(effects.is_empty());
    assert!(state.view().messages.is_empty());
}

#[test]
fn switching_sessions_resets_selection_and_pending_query() {
    init_logging();
    let state = completed_state(&["a.txt"]);
    let first = state.active_session().unwrap();
    let (state, _) = update(state, Msg::SelectionToggled("a.txt".to_string()));
    let (state, _) = update(state, Msg::QuerySubmitted("q".to_string()));
    assert!(state.query_pending());

    let (state, _) = update(state, Msg::NewChatClicked);
    let second = state.active_session().unwrap();
    assert_ne!(first, second);
    assert!(!state.query_pending());
    assert!(state.selected_records().is_empty());
    assert!(state.active_files().is_empty());

    let (state, _) = update(state, Msg::SelectionToggled("a.txt".to_string()));
    let (state, _) = update(state, Msg::SessionActivated(first));
    assert_eq!(state.active_session(), Some(first));
    assert!(state.selected_records().is_empty());
    assert_eq!(state.view().messages.len(), 1);

    // Unknown session ids leave everything alone.
    let (state, _) = update(state, Msg::SessionActivated(999));
    assert_eq!(state.active_session(), Some(first));
}

#[test]
fn late_answer_for_inactive_session_is_appended_there() {
    init_logging();
    let state = completed_state(&["a.txt"]);
    let first = state.active_session().unwrap();
    let (state, _) = update(state, Msg::QuerySubmitted("q".to_string()));
    let (state, _) = update(state, Msg::NewChatClicked);

    let (state, _) = update(
        state,
        Msg::AnswerReceived {
            session_id: first,
            content: "late".to_string(),
        },
    );
    assert_eq!(state.session(first).unwrap().messages().len(), 2);
    assert!(state.view().messages.is_empty());
}

#[test]
fn summaries_are_kept_until_resubmission() {
    init_logging();
    let state = completed_state(&["a.txt"]);
    let (state, _) = update(
        state,
        Msg::SummaryReady {
            name: "a.txt".to_string(),
            summary: "Revenue grew".to_string(),
        },
    );
    assert_eq!(state.summary("a.txt"), Some("Revenue grew"));
    assert!(state.view().files[0].has_summary);

    let (state, _) = update(state, Msg::FilesSelected(vec![descriptor("a.txt")]));
    assert_eq!(state.summary("a.txt"), None);
}

#[test]
fn teardown_cancels_in_flight_records() {
    init_logging();
    let state = completed_state(&["done.txt"]);
    let state = apply(state, vec![record("up.txt").uploading(30)]);

    let (state, effects) = update(state, Msg::Teardown);
    assert_eq!(effects, vec![Effect::CancelUploads]);

    let up = state.records().iter().find(|r| r.name == "up.txt").unwrap();
    assert_eq!(up.status, FileStatus::Error);
    assert_eq!(up.error.as_deref(), Some(CANCELLED_CAUSE));
    let done = state.records().iter().find(|r| r.name == "done.txt").unwrap();
    assert_eq!(done.status, FileStatus::Completed);
}

#[test]
fn panel_changes_are_tracked() {
    init_logging();
    let (mut state, _) = update(AppState::new(), Msg::PanelChanged(Panel::Chat));
    assert_eq!(state.view().panel, Panel::Chat);
    assert!(state.consume_dirty());

    let (mut state, _) = update(state, Msg::PanelChanged(Panel::Chat));
    assert!(!state.consume_dirty());
}
