//! Intake core: file records, admission rules, status reconciliation and the
//! pure state machine driven by the app.
mod effect;
mod msg;
mod record;
mod selection;
mod session;
mod state;
mod store;
mod update;
mod validate;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use record::{format_file_size, FileDescriptor, FileRecord, FileStatus};
pub use selection::Selection;
pub use session::{ChatMessage, Role, Session, SessionBinder, SessionId};
pub use state::{AppState, Panel, CANCELLED_CAUSE};
pub use store::{merge, MergeOutcome, RecordStore};
pub use update::update;
pub use validate::{
    is_admissible_mime, mime_for_path, validate, Validation, Verdict, ACCEPTED_EXTENSIONS,
    MAX_FILES,
};
pub use view_model::{AppViewModel, FileRowView};
