/// Timesheet editing core: time parsing, edit sessions, drafts, row projection,
/// selection and the request queue. Nothing in here performs I/O; operations
/// return the [`crate::api::Mutation`] to send.
pub mod drafts;
pub mod editing;
pub mod projection;
pub mod requests;
pub mod selection;
pub mod time_format;

pub use drafts::{DraftEvent, DraftKey, DraftState, DraftStore, NewRecord};
pub use editing::{EditSession, EditingStore, SaveOutcome};
pub use projection::{DailyRow, DayEntries, DayKey, DayRow, GridLine, LineKind};
pub use requests::{RejectDialog, RequestPanel};
pub use selection::{LockStatus, Selection};
