mod state;

use crossterm::event::KeyCode;

pub use state::App;

/// Possible input events the app reacts to.
pub enum AppEvent {
    Tick,
    KeyPress(KeyCode),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppView {
    Users,
    Details,
    Requests,
    Conflicts,
    Help,
}

/// Editable column of the details grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    Shift,
    Project,
    Start,
    End,
}

impl Column {
    fn left(self) -> Self {
        match self {
            Column::Shift => Column::Shift,
            Column::Project => Column::Shift,
            Column::Start => Column::Project,
            Column::End => Column::Start,
        }
    }

    fn right(self) -> Self {
        match self {
            Column::Shift => Column::Project,
            Column::Project => Column::Start,
            Column::Start => Column::End,
            Column::End => Column::End,
        }
    }

    fn time_field(self) -> Option<crate::types::TimeField> {
        match self {
            Column::Start => Some(crate::types::TimeField::Start),
            Column::End => Some(crate::types::TimeField::End),
            Column::Shift | Column::Project => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// Footer message shown until dismissed or replaced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteSelected,
}

#[derive(Clone, Debug)]
pub struct ConfirmPopup {
    pub message: String,
    pub action: ConfirmAction,
}
