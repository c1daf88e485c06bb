use std::collections::HashSet;
use std::sync::Arc;

use chrono::Local;
use crossterm::event::KeyCode;
use tracing::{debug, info};

use crate::api::{DetailsPayload, Mutation, TimeClockApi};
use crate::editor::projection::{days, grid_lines, project_rows};
use crate::editor::{
    DailyRow, DayKey, DayRow, DraftEvent, DraftKey, DraftStore, EditSession, EditingStore,
    GridLine, LineKind, RequestPanel, SaveOutcome, Selection,
};
use crate::error::{ApiError, EditError};
use crate::types::{DateRange, Project, Shift, TimeClock, TimeField, UserId, Worklog, WorklogId};
use crate::worker::{Job, JobResult, Origin, Worker};

use super::{AppEvent, AppView, Column, ConfirmAction, ConfirmPopup, Notice};

/// The top-level application state.
pub struct App {
    pub running: bool,
    pub view: AppView,
    view_history: Vec<AppView>,
    worker: Worker,
    company_id: Option<u32>,
    pub range: DateRange,
    pub users: Vec<TimeClock>,
    pub selected_user_index: usize,
    pub user: Option<TimeClock>,
    pub stats: DetailsPayload,
    pub rows: Vec<DailyRow>,
    pub shifts: Vec<Shift>,
    pub projects: Vec<Project>,
    pub editing: EditingStore,
    pub drafts: DraftStore,
    pub selection: Selection,
    pub requests: RequestPanel,
    pub selected_conflict_index: usize,
    pub cursor: usize,
    pub column: Column,
    pub notice: Option<Notice>,
    pub confirm_popup: Option<ConfirmPopup>,
    pub loading_users: bool,
    pub loading_details: bool,
    pub loading_requests: bool,
    users_seq: u64,
    details_seq: u64,
    requests_seq: u64,
    bulk_pending: usize,
}

impl App {
    pub fn new(
        api: Arc<dyn TimeClockApi>,
        company_id: Option<u32>,
        range: DateRange,
        user_id: Option<UserId>,
    ) -> Self {
        let mut app = Self {
            running: true,
            view: AppView::Users,
            view_history: Vec::new(),
            worker: Worker::new(api),
            company_id,
            range,
            users: Vec::new(),
            selected_user_index: 0,
            user: None,
            stats: DetailsPayload::default(),
            rows: Vec::new(),
            shifts: Vec::new(),
            projects: Vec::new(),
            editing: EditingStore::default(),
            drafts: DraftStore::default(),
            selection: Selection::default(),
            requests: RequestPanel::default(),
            selected_conflict_index: 0,
            cursor: 0,
            column: Column::Start,
            notice: None,
            confirm_popup: None,
            loading_users: false,
            loading_details: false,
            loading_requests: false,
            users_seq: 0,
            details_seq: 0,
            requests_seq: 0,
            bulk_pending: 0,
        };

        app.load_users();
        app.load_resources();
        if let Some(user_id) = user_id {
            app.open_user(TimeClock {
                user_id,
                ..TimeClock::default()
            });
        }
        app
    }

    /// Central update function - process an event and mutate state.
    pub fn update(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tick => {}
            AppEvent::KeyPress(key) => self.handle_key(key),
        }
        while let Some(result) = self.worker.try_recv() {
            self.handle_result(result);
        }
    }

    pub fn is_busy(&self) -> bool {
        self.worker.in_flight() > 0
    }

    pub fn lines(&self) -> Vec<GridLine> {
        grid_lines(&self.rows, &self.drafts)
    }

    pub fn current_line(&self) -> Option<GridLine> {
        self.lines().into_iter().nth(self.cursor)
    }

    pub fn worklog(&self, id: WorklogId) -> Option<&Worklog> {
        days(&self.rows).find_map(|day| day.worklog(id))
    }

    fn current_day(&self) -> Option<&DayRow> {
        let line = self.current_line()?;
        self.rows.get(line.row).and_then(DailyRow::as_day)
    }

    fn current_draft(&self) -> Option<DraftKey> {
        match self.current_line()?.kind {
            LineKind::Draft(key) => Some(key),
            _ => None,
        }
    }

    /// Worklog under the cursor with an open edit session.
    fn active_session(&self) -> Option<WorklogId> {
        if self.view != AppView::Details {
            return None;
        }
        match self.current_line()?.kind {
            LineKind::Worklog(id) if self.editing.is_editing(id) => Some(id),
            _ => None,
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        if self.confirm_popup.is_some() {
            self.handle_confirm_key(key);
            return;
        }
        if self.requests.reject_dialog.is_some() {
            self.handle_reject_key(key);
            return;
        }
        if let Some(id) = self.active_session() {
            self.handle_session_key(id, key);
            return;
        }

        match key {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('?') => {
                if self.view == AppView::Help {
                    self.go_back();
                } else {
                    self.navigate_to(AppView::Help);
                }
            }
            KeyCode::Char('x') => self.notice = None,
            _ => match self.view {
                AppView::Users => self.handle_users_key(key),
                AppView::Details => self.handle_details_key(key),
                AppView::Requests => self.handle_requests_key(key),
                AppView::Conflicts => self.handle_conflicts_key(key),
                AppView::Help => {
                    if key == KeyCode::Esc {
                        self.go_back();
                    }
                }
            },
        }
    }

    fn navigate_to(&mut self, view: AppView) {
        if self.view != view {
            self.view_history.push(self.view);
            self.view = view;
        }
    }

    fn go_back(&mut self) {
        if let Some(previous) = self.view_history.pop() {
            self.view = previous;
        } else if self.view != AppView::Users {
            self.view = AppView::Users;
        }
    }

    fn handle_users_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => {
                self.selected_user_index = self.selected_user_index.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_user_index + 1 < self.users.len() {
                    self.selected_user_index += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(user) = self.users.get(self.selected_user_index).cloned() {
                    self.open_user(user);
                }
            }
            KeyCode::Char('[') => self.shift_range(-1),
            KeyCode::Char(']') => self.shift_range(1),
            KeyCode::Char('r') => self.load_users(),
            KeyCode::Esc => self.notice = None,
            _ => {}
        }
    }

    fn handle_details_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::Left | KeyCode::BackTab => self.move_column(self.column.left()),
            KeyCode::Right | KeyCode::Tab => self.move_column(self.column.right()),
            KeyCode::Enter => self.activate_cell(),
            KeyCode::Char(' ') => {
                if let Some(key) = self.current_day().map(|day| day.key.clone()) {
                    self.selection.toggle(&key);
                }
            }
            KeyCode::Char('a') => self.selection.toggle_all(&self.rows),
            KeyCode::Char('L') => self.bulk_lock(true),
            KeyCode::Char('U') => self.bulk_lock(false),
            KeyCode::Char('D') => self.confirm_delete(),
            KeyCode::Char('n') | KeyCode::Char('+') => self.add_draft(),
            KeyCode::Char('[') => self.shift_range(-1),
            KeyCode::Char(']') => self.shift_range(1),
            KeyCode::Char('r') => self.load_details(),
            KeyCode::Char('R') => {
                self.navigate_to(AppView::Requests);
                self.load_requests();
            }
            KeyCode::Char('C') => {
                self.selected_conflict_index = 0;
                self.navigate_to(AppView::Conflicts);
            }
            KeyCode::Char(ch) if ch.is_ascii_digit() || ch == ':' => {
                self.edit_draft_time(|value| value.push(ch));
            }
            KeyCode::Backspace => {
                self.edit_draft_time(|value| {
                    value.pop();
                });
            }
            KeyCode::Delete => self.cancel_draft(),
            KeyCode::Esc => {
                if self.current_draft().is_some() {
                    self.cancel_draft();
                } else {
                    self.go_back();
                }
            }
            _ => {}
        }
    }

    fn handle_session_key(&mut self, id: WorklogId, key: KeyCode) {
        let Some(session) = self.editing.session(id).cloned() else {
            return;
        };
        match session {
            EditSession::Time { field, start, end } => match key {
                KeyCode::Esc => self.editing.cancel_editing_field(id),
                KeyCode::Enter => self.save_time(id),
                KeyCode::Tab | KeyCode::BackTab => {
                    let other = match field {
                        TimeField::Start => TimeField::End,
                        TimeField::End => TimeField::Start,
                    };
                    if let Some(log) = self.worklog(id).cloned() {
                        self.editing.start_editing_field(id, other, &log);
                    }
                    self.column = match other {
                        TimeField::Start => Column::Start,
                        TimeField::End => Column::End,
                    };
                }
                KeyCode::Backspace => {
                    let mut value = match field {
                        TimeField::Start => start,
                        TimeField::End => end,
                    };
                    value.pop();
                    self.editing.update_editing_field(id, value);
                }
                KeyCode::Char(ch) if ch.is_ascii_digit() || ch == ':' || ch == '-' => {
                    let mut value = match field {
                        TimeField::Start => start,
                        TimeField::End => end,
                    };
                    value.push(ch);
                    self.editing.update_editing_field(id, value);
                }
                _ => {}
            },
            EditSession::Shift { shift_id } => match key {
                KeyCode::Esc => self.editing.cancel_editing_shift(id),
                KeyCode::Enter => {
                    let outcome = match self.worklog(id).cloned() {
                        Some(log) => self.editing.save_shift_changes(id, &log),
                        None => SaveOutcome::NoSession,
                    };
                    self.dispatch_outcome(id, outcome);
                }
                KeyCode::Up | KeyCode::Down => {
                    let ids = self.shifts.iter().map(|shift| shift.id).collect::<Vec<_>>();
                    let step = if key == KeyCode::Up { -1 } else { 1 };
                    if let Some(next) = cycle_id(&ids, shift_id, step) {
                        self.editing.update_editing_shift(id, next);
                    }
                }
                _ => {}
            },
            EditSession::Project { project_id } => match key {
                KeyCode::Esc => self.editing.cancel_editing_project(id),
                KeyCode::Enter => {
                    let outcome = match self.worklog(id).cloned() {
                        Some(log) => self.editing.save_project_changes(id, &log),
                        None => SaveOutcome::NoSession,
                    };
                    self.dispatch_outcome(id, outcome);
                }
                KeyCode::Up | KeyCode::Down => {
                    let ids = self
                        .projects
                        .iter()
                        .map(|project| project.id)
                        .collect::<Vec<_>>();
                    let step = if key == KeyCode::Up { -1 } else { 1 };
                    if let Some(next) = cycle_id(&ids, project_id, step) {
                        self.editing.update_editing_project(id, next);
                    }
                }
                _ => {}
            },
        }
    }

    fn handle_confirm_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let Some(popup) = self.confirm_popup.take() else {
                    return;
                };
                match popup.action {
                    ConfirmAction::DeleteSelected => {
                        let result = self.selection.delete_mutation(&self.rows);
                        self.submit_bulk(result);
                    }
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_popup = None;
            }
            _ => {}
        }
    }

    fn handle_reject_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.requests.cancel_reject(),
            KeyCode::Enter => {
                let Some(user_id) = self.user_id() else {
                    return;
                };
                match self.requests.confirm_reject(user_id) {
                    Ok(mutation) => self.submit_mutation(Origin::Requests, mutation),
                    Err(err) => self.notice = Some(Notice::error(err.to_string())),
                }
            }
            KeyCode::Backspace => {
                if let Some(dialog) = self.requests.reject_dialog.as_mut() {
                    dialog.reason.pop();
                }
            }
            KeyCode::Char(ch) => {
                if ch.is_control() {
                    return;
                }
                if let Some(dialog) = self.requests.reject_dialog.as_mut() {
                    dialog.reason.push(ch);
                }
            }
            _ => {}
        }
    }

    fn handle_requests_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => self.requests.move_up(),
            KeyCode::Down => self.requests.move_down(),
            KeyCode::Char(' ') => self.requests.toggle_current(),
            KeyCode::Char('a') => self.requests.toggle_all_pending(),
            KeyCode::Char('y') => {
                let Some(user_id) = self.user_id() else {
                    return;
                };
                match self.requests.approve(user_id) {
                    Ok(mutation) => self.submit_mutation(Origin::Requests, mutation),
                    Err(err) => self.notice = Some(Notice::error(err.to_string())),
                }
            }
            KeyCode::Char('n') => {
                if let Err(err) = self.requests.open_reject() {
                    self.notice = Some(Notice::error(err.to_string()));
                }
            }
            KeyCode::Char('r') => self.load_requests(),
            KeyCode::Esc => self.go_back(),
            _ => {}
        }
    }

    fn handle_conflicts_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => {
                self.selected_conflict_index = self.selected_conflict_index.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_conflict_index + 1 < self.stats.conflicts.len() {
                    self.selected_conflict_index += 1;
                }
            }
            KeyCode::Enter => self.jump_to_conflict(),
            KeyCode::Char('r') => self.load_details(),
            KeyCode::Esc => self.go_back(),
            _ => {}
        }
    }

    fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|user| user.user_id)
    }

    fn open_user(&mut self, user: TimeClock) {
        info!(user_id = user.user_id, range = %self.range, "open_user");
        self.user = Some(user);
        self.rows.clear();
        self.stats = DetailsPayload::default();
        self.editing.clear_sessions();
        self.drafts = DraftStore::default();
        self.selection.clear();
        self.requests = RequestPanel::default();
        self.requests_seq += 1;
        self.loading_requests = false;
        self.cursor = 0;
        self.column = Column::Start;
        self.navigate_to(AppView::Details);
        self.load_details();
    }

    fn shift_range(&mut self, weeks: i64) {
        self.range = self.range.shifted_weeks(weeks);
        self.notice = Some(Notice::info(format!("Showing {}", self.range)));
        self.load_users();
        if self.user.is_some() {
            self.editing.clear_sessions();
            self.drafts = DraftStore::default();
            self.selection.clear();
            self.load_details();
            self.requests_seq += 1;
            self.loading_requests = false;
            if self.view == AppView::Requests {
                self.load_requests();
            }
        }
    }

    fn load_users(&mut self) {
        self.users_seq += 1;
        self.loading_users = true;
        self.worker.submit(Job::Users {
            seq: self.users_seq,
            range: self.range,
        });
    }

    fn load_resources(&mut self) {
        self.worker.submit(Job::Resources {
            company_id: self.company_id,
        });
    }

    /// Re-fetches the open user's range. Only the newest request is applied.
    fn load_details(&mut self) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        self.details_seq += 1;
        self.loading_details = true;
        self.worker.submit(Job::Details {
            seq: self.details_seq,
            user_id,
            range: self.range,
        });
    }

    fn load_requests(&mut self) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        self.requests_seq += 1;
        self.loading_requests = true;
        self.worker.submit(Job::Requests {
            seq: self.requests_seq,
            user_id,
            range: self.range,
        });
    }

    fn submit_mutation(&mut self, origin: Origin, mutation: Mutation) {
        self.worker.submit(Job::Mutate { origin, mutation });
    }

    fn handle_result(&mut self, result: JobResult) {
        match result {
            JobResult::Users { seq, result } => {
                if seq != self.users_seq {
                    debug!(seq, latest = self.users_seq, "stale_users_dropped");
                    return;
                }
                self.loading_users = false;
                match result {
                    Ok(users) => {
                        if let Some(current) = self.user.as_mut() {
                            if let Some(found) =
                                users.iter().find(|user| user.user_id == current.user_id)
                            {
                                *current = found.clone();
                            }
                        }
                        self.users = users;
                        if self.selected_user_index >= self.users.len() {
                            self.selected_user_index = self.users.len().saturating_sub(1);
                        }
                    }
                    Err(err) => self.report(&err, "Failed to load users"),
                }
            }
            JobResult::Details {
                seq,
                user_id,
                result,
            } => {
                if seq != self.details_seq || self.user_id() != Some(user_id) {
                    debug!(seq, latest = self.details_seq, "stale_details_dropped");
                    return;
                }
                self.loading_details = false;
                match result {
                    Ok(payload) => self.apply_details(payload),
                    Err(err) => self.report(&err, "Failed to load timesheet"),
                }
            }
            JobResult::Resources(result) => match result {
                Ok(resources) => {
                    self.shifts = resources.shifts;
                    self.projects = resources.projects;
                }
                Err(err) => self.report(&err, "Failed to load shifts and projects"),
            },
            JobResult::Requests {
                seq,
                user_id,
                result,
            } => {
                if seq != self.requests_seq || self.user_id() != Some(user_id) {
                    debug!(seq, latest = self.requests_seq, "stale_requests_dropped");
                    return;
                }
                self.loading_requests = false;
                match result {
                    Ok(items) => self.requests.set_items(items),
                    Err(err) => self.report(&err, "Failed to load requests"),
                }
            }
            JobResult::Mutated {
                origin,
                mutation,
                result,
            } => self.finish_mutation(origin, &mutation, result),
        }
    }

    fn report(&mut self, err: &ApiError, context: &str) {
        self.notice = Some(Notice::error(format!("{context}: {err}")));
    }

    fn apply_details(&mut self, mut payload: DetailsPayload) {
        let anchor = self.cursor_anchor();
        let weeks = std::mem::take(&mut payload.info);
        self.rows = project_rows(&weeks);
        self.stats = payload;
        self.selection.prune(&self.rows);
        let present = days(&self.rows)
            .flat_map(|day| day.worklogs().iter().map(|log| log.worklog_id))
            .collect::<HashSet<_>>();
        self.editing.retain_present(&present);
        if self.selected_conflict_index >= self.stats.conflicts.len() {
            self.selected_conflict_index = self.stats.conflicts.len().saturating_sub(1);
        }
        self.restore_cursor(anchor);
    }

    fn finish_mutation(
        &mut self,
        origin: Origin,
        mutation: &Mutation,
        result: Result<String, ApiError>,
    ) {
        match &origin {
            Origin::Worklog(id) => self.editing.finish_save(*id),
            Origin::Draft(key) => {
                let outcome = result.as_ref().map(|_| ()).map_err(|err| err.to_string());
                self.drafts.finish_save(key, outcome);
            }
            Origin::Bulk => {
                self.bulk_pending = self.bulk_pending.saturating_sub(1);
                if result.is_ok() {
                    self.selection.clear();
                }
            }
            Origin::Requests => self.load_requests(),
        }
        self.notice = Some(match result {
            Ok(message) => Notice::success(message),
            Err(err) => Notice::error(format!("{} failed: {err}", mutation.endpoint())),
        });
        self.load_details();
    }

    fn cursor_anchor(&self) -> Option<(DayKey, LineKind)> {
        let line = self.current_line()?;
        let day = self.rows.get(line.row)?.as_day()?;
        Some((day.key.clone(), line.kind))
    }

    /// Puts the cursor back on the same line after the rows were rebuilt,
    /// falling back to the same day and then to the first editable line.
    fn restore_cursor(&mut self, anchor: Option<(DayKey, LineKind)>) {
        let lines = self.lines();
        let day_of = |line: &GridLine| self.rows.get(line.row).and_then(DailyRow::as_day);
        let position = anchor.and_then(|(key, kind)| {
            lines
                .iter()
                .position(|line| line.kind == kind && day_of(line).is_some_and(|day| day.key == key))
                .or_else(|| {
                    lines
                        .iter()
                        .position(|line| day_of(line).is_some_and(|day| day.key == key))
                })
        });
        self.cursor = position
            .or_else(|| lines.iter().position(|line| line.kind != LineKind::WeekHeader))
            .unwrap_or(0);
    }

    fn move_cursor(&mut self, step: isize) {
        self.leave_cell();
        let lines = self.lines();
        let mut index = self.cursor as isize;
        loop {
            index += step;
            if index < 0 || index as usize >= lines.len() {
                return;
            }
            if lines[index as usize].kind != LineKind::WeekHeader {
                self.cursor = index as usize;
                return;
            }
        }
    }

    fn move_column(&mut self, column: Column) {
        if column != self.column {
            self.leave_cell();
            self.column = column;
        }
    }

    /// Leaving a draft time cell counts as a blur.
    fn leave_cell(&mut self) {
        let (Some(key), Some(field)) = (self.current_draft(), self.column.time_field()) else {
            return;
        };
        self.apply_draft(&key, DraftEvent::Blur(field));
    }

    fn activate_cell(&mut self) {
        let Some(line) = self.current_line() else {
            return;
        };
        match line.kind {
            LineKind::WeekHeader => {}
            LineKind::Placeholder => self.add_draft(),
            LineKind::Worklog(id) => self.open_worklog_cell(id),
            LineKind::Draft(key) => match self.column {
                Column::Shift => {
                    let ids = self.shifts.iter().map(|shift| shift.id).collect::<Vec<_>>();
                    let current = self.drafts.get(&key).and_then(|draft| draft.shift_id);
                    if let Some(next) = cycle_id(&ids, current, 1) {
                        self.apply_draft(&key, DraftEvent::SetShift(next));
                    }
                }
                Column::Project => {
                    let current = self.drafts.get(&key).and_then(|draft| draft.project_id);
                    let next = next_optional_project(&self.projects, current);
                    self.apply_draft(&key, DraftEvent::SetProject(next));
                }
                Column::Start | Column::End => self.leave_cell(),
            },
        }
    }

    fn open_worklog_cell(&mut self, id: WorklogId) {
        let Some(log) = self.worklog(id).cloned() else {
            return;
        };
        if log.is_locked() {
            self.notice = Some(Notice::info(EditError::Locked.to_string()));
            return;
        }
        if self.editing.is_saving(id) {
            self.notice = Some(Notice::info("This worklog is still saving."));
            return;
        }
        match self.column {
            Column::Start => self.editing.start_editing_field(id, TimeField::Start, &log),
            Column::End => self.editing.start_editing_field(id, TimeField::End, &log),
            Column::Shift => self.editing.start_editing_shift(id, &log),
            Column::Project => self.editing.start_editing_project(id, &log),
        };
    }

    fn save_time(&mut self, id: WorklogId) {
        let Some(log) = self.worklog(id).cloned() else {
            self.editing.cancel_editing_field(id);
            return;
        };
        match self.editing.save_field_changes(id, &log) {
            Ok(outcome) => self.dispatch_outcome(id, outcome),
            Err(err) => self.notice = Some(Notice::error(err.to_string())),
        }
    }

    fn dispatch_outcome(&mut self, id: WorklogId, outcome: SaveOutcome) {
        match outcome {
            SaveOutcome::NoSession | SaveOutcome::Unchanged => {}
            SaveOutcome::Discarded => {
                self.notice = Some(Notice::info("Worklog is locked; the edit was discarded."));
            }
            SaveOutcome::Send(mutation) => self.submit_mutation(Origin::Worklog(id), mutation),
        }
    }

    fn add_draft(&mut self) {
        let Some(date) = self.current_day().map(|day| day.date.clone()) else {
            return;
        };
        if self.shifts.is_empty() {
            self.notice = Some(Notice::info("No shifts loaded yet; pick one before saving."));
        }
        let key = self.drafts.start_adding_new_record(
            &date,
            &self.projects,
            &self.shifts,
            Local::now().timestamp_millis(),
        );
        if let Some(index) = self
            .lines()
            .iter()
            .position(|line| line.kind == LineKind::Draft(key.clone()))
        {
            self.cursor = index;
        }
        self.column = Column::Start;
    }

    fn cancel_draft(&mut self) {
        let Some(key) = self.current_draft() else {
            return;
        };
        if !self.drafts.cancel(&key) {
            self.notice = Some(Notice::info("This entry is still saving."));
            return;
        }
        let lines = self.lines();
        if self.cursor >= lines.len() {
            self.cursor = lines.len().saturating_sub(1);
        }
        if lines
            .get(self.cursor)
            .is_some_and(|line| line.kind == LineKind::WeekHeader)
        {
            self.move_cursor(-1);
        }
    }

    fn edit_draft_time(&mut self, edit: impl FnOnce(&mut String)) {
        let (Some(key), Some(field)) = (self.current_draft(), self.column.time_field()) else {
            return;
        };
        let Some(draft) = self.drafts.get(&key) else {
            return;
        };
        let mut value = draft.time(field).to_string();
        edit(&mut value);
        self.apply_draft(&key, DraftEvent::EditTime(field, value));
    }

    /// Feeds an event to a draft and sends it when it just became ready.
    fn apply_draft(&mut self, key: &DraftKey, event: DraftEvent) {
        if self.drafts.apply(key, event) {
            self.save_draft(key);
        }
    }

    fn save_draft(&mut self, key: &DraftKey) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        match self.drafts.save_new_record(key, user_id, &self.range) {
            Ok(mutation) => self.submit_mutation(Origin::Draft(key.clone()), mutation),
            Err(err) => self.notice = Some(Notice::error(err.to_string())),
        }
    }

    fn bulk_lock(&mut self, lock: bool) {
        let status = self.selection.lock_status(&self.rows);
        if self.selection.is_empty() {
            self.notice = Some(Notice::error(EditError::NothingSelected.to_string()));
            return;
        }
        if lock && !status.has_unlocked_rows {
            self.notice = Some(Notice::info("The selected days are already locked."));
            return;
        }
        if !lock && !status.has_locked_rows {
            self.notice = Some(Notice::info("The selected days are already unlocked."));
            return;
        }
        let result = if lock {
            self.selection.lock_mutation(&self.rows)
        } else {
            self.selection.unlock_mutation(&self.rows)
        };
        self.submit_bulk(result);
    }

    fn confirm_delete(&mut self) {
        let worklogs = self.selection.worklog_ids(&self.rows).len();
        if worklogs == 0 {
            self.notice = Some(Notice::error(EditError::NothingSelected.to_string()));
            return;
        }
        self.confirm_popup = Some(ConfirmPopup {
            message: format!(
                "Delete {worklogs} worklog(s) on {} selected day(s)?",
                self.selection.len()
            ),
            action: ConfirmAction::DeleteSelected,
        });
    }

    fn submit_bulk(&mut self, result: Result<Mutation, EditError>) {
        if self.bulk_pending > 0 {
            self.notice = Some(Notice::info("A bulk action is already running."));
            return;
        }
        match result {
            Ok(mutation) => {
                self.bulk_pending += 1;
                self.submit_mutation(Origin::Bulk, mutation);
            }
            Err(err) => self.notice = Some(Notice::error(err.to_string())),
        }
    }

    fn jump_to_conflict(&mut self) {
        let Some(conflict) = self.stats.conflicts.get(self.selected_conflict_index).cloned() else {
            return;
        };
        let key = DayKey(conflict.date.clone());
        let lines = self.lines();
        let day_of = |line: &GridLine| self.rows.get(line.row).and_then(DailyRow::as_day);
        let target = conflict
            .worklog_id
            .and_then(|id| lines.iter().position(|line| line.kind == LineKind::Worklog(id)))
            .or_else(|| {
                lines
                    .iter()
                    .position(|line| day_of(line).is_some_and(|day| day.key == key))
            });
        match target {
            Some(index) => {
                self.cursor = index;
                self.column = Column::Start;
                self.navigate_to(AppView::Details);
            }
            None => {
                self.notice = Some(Notice::error(format!(
                    "{} is not in the loaded range.",
                    conflict.date
                )));
            }
        }
    }
}

/// Steps through `ids` from `current`, wrapping; starts at the first id when
/// `current` is not among them.
fn cycle_id(ids: &[u32], current: Option<u32>, step: isize) -> Option<u32> {
    if ids.is_empty() {
        return None;
    }
    let Some(position) = current.and_then(|id| ids.iter().position(|candidate| *candidate == id))
    else {
        return ids.first().copied();
    };
    let len = ids.len() as isize;
    let next = (position as isize + step).rem_euclid(len) as usize;
    ids.get(next).copied()
}

/// Project cycling for drafts includes "no project" after the last one.
fn next_optional_project(projects: &[Project], current: Option<u32>) -> Option<u32> {
    match current {
        None => projects.first().map(|project| project.id),
        Some(id) => {
            let position = projects.iter().position(|project| project.id == id)?;
            projects.get(position + 1).map(|project| project.id)
        }
    }
}
