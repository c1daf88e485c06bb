/// Pending edit-request queue with approve/reject decisions.
use std::collections::BTreeSet;

use crate::api::{Mutation, RequestDecisionBody};
use crate::error::EditError;
use crate::types::{RequestId, RequestItem, RequestStatus, UserId};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RejectDialog {
    pub ids: Vec<RequestId>,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct RequestPanel {
    pub items: Vec<RequestItem>,
    pub cursor: usize,
    pub reject_dialog: Option<RejectDialog>,
    selected: BTreeSet<RequestId>,
}

impl RequestPanel {
    pub fn set_items(&mut self, items: Vec<RequestItem>) {
        self.items = items;
        let pending = self
            .items
            .iter()
            .filter(|item| item.status == RequestStatus::Pending)
            .map(|item| item.id)
            .collect::<BTreeSet<_>>();
        self.selected.retain(|id| pending.contains(id));
        if self.cursor >= self.items.len() {
            self.cursor = self.items.len().saturating_sub(1);
        }
    }

    pub fn pending_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.status == RequestStatus::Pending)
            .count()
    }

    pub fn is_selected(&self, id: RequestId) -> bool {
        self.selected.contains(&id)
    }

    pub fn current(&self) -> Option<&RequestItem> {
        self.items.get(self.cursor)
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
    }

    pub fn toggle_current(&mut self) {
        let Some(item) = self.current() else {
            return;
        };
        if item.status != RequestStatus::Pending {
            return;
        }
        let id = item.id;
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    pub fn toggle_all_pending(&mut self) {
        let pending = self
            .items
            .iter()
            .filter(|item| item.status == RequestStatus::Pending)
            .map(|item| item.id)
            .collect::<BTreeSet<_>>();
        if !pending.is_empty() && pending == self.selected {
            self.selected.clear();
        } else {
            self.selected = pending;
        }
    }

    /// The selected requests, or the one under the cursor when none are selected.
    pub fn target_ids(&self) -> Vec<RequestId> {
        if !self.selected.is_empty() {
            return self.selected.iter().copied().collect();
        }
        self.current()
            .filter(|item| item.status == RequestStatus::Pending)
            .map(|item| vec![item.id])
            .unwrap_or_default()
    }

    pub fn approve(&mut self, user_id: UserId) -> Result<Mutation, EditError> {
        let ids = self.target_ids();
        if ids.is_empty() {
            return Err(EditError::NothingSelected);
        }
        self.selected.clear();
        Ok(Mutation::ApproveRequests(RequestDecisionBody::new(
            &ids, user_id, None,
        )))
    }

    pub fn open_reject(&mut self) -> Result<(), EditError> {
        let ids = self.target_ids();
        if ids.is_empty() {
            return Err(EditError::NothingSelected);
        }
        self.reject_dialog = Some(RejectDialog {
            ids,
            reason: String::new(),
        });
        Ok(())
    }

    pub fn cancel_reject(&mut self) {
        self.reject_dialog = None;
    }

    /// Sends the rejection once a reason was typed; an empty reason keeps the dialog open.
    pub fn confirm_reject(&mut self, user_id: UserId) -> Result<Mutation, EditError> {
        let Some(dialog) = self.reject_dialog.as_ref() else {
            return Err(EditError::NothingSelected);
        };
        let reason = dialog.reason.trim();
        if reason.is_empty() {
            return Err(EditError::EmptyReason);
        }
        let mutation = Mutation::RejectRequests(RequestDecisionBody::new(
            &dialog.ids,
            user_id,
            Some(reason.to_string()),
        ));
        self.reject_dialog = None;
        self.selected.clear();
        Ok(mutation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: RequestId, status: RequestStatus) -> RequestItem {
        RequestItem {
            id,
            status,
            ..RequestItem::default()
        }
    }

    fn panel() -> RequestPanel {
        let mut panel = RequestPanel::default();
        panel.set_items(vec![
            item(1, RequestStatus::Pending),
            item(2, RequestStatus::Approved),
            item(3, RequestStatus::Pending),
        ]);
        panel
    }

    #[test]
    fn approve_targets_the_cursor_without_selection() {
        let mut panel = panel();
        let mutation = panel.approve(42).unwrap();
        assert_eq!(
            mutation,
            Mutation::ApproveRequests(RequestDecisionBody {
                ids: "1".to_string(),
                user_id: 42,
                reason: None,
            })
        );
    }

    #[test]
    fn decided_requests_cannot_be_targeted() {
        let mut panel = panel();
        panel.move_down();
        panel.toggle_current();
        assert_eq!(panel.approve(42), Err(EditError::NothingSelected));
    }

    #[test]
    fn bulk_approve_uses_all_pending() {
        let mut panel = panel();
        panel.toggle_all_pending();
        assert_eq!(panel.target_ids(), vec![1, 3]);
        panel.toggle_all_pending();
        assert!(panel.target_ids() == vec![1]);
    }

    #[test]
    fn reject_requires_a_reason() {
        let mut panel = panel();
        panel.toggle_all_pending();
        panel.open_reject().unwrap();
        assert_eq!(panel.confirm_reject(42), Err(EditError::EmptyReason));
        assert!(panel.reject_dialog.is_some());

        if let Some(dialog) = panel.reject_dialog.as_mut() {
            dialog.reason.push_str("  Clocked on wrong site ");
        }
        let mutation = panel.confirm_reject(42).unwrap();
        assert_eq!(
            mutation,
            Mutation::RejectRequests(RequestDecisionBody {
                ids: "1,3".to_string(),
                user_id: 42,
                reason: Some("Clocked on wrong site".to_string()),
            })
        );
        assert!(panel.reject_dialog.is_none());
    }

    #[test]
    fn reload_prunes_selection_and_cursor() {
        let mut panel = panel();
        panel.move_down();
        panel.move_down();
        panel.toggle_current();
        panel.set_items(vec![item(1, RequestStatus::Pending)]);
        assert_eq!(panel.cursor, 0);
        assert!(!panel.is_selected(3));
    }
}
