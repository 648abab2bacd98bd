//! The per-user application state container.
//!
//! Every mutation goes through a method on `Workspace`. Callers then notify
//! the `SessionRegistry` with `mark_dirty` so the debounced writer picks the
//! change up; nothing here touches storage directly.

use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::profile::{DailyTask, HomeworkTask, LinguaSession, ProfileDocument, ProfilePatch};
use crate::models::roadmap::{Priority, RoadmapItem, Status};
use crate::validator::ValidatorSession;

pub mod handlers;
pub mod progress;
pub mod sessions;
pub mod tasks;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("roadmap item '{0}' not found")]
    UnknownItem(String),

    #[error("task '{0}' not found")]
    UnknownTask(String),

    #[error("task text cannot be empty")]
    EmptyTaskText,

    #[error("'{0}' is high priority; pass the Socratic validator to complete it")]
    ValidationRequired(String),
}

/// Result of a roadmap status change.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub item: RoadmapItem,
    pub previous: Status,
}

impl StatusChange {
    pub fn newly_completed(&self) -> bool {
        self.previous != Status::Completed && self.item.status == Status::Completed
    }
}

/// Fires once when a list becomes fully complete; re-arms when it stops
/// being complete.
#[derive(Debug, Clone, Copy, Default)]
pub struct Celebration {
    fired: bool,
}

impl Celebration {
    /// Arms already-complete lists as fired so loading them does not celebrate.
    pub fn primed(all_done: bool) -> Self {
        Self { fired: all_done }
    }

    pub fn observe(&mut self, all_done: bool) -> bool {
        if !all_done {
            self.fired = false;
            return false;
        }
        if self.fired {
            return false;
        }
        self.fired = true;
        true
    }
}

pub struct Workspace {
    username_key: String,
    roadmap: Vec<RoadmapItem>,
    daily_tasks: Vec<DailyTask>,
    homework_tasks: Vec<HomeworkTask>,
    lingua_session: Option<LinguaSession>,
    last_reset_date: Option<NaiveDate>,
    daily_celebration: Celebration,
    homework_celebration: Celebration,
    /// In-flight Socratic validator sessions keyed by roadmap item id.
    pub validators: HashMap<String, ValidatorSession>,
}

impl Workspace {
    pub fn from_document(username_key: String, document: ProfileDocument) -> Self {
        let daily_done = tasks::all_complete(document.daily_tasks.iter().map(|t| t.completed));
        let homework_done =
            tasks::all_complete(document.homework_tasks.iter().map(|t| t.completed));
        Self {
            username_key,
            roadmap: document.roadmap,
            daily_tasks: document.daily_tasks,
            homework_tasks: document.homework_tasks,
            lingua_session: document.lingua_session,
            last_reset_date: document.last_reset_date,
            daily_celebration: Celebration::primed(daily_done),
            homework_celebration: Celebration::primed(homework_done),
            validators: HashMap::new(),
        }
    }

    /// Replaces the profile data with a freshly loaded document. Open
    /// validator sessions survive; they are not part of the document.
    pub fn reload(&mut self, document: ProfileDocument) {
        let validators = std::mem::take(&mut self.validators);
        *self = Workspace::from_document(self.username_key.clone(), document);
        self.validators = validators;
    }

    pub fn username_key(&self) -> &str {
        &self.username_key
    }

    /// Everything the profile store holds for this user.
    pub fn snapshot(&self) -> ProfilePatch {
        ProfilePatch {
            roadmap: Some(self.roadmap.clone()),
            daily_tasks: Some(self.daily_tasks.clone()),
            homework_tasks: Some(self.homework_tasks.clone()),
            lingua_session: self.lingua_session.clone(),
            last_reset_date: self.last_reset_date,
        }
    }

    pub fn roadmap(&self) -> &[RoadmapItem] {
        &self.roadmap
    }

    pub fn item(&self, item_id: &str) -> Result<&RoadmapItem, WorkspaceError> {
        self.roadmap
            .iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| WorkspaceError::UnknownItem(item_id.to_string()))
    }

    fn item_mut(&mut self, item_id: &str) -> Result<&mut RoadmapItem, WorkspaceError> {
        self.roadmap
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| WorkspaceError::UnknownItem(item_id.to_string()))
    }

    /// Sets an item's status. Completing a high-priority item is refused here;
    /// that transition belongs to the validator (`complete_validated`).
    pub fn set_status(
        &mut self,
        item_id: &str,
        status: Status,
    ) -> Result<StatusChange, WorkspaceError> {
        let item = self.item_mut(item_id)?;
        if status == Status::Completed
            && item.priority == Priority::High
            && item.status != Status::Completed
        {
            return Err(WorkspaceError::ValidationRequired(item.name.clone()));
        }
        let previous = item.status;
        item.status = status;
        Ok(StatusChange {
            item: item.clone(),
            previous,
        })
    }

    /// Completes an item after the validator let it through.
    pub fn complete_validated(&mut self, item_id: &str) -> Result<StatusChange, WorkspaceError> {
        let item = self.item_mut(item_id)?;
        let previous = item.status;
        item.status = Status::Completed;
        Ok(StatusChange {
            item: item.clone(),
            previous,
        })
    }

    pub fn lingua_session(&self) -> Option<&LinguaSession> {
        self.lingua_session.as_ref()
    }

    pub fn set_lingua_session(&mut self, session: LinguaSession) {
        self.lingua_session = Some(session);
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{first_with_priority, workspace};
    use super::*;

    #[test]
    fn test_set_status_on_medium_item() {
        let mut ws = workspace();
        let id = first_with_priority(&ws, Priority::Medium);
        let change = ws.set_status(&id, Status::Completed).unwrap();
        assert_eq!(change.previous, Status::ToDo);
        assert!(change.newly_completed());
        assert_eq!(ws.item(&id).unwrap().status, Status::Completed);
    }

    #[test]
    fn test_high_priority_completion_requires_validation() {
        let mut ws = workspace();
        let id = first_with_priority(&ws, Priority::High);
        let err = ws.set_status(&id, Status::Completed).unwrap_err();
        assert!(matches!(err, WorkspaceError::ValidationRequired(_)));
        assert_eq!(ws.item(&id).unwrap().status, Status::ToDo);

        ws.set_status(&id, Status::InProgress).unwrap();
        assert_eq!(ws.item(&id).unwrap().status, Status::InProgress);
    }

    #[test]
    fn test_complete_validated_bypasses_gate() {
        let mut ws = workspace();
        let id = first_with_priority(&ws, Priority::High);
        let change = ws.complete_validated(&id).unwrap();
        assert!(change.newly_completed());
        // Re-marking a completed item is not a new completion.
        let again = ws.set_status(&id, Status::Completed).unwrap();
        assert!(!again.newly_completed());
    }

    #[test]
    fn test_unknown_item() {
        let mut ws = workspace();
        assert_eq!(
            ws.set_status("nope", Status::Revisit).unwrap_err(),
            WorkspaceError::UnknownItem("nope".into())
        );
    }

    #[test]
    fn test_celebration_fires_once_and_rearms() {
        let mut c = Celebration::default();
        assert!(!c.observe(false));
        assert!(c.observe(true));
        assert!(!c.observe(true));
        assert!(!c.observe(false));
        assert!(c.observe(true));
    }

    #[test]
    fn test_snapshot_carries_all_fields() {
        let ws = workspace();
        let patch = ws.snapshot();
        assert_eq!(patch.roadmap.unwrap().len(), ws.roadmap().len());
        assert!(patch.daily_tasks.is_some());
        assert!(patch.homework_tasks.is_some());
    }
}
