//! Daily and homework task engine. Direct list mutations keyed by id.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::models::profile::{DailyTask, HomeworkTask};
use crate::persistence::profile::reset_daily_if_new_day;
use crate::workspace::{Celebration, Workspace, WorkspaceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    pub completed: bool,
    /// True only on the toggle that completes the whole list.
    pub celebrate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub removed: bool,
    /// True when removing the task left every remaining one complete.
    pub celebrate: bool,
}

/// An empty list is never "all complete".
pub fn all_complete(flags: impl IntoIterator<Item = bool>) -> bool {
    let mut any = false;
    for done in flags {
        if !done {
            return false;
        }
        any = true;
    }
    any
}

fn clean_text(text: &str) -> Result<String, WorkspaceError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(WorkspaceError::EmptyTaskText);
    }
    Ok(text.to_string())
}

impl Workspace {
    pub fn daily_tasks(&self) -> &[DailyTask] {
        &self.daily_tasks
    }

    pub fn homework_tasks(&self) -> &[HomeworkTask] {
        &self.homework_tasks
    }

    pub fn all_daily_complete(&self) -> bool {
        all_complete(self.daily_tasks.iter().map(|t| t.completed))
    }

    /// Clears daily completion flags the first time the workspace is touched
    /// on a new calendar day. Returns true when anything was reset.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if !reset_daily_if_new_day(&mut self.daily_tasks, &mut self.last_reset_date, today) {
            return false;
        }
        self.daily_celebration = Celebration::primed(self.all_daily_complete());
        true
    }

    pub fn toggle_daily(&mut self, task_id: &str) -> Result<ToggleOutcome, WorkspaceError> {
        let task = self
            .daily_tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| WorkspaceError::UnknownTask(task_id.to_string()))?;
        task.completed = !task.completed;
        let completed = task.completed;
        let celebrate = self
            .daily_celebration
            .observe(all_complete(self.daily_tasks.iter().map(|t| t.completed)));
        Ok(ToggleOutcome {
            completed,
            celebrate,
        })
    }

    pub fn add_daily(&mut self, text: &str) -> Result<DailyTask, WorkspaceError> {
        let task = DailyTask {
            id: Uuid::new_v4().to_string(),
            text: clean_text(text)?,
            completed: false,
            is_fixed: false,
        };
        self.daily_tasks.push(task.clone());
        self.daily_celebration.observe(false);
        Ok(task)
    }

    /// Removes a user-added daily task. Fixed tasks are left in place and
    /// report `removed: false`.
    pub fn delete_daily(&mut self, task_id: &str) -> Result<DeleteOutcome, WorkspaceError> {
        let index = self
            .daily_tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| WorkspaceError::UnknownTask(task_id.to_string()))?;
        if self.daily_tasks[index].is_fixed {
            return Ok(DeleteOutcome {
                removed: false,
                celebrate: false,
            });
        }
        self.daily_tasks.remove(index);
        let celebrate = self.daily_celebration.observe(self.all_daily_complete());
        Ok(DeleteOutcome {
            removed: true,
            celebrate,
        })
    }

    pub fn toggle_homework(&mut self, task_id: &str) -> Result<ToggleOutcome, WorkspaceError> {
        let task = self
            .homework_tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| WorkspaceError::UnknownTask(task_id.to_string()))?;
        task.completed = !task.completed;
        let completed = task.completed;
        let celebrate = self
            .homework_celebration
            .observe(all_complete(self.homework_tasks.iter().map(|t| t.completed)));
        Ok(ToggleOutcome {
            completed,
            celebrate,
        })
    }

    pub fn add_homework(&mut self, text: &str) -> Result<HomeworkTask, WorkspaceError> {
        let task = HomeworkTask {
            id: Uuid::new_v4().to_string(),
            text: clean_text(text)?,
            completed: false,
        };
        self.homework_tasks.push(task.clone());
        self.homework_celebration.observe(false);
        Ok(task)
    }

    pub fn delete_homework(&mut self, task_id: &str) -> Result<DeleteOutcome, WorkspaceError> {
        let before = self.homework_tasks.len();
        self.homework_tasks.retain(|t| t.id != task_id);
        if self.homework_tasks.len() == before {
            return Err(WorkspaceError::UnknownTask(task_id.to_string()));
        }
        let celebrate = self
            .homework_celebration
            .observe(all_complete(self.homework_tasks.iter().map(|t| t.completed)));
        Ok(DeleteOutcome {
            removed: true,
            celebrate,
        })
    }
}
