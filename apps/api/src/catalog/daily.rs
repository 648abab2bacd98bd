use crate::models::profile::DailyTask;

/// Recurring tasks present on every profile. Reconciled by text on login.
pub const FIXED_DAILY_TASKS: &[(&str, &str)] = &[
    ("fixed-dsa", "Solve 2 DSA problems"),
    ("fixed-reading", "Read one engineering blog post"),
    ("fixed-project", "30 minutes of project work"),
    ("fixed-flashcards", "Review today's flashcards"),
];

pub fn fixed_daily_tasks() -> Vec<DailyTask> {
    FIXED_DAILY_TASKS
        .iter()
        .map(|(id, text)| DailyTask {
            id: id.to_string(),
            text: text.to_string(),
            completed: false,
            is_fixed: true,
        })
        .collect()
}
