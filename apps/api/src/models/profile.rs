use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::roadmap::RoadmapItem;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTask {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// Seeded recurring task; cannot be deleted.
    #[serde(default)]
    pub is_fixed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkTask {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub word: String,
    pub meaning: String,
    #[serde(default)]
    pub example: String,
}

/// One day's language practice: a translation challenge plus vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinguaSession {
    pub date: NaiveDate,
    pub language: String,
    pub challenge: String,
    pub reference_answer: String,
    pub vocabulary: Vec<VocabularyEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// The stored per-user document, one per normalized username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    #[serde(default)]
    pub roadmap: Vec<RoadmapItem>,
    #[serde(default)]
    pub daily_tasks: Vec<DailyTask>,
    #[serde(default)]
    pub homework_tasks: Vec<HomeworkTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lingua_session: Option<LinguaSession>,
    pub last_active: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reset_date: Option<NaiveDate>,
}

/// Partial write: only `Some` fields overwrite the stored document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roadmap: Option<Vec<RoadmapItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_tasks: Option<Vec<DailyTask>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homework_tasks: Option<Vec<HomeworkTask>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lingua_session: Option<LinguaSession>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reset_date: Option<NaiveDate>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the patch field by field, mirroring the store's top-level merge.
    pub fn apply_to(self, doc: &mut ProfileDocument) {
        if let Some(roadmap) = self.roadmap {
            doc.roadmap = roadmap;
        }
        if let Some(daily) = self.daily_tasks {
            doc.daily_tasks = daily;
        }
        if let Some(homework) = self.homework_tasks {
            doc.homework_tasks = homework;
        }
        if let Some(session) = self.lingua_session {
            doc.lingua_session = Some(session);
        }
        if let Some(date) = self.last_reset_date {
            doc.last_reset_date = Some(date);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = ProfilePatch {
            homework_tasks: Some(vec![]),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert!(obj.contains_key("homeworkTasks"));
    }

    #[test]
    fn test_document_tolerates_missing_task_lists() {
        let json = r#"{"roadmap": [], "lastActive": "2026-01-05T10:00:00Z"}"#;
        let doc: ProfileDocument = serde_json::from_str(json).unwrap();
        assert!(doc.daily_tasks.is_empty());
        assert!(doc.homework_tasks.is_empty());
        assert!(doc.lingua_session.is_none());
        assert!(doc.last_reset_date.is_none());
    }

    #[test]
    fn test_apply_keeps_untouched_fields() {
        let mut doc = ProfileDocument {
            roadmap: vec![],
            daily_tasks: vec![DailyTask {
                id: "d1".into(),
                text: "Read".into(),
                completed: true,
                is_fixed: false,
            }],
            homework_tasks: vec![],
            lingua_session: None,
            last_active: Utc::now(),
            last_reset_date: None,
        };
        ProfilePatch {
            homework_tasks: Some(vec![HomeworkTask {
                id: "h1".into(),
                text: "Lab 3".into(),
                completed: false,
            }]),
            ..Default::default()
        }
        .apply_to(&mut doc);
        assert_eq!(doc.daily_tasks.len(), 1);
        assert_eq!(doc.homework_tasks.len(), 1);
    }
}
