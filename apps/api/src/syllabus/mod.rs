//! Per-user syllabus checklist over the static course catalog.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::syllabus::{find_course, Course, COURSES};
use crate::persistence::device::{device_key, DeviceStore, DeviceStoreError};

pub mod handlers;

const SYLLABUS_SLOT: &str = "syllabus";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyllabusError {
    #[error("unknown course '{0}'")]
    UnknownCourse(String),

    #[error("course {code} has no unit {index}")]
    UnknownUnit { code: String, index: usize },
}

/// Completed units as `{COURSE}:{unitIndex}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyllabusProgress {
    pub completed: BTreeSet<String>,
}

fn unit_key(code: &str, index: usize) -> String {
    format!("{code}:{index}")
}

fn percentage(done: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * done as f64 / total as f64).round() as u32
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub code: &'static str,
    pub title: &'static str,
    pub completed_units: Vec<usize>,
    pub total_units: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyllabusReport {
    pub overall: u32,
    pub courses: Vec<CourseProgress>,
}

impl SyllabusProgress {
    pub fn is_done(&self, code: &str, index: usize) -> bool {
        self.completed.contains(&unit_key(code, index))
    }

    /// Flips one unit. Returns the new state.
    pub fn toggle(&mut self, code: &str, index: usize) -> Result<bool, SyllabusError> {
        let course = find_course(code).ok_or_else(|| SyllabusError::UnknownCourse(code.to_string()))?;
        if index >= course.units.len() {
            return Err(SyllabusError::UnknownUnit {
                code: course.code.to_string(),
                index,
            });
        }
        let key = unit_key(course.code, index);
        if self.completed.remove(&key) {
            Ok(false)
        } else {
            self.completed.insert(key);
            Ok(true)
        }
    }

    fn course_progress(&self, course: &'static Course) -> CourseProgress {
        let completed_units: Vec<usize> = (0..course.units.len())
            .filter(|i| self.is_done(course.code, *i))
            .collect();
        CourseProgress {
            code: course.code,
            title: course.title,
            percentage: percentage(completed_units.len(), course.units.len()),
            completed_units,
            total_units: course.units.len(),
        }
    }

    pub fn report(&self) -> SyllabusReport {
        let courses: Vec<CourseProgress> = COURSES.iter().map(|c| self.course_progress(c)).collect();
        let done: usize = courses.iter().map(|c| c.completed_units.len()).sum();
        let total: usize = courses.iter().map(|c| c.total_units).sum();
        SyllabusReport {
            overall: percentage(done, total),
            courses,
        }
    }
}

pub async fn load_progress(
    device: &dyn DeviceStore,
    username_key: &str,
) -> Result<SyllabusProgress, DeviceStoreError> {
    Ok(device
        .get_json(&device_key(username_key, SYLLABUS_SLOT))
        .await?
        .unwrap_or_default())
}

pub async fn save_progress(
    device: &dyn DeviceStore,
    username_key: &str,
    progress: &SyllabusProgress,
) -> Result<(), DeviceStoreError> {
    device
        .set_json(&device_key(username_key, SYLLABUS_SLOT), progress, None)
        .await
}
