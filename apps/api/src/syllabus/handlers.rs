use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::catalog::syllabus::{Course, Elective, COURSES, ELECTIVES};
use crate::errors::AppError;
use crate::state::AppState;
use crate::syllabus::{load_progress, save_progress, SyllabusReport};
use crate::workspace::handlers::workspace_for;

#[derive(Serialize)]
pub struct SyllabusCatalog {
    pub courses: &'static [Course],
    pub electives: &'static [Elective],
}

/// GET /api/v1/syllabus
pub async fn handle_catalog() -> Json<SyllabusCatalog> {
    Json(SyllabusCatalog {
        courses: COURSES,
        electives: ELECTIVES,
    })
}

/// GET /api/v1/users/:username/syllabus
pub async fn handle_progress(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<SyllabusReport>, AppError> {
    let workspace = workspace_for(&state, &username).await?;
    let ws = workspace.lock().await;
    let progress = load_progress(state.device.as_ref(), ws.username_key()).await?;
    Ok(Json(progress.report()))
}

/// POST /api/v1/users/:username/syllabus/:code/units/:index/toggle
pub async fn handle_toggle_unit(
    State(state): State<AppState>,
    Path((username, code, index)): Path<(String, String, usize)>,
) -> Result<Json<SyllabusReport>, AppError> {
    let workspace = workspace_for(&state, &username).await?;
    let ws = workspace.lock().await;
    let mut progress = load_progress(state.device.as_ref(), ws.username_key()).await?;
    progress.toggle(&code, index)?;
    save_progress(state.device.as_ref(), ws.username_key(), &progress).await?;
    Ok(Json(progress.report()))
}
