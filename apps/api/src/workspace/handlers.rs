use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::profile::{DailyTask, HomeworkTask};
use crate::models::roadmap::{RoadmapItem, Role, Status};
use crate::shop::reward_completion;
use crate::state::AppState;
use crate::workspace::progress::{build_report, ProgressReport, RoadmapFilter};
use crate::workspace::sessions::SharedWorkspace;
use crate::workspace::tasks::{DeleteOutcome, ToggleOutcome};

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// The caller's workspace, logging in implicitly when none is loaded.
pub(crate) async fn workspace_for(
    state: &AppState,
    username: &str,
) -> Result<SharedWorkspace, AppError> {
    Ok(state.sessions.workspace(username, today()).await?)
}

// ─── Session ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub username_key: String,
    pub created: bool,
    pub added_items: usize,
    pub roadmap_items: usize,
}

/// POST /api/v1/session/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (_, outcome) = state.sessions.login(&req.username, today()).await?;
    Ok(Json(LoginResponse {
        roadmap_items: outcome.document.roadmap.len(),
        username_key: outcome.username_key,
        created: outcome.created,
        added_items: outcome.added_items,
    }))
}

/// POST /api/v1/session/flush
pub async fn handle_flush(State(state): State<AppState>) -> StatusCode {
    state.sessions.flush().await;
    StatusCode::NO_CONTENT
}

// ─── Roadmap ────────────────────────────────────────────────────────────────

/// GET /api/v1/users/:username/roadmap
pub async fn handle_list_roadmap(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(filter): Query<RoadmapFilter>,
) -> Result<Json<Vec<RoadmapItem>>, AppError> {
    let workspace = workspace_for(&state, &username).await?;
    let ws = workspace.lock().await;
    let items = ws
        .roadmap()
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect();
    Ok(Json(items))
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: Status,
}

/// PATCH /api/v1/users/:username/roadmap/:item_id
///
/// Completing a high-priority item is refused with 409; use the validator.
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path((username, item_id)): Path<(String, String)>,
    Json(req): Json<StatusUpdate>,
) -> Result<Json<RoadmapItem>, AppError> {
    let workspace = workspace_for(&state, &username).await?;
    let mut ws = workspace.lock().await;
    let change = ws.set_status(&item_id, req.status)?;
    state.sessions.mark_dirty(ws.username_key());

    if change.newly_completed() {
        // Still under the workspace lock, so wallet updates for one user
        // never interleave.
        reward_completion(state.device.as_ref(), ws.username_key(), &change.item).await;
    }
    Ok(Json(change.item))
}

#[derive(Deserialize)]
pub struct RoleQuery {
    pub role: Option<Role>,
}

/// GET /api/v1/users/:username/progress
pub async fn handle_progress(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<ProgressReport>, AppError> {
    let workspace = workspace_for(&state, &username).await?;
    let ws = workspace.lock().await;
    Ok(Json(build_report(ws.roadmap(), query.role)))
}

// ─── Tasks ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBoard {
    pub daily_tasks: Vec<DailyTask>,
    pub homework_tasks: Vec<HomeworkTask>,
    pub all_daily_complete: bool,
}

#[derive(Deserialize)]
pub struct NewTask {
    pub text: String,
}

/// GET /api/v1/users/:username/tasks
pub async fn handle_list_tasks(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<TaskBoard>, AppError> {
    let workspace = workspace_for(&state, &username).await?;
    let ws = workspace.lock().await;
    Ok(Json(TaskBoard {
        daily_tasks: ws.daily_tasks().to_vec(),
        homework_tasks: ws.homework_tasks().to_vec(),
        all_daily_complete: ws.all_daily_complete(),
    }))
}

/// POST /api/v1/users/:username/tasks/daily
pub async fn handle_add_daily(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<NewTask>,
) -> Result<(StatusCode, Json<DailyTask>), AppError> {
    let workspace = workspace_for(&state, &username).await?;
    let mut ws = workspace.lock().await;
    let task = ws.add_daily(&req.text)?;
    state.sessions.mark_dirty(ws.username_key());
    Ok((StatusCode::CREATED, Json(task)))
}

/// POST /api/v1/users/:username/tasks/daily/:task_id/toggle
pub async fn handle_toggle_daily(
    State(state): State<AppState>,
    Path((username, task_id)): Path<(String, String)>,
) -> Result<Json<ToggleOutcome>, AppError> {
    let workspace = workspace_for(&state, &username).await?;
    let mut ws = workspace.lock().await;
    let outcome = ws.toggle_daily(&task_id)?;
    state.sessions.mark_dirty(ws.username_key());
    if outcome.celebrate {
        info!("{} finished every daily task", ws.username_key());
    }
    Ok(Json(outcome))
}

/// DELETE /api/v1/users/:username/tasks/daily/:task_id
///
/// Fixed tasks stay put and report `removed: false`.
pub async fn handle_delete_daily(
    State(state): State<AppState>,
    Path((username, task_id)): Path<(String, String)>,
) -> Result<Json<DeleteOutcome>, AppError> {
    let workspace = workspace_for(&state, &username).await?;
    let mut ws = workspace.lock().await;
    let outcome = ws.delete_daily(&task_id)?;
    if outcome.removed {
        state.sessions.mark_dirty(ws.username_key());
    }
    if outcome.celebrate {
        info!("{} finished every daily task", ws.username_key());
    }
    Ok(Json(outcome))
}

/// POST /api/v1/users/:username/tasks/homework
pub async fn handle_add_homework(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<NewTask>,
) -> Result<(StatusCode, Json<HomeworkTask>), AppError> {
    let workspace = workspace_for(&state, &username).await?;
    let mut ws = workspace.lock().await;
    let task = ws.add_homework(&req.text)?;
    state.sessions.mark_dirty(ws.username_key());
    Ok((StatusCode::CREATED, Json(task)))
}

/// POST /api/v1/users/:username/tasks/homework/:task_id/toggle
pub async fn handle_toggle_homework(
    State(state): State<AppState>,
    Path((username, task_id)): Path<(String, String)>,
) -> Result<Json<ToggleOutcome>, AppError> {
    let workspace = workspace_for(&state, &username).await?;
    let mut ws = workspace.lock().await;
    let outcome = ws.toggle_homework(&task_id)?;
    state.sessions.mark_dirty(ws.username_key());
    Ok(Json(outcome))
}

/// DELETE /api/v1/users/:username/tasks/homework/:task_id
pub async fn handle_delete_homework(
    State(state): State<AppState>,
    Path((username, task_id)): Path<(String, String)>,
) -> Result<Json<DeleteOutcome>, AppError> {
    let workspace = workspace_for(&state, &username).await?;
    let mut ws = workspace.lock().await;
    let outcome = ws.delete_homework(&task_id)?;
    state.sessions.mark_dirty(ws.username_key());
    Ok(Json(outcome))
}
