use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::preferences::{is_image_data_url, load_theme, save_theme, timetable_key, Theme};
use crate::state::AppState;
use crate::workspace::handlers::workspace_for;

#[derive(Serialize, Deserialize)]
pub struct ThemeBody {
    pub theme: Theme,
}

async fn user_key(state: &AppState, username: &str) -> Result<String, AppError> {
    let workspace = workspace_for(state, username).await?;
    let key = workspace.lock().await.username_key().to_string();
    Ok(key)
}

/// GET /api/v1/users/:username/theme
pub async fn handle_get_theme(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<ThemeBody>, AppError> {
    let user = user_key(&state, &username).await?;
    let theme = load_theme(state.device.as_ref(), &user).await?;
    Ok(Json(ThemeBody { theme }))
}

/// PUT /api/v1/users/:username/theme
pub async fn handle_put_theme(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(body): Json<ThemeBody>,
) -> Result<Json<ThemeBody>, AppError> {
    let user = user_key(&state, &username).await?;
    save_theme(state.device.as_ref(), &user, body.theme).await?;
    Ok(Json(body))
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableBody {
    pub data_url: String,
}

/// GET /api/v1/users/:username/timetable
pub async fn handle_get_timetable(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<TimetableBody>, AppError> {
    let user = user_key(&state, &username).await?;
    let data_url = state
        .device
        .get(&timetable_key(&user))
        .await?
        .ok_or_else(|| AppError::NotFound("No timetable uploaded".to_string()))?;
    Ok(Json(TimetableBody { data_url }))
}

/// PUT /api/v1/users/:username/timetable
///
/// Oversized images fail with 413 `STORAGE_QUOTA_EXCEEDED`, whether the
/// body limit or the device store catches them.
pub async fn handle_put_timetable(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Result<Json<TimetableBody>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(body) = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::QuotaExceeded(rejection.body_text())
        } else {
            AppError::Validation(rejection.body_text())
        }
    })?;
    if !is_image_data_url(&body.data_url) {
        return Err(AppError::Validation(
            "Timetable must be a base64 image data URL".to_string(),
        ));
    }
    let user = user_key(&state, &username).await?;
    state
        .device
        .set(&timetable_key(&user), &body.data_url)
        .await?;
    info!("Stored {} byte timetable for {user}", body.data_url.len());
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/users/:username/timetable
pub async fn handle_delete_timetable(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<StatusCode, AppError> {
    let user = user_key(&state, &username).await?;
    state.device.delete(&timetable_key(&user)).await?;
    Ok(StatusCode::NO_CONTENT)
}
