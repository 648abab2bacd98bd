use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::lingua::{
    evaluate_attempt, record_attempt, session_key, todays_session, AttemptVerdict,
    DEFAULT_LANGUAGE,
};
use crate::models::profile::LinguaSession;
use crate::persistence::device::DAILY_CACHE_TTL;
use crate::state::AppState;
use crate::workspace::handlers::{today, workspace_for};

#[derive(Deserialize)]
pub struct LanguageQuery {
    pub language: Option<String>,
}

/// GET /api/v1/users/:username/lingua
pub async fn handle_today(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<LinguaSession>, AppError> {
    let language = query
        .language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE)
        .to_string();
    let date = today();
    let workspace = workspace_for(&state, &username).await?;
    let (user, existing) = {
        let ws = workspace.lock().await;
        (ws.username_key().to_string(), ws.lingua_session().cloned())
    };

    let session = todays_session(
        &state.ai,
        state.device.as_ref(),
        &user,
        existing.clone(),
        &language,
        date,
    )
    .await;

    if existing.as_ref() != Some(&session) {
        workspace.lock().await.set_lingua_session(session.clone());
        state.sessions.mark_dirty(&user);
    }
    Ok(Json(session))
}

#[derive(Deserialize)]
pub struct AttemptRequest {
    pub attempt: String,
}

#[derive(Serialize)]
pub struct AttemptResponse {
    pub verdict: AttemptVerdict,
    pub session: LinguaSession,
}

/// POST /api/v1/users/:username/lingua/attempt
pub async fn handle_attempt(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<AttemptRequest>,
) -> Result<Json<AttemptResponse>, AppError> {
    let attempt = req.attempt.trim();
    if attempt.is_empty() {
        return Err(AppError::Validation("attempt cannot be empty".to_string()));
    }

    let workspace = workspace_for(&state, &username).await?;
    let (user, session) = {
        let ws = workspace.lock().await;
        let session = ws
            .lingua_session()
            .filter(|s| s.date == today())
            .cloned()
            .ok_or_else(|| AppError::NotFound("No language session for today".to_string()))?;
        (ws.username_key().to_string(), session)
    };

    let verdict = evaluate_attempt(&state.ai, &session, attempt).await;

    let mut session = session;
    record_attempt(&mut session, attempt, &verdict);
    workspace.lock().await.set_lingua_session(session.clone());
    state.sessions.mark_dirty(&user);
    state
        .device
        .remember(&session_key(&user, session.date), &session, Some(DAILY_CACHE_TTL))
        .await;

    Ok(Json(AttemptResponse { verdict, session }))
}
