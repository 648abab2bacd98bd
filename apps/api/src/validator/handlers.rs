use std::collections::hash_map::Entry;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::roadmap::Status;
use crate::shop::reward_completion;
use crate::state::AppState;
use crate::validator::{
    evaluate_answer, generate_challenge, requires_validation, GateDecision, ValidatorError,
    ValidatorPhase, ValidatorSession,
};
use crate::workspace::handlers::workspace_for;
use crate::workspace::Workspace;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorView {
    pub item_id: String,
    pub item_status: Status,
    #[serde(flatten)]
    pub phase: ValidatorPhase,
}

fn view(ws: &Workspace, item_id: &str) -> Result<ValidatorView, AppError> {
    let item = ws.item(item_id)?;
    let phase = ws
        .validators
        .get(item_id)
        .map(|session| session.phase().clone())
        .unwrap_or(ValidatorPhase::Idle);
    Ok(ValidatorView {
        item_id: item.id.clone(),
        item_status: item.status,
        phase,
    })
}

fn no_session(item_id: &str) -> AppError {
    AppError::NotFound(format!("No validator session for '{item_id}'"))
}

/// POST /api/v1/users/:username/validator/:item_id/start
///
/// Generates a challenge question. The workspace lock is released while the
/// model is working.
pub async fn handle_start(
    State(state): State<AppState>,
    Path((username, item_id)): Path<(String, String)>,
) -> Result<Json<ValidatorView>, AppError> {
    let workspace = workspace_for(&state, &username).await?;

    let item = {
        let mut ws = workspace.lock().await;
        let item = ws.item(&item_id)?.clone();
        if !requires_validation(&item) {
            return Err(ValidatorError::NotRequired(item.name).into());
        }
        let session = match ws.validators.entry(item_id.clone()) {
            Entry::Occupied(existing) => existing.into_mut(),
            Entry::Vacant(slot) => slot.insert(ValidatorSession::open(&item)?),
        };
        session.begin()?;
        session.prior_status = item.status;
        item
    };

    let question = generate_challenge(&state.ai, &item).await;

    let mut ws = workspace.lock().await;
    ws.validators
        .get_mut(&item_id)
        .ok_or_else(|| no_session(&item_id))?
        .question_ready(question)?;
    Ok(Json(view(&ws, &item_id)?))
}

#[derive(Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

/// POST /api/v1/users/:username/validator/:item_id/answer
///
/// A pass completes the item and credits star points; a fail leaves the
/// item at the status it had when the question was asked.
pub async fn handle_answer(
    State(state): State<AppState>,
    Path((username, item_id)): Path<(String, String)>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<ValidatorView>, AppError> {
    let workspace = workspace_for(&state, &username).await?;

    let (item, question) = {
        let mut ws = workspace.lock().await;
        let item = ws.item(&item_id)?.clone();
        let question = ws
            .validators
            .get_mut(&item_id)
            .ok_or_else(|| no_session(&item_id))?
            .submit(&req.answer)?;
        (item, question)
    };

    let verdict = evaluate_answer(&state.ai, &item, &question, req.answer.trim()).await;

    let mut ws = workspace.lock().await;
    let decision = ws
        .validators
        .get_mut(&item_id)
        .ok_or_else(|| no_session(&item_id))?
        .conclude(verdict)?;

    match decision {
        GateDecision::Complete => {
            let change = ws.complete_validated(&item_id)?;
            state.sessions.mark_dirty(ws.username_key());
            if change.newly_completed() {
                reward_completion(state.device.as_ref(), ws.username_key(), &change.item).await;
            }
        }
        GateDecision::Revert(prior) => {
            if ws.item(&item_id)?.status != prior {
                ws.set_status(&item_id, prior)?;
                state.sessions.mark_dirty(ws.username_key());
            }
        }
    }
    Ok(Json(view(&ws, &item_id)?))
}

/// GET /api/v1/users/:username/validator/:item_id
pub async fn handle_get(
    State(state): State<AppState>,
    Path((username, item_id)): Path<(String, String)>,
) -> Result<Json<ValidatorView>, AppError> {
    let workspace = workspace_for(&state, &username).await?;
    let ws = workspace.lock().await;
    Ok(Json(view(&ws, &item_id)?))
}

/// DELETE /api/v1/users/:username/validator/:item_id
pub async fn handle_cancel(
    State(state): State<AppState>,
    Path((username, item_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let workspace = workspace_for(&state, &username).await?;
    let mut ws = workspace.lock().await;
    if let Some(session) = ws.validators.get_mut(&item_id) {
        session.cancel();
    }
    Ok(StatusCode::NO_CONTENT)
}
