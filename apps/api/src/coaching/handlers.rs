use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::coaching::{
    completed_outputs, daily_briefing, evaluate_interview, flashcards, interview_question,
    market_trends, resume_bullets, Flashcard, InterviewFeedback, ResumeBullets, Trend,
};
use crate::errors::AppError;
use crate::models::roadmap::Role;
use crate::persistence::device::{daily_key, DAILY_CACHE_TTL};
use crate::state::AppState;
use crate::workspace::handlers::{today, workspace_for};

/// POST /api/v1/users/:username/flashcards/:item_id
pub async fn handle_flashcards(
    State(state): State<AppState>,
    Path((username, item_id)): Path<(String, String)>,
) -> Result<Json<Vec<Flashcard>>, AppError> {
    let workspace = workspace_for(&state, &username).await?;
    let item = workspace.lock().await.item(&item_id)?.clone();
    Ok(Json(flashcards(&state.ai, &item).await))
}

#[derive(Deserialize)]
pub struct QuestionRequest {
    pub role: Role,
    pub topic: Option<String>,
}

#[derive(Serialize)]
pub struct QuestionResponse {
    pub question: String,
}

/// POST /api/v1/interview/question
pub async fn handle_interview_question(
    State(state): State<AppState>,
    Json(req): Json<QuestionRequest>,
) -> Json<QuestionResponse> {
    let seed = today().ordinal() as usize;
    let question = interview_question(&state.ai, req.role, req.topic.as_deref(), seed).await;
    Json(QuestionResponse { question })
}

#[derive(Deserialize)]
pub struct EvaluateRequest {
    pub role: Role,
    pub question: String,
    pub answer: String,
}

/// POST /api/v1/interview/evaluate
pub async fn handle_interview_evaluate(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<InterviewFeedback>, AppError> {
    if req.answer.trim().is_empty() {
        return Err(AppError::Validation("answer cannot be empty".to_string()));
    }
    Ok(Json(
        evaluate_interview(&state.ai, req.role, &req.question, req.answer.trim()).await,
    ))
}

#[derive(Deserialize, Default)]
pub struct ResumeRequest {
    pub role: Option<Role>,
}

/// POST /api/v1/users/:username/resume-bullets
pub async fn handle_resume_bullets(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<ResumeRequest>,
) -> Result<Json<ResumeBullets>, AppError> {
    let workspace = workspace_for(&state, &username).await?;
    let items = completed_outputs(workspace.lock().await.roadmap());
    if items.is_empty() {
        return Err(AppError::Validation(
            "Complete at least one project or output item first".to_string(),
        ));
    }
    Ok(Json(resume_bullets(&state.ai, &items, req.role).await))
}

#[derive(Serialize, Deserialize)]
pub struct Briefing {
    pub date: chrono::NaiveDate,
    pub text: String,
}

/// GET /api/v1/users/:username/briefing
///
/// Generated once per user per day, then served from the device store.
pub async fn handle_briefing(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Briefing>, AppError> {
    let date = today();
    let workspace = workspace_for(&state, &username).await?;
    let (user, roadmap) = {
        let ws = workspace.lock().await;
        (ws.username_key().to_string(), ws.roadmap().to_vec())
    };

    let key = daily_key(&user, "briefing", date);
    if let Ok(Some(cached)) = state.device.get_json::<Briefing>(&key).await {
        return Ok(Json(cached));
    }

    let briefing = Briefing {
        date,
        text: daily_briefing(&state.ai, &roadmap, date).await,
    };
    state
        .device
        .remember(&key, &briefing, Some(DAILY_CACHE_TTL))
        .await;
    Ok(Json(briefing))
}

#[derive(Deserialize)]
pub struct TrendsQuery {
    pub role: Option<Role>,
}

#[derive(Serialize, Deserialize)]
pub struct TrendsResponse {
    pub role: Role,
    pub trends: Vec<Trend>,
    pub fallback: bool,
}

/// GET /api/v1/users/:username/trends
pub async fn handle_trends(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<TrendsResponse>, AppError> {
    let role = query.role.unwrap_or(Role::Sde);
    let workspace = workspace_for(&state, &username).await?;
    let user = workspace.lock().await.username_key().to_string();

    let slot = format!("trends-{}", role.label().to_lowercase().replace(' ', "-"));
    let key = daily_key(&user, &slot, today());
    if let Ok(Some(cached)) = state.device.get_json::<TrendsResponse>(&key).await {
        return Ok(Json(cached));
    }

    let (trends, fallback) = market_trends(&state.ai, role).await;
    let response = TrendsResponse {
        role,
        trends,
        fallback,
    };
    // Offline fallbacks are not cached so a later call can still go live.
    if !fallback {
        state
            .device
            .remember(&key, &response, Some(DAILY_CACHE_TTL))
            .await;
    }
    Ok(Json(response))
}
