pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::state::AppState;
use crate::{coaching, lingua, preferences, shop, syllabus, validator, workspace};

pub fn build_router(state: AppState) -> Router {
    let timetable_limit = preferences::timetable_body_limit(state.config.device_value_max_bytes);
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/ai/status", get(health::ai_status_handler))
        // Session
        .route("/api/v1/session/login", post(workspace::handlers::handle_login))
        .route("/api/v1/session/flush", post(workspace::handlers::handle_flush))
        // Roadmap and progress
        .route(
            "/api/v1/users/:username/roadmap",
            get(workspace::handlers::handle_list_roadmap),
        )
        .route(
            "/api/v1/users/:username/roadmap/:item_id",
            patch(workspace::handlers::handle_update_status),
        )
        .route(
            "/api/v1/users/:username/progress",
            get(workspace::handlers::handle_progress),
        )
        // Tasks
        .route(
            "/api/v1/users/:username/tasks",
            get(workspace::handlers::handle_list_tasks),
        )
        .route(
            "/api/v1/users/:username/tasks/daily",
            post(workspace::handlers::handle_add_daily),
        )
        .route(
            "/api/v1/users/:username/tasks/daily/:task_id",
            axum::routing::delete(workspace::handlers::handle_delete_daily),
        )
        .route(
            "/api/v1/users/:username/tasks/daily/:task_id/toggle",
            post(workspace::handlers::handle_toggle_daily),
        )
        .route(
            "/api/v1/users/:username/tasks/homework",
            post(workspace::handlers::handle_add_homework),
        )
        .route(
            "/api/v1/users/:username/tasks/homework/:task_id",
            axum::routing::delete(workspace::handlers::handle_delete_homework),
        )
        .route(
            "/api/v1/users/:username/tasks/homework/:task_id/toggle",
            post(workspace::handlers::handle_toggle_homework),
        )
        // Socratic validator
        .route(
            "/api/v1/users/:username/validator/:item_id",
            get(validator::handlers::handle_get).delete(validator::handlers::handle_cancel),
        )
        .route(
            "/api/v1/users/:username/validator/:item_id/start",
            post(validator::handlers::handle_start),
        )
        .route(
            "/api/v1/users/:username/validator/:item_id/answer",
            post(validator::handlers::handle_answer),
        )
        // Coaching
        .route(
            "/api/v1/users/:username/flashcards/:item_id",
            post(coaching::handlers::handle_flashcards),
        )
        .route(
            "/api/v1/interview/question",
            post(coaching::handlers::handle_interview_question),
        )
        .route(
            "/api/v1/interview/evaluate",
            post(coaching::handlers::handle_interview_evaluate),
        )
        .route(
            "/api/v1/users/:username/resume-bullets",
            post(coaching::handlers::handle_resume_bullets),
        )
        .route(
            "/api/v1/users/:username/briefing",
            get(coaching::handlers::handle_briefing),
        )
        .route(
            "/api/v1/users/:username/trends",
            get(coaching::handlers::handle_trends),
        )
        // Language hub
        .route(
            "/api/v1/users/:username/lingua",
            get(lingua::handlers::handle_today),
        )
        .route(
            "/api/v1/users/:username/lingua/attempt",
            post(lingua::handlers::handle_attempt),
        )
        // Shop
        .route("/api/v1/shop", get(shop::handlers::handle_list_items))
        .route(
            "/api/v1/users/:username/wallet",
            get(shop::handlers::handle_get_wallet),
        )
        .route(
            "/api/v1/users/:username/shop/purchase",
            post(shop::handlers::handle_purchase),
        )
        // Syllabus
        .route("/api/v1/syllabus", get(syllabus::handlers::handle_catalog))
        .route(
            "/api/v1/users/:username/syllabus",
            get(syllabus::handlers::handle_progress),
        )
        .route(
            "/api/v1/users/:username/syllabus/:code/units/:index/toggle",
            post(syllabus::handlers::handle_toggle_unit),
        )
        // Preferences
        .route(
            "/api/v1/users/:username/theme",
            get(preferences::handlers::handle_get_theme).put(preferences::handlers::handle_put_theme),
        )
        .route(
            "/api/v1/users/:username/timetable",
            get(preferences::handlers::handle_get_timetable)
                .put(preferences::handlers::handle_put_timetable)
                .delete(preferences::handlers::handle_delete_timetable)
                .layer(DefaultBodyLimit::max(timetable_limit)),
        )
        .with_state(state)
}
