//! HTTP API for the Prepdeck service.
//!
//! This module provides the REST API endpoints for:
//! - Health monitoring
//! - Subject/topic/material catalog management
//! - MCQ questions and quiz attempts
//! - AI quiz generation jobs and study tools

use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, post},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::service::PrepdeckService;

pub mod ai;
pub mod jobs;
pub mod materials;
pub mod subjects;
pub mod topics;

use ai::{
    article_analysis_handler, essay_outline_handler, mentor_chat_handler, theory_summary_handler,
};
use jobs::{get_job_handler, list_jobs_handler};
use materials::{
    add_question_handler, create_material_handler, delete_material_handler,
    delete_question_handler, get_material_handler, import_quiz_handler, list_attempts_handler,
    list_materials_handler, list_questions_handler, record_attempt_handler,
    update_material_handler,
};
use subjects::{
    create_subject_handler, delete_subject_handler, get_subject_handler, list_subjects_handler,
    update_subject_handler,
};
use topics::{
    create_topic_handler, create_topic_with_quiz_handler, delete_topic_handler, generate_quiz_handler,
    get_topic_handler, list_topics_handler, update_topic_handler,
};

/// Application state
pub struct AppState {
    pub service: Arc<PrepdeckService>,
    pub start_time: Instant,
}

/// Build the API router
pub fn router(service: Arc<PrepdeckService>) -> Router {
    let state = Arc::new(AppState {
        service,
        start_time: Instant::now(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Subject endpoints
        .route("/subjects", get(list_subjects_handler))
        .route("/subjects", post(create_subject_handler))
        .route("/subjects/{id}", get(get_subject_handler))
        .route("/subjects/{id}", axum::routing::put(update_subject_handler))
        .route("/subjects/{id}", delete(delete_subject_handler))
        // Topic endpoints
        .route("/topics", get(list_topics_handler))
        .route("/topics", post(create_topic_handler))
        .route("/topics/with-quiz", post(create_topic_with_quiz_handler))
        .route("/topics/{id}", get(get_topic_handler))
        .route("/topics/{id}", axum::routing::put(update_topic_handler))
        .route("/topics/{id}", delete(delete_topic_handler))
        .route("/topics/{id}/generate-quiz", post(generate_quiz_handler))
        // Material endpoints
        .route("/materials", get(list_materials_handler))
        .route("/materials", post(create_material_handler))
        .route("/materials/{id}", get(get_material_handler))
        .route(
            "/materials/{id}",
            axum::routing::put(update_material_handler),
        )
        .route("/materials/{id}", delete(delete_material_handler))
        .route("/materials/{id}/questions", get(list_questions_handler))
        .route("/materials/{id}/questions", post(add_question_handler))
        .route("/materials/{id}/import-quiz", post(import_quiz_handler))
        .route("/materials/{id}/attempts", get(list_attempts_handler))
        .route("/materials/{id}/attempts", post(record_attempt_handler))
        // Question endpoints
        .route("/questions/{id}", delete(delete_question_handler))
        // Generation job endpoints (polled by clients)
        .route("/jobs", get(list_jobs_handler))
        .route("/jobs/{id}", get(get_job_handler))
        // AI study tools
        .route("/ai/theory-summary", post(theory_summary_handler))
        .route("/ai/essay-outline", post(essay_outline_handler))
        .route("/ai/article-analysis", post(article_analysis_handler))
        .route("/ai/mentor-chat", post(mentor_chat_handler));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

// === Health ===

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let ai_available = state.service.ai_available();

    let status = if ai_available {
        "healthy".to_string()
    } else {
        "degraded: generation service unconfigured".to_string()
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        ai_available,
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
    ai_available: bool,
}

/// Response for delete operations
#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}
