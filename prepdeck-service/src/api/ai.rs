//! AI study tool endpoints.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ServiceError;
use crate::service::{ArticleAnalysis, ChatTurn};

use super::AppState;

/// Request for a theory summary
#[derive(Deserialize)]
pub struct TheorySummaryRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct TheorySummaryResponse {
    pub summary: String,
}

/// Request for an essay outline
#[derive(Deserialize)]
pub struct EssayOutlineRequest {
    pub topic: String,
}

#[derive(Serialize)]
pub struct EssayOutlineResponse {
    pub outline: String,
}

/// Request for article analysis
#[derive(Deserialize)]
pub struct ArticleAnalysisRequest {
    pub text: String,
}

/// Request for mentor chat
#[derive(Deserialize)]
pub struct MentorChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Serialize)]
pub struct MentorChatResponse {
    pub reply: String,
}

/// Create structured study notes from source text
pub async fn theory_summary_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TheorySummaryRequest>,
) -> Result<Json<TheorySummaryResponse>, ServiceError> {
    let summary = state.service.theory_summary(&request.text).await?;
    Ok(Json(TheorySummaryResponse { summary }))
}

/// Generate an exam-style essay outline
pub async fn essay_outline_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EssayOutlineRequest>,
) -> Result<Json<EssayOutlineResponse>, ServiceError> {
    let outline = state.service.essay_outline(&request.topic).await?;
    Ok(Json(EssayOutlineResponse { outline }))
}

/// Analyze an article for vocabulary, key points, and perspectives
pub async fn article_analysis_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ArticleAnalysisRequest>,
) -> Result<Json<ArticleAnalysis>, ServiceError> {
    let analysis = state.service.article_analysis(&request.text).await?;
    Ok(Json(analysis))
}

/// Answer a student's question with conversation context
pub async fn mentor_chat_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MentorChatRequest>,
) -> Result<Json<MentorChatResponse>, ServiceError> {
    let reply = state
        .service
        .mentor_chat(&request.message, &request.history)
        .await?;
    Ok(Json(MentorChatResponse { reply }))
}
