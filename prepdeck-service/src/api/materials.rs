//! Material API endpoints, including questions, imports, and attempts.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{Material, MaterialKind, McqQuestion, QuizAttempt};
use crate::error::ServiceError;
use crate::service::ImportedQuestion;

use super::{AppState, DeleteResponse};

/// Request to create a material
#[derive(Deserialize)]
pub struct CreateMaterialRequest {
    pub topic_id: String,
    pub kind: MaterialKind,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub display_order: Option<i32>,
}

/// Request to update a material
#[derive(Deserialize)]
pub struct UpdateMaterialRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// List materials query parameters
#[derive(Deserialize)]
pub struct ListMaterialsParams {
    pub topic_id: Option<String>,
}

/// Request to bulk import questions
#[derive(Deserialize)]
pub struct ImportQuizRequest {
    pub questions: Vec<ImportedQuestion>,
}

/// Response for question imports
#[derive(Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub imported: usize,
}

/// Request to record a quiz attempt
#[derive(Deserialize)]
pub struct RecordAttemptRequest {
    pub user_id: String,
    pub total_questions: u32,
    pub correct_answers: u32,
    /// Percentage 0-100
    pub score: u32,
    /// Per-question answers as submitted by the quiz player
    pub answers: serde_json::Value,
}

/// List attempts query parameters
#[derive(Deserialize)]
pub struct ListAttemptsParams {
    pub user_id: Option<String>,
}

/// List materials, optionally filtered by topic
pub async fn list_materials_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListMaterialsParams>,
) -> Result<Json<Vec<Material>>, ServiceError> {
    let materials = state.service.db.list_materials(params.topic_id.as_deref())?;
    Ok(Json(materials))
}

/// Create a new material
pub async fn create_material_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateMaterialRequest>,
) -> Result<Json<Material>, ServiceError> {
    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(ServiceError::InvalidRequest {
            message: "Material title is required".to_string(),
        });
    }

    if state.service.db.get_topic(&request.topic_id)?.is_none() {
        return Err(ServiceError::TopicNotFound {
            topic_id: request.topic_id,
        });
    }

    let now = Utc::now();
    let material = Material {
        id: Uuid::new_v4().to_string(),
        topic_id: request.topic_id,
        kind: request.kind,
        title,
        description: request.description,
        content: request.content,
        display_order: request.display_order.unwrap_or(0),
        created_at: now,
        updated_at: now,
    };
    state.service.db.insert_material(&material)?;

    Ok(Json(material))
}

/// Get a material by ID
pub async fn get_material_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Material>, ServiceError> {
    let material = state
        .service
        .db
        .get_material(&id)?
        .ok_or(ServiceError::MaterialNotFound { material_id: id })?;
    Ok(Json(material))
}

/// Update a material
pub async fn update_material_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateMaterialRequest>,
) -> Result<Json<Material>, ServiceError> {
    let updated = state.service.db.update_material(
        &id,
        request.title.trim(),
        request.description.as_deref(),
        request.content.as_deref(),
    )?;
    if !updated {
        return Err(ServiceError::MaterialNotFound { material_id: id });
    }

    let material = state
        .service
        .db
        .get_material(&id)?
        .ok_or(ServiceError::MaterialNotFound { material_id: id })?;
    Ok(Json(material))
}

/// Delete a material and its questions/attempts
pub async fn delete_material_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ServiceError> {
    let deleted = state.service.db.delete_material(&id)?;
    if !deleted {
        return Err(ServiceError::MaterialNotFound { material_id: id });
    }

    Ok(Json(DeleteResponse {
        success: true,
        message: "Material deleted".to_string(),
    }))
}

/// List questions for a material in display order
pub async fn list_questions_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<McqQuestion>>, ServiceError> {
    if state.service.db.get_material(&id)?.is_none() {
        return Err(ServiceError::MaterialNotFound { material_id: id });
    }

    let questions = state.service.db.list_questions(&id)?;
    Ok(Json(questions))
}

/// Add a single question to a material
pub async fn add_question_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<ImportedQuestion>,
) -> Result<Json<ImportResponse>, ServiceError> {
    let imported = state.service.import_questions(&id, vec![request])?;
    Ok(Json(ImportResponse {
        success: true,
        imported,
    }))
}

/// Bulk import letter-keyed questions
pub async fn import_quiz_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<ImportQuizRequest>,
) -> Result<Json<ImportResponse>, ServiceError> {
    let imported = state.service.import_questions(&id, request.questions)?;
    Ok(Json(ImportResponse {
        success: true,
        imported,
    }))
}

/// Delete a question
pub async fn delete_question_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ServiceError> {
    let deleted = state.service.db.delete_question(&id)?;
    if !deleted {
        return Err(ServiceError::InvalidRequest {
            message: format!("Question not found: {id}"),
        });
    }

    Ok(Json(DeleteResponse {
        success: true,
        message: "Question deleted".to_string(),
    }))
}

/// Record a quiz attempt
pub async fn record_attempt_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<RecordAttemptRequest>,
) -> Result<Json<QuizAttempt>, ServiceError> {
    if state.service.db.get_material(&id)?.is_none() {
        return Err(ServiceError::MaterialNotFound { material_id: id });
    }
    if request.score > 100 {
        return Err(ServiceError::InvalidRequest {
            message: "Score must be a percentage between 0 and 100".to_string(),
        });
    }
    if request.correct_answers > request.total_questions {
        return Err(ServiceError::InvalidRequest {
            message: "Correct answers cannot exceed total questions".to_string(),
        });
    }

    let attempt = QuizAttempt {
        id: Uuid::new_v4().to_string(),
        user_id: request.user_id,
        material_id: id,
        total_questions: request.total_questions,
        correct_answers: request.correct_answers,
        score: request.score,
        answers: request.answers,
        completed_at: Utc::now(),
    };
    state.service.db.insert_attempt(&attempt)?;

    Ok(Json(attempt))
}

/// List attempts for a material, optionally filtered by user
pub async fn list_attempts_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ListAttemptsParams>,
) -> Result<Json<Vec<QuizAttempt>>, ServiceError> {
    if state.service.db.get_material(&id)?.is_none() {
        return Err(ServiceError::MaterialNotFound { material_id: id });
    }

    let attempts = state
        .service
        .db
        .list_attempts(&id, params.user_id.as_deref())?;
    Ok(Json(attempts))
}
