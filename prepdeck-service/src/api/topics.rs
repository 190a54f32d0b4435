//! Topic API endpoints, including quiz generation entry points.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::Topic;
use crate::error::ServiceError;
use crate::service::QuizGenerationStarted;

use super::{AppState, DeleteResponse};

/// Request to create a topic
#[derive(Deserialize)]
pub struct CreateTopicRequest {
    pub subject_id: String,
    #[serde(default)]
    pub parent_topic_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request to update a topic
#[derive(Deserialize)]
pub struct UpdateTopicRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// List topics query parameters
#[derive(Deserialize)]
pub struct ListTopicsParams {
    pub subject_id: Option<String>,
}

/// Request to start quiz generation for an existing topic
#[derive(Deserialize)]
pub struct GenerateQuizRequest {
    pub user_id: String,
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub include_urdu: bool,
}

/// Request to create a topic and generate a quiz for it in one call
#[derive(Deserialize)]
pub struct CreateTopicWithQuizRequest {
    pub user_id: String,
    pub subject_id: String,
    pub topic_name: String,
    pub text: String,
    #[serde(default)]
    pub include_urdu: bool,
}

/// List topics, optionally filtered by subject
pub async fn list_topics_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTopicsParams>,
) -> Result<Json<Vec<Topic>>, ServiceError> {
    let topics = state.service.db.list_topics(params.subject_id.as_deref())?;
    Ok(Json(topics))
}

/// Create a new topic
pub async fn create_topic_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTopicRequest>,
) -> Result<Json<Topic>, ServiceError> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::InvalidRequest {
            message: "Topic name is required".to_string(),
        });
    }

    if state.service.db.get_subject(&request.subject_id)?.is_none() {
        return Err(ServiceError::SubjectNotFound {
            subject_id: request.subject_id,
        });
    }
    if let Some(parent_id) = &request.parent_topic_id
        && state.service.db.get_topic(parent_id)?.is_none()
    {
        return Err(ServiceError::TopicNotFound {
            topic_id: parent_id.clone(),
        });
    }

    let now = Utc::now();
    let topic = Topic {
        id: Uuid::new_v4().to_string(),
        subject_id: request.subject_id,
        parent_topic_id: request.parent_topic_id,
        name,
        description: request.description,
        content: None,
        created_at: now,
        updated_at: now,
    };
    state.service.db.insert_topic(&topic)?;

    Ok(Json(topic))
}

/// Get a topic by ID
pub async fn get_topic_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Topic>, ServiceError> {
    let topic = state
        .service
        .db
        .get_topic(&id)?
        .ok_or(ServiceError::TopicNotFound { topic_id: id })?;
    Ok(Json(topic))
}

/// Update a topic
pub async fn update_topic_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTopicRequest>,
) -> Result<Json<Topic>, ServiceError> {
    let updated = state.service.db.update_topic(
        &id,
        request.name.trim(),
        request.description.as_deref(),
        request.content.as_deref(),
    )?;
    if !updated {
        return Err(ServiceError::TopicNotFound { topic_id: id });
    }

    let topic = state
        .service
        .db
        .get_topic(&id)?
        .ok_or(ServiceError::TopicNotFound { topic_id: id })?;
    Ok(Json(topic))
}

/// Delete a topic and all nested content
pub async fn delete_topic_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ServiceError> {
    let deleted = state.service.db.delete_topic(&id)?;
    if !deleted {
        return Err(ServiceError::TopicNotFound { topic_id: id });
    }

    Ok(Json(DeleteResponse {
        success: true,
        message: "Topic deleted".to_string(),
    }))
}

/// Start a chunked quiz generation job for an existing topic
pub async fn generate_quiz_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<GenerateQuizRequest>,
) -> Result<Json<QuizGenerationStarted>, ServiceError> {
    if request.title.trim().is_empty() {
        return Err(ServiceError::InvalidRequest {
            message: "Title is required".to_string(),
        });
    }

    let started = state.service.start_quiz_generation(
        &request.user_id,
        &id,
        request.title.trim(),
        request.text,
        request.include_urdu,
    )?;

    Ok(Json(started))
}

/// Create a topic and start a quiz generation job for it
pub async fn create_topic_with_quiz_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTopicWithQuizRequest>,
) -> Result<Json<QuizGenerationStarted>, ServiceError> {
    if request.topic_name.trim().is_empty() {
        return Err(ServiceError::InvalidRequest {
            message: "Topic name is required".to_string(),
        });
    }

    let started = state.service.create_topic_with_quiz(
        &request.user_id,
        &request.subject_id,
        request.topic_name.trim(),
        request.text,
        request.include_urdu,
    )?;

    Ok(Json(started))
}
