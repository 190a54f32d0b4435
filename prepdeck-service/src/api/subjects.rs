//! Subject API endpoints.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::Subject;
use crate::error::ServiceError;

use super::{AppState, DeleteResponse};

/// Request to create a subject
#[derive(Deserialize)]
pub struct CreateSubjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Request to update a subject
#[derive(Deserialize)]
pub struct UpdateSubjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// List all subjects
pub async fn list_subjects_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Subject>>, ServiceError> {
    let subjects = state.service.db.list_subjects()?;
    Ok(Json(subjects))
}

/// Create a new subject
pub async fn create_subject_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateSubjectRequest>,
) -> Result<Json<Subject>, ServiceError> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::InvalidRequest {
            message: "Subject name is required".to_string(),
        });
    }

    let now = Utc::now();
    let subject = Subject {
        id: Uuid::new_v4().to_string(),
        name,
        description: request.description,
        icon: request.icon,
        created_at: now,
        updated_at: now,
    };
    state.service.db.insert_subject(&subject)?;

    Ok(Json(subject))
}

/// Get a subject by ID
pub async fn get_subject_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Subject>, ServiceError> {
    let subject = state
        .service
        .db
        .get_subject(&id)?
        .ok_or(ServiceError::SubjectNotFound { subject_id: id })?;
    Ok(Json(subject))
}

/// Update a subject
pub async fn update_subject_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateSubjectRequest>,
) -> Result<Json<Subject>, ServiceError> {
    let updated = state.service.db.update_subject(
        &id,
        request.name.trim(),
        request.description.as_deref(),
        request.icon.as_deref(),
    )?;
    if !updated {
        return Err(ServiceError::SubjectNotFound { subject_id: id });
    }

    let subject = state
        .service
        .db
        .get_subject(&id)?
        .ok_or(ServiceError::SubjectNotFound { subject_id: id })?;
    Ok(Json(subject))
}

/// Delete a subject and all nested content
pub async fn delete_subject_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ServiceError> {
    let deleted = state.service.db.delete_subject(&id)?;
    if !deleted {
        return Err(ServiceError::SubjectNotFound { subject_id: id });
    }

    Ok(Json(DeleteResponse {
        success: true,
        message: "Subject deleted".to_string(),
    }))
}
