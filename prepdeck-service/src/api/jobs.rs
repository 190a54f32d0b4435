//! Generation job API endpoints.
//!
//! Clients poll `GET /api/jobs/{id}` at a fixed interval until the job
//! reaches a terminal status.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::GenerationJob;
use crate::error::ServiceError;

use super::AppState;

/// List jobs query parameters
#[derive(Deserialize)]
pub struct ListJobsParams {
    pub user_id: Option<String>,
}

/// Get a generation job by ID
pub async fn get_job_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GenerationJob>, ServiceError> {
    let job = state
        .service
        .db
        .get_job(&id)?
        .ok_or(ServiceError::JobNotFound { job_id: id })?;
    Ok(Json(job))
}

/// List jobs, newest first, optionally filtered by user
pub async fn list_jobs_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListJobsParams>,
) -> Result<Json<Vec<GenerationJob>>, ServiceError> {
    let jobs = state.service.db.list_jobs(params.user_id.as_deref())?;
    Ok(Json(jobs))
}
