use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Main service error type
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Subject not found: {subject_id}")]
    SubjectNotFound { subject_id: String },

    #[error("Topic not found: {topic_id}")]
    TopicNotFound { topic_id: String },

    #[error("Material not found: {material_id}")]
    MaterialNotFound { material_id: String },

    #[error("Generation job not found: {job_id}")]
    JobNotFound { job_id: String },

    #[error("{0}")]
    Gemini(#[from] GeminiError),

    #[error("Database error")]
    Database(#[from] DatabaseError),

    #[error("{0}")]
    Generation(#[from] GenerationError),

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

/// Gemini client errors
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Generation service not configured (missing API key)")]
    Unconfigured,

    #[error("Connection failed to generation service at {url}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Generation failed (status {status}): {message}")]
    Generation { status: u16, message: String },

    #[error("Generation service returned an empty response")]
    EmptyResponse,

    #[error("Invalid response from generation service")]
    InvalidResponse {
        #[source]
        source: serde_json::Error,
    },
}

/// Database errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection failed")]
    Connection(#[source] rusqlite::Error),

    #[error("Query failed")]
    Query(#[source] rusqlite::Error),

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("Serialization failed")]
    Serialization(#[source] serde_json::Error),
}

/// Generation pipeline errors
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Input text is empty")]
    EmptyInput,

    #[error("Chunk {chunk_index} failed after {attempts} attempts: {source}")]
    ChunkFailed {
        chunk_index: usize,
        attempts: u32,
        #[source]
        source: Box<ServiceError>,
    },

    #[error("No questions could be generated from the provided text")]
    NoQuestions,
}

/// API error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::SubjectNotFound { .. }
            | ServiceError::TopicNotFound { .. }
            | ServiceError::MaterialNotFound { .. }
            | ServiceError::JobNotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Gemini(GeminiError::Unconfigured) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ServiceError::SubjectNotFound { .. } => "subject_not_found",
            ServiceError::TopicNotFound { .. } => "topic_not_found",
            ServiceError::MaterialNotFound { .. } => "material_not_found",
            ServiceError::JobNotFound { .. } => "job_not_found",
            ServiceError::Gemini(GeminiError::Unconfigured) => "gemini_unconfigured",
            ServiceError::Gemini(GeminiError::Connection { .. }) => "gemini_connection",
            ServiceError::Gemini(GeminiError::Generation { .. }) => "gemini_generation",
            ServiceError::Gemini(GeminiError::EmptyResponse) => "gemini_empty_response",
            ServiceError::Gemini(GeminiError::InvalidResponse { .. }) => "gemini_invalid_response",
            ServiceError::Database(_) => "database_error",
            ServiceError::Generation(GenerationError::EmptyInput) => "empty_input",
            ServiceError::Generation(GenerationError::ChunkFailed { .. }) => "chunk_failed",
            ServiceError::Generation(GenerationError::NoQuestions) => "no_questions",
            ServiceError::InvalidRequest { .. } => "invalid_request",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code().to_string();

        let response = ErrorResponse {
            message: self.to_string(),
            code: Some(code),
        };

        (status, Json(response)).into_response()
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
