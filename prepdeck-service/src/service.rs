//! Service coordinator.

mod quiz_generation;
mod study_tools;

pub use quiz_generation::{ImportedQuestion, QuizGenerationStarted};
pub use study_tools::{ArticleAnalysis, ChatTurn, VocabularyEntry};

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::StaticConfig;
use crate::db::Database;
use crate::error::{GeminiError, ServiceResult};
use crate::gemini::GeminiClient;

/// Main service coordinator
pub struct PrepdeckService {
    pub config: Arc<StaticConfig>,
    pub db: Arc<Database>,
    /// Absent when no API key is configured; AI endpoints then report 503
    gemini: Option<Arc<GeminiClient>>,
}

impl PrepdeckService {
    /// Create a new service instance
    pub fn new(db: Arc<Database>, config: Arc<StaticConfig>) -> Self {
        let gemini = if config.gemini.is_configured() {
            match GeminiClient::new(config.gemini.clone()) {
                Ok(client) => {
                    info!(model = %config.gemini.model, "Gemini client initialized");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    warn!(error = %e, "Failed to initialize Gemini client");
                    None
                }
            }
        } else {
            warn!("No Gemini API key configured, AI endpoints disabled");
            None
        };

        Self { config, db, gemini }
    }

    /// Whether AI-assisted endpoints can serve requests
    pub fn ai_available(&self) -> bool {
        self.gemini.is_some()
    }

    pub(crate) fn gemini(&self) -> ServiceResult<Arc<GeminiClient>> {
        self.gemini
            .clone()
            .ok_or_else(|| GeminiError::Unconfigured.into())
    }

    #[cfg(test)]
    pub(crate) fn without_gemini(db: Arc<Database>, config: Arc<StaticConfig>) -> Self {
        Self {
            config,
            db,
            gemini: None,
        }
    }
}
