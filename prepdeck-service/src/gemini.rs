use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::error::{GeminiError, ServiceError, ServiceResult};

/// Gemini API client
///
/// A thin wrapper over the `generateContent` endpoint. Construction fails
/// fast when no API key is configured so callers can report an unconfigured
/// service before starting any work.
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

/// One generation request
pub struct GenerateRequest<'a> {
    pub system_instruction: &'a str,
    pub prompt: String,
    /// When set, the service is asked for schema-constrained JSON output
    pub response_schema: Option<serde_json::Value>,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: GeminiConfig) -> ServiceResult<Self> {
        if !config.is_configured() {
            return Err(ServiceError::Gemini(GeminiError::Unconfigured));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                ServiceError::Gemini(GeminiError::Connection {
                    url: config.base_url.clone(),
                    source: e,
                })
            })?;

        Ok(Self { client, config })
    }

    /// Request schema-constrained JSON output and parse it.
    ///
    /// The service is asked for `application/json` against the supplied
    /// schema; anything that is not parseable JSON is reported as an
    /// invalid response so the caller's retry path can engage.
    pub async fn generate_structured(
        &self,
        request: GenerateRequest<'_>,
    ) -> ServiceResult<serde_json::Value> {
        let text = self.generate(request).await?;

        serde_json::from_str(&text)
            .map_err(|e| ServiceError::Gemini(GeminiError::InvalidResponse { source: e }))
    }

    /// Request free-form text output (summaries, outlines, chat).
    pub async fn generate_text(
        &self,
        system_instruction: &str,
        prompt: String,
    ) -> ServiceResult<String> {
        self.generate(GenerateRequest {
            system_instruction,
            prompt,
            response_schema: None,
        })
        .await
    }

    async fn generate(&self, request: GenerateRequest<'_>) -> ServiceResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let generation_config = if let Some(schema) = request.response_schema {
            GeminiGenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema),
                max_output_tokens: Some(self.config.max_output_tokens),
            }
        } else {
            GeminiGenerationConfig {
                response_mime_type: None,
                response_schema: None,
                max_output_tokens: Some(self.config.max_output_tokens),
            }
        };

        let body = GeminiGenerateRequest {
            system_instruction: GeminiContent::text(request.system_instruction),
            contents: vec![GeminiContent::text(&request.prompt)],
            generation_config,
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeminiError::Connection {
                url: url.clone(),
                source: e,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();

            return Err(ServiceError::Gemini(GeminiError::Generation {
                status,
                message,
            }));
        }

        let generated: GeminiGenerateResponse =
            response
                .json()
                .await
                .map_err(|e| GeminiError::InvalidResponse {
                    source: serde_json::Error::io(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        e.to_string(),
                    )),
                })?;

        let text: String = generated
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ServiceError::Gemini(GeminiError::EmptyResponse));
        }

        Ok(text)
    }
}

// Internal Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerateRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

impl GeminiContent {
    fn text(text: &str) -> Self {
        Self {
            parts: vec![GeminiRequestPart {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiGenerateResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiCandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_gemini;

    #[test]
    fn construction_fails_without_api_key() {
        let config = default_gemini();
        assert!(!config.is_configured());
        assert!(matches!(
            GeminiClient::new(config),
            Err(ServiceError::Gemini(GeminiError::Unconfigured))
        ));
    }

    #[test]
    fn request_serializes_with_camel_case_config() {
        let body = GeminiGenerateRequest {
            system_instruction: GeminiContent::text("be brief"),
            contents: vec![GeminiContent::text("hello")],
            generation_config: GeminiGenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(serde_json::json!({ "type": "OBJECT" })),
                max_output_tokens: Some(8192),
            },
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be brief");
    }

    #[test]
    fn response_parses_candidate_parts() {
        let raw = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "{\"questions\":[]}" } ] } }
            ]
        }"#;
        let parsed: GeminiGenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.candidates.len(), 1);
        assert_eq!(
            parsed.candidates[0].content.parts[0].text.as_deref(),
            Some("{\"questions\":[]}")
        );
    }
}
