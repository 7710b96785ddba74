//! Gemini-backed analysis provider.
//!
//! Each analysis kind is one `generateContent` call carrying the image
//! inline (base64) plus a kind-specific instruction, constrained by a JSON
//! response schema listing exactly the fields that kind owns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use clouddrive_core::models::{AnalysisFragment, AnalysisKind};

use crate::provider::{AnalysisProvider, ProviderError};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
}

impl Debug for GeminiProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiProvider")
            .field("model", &self.model)
            .finish()
    }
}

// generateContent request/response structures
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

// Per-kind response payloads, matching the response schemas below.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModerationPayload {
    is_safe: bool,
    safety_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassificationPayload {
    tags: Vec<String>,
    suggested_folder: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OcrPayload {
    extracted_text: String,
}

#[derive(Debug, Deserialize)]
struct MetadataPayload {
    description: String,
}

impl GeminiProvider {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Gemini API key is required but not provided".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProviderError::Transport)?;

        Ok(Self {
            http_client,
            api_key,
            model: model.into(),
        })
    }

    /// Instruction text sent alongside the image for the given kind.
    fn instruction(kind: AnalysisKind) -> &'static str {
        match kind {
            AnalysisKind::Moderation => {
                "Analyze this image for sensitive content (violence, adult content, etc). Return JSON."
            }
            AnalysisKind::Classification => {
                "Classify this image for a cloud storage system. Return JSON."
            }
            AnalysisKind::Ocr => {
                "Extract all text from this image. If no text, return 'No text detected'."
            }
            AnalysisKind::Metadata => "Describe this image visually for accessibility alt-text.",
        }
    }

    /// Structural response schema per kind: exactly the fields the kind owns.
    fn response_schema(kind: AnalysisKind) -> serde_json::Value {
        match kind {
            AnalysisKind::Moderation => json!({
                "type": "OBJECT",
                "properties": {
                    "isSafe": {
                        "type": "BOOLEAN",
                        "description": "Is this content safe for work?"
                    },
                    "safetyReason": {
                        "type": "STRING",
                        "description": "Reason if unsafe, or 'Safe' if safe."
                    },
                },
                "required": ["isSafe"],
            }),
            AnalysisKind::Classification => json!({
                "type": "OBJECT",
                "properties": {
                    "tags": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" },
                        "description": "3-5 relevant tags."
                    },
                    "suggestedFolder": {
                        "type": "STRING",
                        "description": "A short folder name (e.g., Finance, Travel)."
                    },
                },
                "required": ["tags", "suggestedFolder"],
            }),
            AnalysisKind::Ocr => json!({
                "type": "OBJECT",
                "properties": {
                    "extractedText": {
                        "type": "STRING",
                        "description": "All visible text in the image."
                    },
                },
                "required": ["extractedText"],
            }),
            AnalysisKind::Metadata => json!({
                "type": "OBJECT",
                "properties": {
                    "description": {
                        "type": "STRING",
                        "description": "A concise visual description."
                    },
                },
                "required": ["description"],
            }),
        }
    }

    /// Strip markdown code fences if the model wrapped its JSON in them.
    fn extract_json(text: &str) -> &str {
        if text.contains("```json") {
            text.split("```json")
                .nth(1)
                .and_then(|s| s.split("```").next())
                .unwrap_or(text)
                .trim()
        } else if text.contains("```") {
            text.split("```")
                .nth(1)
                .and_then(|s| s.split("```").next())
                .unwrap_or(text)
                .trim()
        } else {
            text.trim()
        }
    }

    /// Parse the response text into the fragment owned by `kind`.
    fn parse_fragment(kind: AnalysisKind, text: &str) -> Result<AnalysisFragment, ProviderError> {
        let json_text = Self::extract_json(text);
        let schema_err = |e: serde_json::Error| ProviderError::Schema {
            kind,
            message: e.to_string(),
        };

        match kind {
            AnalysisKind::Moderation => {
                let payload: ModerationPayload =
                    serde_json::from_str(json_text).map_err(schema_err)?;
                Ok(AnalysisFragment::Moderation {
                    is_safe: payload.is_safe,
                    safety_reason: payload.safety_reason,
                })
            }
            AnalysisKind::Classification => {
                let payload: ClassificationPayload =
                    serde_json::from_str(json_text).map_err(schema_err)?;
                Ok(AnalysisFragment::Classification {
                    tags: payload.tags,
                    suggested_folder: payload.suggested_folder,
                })
            }
            AnalysisKind::Ocr => {
                let payload: OcrPayload = serde_json::from_str(json_text).map_err(schema_err)?;
                Ok(AnalysisFragment::Ocr {
                    extracted_text: payload.extracted_text,
                })
            }
            AnalysisKind::Metadata => {
                let payload: MetadataPayload =
                    serde_json::from_str(json_text).map_err(schema_err)?;
                Ok(AnalysisFragment::Metadata {
                    description: payload.description,
                })
            }
        }
    }

    async fn generate_content(
        &self,
        kind: AnalysisKind,
        image: &[u8],
        content_type: &str,
    ) -> Result<String, ProviderError> {
        use base64::Engine;
        let base64_image = base64::engine::general_purpose::STANDARD.encode(image);

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: content_type.to_string(),
                            data: base64_image,
                        },
                    },
                    Part::Text {
                        text: Self::instruction(kind).to_string(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: Self::response_schema(kind),
            },
        };

        let response = self
            .http_client
            .post(format!(
                "{}/models/{}:generateContent",
                API_BASE, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(ProviderError::Transport)?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        Ok(text)
    }
}

#[async_trait]
impl AnalysisProvider for GeminiProvider {
    async fn analyze(
        &self,
        kind: AnalysisKind,
        image: &[u8],
        content_type: &str,
    ) -> Result<AnalysisFragment, ProviderError> {
        tracing::debug!(
            kind = %kind,
            model = %self.model,
            image_size = image.len(),
            "Dispatching analysis request"
        );

        let text = self.generate_content(kind, image, content_type).await?;
        Self::parse_fragment(kind, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_rejected() {
        let provider = GeminiProvider::new("", "gemini-2.5-flash", Duration::from_secs(1));
        assert!(matches!(provider, Err(ProviderError::NotConfigured(_))));
    }

    #[test]
    fn schemas_list_exactly_the_owned_fields() {
        let props = |kind: AnalysisKind| -> Vec<String> {
            let schema = GeminiProvider::response_schema(kind);
            let mut keys: Vec<String> = schema["properties"]
                .as_object()
                .unwrap()
                .keys()
                .cloned()
                .collect();
            keys.sort();
            keys
        };
        assert_eq!(props(AnalysisKind::Moderation), ["isSafe", "safetyReason"]);
        assert_eq!(
            props(AnalysisKind::Classification),
            ["suggestedFolder", "tags"]
        );
        assert_eq!(props(AnalysisKind::Ocr), ["extractedText"]);
        assert_eq!(props(AnalysisKind::Metadata), ["description"]);
    }

    #[test]
    fn parse_moderation_fragment() {
        let fragment = GeminiProvider::parse_fragment(
            AnalysisKind::Moderation,
            r#"{"isSafe": false, "safetyReason": "Graphic violence"}"#,
        )
        .unwrap();
        assert_eq!(
            fragment,
            AnalysisFragment::Moderation {
                is_safe: false,
                safety_reason: Some("Graphic violence".to_string()),
            }
        );
    }

    #[test]
    fn parse_classification_fragment() {
        let fragment = GeminiProvider::parse_fragment(
            AnalysisKind::Classification,
            r#"{"tags": ["animal", "pet", "cute"], "suggestedFolder": "Pets"}"#,
        )
        .unwrap();
        assert_eq!(
            fragment,
            AnalysisFragment::Classification {
                tags: vec![
                    "animal".to_string(),
                    "pet".to_string(),
                    "cute".to_string()
                ],
                suggested_folder: "Pets".to_string(),
            }
        );
    }

    #[test]
    fn parse_tolerates_markdown_fences() {
        let text = "Here it is:\n```json\n{\"extractedText\": \"No text detected\"}\n```\n";
        let fragment = GeminiProvider::parse_fragment(AnalysisKind::Ocr, text).unwrap();
        assert_eq!(
            fragment,
            AnalysisFragment::Ocr {
                extracted_text: "No text detected".to_string(),
            }
        );
    }

    #[test]
    fn malformed_response_is_a_schema_fault() {
        let err =
            GeminiProvider::parse_fragment(AnalysisKind::Metadata, "not json").unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Schema {
                kind: AnalysisKind::Metadata,
                ..
            }
        ));
    }

    #[test]
    fn missing_required_field_is_a_schema_fault() {
        let err = GeminiProvider::parse_fragment(
            AnalysisKind::Classification,
            r#"{"tags": ["receipt"]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ProviderError::Schema { .. }));
    }
}
