//! Gemini `generateContent` client.
//!
//! Sends text-to-image, image-to-image and text-only requests to the Gemini
//! REST API and extracts the first image from a mixed text/image response.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use gemini_image_mcp_common::config::Config;
use gemini_image_mcp_common::error::Error;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::format::ImageFormat;
use crate::prompt::{generation_instructions, transformation_instructions};
use crate::request::{ImageData, ImageRequest, RequestMode};

/// A model that can produce images and plain text.
///
/// The orchestrator only talks to this trait so it can run against a stub.
#[async_trait]
pub trait ImageModel: Send + Sync {
    /// Produce one image for the request.
    async fn generate_image(&self, request: &ImageRequest) -> Result<ImageData, Error>;

    /// Produce a plain-text answer to `prompt`.
    async fn generate_text(&self, prompt: &str) -> Result<String, Error>;
}

/// Gemini REST client authenticated with an API key.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    image_model: String,
    image_endpoint: String,
    text_endpoint: String,
}

impl GeminiClient {
    /// Create a client for the models and base URL in `config`.
    pub fn new(config: &Config) -> Self {
        Self::with_http(reqwest::Client::new(), config)
    }

    /// Create a client sharing an existing HTTP client.
    pub fn with_http(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            image_model: config.image_model.clone(),
            image_endpoint: config.gemini_endpoint(&config.image_model),
            text_endpoint: config.gemini_endpoint(&config.text_model),
        }
    }

    async fn post(&self, endpoint: &str, request: &GeminiRequest) -> Result<GeminiResponse, Error> {
        let response = self
            .http
            .post(endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::api(endpoint, 0, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(endpoint, status.as_u16(), body));
        }

        let body = response.text().await.map_err(|e| {
            Error::api(endpoint, status.as_u16(), format!("Failed to read response: {}", e))
        })?;

        serde_json::from_str(&body).map_err(|e| {
            Error::api(
                endpoint,
                status.as_u16(),
                format!("Failed to parse response: {}. Raw: {}", e, truncate(&body, 500)),
            )
        })
    }
}

#[async_trait]
impl ImageModel for GeminiClient {
    #[instrument(
        level = "info",
        name = "gemini_generate_image",
        skip(self, request),
        fields(model = %self.image_model, mode = ?request.mode)
    )]
    async fn generate_image(&self, request: &ImageRequest) -> Result<ImageData, Error> {
        let body = GeminiRequest::for_image(request);
        debug!(endpoint = %self.image_endpoint, "Calling Gemini API for image");

        let response = self.post(&self.image_endpoint, &body).await?;

        match extract_image(&response) {
            Some(image) => {
                info!(
                    format = %image.format,
                    size = image.data.len(),
                    "Received image from Gemini API"
                );
                Ok(image)
            }
            None => {
                let detail = describe_missing_image(&response);
                warn!(detail = %detail, "Gemini response contained no image");
                Err(Error::no_image(&self.image_model, detail))
            }
        }
    }

    #[instrument(level = "debug", name = "gemini_generate_text", skip_all)]
    async fn generate_text(&self, prompt: &str) -> Result<String, Error> {
        let body = GeminiRequest::for_text(prompt);
        let response = self.post(&self.text_endpoint, &body).await?;
        Ok(collect_text(&response))
    }
}

/// First decodable image part across all candidates, in order.
///
/// Parts that are text, carry a non-image MIME type or fail to decode are
/// skipped.
pub fn extract_image(response: &GeminiResponse) -> Option<ImageData> {
    response
        .parts()
        .filter_map(|part| match part {
            GeminiResponsePart::InlineData { inline_data } => Some(inline_data),
            _ => None,
        })
        .find_map(|inline| {
            if !inline.mime_type.to_ascii_lowercase().starts_with("image/") {
                return None;
            }
            let data = BASE64.decode(inline.data.trim()).ok()?;
            let format =
                ImageFormat::from_mime(&inline.mime_type).or_else(|| ImageFormat::sniff(&data))?;
            Some(ImageData { data, format })
        })
}

/// Text parts of the response joined with newlines.
pub fn collect_text(response: &GeminiResponse) -> String {
    response
        .parts()
        .filter_map(|part| match part {
            GeminiResponsePart::Text { text } => Some(text.trim()),
            _ => None,
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_missing_image(response: &GeminiResponse) -> String {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_deref())
    {
        return format!("prompt was blocked ({})", reason);
    }

    let text = collect_text(response);
    if !text.is_empty() {
        return format!("model answered with text only: {}", truncate(&text, 300));
    }

    match response.candidates.iter().find_map(|c| c.finish_reason.as_deref()) {
        Some(reason) => format!("response contained no image data (finish reason {})", reason),
        None => "response contained no image data".to_string(),
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// =============================================================================
// API Request/Response Types
// =============================================================================

/// `generateContent` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// Conversation turns (a single user turn here)
    pub contents: Vec<GeminiContent>,
    /// Generation configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GeminiGenerationConfig>,
}

impl GeminiRequest {
    /// Body for an image request: the instruction template, plus the source
    /// image in transform mode.
    pub fn for_image(request: &ImageRequest) -> Self {
        let mut parts = Vec::with_capacity(2);
        match request.mode {
            RequestMode::Generate => {
                parts.push(GeminiPart::Text {
                    text: generation_instructions(&request.prompt),
                });
            }
            RequestMode::Transform => {
                parts.push(GeminiPart::Text {
                    text: transformation_instructions(&request.prompt),
                });
                if let Some(source) = &request.source {
                    parts.push(GeminiPart::InlineData {
                        inline_data: GeminiInlineData {
                            mime_type: source.format.mime_type().to_string(),
                            data: BASE64.encode(&source.data),
                        },
                    });
                }
            }
        }

        Self {
            contents: vec![GeminiContent::user(parts)],
            generation_config: Some(GeminiGenerationConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            }),
        }
    }

    /// Body for a text-only request.
    pub fn for_text(prompt: &str) -> Self {
        Self {
            contents: vec![GeminiContent::user(vec![GeminiPart::Text {
                text: prompt.to_string(),
            }])],
            generation_config: None,
        }
    }
}

/// Gemini content structure.
#[derive(Debug, Serialize)]
pub struct GeminiContent {
    /// Role (user or model)
    pub role: String,
    /// Content parts
    pub parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn user(parts: Vec<GeminiPart>) -> Self {
        Self {
            role: "user".to_string(),
            parts,
        }
    }
}

/// Gemini content part (request).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GeminiPart {
    /// Text content
    Text { text: String },
    /// Inline binary content
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

/// Gemini generation config.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    /// Response modalities (TEXT, IMAGE)
    pub response_modalities: Vec<String>,
}

/// `generateContent` response body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    /// Response candidates
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    /// Feedback on the prompt, present when it was blocked
    #[serde(default)]
    pub prompt_feedback: Option<GeminiPromptFeedback>,
}

impl GeminiResponse {
    fn parts(&self) -> impl Iterator<Item = &GeminiResponsePart> {
        self.candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
    }
}

/// Gemini response candidate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    /// Content
    #[serde(default)]
    pub content: Option<GeminiResponseContent>,
    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Gemini response content.
#[derive(Debug, Deserialize)]
pub struct GeminiResponseContent {
    /// Content parts
    #[serde(default)]
    pub parts: Vec<GeminiResponsePart>,
}

/// Gemini response part.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GeminiResponsePart {
    /// Inline data (image)
    InlineData {
        #[serde(rename = "inlineData", alias = "inline_data")]
        inline_data: GeminiInlineData,
    },
    /// Text content
    Text { text: String },
    /// Anything else (function calls, executable code, ...)
    Other(serde_json::Value),
}

/// Gemini inline data (base64 encoded).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiInlineData {
    /// MIME type
    #[serde(alias = "mime_type")]
    pub mime_type: String,
    /// Base64-encoded data
    pub data: String,
}

/// Prompt feedback.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPromptFeedback {
    /// Block reason, e.g. `SAFETY`
    #[serde(default)]
    pub block_reason: Option<String>,
}
