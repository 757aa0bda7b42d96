//! Image-hosting upload client.
//!
//! Posts image bytes as `multipart/form-data` to a configured endpoint and
//! extracts the public URL from the response.

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::UploadConfig;
use crate::error::UploadError;

/// JSON locations searched for the public URL, in order.
const URL_POINTERS: &[&str] = &["/url", "/link", "/data/url", "/data/link", "/data/display_url"];

/// Image-hosting client.
#[derive(Clone)]
pub struct UploadClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl UploadClient {
    /// Create a new upload client for the configured endpoint.
    pub fn new(config: &UploadConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create a new upload client sharing an existing HTTP client.
    pub fn with_client(client: reqwest::Client, config: &UploadConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Upload image bytes and return the public URL.
    ///
    /// # Arguments
    /// * `data` - The image bytes
    /// * `filename` - File name announced in the form part
    /// * `content_type` - The MIME type of the image
    ///
    /// # Errors
    /// Returns an `UploadError` on transport failure, non-2xx status, or a
    /// response without a URL.
    #[instrument(
        level = "debug",
        name = "upload_image",
        skip(self, data),
        fields(endpoint = %self.endpoint, size = data.len())
    )]
    pub async fn upload(
        &self,
        data: &[u8],
        filename: &str,
        content_type: &str,
    ) -> Result<String, UploadError> {
        let part = Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| UploadError::Request {
                endpoint: self.endpoint.clone(),
                message: format!("Invalid content type '{}': {}", content_type, e),
            })?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Request {
                endpoint: self.endpoint.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| UploadError::Request {
            endpoint: self.endpoint.clone(),
            message: format!("Failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            return Err(UploadError::Status {
                endpoint: self.endpoint.clone(),
                status_code: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "Upload accepted");

        extract_url(&body).ok_or_else(|| UploadError::MissingUrl {
            endpoint: self.endpoint.clone(),
        })
    }
}

/// Find the public URL in an upload response body.
///
/// Accepts a JSON document with the URL at one of the known locations, or a
/// plain-text body that is itself a URL.
pub fn extract_url(body: &str) -> Option<String> {
    let trimmed = body.trim();

    if let Ok(json) = serde_json::from_str::<Value>(trimmed) {
        return URL_POINTERS
            .iter()
            .filter_map(|pointer| json.pointer(pointer).and_then(Value::as_str))
            .find(|candidate| is_http_url(candidate))
            .map(str::to_string);
    }

    if is_http_url(trimmed) && !trimmed.contains(char::is_whitespace) {
        return Some(trimmed.to_string());
    }

    None
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("https://") || s.starts_with("http://")
}
