//! Request orchestration for the image tools.
//!
//! Each tool call runs one pipeline inside its own task:
//! normalize prompt → validate → generate → name → save → upload.
//! Translation and upload failures are logged and skipped; everything else
//! ends the request with an error.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use gemini_image_mcp_common::config::Config;
use gemini_image_mcp_common::error::Error;
use gemini_image_mcp_common::upload::UploadClient;
use tracing::{debug, info, instrument, warn};

use crate::filename::synthesize;
use crate::format::ImageFormat;
use crate::gemini::{GeminiClient, ImageModel};
use crate::prompt::normalize;
use crate::request::{GeneratedImage, ImageRequest, SourceImage};
use crate::storage::{ImageStore, clamp_limit};

/// Terminal result of a generate or transform request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOutcome {
    /// Absolute path of the saved image
    pub path: PathBuf,
    /// Public URL when the upload succeeded
    pub url: Option<String>,
}

impl fmt::Display for ImageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.url {
            Some(url) => f.write_str(url),
            None => write!(f, "{}", self.path.display()),
        }
    }
}

/// Image generation handler.
pub struct ImageHandler {
    model: Arc<dyn ImageModel>,
    store: ImageStore,
    uploader: Option<UploadClient>,
}

impl ImageHandler {
    /// Create a handler talking to Gemini with the given configuration.
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::new();
        let uploader = config
            .upload
            .as_ref()
            .map(|upload| UploadClient::with_client(http.clone(), upload));

        Self {
            model: Arc::new(GeminiClient::with_http(http, config)),
            store: ImageStore::new(&config.output_dir),
            uploader,
        }
    }

    /// Create a handler from explicit parts.
    pub fn with_deps(
        model: Arc<dyn ImageModel>,
        store: ImageStore,
        uploader: Option<UploadClient>,
    ) -> Self {
        Self { model, store, uploader }
    }

    /// Generate an image from a text prompt.
    #[instrument(level = "info", name = "generate_from_text", skip_all)]
    pub async fn generate_from_text(&self, prompt: &str) -> Result<ImageOutcome, Error> {
        let normalized = normalize(self.model.as_ref(), prompt).await;
        self.run(ImageRequest::generate(normalized)).await
    }

    /// Transform an image from the output directory.
    ///
    /// `image_filename` is a bare filename or a path returned by listing.
    #[instrument(level = "info", name = "transform_from_file", skip(self, prompt))]
    pub async fn transform_from_file(
        &self,
        image_filename: &str,
        prompt: &str,
    ) -> Result<ImageOutcome, Error> {
        let source = self.store.read_source(image_filename).await?;
        let normalized = normalize(self.model.as_ref(), prompt).await;
        self.run(ImageRequest::transform(normalized, source)).await
    }

    /// Transform an image passed inline as a `data:image/<format>;base64,<data>` URL.
    #[instrument(
        level = "info",
        name = "transform_from_encoded",
        skip_all,
        fields(len = encoded_image.len())
    )]
    pub async fn transform_from_encoded(
        &self,
        encoded_image: &str,
        prompt: &str,
    ) -> Result<ImageOutcome, Error> {
        let source = decode_data_url(encoded_image)?;
        let normalized = normalize(self.model.as_ref(), prompt).await;
        self.run(ImageRequest::transform(normalized, source)).await
    }

    /// List generated images, newest first.
    ///
    /// A given limit is clamped to `[10, 100]`; without one every image is
    /// returned.
    #[instrument(level = "info", name = "list_images", skip(self))]
    pub async fn list_images(&self, limit: Option<i64>) -> Result<Vec<PathBuf>, Error> {
        self.store.list(limit.map(clamp_limit)).await
    }

    async fn run(&self, request: ImageRequest) -> Result<ImageOutcome, Error> {
        request.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            Error::validation(messages.join("; "))
        })?;

        let image = self.model.generate_image(&request).await?;

        let filename = synthesize(&request.prompt, image.format);
        let image = GeneratedImage::new(image, filename);
        let path = self.store.save(&image).await?;

        let url = self.upload(&image).await;
        info!(path = %path.display(), uploaded = url.is_some(), "Image ready");

        Ok(ImageOutcome { path, url })
    }

    async fn upload(&self, image: &GeneratedImage) -> Option<String> {
        let uploader = self.uploader.as_ref()?;
        match uploader
            .upload(&image.data, &image.filename, image.format.mime_type())
            .await
        {
            Ok(url) => {
                debug!(url = %url, "Image uploaded");
                Some(url)
            }
            Err(e) => {
                warn!(error = %e, "Upload failed, returning local path");
                None
            }
        }
    }
}

/// Decode a `data:image/<format>;base64,<data>` URL.
pub fn decode_data_url(encoded: &str) -> Result<SourceImage, Error> {
    const EXPECTED: &str = "Expected data:image/<format>;base64,<data>";

    let encoded = encoded.trim();
    let rest = encoded
        .strip_prefix("data:")
        .filter(|rest| rest.to_ascii_lowercase().starts_with("image/"))
        .ok_or_else(|| Error::validation(format!("Invalid image format. {}", EXPECTED)))?;

    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| Error::validation(format!("Invalid image data format. {}", EXPECTED)))?;

    let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let data = BASE64
        .decode(payload.as_bytes())
        .map_err(|e| Error::validation(format!("Invalid base64 encoding: {}", e)))?;

    let format = ImageFormat::sniff(&data)
        .or_else(|| ImageFormat::from_mime(mime))
        .ok_or_else(|| {
            Error::validation(format!(
                "Unsupported image type {}; supported formats are PNG, JPEG and WebP",
                mime
            ))
        })?;

    Ok(SourceImage { data, format })
}
