//! Configuration module for loading environment variables and settings.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Default Gemini model used for image generation and transformation.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Default Gemini model used for text-only calls (prompt translation).
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Default base URL of the Gemini REST API.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Directory name under the home directory used when `OUTPUT_IMAGE_PATH` is unset.
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "gen_image";

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Gemini API key (required)
    pub api_key: String,
    /// Base URL of the Gemini REST API
    pub api_base: String,
    /// Model used for image requests
    pub image_model: String,
    /// Model used for text-only requests
    pub text_model: String,
    /// Absolute path of the directory generated images are written to
    pub output_dir: PathBuf,
    /// Optional image-hosting endpoint
    pub upload: Option<UploadConfig>,
}

/// Image-hosting endpoint settings. Only present when both URL and key are set.
#[derive(Clone)]
pub struct UploadConfig {
    /// Endpoint accepting multipart uploads
    pub endpoint: String,
    /// Bearer credential for the endpoint
    pub api_key: String,
}

impl Config {
    /// Load configuration from environment variables and .env file.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingEnvVar` if GEMINI_API_KEY is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key =
            var("GEMINI_API_KEY").ok_or_else(|| ConfigError::missing_env_var("GEMINI_API_KEY"))?;

        let api_base = var("GEMINI_API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let image_model =
            var("GEMINI_IMAGE_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string());
        let text_model = var("GEMINI_TEXT_MODEL").unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string());

        let output_dir = match var("OUTPUT_IMAGE_PATH") {
            Some(path) => absolutize(Path::new(&path))?,
            None => dirs::home_dir()
                .map(|home| home.join(DEFAULT_OUTPUT_DIR_NAME))
                .ok_or_else(|| {
                    ConfigError::invalid_value(
                        "OUTPUT_IMAGE_PATH",
                        "not set and no home directory found",
                    )
                })?,
        };

        let upload = match (var("UPLOAD_URL"), var("UPLOAD_API_KEY")) {
            (Some(endpoint), Some(api_key)) => Some(UploadConfig { endpoint, api_key }),
            _ => None,
        };

        Ok(Self {
            api_key,
            api_base,
            image_model,
            text_model,
            output_dir,
            upload,
        })
    }

    /// Get the Gemini `generateContent` endpoint URL for a given model.
    pub fn gemini_endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, model)
    }

    /// Whether generated images are forwarded to an image host.
    pub fn upload_enabled(&self) -> bool {
        self.upload.is_some()
    }
}

fn absolutize(path: &Path) -> Result<PathBuf, ConfigError> {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .ok_or_else(|| {
                ConfigError::invalid_value(
                    "OUTPUT_IMAGE_PATH",
                    "cannot expand '~' without a home directory",
                )
            })?,
        Err(_) => path.to_path_buf(),
    };

    std::path::absolute(&expanded)
        .map_err(|e| ConfigError::invalid_value("OUTPUT_IMAGE_PATH", e.to_string()))
}

// Credentials are redacted so configuration can be logged safely.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("image_model", &self.image_model)
            .field("text_model", &self.text_model)
            .field("output_dir", &self.output_dir)
            .field("upload", &self.upload)
            .finish()
    }
}

impl fmt::Debug for UploadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
