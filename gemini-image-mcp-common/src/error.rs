//! Error types for the common library.
//!
//! This module provides the error hierarchy shared by the image pipeline,
//! built with `thiserror`.
//!
//! # Error Categories
//!
//! - `ConfigError`: Missing or invalid configuration
//! - `StorageError`: Output directory missing, unwritable or unreadable
//! - `UploadError`: Image-hosting endpoint failures (never fatal for a request)
//! - `Error::Api`: Generation model errors (includes endpoint and status)
//! - `Error::NoImageReturned`: The model answered without any image payload
//! - `Error::Translation`: Prompt translation failures (never fatal for a request)
//! - `Error::Validation`: Input validation failures
//! - `Error::Io`: Other file system operations

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the image server.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors (missing env vars, invalid values)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Output directory errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Image-hosting upload errors
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Generation model API errors with endpoint and HTTP status context.
    ///
    /// A status code of 0 means the request never produced an HTTP response
    /// (connection refused, DNS failure, aborted transfer).
    #[error("API error for {endpoint} (HTTP {status_code}): {message}")]
    Api {
        /// The API endpoint that was called
        endpoint: String,
        /// HTTP status code returned by the API
        status_code: u16,
        /// Error message from the API or describing the failure
        message: String,
    },

    /// The model responded successfully but returned no image data
    #[error("No image was returned by model {model}: {detail}")]
    NoImageReturned {
        /// Model that was asked for an image
        model: String,
        /// Model commentary or block reason, if any
        detail: String,
    },

    /// Prompt translation failed
    #[error("Translation failed: {0}")]
    Translation(String),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// File system I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new API error with endpoint, status code, and message.
    ///
    /// # Example
    ///
    /// ```
    /// use gemini_image_mcp_common::error::Error;
    ///
    /// let err = Error::api(
    ///     "https://generativelanguage.googleapis.com/v1beta/models/m:generateContent",
    ///     429,
    ///     "Quota exceeded"
    /// );
    /// assert!(err.to_string().contains("429"));
    /// assert!(err.to_string().contains("Quota exceeded"));
    /// ```
    pub fn api(endpoint: impl Into<String>, status_code: u16, message: impl Into<String>) -> Self {
        Error::Api {
            endpoint: endpoint.into(),
            status_code,
            message: message.into(),
        }
    }

    /// Create a new "no image returned" error.
    ///
    /// # Example
    ///
    /// ```
    /// use gemini_image_mcp_common::error::Error;
    ///
    /// let err = Error::no_image("gemini-2.5-flash-image", "I can't draw that");
    /// assert!(err.to_string().contains("No image was returned"));
    /// ```
    pub fn no_image(model: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::NoImageReturned {
            model: model.into(),
            detail: detail.into(),
        }
    }

    /// Create a new translation error.
    pub fn translation(message: impl Into<String>) -> Self {
        Error::Translation(message.into())
    }

    /// Create a new validation error.
    ///
    /// # Example
    ///
    /// ```
    /// use gemini_image_mcp_common::error::Error;
    ///
    /// let err = Error::validation("prompt cannot be empty");
    /// assert!(err.to_string().contains("prompt cannot be empty"));
    /// ```
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}

/// Configuration errors.
///
/// These errors occur when loading or validating configuration from
/// environment variables or configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("Required environment variable {0} is not set")]
    MissingEnvVar(String),

    /// An environment variable has an invalid value
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl ConfigError {
    /// Create a new missing environment variable error.
    pub fn missing_env_var(name: impl Into<String>) -> Self {
        ConfigError::MissingEnvVar(name.into())
    }

    /// Create a new invalid value error.
    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue(name.into(), reason.into())
    }
}

/// Output directory errors.
///
/// Any of these is fatal for the current request and is never retried.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The output directory does not exist
    #[error("Output directory {} does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Writing an image into the directory failed
    #[error("Failed to write {}: {message}", path.display())]
    WriteFailed {
        /// Target path of the write
        path: PathBuf,
        /// Underlying failure
        message: String,
    },

    /// Reading the directory or a file in it failed
    #[error("Failed to read {}: {message}", path.display())]
    ReadFailed {
        /// Path that could not be read
        path: PathBuf,
        /// Underlying failure
        message: String,
    },

    /// A file with the synthesized name already exists
    #[error("Refusing to overwrite existing image {}", .0.display())]
    AlreadyExists(PathBuf),

    /// The requested image is not present in the output directory
    #[error("Image file not found: {0}")]
    ImageNotFound(String),
}

impl StorageError {
    /// Create a new write failure.
    pub fn write_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        StorageError::WriteFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new read failure.
    pub fn read_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        StorageError::ReadFailed {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Image-hosting upload errors.
///
/// The orchestrator collapses all of these into "upload unavailable" and
/// falls back to the local path.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The request never got an HTTP response
    #[error("Upload request to {endpoint} failed: {message}")]
    Request {
        /// Upload endpoint
        endpoint: String,
        /// Underlying failure
        message: String,
    },

    /// The endpoint answered with a non-success status
    #[error("Upload to {endpoint} failed with HTTP {status_code}: {body}")]
    Status {
        /// Upload endpoint
        endpoint: String,
        /// HTTP status code
        status_code: u16,
        /// Response body
        body: String,
    },

    /// The response did not contain a usable URL
    #[error("Upload response from {endpoint} contained no URL")]
    MissingUrl {
        /// Upload endpoint
        endpoint: String,
    },
}

/// Result type alias using the unified Error type.
pub type Result<T> = std::result::Result<T, Error>;
