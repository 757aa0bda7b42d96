//! Image request and payload types.

use std::fmt;

use crate::format::ImageFormat;

/// Largest source image accepted for transformation (inline request limit).
pub const MAX_SOURCE_BYTES: usize = 20 * 1024 * 1024;

/// What the model is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Text-to-image
    Generate,
    /// Image-to-image
    Transform,
}

/// Source image for a transform request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Raw image bytes
    pub data: Vec<u8>,
    /// Detected format
    pub format: ImageFormat,
}

/// One request to the image model.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    /// Prompt after normalization (English, untemplated)
    pub prompt: String,
    /// Generation or transformation
    pub mode: RequestMode,
    /// Source image, required in transform mode
    pub source: Option<SourceImage>,
}

/// Binary image returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Raw image bytes
    pub data: Vec<u8>,
    /// Image format
    pub format: ImageFormat,
}

/// A model output with its synthesized filename, ready to be written once.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// Raw image bytes
    pub data: Vec<u8>,
    /// Image format
    pub format: ImageFormat,
    /// Bare filename inside the output directory
    pub filename: String,
}

impl GeneratedImage {
    /// Attach a filename to model output.
    pub fn new(image: ImageData, filename: String) -> Self {
        Self {
            data: image.data,
            format: image.format,
            filename,
        }
    }
}

/// Validation error details for an image request.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ImageRequest {
    /// Text-to-image request.
    pub fn generate(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            mode: RequestMode::Generate,
            source: None,
        }
    }

    /// Image-to-image request.
    pub fn transform(prompt: impl Into<String>, source: SourceImage) -> Self {
        Self {
            prompt: prompt.into(),
            mode: RequestMode::Transform,
            source: Some(source),
        }
    }

    /// Validate the request.
    ///
    /// # Returns
    /// - `Ok(())` if the request is valid
    /// - `Err(Vec<ValidationError>)` with every violation found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.prompt.trim().is_empty() {
            errors.push(ValidationError {
                field: "prompt".to_string(),
                message: "Prompt cannot be empty".to_string(),
            });
        }

        match (self.mode, &self.source) {
            (RequestMode::Transform, None) => errors.push(ValidationError {
                field: "source".to_string(),
                message: "Transform requests need a source image".to_string(),
            }),
            (RequestMode::Transform, Some(source)) => {
                if source.data.is_empty() {
                    errors.push(ValidationError {
                        field: "source".to_string(),
                        message: "Source image is empty".to_string(),
                    });
                } else if source.data.len() > MAX_SOURCE_BYTES {
                    errors.push(ValidationError {
                        field: "source".to_string(),
                        message: format!(
                            "Source image is {} bytes, the limit is {} bytes",
                            source.data.len(),
                            MAX_SOURCE_BYTES
                        ),
                    });
                }
            }
            (RequestMode::Generate, Some(_)) => errors.push(ValidationError {
                field: "source".to_string(),
                message: "Generate requests do not take a source image".to_string(),
            }),
            (RequestMode::Generate, None) => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
