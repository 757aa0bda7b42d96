//! Gemini Image MCP Server Library
//!
//! Image generation and transformation through Google's Gemini model,
//! served over MCP.

pub mod filename;
pub mod format;
pub mod gemini;
pub mod handler;
pub mod prompt;
pub mod request;
pub mod server;
pub mod storage;

pub use format::ImageFormat;
pub use gemini::{GeminiClient, ImageModel};
pub use handler::{ImageHandler, ImageOutcome};
pub use request::{GeneratedImage, ImageData, ImageRequest, RequestMode, SourceImage};
pub use server::ImageServer;
pub use storage::ImageStore;
