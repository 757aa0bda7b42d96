//! Gemini Image MCP Common Library
//!
//! Configuration, error types, the image-hosting upload client, tracing
//! setup and MCP transport plumbing shared by the image server.

pub mod config;
pub mod error;
pub mod server;
pub mod tracing;
pub mod transport;
pub mod upload;


pub use config::{Config, UploadConfig};
pub use error::{ConfigError, Error, Result, StorageError, UploadError};
pub use server::{McpServerBuilder, ServerError, shutdown_channel};
pub use transport::{Transport, TransportArgs, TransportMode};
pub use upload::UploadClient;
