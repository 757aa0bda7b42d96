//! MCP server for the image tools.
//!
//! Exposes:
//! - `generate_image_from_text`
//! - `transform_image_from_file`
//! - `transform_image_from_encoded`
//! - `list_generated_images`
//!
//! Pipeline failures come back as tool results flagged `is_error`; only
//! malformed arguments and unknown tools are protocol errors.

use std::borrow::Cow;
use std::sync::Arc;

use gemini_image_mcp_common::config::Config;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    model::{
        CallToolResult, Content, JsonObject, ListToolsResult, ServerCapabilities, ServerInfo,
        Tool,
    },
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{error, info};

use crate::handler::ImageHandler;

/// Tool name for text-to-image generation.
pub const GENERATE_TOOL: &str = "generate_image_from_text";
/// Tool name for transforming a stored image.
pub const TRANSFORM_FILE_TOOL: &str = "transform_image_from_file";
/// Tool name for transforming an inline image.
pub const TRANSFORM_ENCODED_TOOL: &str = "transform_image_from_encoded";
/// Tool name for listing stored images.
pub const LIST_TOOL: &str = "list_generated_images";

/// MCP Server for image generation.
#[derive(Clone)]
pub struct ImageServer {
    handler: Arc<ImageHandler>,
}

/// Tool parameters for generate_image_from_text.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenerateImageParams {
    /// Description of the image to generate, in any language
    pub prompt: String,
}

/// Tool parameters for transform_image_from_file.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TransformFileParams {
    /// Name of an image in the output directory, or a path returned by list_generated_images
    pub image_filename: String,
    /// Description of the change to make
    pub prompt: String,
}

/// Tool parameters for transform_image_from_encoded.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TransformEncodedParams {
    /// Image as a data URL: data:image/<format>;base64,<data>
    pub encoded_image: String,
    /// Description of the change to make
    pub prompt: String,
}

/// Tool parameters for list_generated_images.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListImagesParams {
    /// Maximum number of images to return (clamped to 10-100); all images when omitted
    #[serde(default)]
    #[schemars(range(min = 10, max = 100))]
    pub limit: Option<i64>,
}

impl ImageServer {
    /// Create a new ImageServer with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_handler(Arc::new(ImageHandler::new(config)))
    }

    /// Create a server around an existing handler.
    pub fn with_handler(handler: Arc<ImageHandler>) -> Self {
        Self { handler }
    }

    /// Generate an image from a text prompt.
    pub async fn generate_image_from_text(&self, params: GenerateImageParams) -> CallToolResult {
        info!(prompt = %params.prompt, "Generating image");
        match self.handler.generate_from_text(&params.prompt).await {
            Ok(outcome) => CallToolResult::success(vec![Content::text(outcome.to_string())]),
            Err(e) => tool_error("Error generating image", e),
        }
    }

    /// Transform an image from the output directory.
    pub async fn transform_image_from_file(&self, params: TransformFileParams) -> CallToolResult {
        info!(
            image_filename = %params.image_filename,
            prompt = %params.prompt,
            "Transforming image file"
        );
        match self
            .handler
            .transform_from_file(&params.image_filename, &params.prompt)
            .await
        {
            Ok(outcome) => CallToolResult::success(vec![Content::text(outcome.to_string())]),
            Err(e) => tool_error("Error transforming image", e),
        }
    }

    /// Transform an image passed as a data URL.
    pub async fn transform_image_from_encoded(
        &self,
        params: TransformEncodedParams,
    ) -> CallToolResult {
        info!(prompt = %params.prompt, "Transforming encoded image");
        match self
            .handler
            .transform_from_encoded(&params.encoded_image, &params.prompt)
            .await
        {
            Ok(outcome) => CallToolResult::success(vec![Content::text(outcome.to_string())]),
            Err(e) => tool_error("Error transforming image", e),
        }
    }

    /// List generated images, one text item per path.
    pub async fn list_generated_images(&self, params: ListImagesParams) -> CallToolResult {
        match self.handler.list_images(params.limit).await {
            Ok(paths) => CallToolResult::success(
                paths
                    .iter()
                    .map(|path| Content::text(path.display().to_string()))
                    .collect(),
            ),
            Err(e) => tool_error("Error listing images", e),
        }
    }

    /// Route a tool call by name.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        match name {
            GENERATE_TOOL => Ok(self.generate_image_from_text(parse_args(arguments)?).await),
            TRANSFORM_FILE_TOOL => Ok(self.transform_image_from_file(parse_args(arguments)?).await),
            TRANSFORM_ENCODED_TOOL => {
                Ok(self.transform_image_from_encoded(parse_args(arguments)?).await)
            }
            LIST_TOOL => {
                let params = match arguments {
                    Some(args) => parse_args(Some(args))?,
                    None => ListImagesParams::default(),
                };
                Ok(self.list_generated_images(params).await)
            }
            _ => Err(McpError::invalid_params(format!("Unknown tool: {}", name), None)),
        }
    }

    /// Tool declarations advertised to clients.
    pub fn tools() -> Vec<Tool> {
        vec![
            tool::<GenerateImageParams>(
                GENERATE_TOOL,
                "Generate an image from a text prompt using Google's Gemini model. \
                 Non-English prompts are translated first. Returns the public URL of \
                 the image when uploading is configured, otherwise its local path.",
            ),
            tool::<TransformFileParams>(
                TRANSFORM_FILE_TOOL,
                "Transform an image from the output directory according to a text prompt \
                 using Google's Gemini model. The file name must match exactly. Returns \
                 the URL or local path of the new image.",
            ),
            tool::<TransformEncodedParams>(
                TRANSFORM_ENCODED_TOOL,
                "Transform an image passed as a base64 data URL \
                 (data:image/<format>;base64,<data>) according to a text prompt using \
                 Google's Gemini model. Returns the URL or local path of the new image.",
            ),
            tool::<ListImagesParams>(
                LIST_TOOL,
                "List images in the output directory, newest first. Returns one absolute \
                 path per image.",
            ),
        ]
    }
}

fn tool<T: JsonSchema>(name: &'static str, description: &'static str) -> Tool {
    let schema = schemars::schema_for!(T);
    let input_schema = match serde_json::to_value(&schema).unwrap_or_default() {
        serde_json::Value::Object(map) => Arc::new(map),
        _ => Arc::new(serde_json::Map::new()),
    };

    Tool {
        name: Cow::Borrowed(name),
        description: Some(Cow::Borrowed(description)),
        input_schema,
        annotations: None,
        icons: None,
        meta: None,
        output_schema: None,
        title: None,
    }
}

fn parse_args<T: DeserializeOwned>(arguments: Option<JsonObject>) -> Result<T, McpError> {
    let args = arguments.ok_or_else(|| McpError::invalid_params("Missing parameters", None))?;
    serde_json::from_value(serde_json::Value::Object(args))
        .map_err(|e| McpError::invalid_params(format!("Invalid parameters: {}", e), None))
}

fn tool_error(context: &str, err: gemini_image_mcp_common::Error) -> CallToolResult {
    let message = format!("{}: {}", context, err);
    error!(error = %err, "{}", context);
    CallToolResult::error(vec![Content::text(message)])
}

impl ServerHandler for ImageServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Image generation server using Google's Gemini model. \
                 Use generate_image_from_text to create images from prompts, \
                 transform_image_from_file or transform_image_from_encoded to edit images, \
                 and list_generated_images to find earlier results."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        async move {
            Ok(ListToolsResult {
                tools: Self::tools(),
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        params: rmcp::model::CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move { self.dispatch(params.name.as_ref(), params.arguments).await }
    }
}
