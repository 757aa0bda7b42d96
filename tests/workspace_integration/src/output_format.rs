//! Output format tests.
//!
//! Tool results are plain text: a URL or absolute path for generate and
//! transform, one absolute path per item for listing, and a single
//! `is_error` message naming the failure otherwise.

use rmcp::model::{CallToolResult, Content, RawContent};

/// Validates that a CallToolResult has valid content format.
fn validate_tool_result(result: &CallToolResult) -> Result<(), String> {
    if result.is_error.unwrap_or(false) && result.content.len() != 1 {
        return Err(format!(
            "Error result should carry exactly one message, got {}",
            result.content.len()
        ));
    }

    for content in &result.content {
        validate_content(content)?;
    }

    Ok(())
}

/// Validates that a Content item is non-empty text.
fn validate_content(content: &Content) -> Result<(), String> {
    match &content.raw {
        RawContent::Text(text_content) if text_content.text.trim().is_empty() => {
            Err("Text content should not be empty".to_string())
        }
        RawContent::Text(_) => Ok(()),
        other => Err(format!("Expected text content, got {:?}", other)),
    }
}

fn texts(result: &CallToolResult) -> Vec<String> {
    result
        .content
        .iter()
        .filter_map(|content| match &content.raw {
            RawContent::Text(text) => Some(text.text.clone()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{args, offline_config};
    use gemini_image_mcp::server::{
        GENERATE_TOOL, ImageServer, LIST_TOOL, TRANSFORM_ENCODED_TOOL, TRANSFORM_FILE_TOOL,
    };
    use std::path::Path;
    use tempfile::TempDir;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn server_in(dir: &TempDir) -> ImageServer {
        ImageServer::new(&offline_config(dir.path().to_path_buf()))
    }

    fn write_image(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), PNG_HEADER).unwrap();
    }

    #[test]
    fn test_content_validation() {
        assert!(validate_content(&Content::text("/tmp/a.png")).is_ok());
        assert!(validate_content(&Content::text("  ")).is_err());
        assert!(validate_content(&Content::image("base64data", "image/png")).is_err());
    }

    #[test]
    fn test_error_result_needs_one_message() {
        let result = CallToolResult::error(vec![]);
        assert!(validate_tool_result(&result).is_err());

        let result = CallToolResult::error(vec![Content::text("Error generating image: boom")]);
        assert!(validate_tool_result(&result).is_ok());
    }

    #[tokio::test]
    async fn test_empty_listing_is_empty_success() {
        let dir = TempDir::new().unwrap();
        let result = server_in(&dir).dispatch(LIST_TOOL, None).await.unwrap();

        assert_ne!(result.is_error, Some(true));
        assert!(result.content.is_empty());
        assert!(validate_tool_result(&result).is_ok());
    }

    #[tokio::test]
    async fn test_listing_returns_absolute_image_paths() {
        let dir = TempDir::new().unwrap();
        write_image(dir.path(), "red_fox_a1b2c3d4e5f6.png");
        write_image(dir.path(), "blue_sea_0123456789ab.png");
        std::fs::write(dir.path().join("notes.txt"), b"not an image").unwrap();

        let result = server_in(&dir)
            .dispatch(LIST_TOOL, args(serde_json::json!({ "limit": 10 })))
            .await
            .unwrap();

        assert!(validate_tool_result(&result).is_ok());
        let paths = texts(&result);
        assert_eq!(paths.len(), 2);
        for path in &paths {
            let path = Path::new(path);
            assert!(path.is_absolute());
            assert_eq!(path.parent(), Some(dir.path()));
            assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        }
    }

    #[tokio::test]
    async fn test_generation_failure_is_single_error_message() {
        let dir = TempDir::new().unwrap();
        let result = server_in(&dir)
            .dispatch(GENERATE_TOOL, args(serde_json::json!({ "prompt": "a lighthouse at dusk" })))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        assert!(validate_tool_result(&result).is_ok());
        assert!(texts(&result)[0].starts_with("Error generating image"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0, "Nothing should be written");
    }

    #[tokio::test]
    async fn test_missing_source_file_is_error_result() {
        let dir = TempDir::new().unwrap();
        let result = server_in(&dir)
            .dispatch(
                TRANSFORM_FILE_TOOL,
                args(serde_json::json!({ "image_filename": "missing.png", "prompt": "add snow" })),
            )
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        let message = &texts(&result)[0];
        assert!(message.starts_with("Error transforming image"));
        assert!(message.contains("missing.png"));
    }

    #[tokio::test]
    async fn test_bad_data_url_is_error_result() {
        let dir = TempDir::new().unwrap();
        let result = server_in(&dir)
            .dispatch(
                TRANSFORM_ENCODED_TOOL,
                args(serde_json::json!({
                    "encoded_image": "not a data url",
                    "prompt": "add snow"
                })),
            )
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        assert!(validate_tool_result(&result).is_ok());
        assert!(texts(&result)[0].contains("data:image/"));
    }
}
