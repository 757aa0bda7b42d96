//! Input parameter validation tests.
//!
//! Malformed arguments are protocol errors; well-formed arguments with bad
//! values come back as error results and never reach the model.

#[cfg(test)]
mod tests {
    use crate::{args, offline_config};
    use gemini_image_mcp::handler::decode_data_url;
    use gemini_image_mcp::request::{ImageRequest, MAX_SOURCE_BYTES, SourceImage};
    use gemini_image_mcp::server::{GENERATE_TOOL, ImageServer, LIST_TOOL, TRANSFORM_FILE_TOOL};
    use gemini_image_mcp::storage::{ImageStore, MAX_LIST_LIMIT, MIN_LIST_LIMIT, clamp_limit};
    use gemini_image_mcp::ImageFormat;
    use gemini_image_mcp_common::{Error, StorageError};
    use tempfile::TempDir;

    #[test]
    fn test_request_validation_rejects_empty_prompt() {
        let errors = ImageRequest::generate("   ").validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "prompt"));
    }

    #[test]
    fn test_request_validation_rejects_oversized_source() {
        let source = SourceImage {
            data: vec![0u8; MAX_SOURCE_BYTES + 1],
            format: ImageFormat::Png,
        };
        let errors = ImageRequest::transform("add snow", source).validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "source"));
    }

    #[test]
    fn test_data_url_rejections() {
        for bad in [
            "",
            "data:text/plain;base64,aGVsbG8=",
            "data:image/png,iVBORw0KGgo=",
            "data:image/png;base64,@@@@",
            "data:image/gif;base64,R0lGODlhAQABAAAAACw=",
        ] {
            let result = decode_data_url(bad);
            assert!(
                matches!(result, Err(Error::Validation(_))),
                "{:?} should be rejected, got {:?}",
                bad,
                result
            );
        }
    }

    #[test]
    fn test_data_url_accepts_png() {
        let source = decode_data_url("data:image/png;base64,iVBORw0KGgoAAAA=").unwrap();
        assert_eq!(source.format, ImageFormat::Png);
    }

    #[tokio::test]
    async fn test_resolve_rejects_paths_outside_output_dir() {
        let dir = TempDir::new().unwrap();
        let store = ImageStore::new(dir.path());

        for name in ["../escape.png", "nested/inner.png", "/etc/passwd", ""] {
            let result = store.resolve(name).await;
            assert!(
                matches!(result, Err(Error::Validation(_))),
                "{:?} should be rejected, got {:?}",
                name,
                result
            );
        }
    }

    #[tokio::test]
    async fn test_resolve_requires_exact_name() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("red_fox_a1b2c3d4e5f6.png"), b"x").unwrap();
        let store = ImageStore::new(dir.path());

        let result = store.resolve("red_fox").await;
        assert!(matches!(result, Err(Error::Storage(StorageError::ImageNotFound(_)))));

        let found = store.resolve("red_fox_a1b2c3d4e5f6.png").await.unwrap();
        assert_eq!(found, dir.path().join("red_fox_a1b2c3d4e5f6.png"));
    }

    #[test]
    fn test_list_limit_is_clamped() {
        assert_eq!(clamp_limit(-5), MIN_LIST_LIMIT);
        assert_eq!(clamp_limit(0), MIN_LIST_LIMIT);
        assert_eq!(clamp_limit(42), 42);
        assert_eq!(clamp_limit(10_000), MAX_LIST_LIMIT);
    }

    #[tokio::test]
    async fn test_malformed_arguments_are_protocol_errors() {
        let dir = TempDir::new().unwrap();
        let server = ImageServer::new(&offline_config(dir.path().to_path_buf()));

        assert!(server.dispatch(GENERATE_TOOL, None).await.is_err());
        assert!(
            server
                .dispatch(GENERATE_TOOL, args(serde_json::json!({ "prompt": 7 })))
                .await
                .is_err()
        );
        assert!(
            server
                .dispatch(
                    TRANSFORM_FILE_TOOL,
                    args(serde_json::json!({ "image_filename": "a.png" })),
                )
                .await
                .is_err()
        );
        assert!(
            server
                .dispatch(LIST_TOOL, args(serde_json::json!({ "limit": "ten" })))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_empty_prompt_is_error_result() {
        let dir = TempDir::new().unwrap();
        let server = ImageServer::new(&offline_config(dir.path().to_path_buf()));

        let result = server
            .dispatch(GENERATE_TOOL, args(serde_json::json!({ "prompt": "" })))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
    }
}

#[cfg(test)]
mod property_tests {
    use gemini_image_mcp::storage::{MAX_LIST_LIMIT, MIN_LIST_LIMIT, clamp_limit};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn clamped_limit_stays_in_range(limit in any::<i64>()) {
            let clamped = clamp_limit(limit);
            prop_assert!((MIN_LIST_LIMIT..=MAX_LIST_LIMIT).contains(&clamped));
        }

        #[test]
        fn in_range_limit_is_unchanged(limit in 10i64..=100) {
            prop_assert_eq!(clamp_limit(limit) as i64, limit);
        }
    }
}
