//! Server startup integration tests.
//!
//! The server must build from configuration alone, without touching the
//! network, and advertise tools but no resources.

#[cfg(test)]
mod tests {
    use crate::offline_config;
    use gemini_image_mcp::ImageServer;
    use gemini_image_mcp_common::{Config, Transport};
    use rmcp::ServerHandler;
    use std::path::PathBuf;

    #[test]
    fn test_image_server_startup() {
        let server = ImageServer::new(&offline_config(PathBuf::from("/tmp")));
        let info = server.get_info();

        let instructions = info
            .instructions
            .as_ref()
            .expect("Server should provide instructions")
            .to_lowercase();
        assert!(instructions.contains("image"), "Server instructions should mention 'image'");
        assert!(instructions.contains("gemini"));
    }

    #[test]
    fn test_server_has_tools_but_no_resources() {
        let server = ImageServer::new(&offline_config(PathBuf::from("/tmp")));
        let info = server.get_info();

        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
    }

    #[test]
    fn test_server_builds_from_env_lookup() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().to_string_lossy().to_string();
        let config = Config::from_lookup(|name| match name {
            "GEMINI_API_KEY" => Some("test-key".to_string()),
            "OUTPUT_IMAGE_PATH" => Some(output.clone()),
            _ => None,
        })
        .expect("Config should load with only an API key");

        assert_eq!(config.output_dir, dir.path());
        assert!(!config.upload_enabled());

        let server = ImageServer::new(&config);
        assert!(server.get_info().capabilities.tools.is_some());
    }

    #[test]
    fn test_default_transport_is_stdio() {
        assert!(Transport::default().is_stdio());
    }
}
