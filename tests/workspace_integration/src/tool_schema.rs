//! Tool schema validity tests.
//!
//! Every advertised tool must carry a description and an object schema
//! that lists each required argument with its type.

use serde_json::Value;

/// Validates that a JSON schema has the required structure.
fn validate_json_schema(schema: &Value) -> Result<(), String> {
    let obj = schema
        .as_object()
        .ok_or_else(|| "Schema must be an object".to_string())?;

    if let Some(type_val) = obj.get("type") {
        if type_val != "object" {
            return Err(format!("Expected type 'object', got {:?}", type_val));
        }
    }

    let properties = match obj.get("properties") {
        Some(Value::Object(properties)) => properties,
        Some(_) => return Err("Properties must be an object".to_string()),
        None => return Ok(()),
    };

    if let Some(required) = obj.get("required") {
        let required = required
            .as_array()
            .ok_or_else(|| "Required must be an array".to_string())?;
        for field in required {
            let field = field
                .as_str()
                .ok_or_else(|| format!("Required entry {:?} must be a string", field))?;
            let property = properties
                .get(field)
                .ok_or_else(|| format!("Required field '{}' has no property", field))?;
            if property.get("type").is_none() {
                return Err(format!("Required field '{}' has no type", field));
            }
        }
    }

    Ok(())
}

/// Validates that a tool has required fields.
fn validate_tool(tool: &rmcp::model::Tool) -> Result<(), String> {
    if tool.name.is_empty() {
        return Err("Tool name cannot be empty".to_string());
    }

    match &tool.description {
        Some(description) if !description.is_empty() => {}
        _ => return Err(format!("Tool '{}' must have a description", tool.name)),
    }

    if tool.input_schema.is_empty() {
        return Err(format!("Tool '{}' must have an input schema", tool.name));
    }

    let schema_value = serde_json::to_value(&*tool.input_schema)
        .map_err(|e| format!("Failed to serialize schema: {}", e))?;
    validate_json_schema(&schema_value)
}

/// Names listed under `required` in a tool's schema.
fn required_fields(tool: &rmcp::model::Tool) -> Vec<String> {
    tool.input_schema
        .get("required")
        .and_then(Value::as_array)
        .map(|fields| {
            fields
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemini_image_mcp::server::{
        GENERATE_TOOL, ImageServer, LIST_TOOL, TRANSFORM_ENCODED_TOOL, TRANSFORM_FILE_TOOL,
    };
    use std::borrow::Cow;
    use std::sync::Arc;

    fn find_tool(name: &str) -> rmcp::model::Tool {
        ImageServer::tools()
            .into_iter()
            .find(|t| t.name == name)
            .unwrap_or_else(|| panic!("Tool {} should be registered", name))
    }

    #[test]
    fn test_json_schema_validation() {
        let valid_schema = serde_json::json!({
            "type": "object",
            "properties": {
                "prompt": { "type": "string" }
            },
            "required": ["prompt"]
        });
        assert!(validate_json_schema(&valid_schema).is_ok());

        let wrong_type = serde_json::json!({ "type": "string" });
        assert!(validate_json_schema(&wrong_type).is_err());

        let dangling_required = serde_json::json!({
            "type": "object",
            "properties": {},
            "required": ["prompt"]
        });
        assert!(validate_json_schema(&dangling_required).is_err());
    }

    #[test]
    fn test_tool_validation() {
        let valid_tool = rmcp::model::Tool {
            name: Cow::Borrowed("test_tool"),
            description: Some(Cow::Borrowed("A test tool")),
            input_schema: Arc::new(
                serde_json::json!({ "type": "object", "properties": {} })
                    .as_object()
                    .unwrap()
                    .clone(),
            ),
            annotations: None,
            icons: None,
            meta: None,
            output_schema: None,
            title: None,
        };
        assert!(validate_tool(&valid_tool).is_ok());

        let no_description = rmcp::model::Tool {
            description: None,
            ..valid_tool.clone()
        };
        assert!(validate_tool(&no_description).is_err());

        let no_name = rmcp::model::Tool {
            name: Cow::Borrowed(""),
            ..valid_tool
        };
        assert!(validate_tool(&no_name).is_err());
    }

    #[test]
    fn test_all_registered_tools_are_valid() {
        let tools = ImageServer::tools();
        assert_eq!(tools.len(), 4);
        for tool in &tools {
            let result = validate_tool(tool);
            assert!(result.is_ok(), "Tool {} invalid: {:?}", tool.name, result.err());
        }
    }

    #[test]
    fn test_generate_tool_requires_prompt() {
        let tool = find_tool(GENERATE_TOOL);
        assert_eq!(required_fields(&tool), vec!["prompt".to_string()]);
        assert_eq!(tool.input_schema["properties"]["prompt"]["type"], "string");
    }

    #[test]
    fn test_transform_tools_require_source_and_prompt() {
        let file_tool = find_tool(TRANSFORM_FILE_TOOL);
        let mut required = required_fields(&file_tool);
        required.sort();
        assert_eq!(required, vec!["image_filename".to_string(), "prompt".to_string()]);

        let encoded_tool = find_tool(TRANSFORM_ENCODED_TOOL);
        let mut required = required_fields(&encoded_tool);
        required.sort();
        assert_eq!(required, vec!["encoded_image".to_string(), "prompt".to_string()]);
    }

    #[test]
    fn test_list_tool_limit_is_optional_and_bounded() {
        let tool = find_tool(LIST_TOOL);
        assert!(required_fields(&tool).is_empty());

        let limit = tool.input_schema["properties"]["limit"].to_string();
        assert!(limit.contains("\"minimum\":10"), "{}", limit);
        assert!(limit.contains("\"maximum\":100"), "{}", limit);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use gemini_image_mcp::server::ImageServer;
    use proptest::prelude::*;

    proptest! {
        /// Registered tool names are snake_case identifiers.
        #[test]
        fn tool_names_are_snake_case(index in 0usize..4) {
            let tools = ImageServer::tools();
            let name = tools[index].name.to_string();
            prop_assert!(name.chars().next().is_some_and(|c| c.is_ascii_lowercase()));
            prop_assert!(name.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }

        /// Arbitrary extra properties never make a valid schema invalid.
        #[test]
        fn optional_properties_keep_schema_valid(field in "[a-z][a-z_]{0,15}") {
            let schema = serde_json::json!({
                "type": "object",
                "properties": {
                    "prompt": { "type": "string" },
                    field: { "type": ["integer", "null"] }
                },
                "required": ["prompt"]
            });
            prop_assert!(validate_json_schema(&schema).is_ok());
        }
    }
}
