//! Wire records for both APIs.
//!
//! Source records are deserialized straight off the Assistants API and
//! re-serialized verbatim into local backups, so every struct carries a
//! flattened `extra` map that preserves fields a2am doesn't interpret.
//! Destination request types serialize only what the Agent Service accepts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// The cursor page shape shared by every list endpoint
/// (`{"object":"list","data":[...],"first_id":..,"last_id":..,"has_more":..}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPage<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub first_id: Option<String>,
    #[serde(default)]
    pub last_id: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

// ---------------------------------------------------------------------------
// Source records
// ---------------------------------------------------------------------------

/// An assistant as returned by the Assistants API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assistant {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    pub model: String,
    #[serde(default)]
    pub tools: Vec<Tool>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A tool attached to an assistant.
///
/// The discriminator is kept as a plain string so unknown tool types stay
/// representable; the `function` payload is opaque and copied verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A conversation thread as returned by the Assistants API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadRecord {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub tool_resources: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single message within a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    pub role: String,
    #[serde(default)]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub content: Vec<ContentPart>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One element of a message's `content` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_file: Option<ImageFileContent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContent {
    pub value: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageFileContent {
    pub file_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Destination requests / records
// ---------------------------------------------------------------------------

/// Payload for `POST /assistants` against the Agent Service.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAgentRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub tools: Vec<Tool>,
}

/// An agent as returned by the Agent Service.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A thread created in the Agent Service.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentThread {
    pub id: String,
}

// ---------------------------------------------------------------------------
// Content rendering
// ---------------------------------------------------------------------------

/// Render a message's content parts as prompt lines.
///
/// Text parts become `Text:{value}`, image parts become
/// `Image File ID: {file_id}`, and anything else is noted with its type so
/// the summarizer knows content was present but unrepresentable.
pub fn render_content_parts(message: &ThreadMessage) -> String {
    let mut lines = String::new();
    for part in &message.content {
        match part.kind.as_str() {
            "text" => {
                if let Some(text) = &part.text {
                    lines.push_str(&format!("Text:{}\n", text.value));
                }
            }
            "image_file" => {
                if let Some(image) = &part.image_file {
                    lines.push_str(&format!("Image File ID: {}\n", image.file_id));
                }
            }
            other => {
                lines.push_str(&format!("Unknown content type: {other}\n"));
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_preserves_unknown_fields() {
        let raw = serde_json::json!({
            "id": "asst_1",
            "object": "assistant",
            "name": "helper",
            "model": "gpt-4o",
            "instructions": "be helpful",
            "tools": [{"type": "code_interpreter"}],
            "created_at": 1_700_000_000,
            "metadata": {"team": "ops"},
            "top_p": 0.9
        });
        let assistant: Assistant = serde_json::from_value(raw.clone()).expect("parse");
        assert_eq!(assistant.id, "asst_1");
        assert_eq!(assistant.tools[0].kind, "code_interpreter");
        assert_eq!(assistant.extra.get("top_p"), Some(&serde_json::json!(0.9)));

        // Round-trip keeps the fields a2am doesn't interpret.
        let back = serde_json::to_value(&assistant).expect("serialize");
        assert_eq!(back.get("object"), Some(&serde_json::json!("assistant")));
        assert_eq!(back.get("top_p"), Some(&serde_json::json!(0.9)));
    }

    #[test]
    fn unknown_tool_types_still_parse() {
        let tool: Tool =
            serde_json::from_value(serde_json::json!({"type": "retrieval"})).expect("parse");
        assert_eq!(tool.kind, "retrieval");
        assert!(tool.function.is_none());
    }

    #[test]
    fn function_tool_payload_is_opaque() {
        let raw = serde_json::json!({
            "type": "function",
            "function": {
                "name": "lookup",
                "parameters": {"type": "object", "properties": {}}
            }
        });
        let tool: Tool = serde_json::from_value(raw.clone()).expect("parse");
        assert_eq!(tool.kind, "function");
        assert_eq!(serde_json::to_value(&tool).expect("serialize"), raw);
    }

    #[test]
    fn list_page_defaults_missing_cursor_fields() {
        let page: ListPage<Assistant> =
            serde_json::from_value(serde_json::json!({"data": []})).expect("parse");
        assert!(page.data.is_empty());
        assert!(page.last_id.is_none());
        assert!(!page.has_more);
    }

    #[test]
    fn render_content_covers_all_part_kinds() {
        let message: ThreadMessage = serde_json::from_value(serde_json::json!({
            "id": "msg_1",
            "role": "assistant",
            "assistant_id": "asst_1",
            "content": [
                {"type": "text", "text": {"value": "hello", "annotations": []}},
                {"type": "image_file", "image_file": {"file_id": "file-9"}},
                {"type": "refusal"}
            ]
        }))
        .expect("parse");

        let rendered = render_content_parts(&message);
        assert!(rendered.contains("Text:hello\n"));
        assert!(rendered.contains("Image File ID: file-9\n"));
        assert!(rendered.contains("Unknown content type: refusal\n"));
    }

    #[test]
    fn create_agent_request_omits_absent_fields() {
        let request = CreateAgentRequest {
            model: "dep".to_string(),
            name: None,
            instructions: Some("do things".to_string()),
            tools: Vec::new(),
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert!(value.get("name").is_none());
        assert_eq!(value.get("model"), Some(&serde_json::json!("dep")));
        assert_eq!(value.get("tools"), Some(&serde_json::json!([])));
    }
}
