//! Canned payloads for a chat-completion API.
//!
//! The downstream API answers either with a single JSON object or, when
//! streaming, with newline-delimited JSON records where only the final
//! record carries `done: true`. Tool invocations arrive as `tool_calls`
//! entries on a message whose textual content is empty.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use standin_core::MockResponse;

const MODEL: &str = "mock-chat-model";
const NDJSON: &str = "application/x-ndjson";

/// One record of the chat-completion wire format.
///
/// A non-streaming reply is a single record with `done: true`; a stream is
/// a sequence of records where only the last one is terminal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatChunk {
    pub model: String,
    pub message: ChatMessage,
    pub done: bool,
}

/// Assistant message content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

/// Tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Value,
}

impl ChatMessage {
    fn assistant(content: &str) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.to_string(),
            tool_calls: Vec::new(),
        }
    }

    fn tool_invocation(name: &str, arguments: Value) -> Self {
        Self {
            role: "assistant".to_string(),
            content: String::new(),
            tool_calls: vec![ToolCall {
                function: FunctionCall {
                    name: name.to_string(),
                    arguments,
                },
            }],
        }
    }
}

fn terminal_chunk(message: ChatMessage) -> ChatChunk {
    ChatChunk {
        model: MODEL.to_string(),
        message,
        done: true,
    }
}

fn to_json(chunk: &ChatChunk) -> Value {
    serde_json::to_value(chunk).expect("chat chunk serializes")
}

fn ndjson_body(chunks: &[ChatChunk]) -> String {
    let mut body = String::new();
    for chunk in chunks {
        body.push_str(&serde_json::to_string(chunk).expect("chat chunk serializes"));
        body.push('\n');
    }
    body
}

/// Non-streaming assistant reply.
pub fn chat_reply(content: &str) -> MockResponse {
    MockResponse::json(to_json(&terminal_chunk(ChatMessage::assistant(content))))
}

/// Streaming assistant reply: one NDJSON record per content chunk, with
/// `done: true` on the last record and only the last record.
pub fn chat_stream(chunks: &[&str]) -> MockResponse {
    let records: Vec<ChatChunk> = chunks
        .iter()
        .enumerate()
        .map(|(index, content)| ChatChunk {
            model: MODEL.to_string(),
            message: ChatMessage::assistant(content),
            done: index + 1 == chunks.len(),
        })
        .collect();

    MockResponse::text(ndjson_body(&records)).with_content_type(NDJSON)
}

/// Non-streaming tool invocation: the named tool with the given arguments,
/// textual content empty.
pub fn tool_call_reply(name: &str, arguments: Value) -> MockResponse {
    MockResponse::json(to_json(&terminal_chunk(ChatMessage::tool_invocation(
        name, arguments,
    ))))
}

/// Streaming tool invocation: a single terminal NDJSON record.
pub fn tool_call_stream(name: &str, arguments: Value) -> MockResponse {
    let record = terminal_chunk(ChatMessage::tool_invocation(name, arguments));
    MockResponse::text(ndjson_body(std::slice::from_ref(&record))).with_content_type(NDJSON)
}
