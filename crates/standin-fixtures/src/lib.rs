//! # standin-fixtures
//!
//! Ready-made mock payloads for the chat-completion API the code under
//! test talks to, plus the configuration-file layouts it loads. Pure data
//! assembly on top of `standin-core` value objects.

pub mod chat;
pub mod config;

pub use chat::{
    chat_reply, chat_stream, tool_call_reply, tool_call_stream, ChatChunk, ChatMessage,
    FunctionCall, ToolCall,
};
pub use config::{prompt_config_layout, tool_config_layout, PromptDefinition, ToolDefinition};
