//! Canned configuration-file layouts.
//!
//! Two layouts the code under test knows how to load: tool definitions as
//! one JSON document, and per-prompt directories holding a template plus a
//! response schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use standin_core::{MockFile, MockFileSystem};

/// A callable tool as the configuration file describes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema for the tool's arguments.
    pub parameters: Value,
}

/// A prompt template plus the schema its answers must satisfy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptDefinition {
    pub name: String,
    pub template: String,
    pub schema: Value,
}

/// Layout holding `tools/definitions.json` with the given definitions.
pub fn tool_config_layout(tools: &[ToolDefinition]) -> MockFileSystem {
    let definitions = serde_json::to_value(tools).expect("tool definitions serialize");
    MockFileSystem::new().with_file(MockFile::json("tools/definitions.json", definitions))
}

/// Layout holding one directory per prompt: `prompts/<name>/prompt.md` with
/// the template and `prompts/<name>/schema.json` with the schema.
pub fn prompt_config_layout(prompts: &[PromptDefinition]) -> MockFileSystem {
    let mut layout = MockFileSystem::new().with_dir("prompts");
    for prompt in prompts {
        layout = layout
            .with_file(MockFile::text(
                format!("prompts/{}/prompt.md", prompt.name),
                prompt.template.clone(),
            ))
            .with_file(MockFile::json(
                format!("prompts/{}/schema.json", prompt.name),
                prompt.schema.clone(),
            ));
    }
    layout
}
