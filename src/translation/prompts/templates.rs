/*!
 * Prompt templates for flashcard sentence translation.
 *
 * The instructions ask for structured JSON output; each provider adapter
 * additionally constrains generation with `response_schema`.
 */

use serde_json::{json, Value};

/// Instruction template for sentence translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default instructions. Placeholder: {source_language}
    pub const SENTENCE_TRANSLATOR: &'static str = r#"You are a professional translator. For each sentence provided in the input list (sentences are separated by newlines), identify the word wrapped in **...** tags. Translate that bold word into natural {source_language} in the context of the full sentence. If the word is a slang term, provide an equivalent slang term in {source_language}. If a one-word translation is not possible, use multiple words or a short phrase that best captures the meaning. Always provide two similar translations for the bold word, separated by a comma followed by a space (, ), and ensure both translations are in lowercase.

Also translate the entire sentence into {source_language}, and wrap the translated word in **...** tags.

Copy the original sentence unchanged, keeping its **...** tags exactly where they are.

Your response must be a valid JSON object with a single property "translations", which is an array of objects, one per input sentence and in the same order. Each object must have the following properties:

{
  "words_source": "first translation, second translation of the **bold** word in lowercase",
  "sentence_source": "full translated sentence with **bold** word",
  "sentence_target": "original sentence with **bold** word"
}"#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default sentence translator template.
    pub fn sentence_translator() -> Self {
        Self::new(Self::SENTENCE_TRANSLATOR)
    }

    /// Render the template for a source language name.
    pub fn render(&self, source_language: &str) -> String {
        self.template.replace("{source_language}", source_language)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::sentence_translator()
    }
}

/// Schema dialects accepted by the providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFlavor {
    /// JSON Schema with `additionalProperties: false` (OpenAI strict mode, Anthropic tools)
    Strict,
    /// OpenAPI subset without `additionalProperties` (Gemini)
    OpenApi,
}

/// JSON schema of the `{"translations": [...]}` answer
pub fn response_schema(flavor: SchemaFlavor) -> Value {
    let string = json!({ "type": "string" });
    let mut item = json!({
        "type": "object",
        "properties": {
            "words_source": string,
            "sentence_source": string,
            "sentence_target": string,
        },
        "required": ["words_source", "sentence_source", "sentence_target"],
    });
    let mut root = json!({
        "type": "object",
        "properties": {
            "translations": { "type": "array", "items": item.clone() },
        },
        "required": ["translations"],
    });

    if flavor == SchemaFlavor::Strict {
        item["additionalProperties"] = json!(false);
        root["properties"]["translations"]["items"] = item;
        root["additionalProperties"] = json!(false);
    }

    root
}
