/*!
 * Prompt templates for flashcard sentence translation.
 */

pub use self::templates::{response_schema, PromptTemplate, SchemaFlavor};

pub mod templates;
