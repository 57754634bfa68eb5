pub mod extractor;
pub mod llm;
pub mod prompt;
