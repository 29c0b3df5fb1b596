pub mod engine;
pub mod parse;
pub mod provider;

pub use engine::{GenerationEngine, PromptContext};
pub use parse::parse_action_tags;
pub use provider::OpenAiEngine;
