//! AI Generation Layer
//!
//! Provider abstraction, concrete backends, and prompt construction.

pub mod prompt;
pub mod provider;

pub use prompt::build_prompt;
pub use provider::{
    ClaudeCodeProvider, GeminiProvider, GenerationProvider, SharedProvider, create_provider,
};
