//! Prompt templates sent to review backends and the arbitration moderator

mod template;

pub use template::{DEFAULT_MAX_CHARS_PER_FILE, ReviewPromptTemplate};
