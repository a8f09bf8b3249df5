//! Code source adapters

mod local;

pub use local::{DEFAULT_EXTENSIONS, DEFAULT_MAX_FILES, LocalCodeSource};
