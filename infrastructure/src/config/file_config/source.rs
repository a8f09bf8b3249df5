//! Source configuration from TOML (`[source]` section)

use autofix_domain::DEFAULT_MAX_CHARS_PER_FILE;
use serde::{Deserialize, Serialize};

/// Default extensions reviewed (without the leading dot)
const DEFAULT_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "java", "go", "rb", "php", "c", "cpp", "cs", "rs",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSourceConfig {
    pub max_files: usize,
    pub max_chars_per_file: usize,
    pub extensions: Vec<String>,
}

impl Default for FileSourceConfig {
    fn default() -> Self {
        Self {
            max_files: 20,
            max_chars_per_file: DEFAULT_MAX_CHARS_PER_FILE,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}
