//! Configuration file loading for autofix-council
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `AUTOFIX_`-prefixed environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./autofix.toml` or `./.autofix.toml`
//! 4. Global: `$XDG_CONFIG_HOME/autofix-council/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, FileAdjudication,
    FileBackendConfig, FileConfig, FileOutputConfig, FileSourceConfig, FileWorkflowConfig,
    default_backends,
};
pub use loader::ConfigLoader;
