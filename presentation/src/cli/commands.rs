//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for run reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full report: commits, unresolved issues, score breakdown
    Full,
    /// Branch, counts and total score only
    Summary,
    /// The run report as JSON
    Json,
}

impl From<OutputFormat> for autofix_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => autofix_domain::OutputFormat::Full,
            OutputFormat::Summary => autofix_domain::OutputFormat::Summary,
            OutputFormat::Json => autofix_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for autofix-council
#[derive(Parser, Debug)]
#[command(name = "autofix-council")]
#[command(author, version, about = "Multi-backend AI code review that commits its own fixes")]
#[command(long_about = r#"
autofix-council sends every source file in a repository to several AI
review backends at once, merges their findings, and applies one fix per
commit on a dedicated branch.

Each run walks a fixed graph:
1. Setup:      load files, create the TEAM_LEADER_AI_Fix branch
2. Dispatch:   all backends review all files in parallel
3. Adjudicate: one fix per (file, line)
4. Apply:      one single-line edit and one commit per fix
5. Retry:      loop back while serious issues remain (bounded)
6. Output:     push, score, save the report

Configuration files are loaded from (in priority order):
1. AUTOFIX_* environment variables
2. --config <path>      Explicit config file
3. ./autofix.toml       Project-level config
4. ~/.config/autofix-council/config.toml   Global config

Example:
  autofix-council --team "RIFT ORGANISERS" --leader "Saiyam Kumar" ./repo
  autofix-council --dry-run -b claude -b local -o summary ./repo
"#)]
pub struct Cli {
    /// Repository to review
    #[arg(value_name = "REPO_DIR")]
    pub repo_dir: PathBuf,

    /// Team name (first part of the branch name)
    #[arg(long, default_value = "AUTOFIX")]
    pub team: String,

    /// Team leader (second part of the branch name)
    #[arg(long, default_value = "COUNCIL")]
    pub leader: String,

    /// Configured backends to use (can be specified multiple times)
    #[arg(short, long = "backend", value_name = "NAME")]
    pub backends: Vec<String>,

    /// Maximum apply passes
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Apply fixes to an in-memory copy; nothing on disk changes
    #[arg(long)]
    pub dry_run: bool,

    /// Commit fixes but do not push the branch
    #[arg(long)]
    pub no_push: bool,

    /// Remote to push to
    #[arg(long, value_name = "NAME")]
    pub remote: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
