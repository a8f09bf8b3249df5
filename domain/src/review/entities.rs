//! Review entities: what backends report and what the workflow applies.

use crate::core::backend::BackendId;
use serde::{Deserialize, Serialize};

/// Immutable snapshot of one source file at dispatch time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFile {
    pub path: String,
    pub content: String,
}

impl CodeFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Number of lines as the applicator counts them (a trailing newline
    /// does not open an extra line).
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

/// Category of a reported issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IssueType {
    Linting,
    Syntax,
    Logic,
    Style,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Linting => "LINTING",
            IssueType::Syntax => "SYNTAX",
            IssueType::Logic => "LOGIC",
            IssueType::Style => "STYLE",
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IssueType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LINTING" | "LINT" => Ok(IssueType::Linting),
            "SYNTAX" => Ok(IssueType::Syntax),
            "LOGIC" => Ok(IssueType::Logic),
            "STYLE" => Ok(IssueType::Style),
            _ => Err(()),
        }
    }
}

/// Severity of a reported issue, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(()),
        }
    }
}

/// Location key used for deduplication: `(file, line)`
pub type IssueKey = (String, u32);

/// A finding produced by exactly one backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub file: String,
    /// 1-based line number
    pub line: u32,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_old_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_new_text: Option<String>,
    pub backend: BackendId,
}

impl Issue {
    pub fn new(
        backend: BackendId,
        file: impl Into<String>,
        line: u32,
        issue_type: IssueType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            issue_type,
            severity: Severity::default(),
            message: message.into(),
            suggested_old_text: None,
            suggested_new_text: None,
            backend,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_old_text(mut self, text: impl Into<String>) -> Self {
        self.suggested_old_text = Some(text.into());
        self
    }

    pub fn with_new_text(mut self, text: impl Into<String>) -> Self {
        self.suggested_new_text = Some(text.into());
        self
    }

    pub fn key(&self) -> IssueKey {
        (self.file.clone(), self.line)
    }

    /// Whether the issue carries replacement text and can become a [`Fix`]
    pub fn is_fixable(&self) -> bool {
        self.suggested_new_text.is_some()
    }
}

/// An issue promoted by adjudication to "apply"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fix {
    pub file: String,
    pub line: u32,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub message: String,
    pub old_text: Option<String>,
    pub new_text: String,
    pub backend: BackendId,
}

impl Fix {
    /// Promote an issue; `None` when it has no replacement text.
    pub fn from_issue(issue: &Issue) -> Option<Self> {
        let new_text = issue.suggested_new_text.clone()?;
        Some(Self {
            file: issue.file.clone(),
            line: issue.line,
            issue_type: issue.issue_type,
            severity: issue.severity,
            message: issue.message.clone(),
            old_text: issue.suggested_old_text.clone(),
            new_text,
            backend: issue.backend.clone(),
        })
    }

    pub fn key(&self) -> IssueKey {
        (self.file.clone(), self.line)
    }

    /// Commit message recorded for this fix
    pub fn commit_message(&self) -> String {
        format!(
            "{} error in {} line {} → Fix: {}",
            self.issue_type, self.file, self.line, self.message
        )
    }
}

/// A commit recorded by the patch applicator, one per applied fix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub short_hash: String,
    pub message: String,
    pub file: String,
    pub line: u32,
}

/// Length of the abbreviated commit hash
pub const SHORT_HASH_LEN: usize = 7;

impl Commit {
    pub fn for_fix(fix: &Fix, full_hash: &str) -> Self {
        Self {
            short_hash: full_hash.chars().take(SHORT_HASH_LEN).collect(),
            message: fix.commit_message(),
            file: fix.file.clone(),
            line: fix.line,
        }
    }
}
