//! Patch application
//!
//! Applies adjudicated fixes to a working copy, one single-line edit and
//! one commit per fix. A fix that cannot be applied is skipped; the batch
//! always runs to the end.

use crate::ports::progress::ProgressNotifier;
use crate::ports::run_event_logger::{RunEvent, RunEventLogger};
use crate::ports::working_copy::{WorkingCopy, WorkingCopyError};
use autofix_domain::{Commit, Fix};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a fix was not applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingFile,
    LineOutOfRange { line: u32, line_count: usize },
    WorkingCopy(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingFile => write!(f, "file not found"),
            SkipReason::LineOutOfRange { line, line_count } => {
                write!(f, "line {} outside 1..={}", line, line_count)
            }
            SkipReason::WorkingCopy(e) => write!(f, "{}", e),
        }
    }
}

impl From<WorkingCopyError> for SkipReason {
    fn from(e: WorkingCopyError) -> Self {
        SkipReason::WorkingCopy(e.to_string())
    }
}

/// Result of one apply pass
#[derive(Debug, Default)]
pub struct ApplyOutcome {
    /// One commit per applied fix, in application order
    pub commits: Vec<Commit>,
    pub skipped: Vec<(Fix, SkipReason)>,
}

impl ApplyOutcome {
    pub fn skipped_fixes(&self) -> Vec<Fix> {
        self.skipped.iter().map(|(fix, _)| fix.clone()).collect()
    }
}

/// Replace line `line` (1-based) of `content` with `new_text`.
///
/// The original line's terminator (`\n`, `\r\n`, or none on a final line)
/// is kept, and trailing terminators on `new_text` are dropped. Returns
/// `None` when `line` is outside `1..=line_count`.
pub fn replace_line(content: &str, line: u32, new_text: &str) -> Option<String> {
    let index = (line as usize).checked_sub(1)?;
    let mut lines: Vec<&str> = content.split_inclusive('\n').collect();
    let target = lines.get(index)?;

    let terminator = if target.ends_with("\r\n") {
        "\r\n"
    } else if target.ends_with('\n') {
        "\n"
    } else {
        ""
    };
    let replacement = format!("{}{}", new_text.trim_end_matches(['\r', '\n']), terminator);
    lines[index] = &replacement;

    Some(lines.concat())
}

/// Applies fixes to a [`WorkingCopy`]
pub struct PatchApplicator {
    working_copy: Arc<dyn WorkingCopy>,
}

impl PatchApplicator {
    pub fn new(working_copy: Arc<dyn WorkingCopy>) -> Self {
        Self { working_copy }
    }

    /// Apply `fixes` in order
    pub async fn apply(
        &self,
        fixes: &[Fix],
        progress: &dyn ProgressNotifier,
        events: &dyn RunEventLogger,
    ) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::default();

        for fix in fixes {
            match self.apply_one(fix).await {
                Ok(commit) => {
                    info!("Applied fix {} ({}:{})", commit.short_hash, fix.file, fix.line);
                    progress.on_fix_applied(&commit);
                    events.log(RunEvent::new(
                        "fix_applied",
                        json!({
                            "file": fix.file,
                            "line": fix.line,
                            "backend": fix.backend.as_str(),
                            "short_hash": commit.short_hash,
                        }),
                    ));
                    outcome.commits.push(commit);
                }
                Err(reason) => {
                    match &reason {
                        SkipReason::WorkingCopy(_) => {
                            warn!("Skipping fix {}:{}: {}", fix.file, fix.line, reason)
                        }
                        _ => debug!("Skipping fix {}:{}: {}", fix.file, fix.line, reason),
                    }
                    let reason_text = reason.to_string();
                    progress.on_fix_skipped(fix, &reason_text);
                    events.log(RunEvent::new(
                        "fix_skipped",
                        json!({
                            "file": fix.file,
                            "line": fix.line,
                            "reason": reason_text,
                        }),
                    ));
                    outcome.skipped.push((fix.clone(), reason));
                }
            }
        }

        outcome
    }

    async fn apply_one(&self, fix: &Fix) -> Result<Commit, SkipReason> {
        let original = self
            .working_copy
            .read_file(&fix.file)
            .await?
            .ok_or(SkipReason::MissingFile)?;

        let patched = replace_line(&original, fix.line, &fix.new_text).ok_or(
            SkipReason::LineOutOfRange {
                line: fix.line,
                line_count: original.lines().count(),
            },
        )?;

        self.working_copy.write_file(&fix.file, &patched).await?;

        match self.working_copy.commit(&fix.file, &fix.commit_message()).await {
            Ok(hash) => Ok(Commit::for_fix(fix, &hash)),
            Err(e) => {
                // Leave the file as it was so later fixes see committed content
                if let Err(restore) = self.working_copy.write_file(&fix.file, &original).await {
                    warn!("Failed to restore {} after commit error: {}", fix.file, restore);
                }
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoProgress;
    use crate::ports::run_event_logger::NoRunEventLogger;
    use async_trait::async_trait;
    use autofix_domain::{BackendId, IssueType, Severity};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockWorkingCopy {
        files: Mutex<HashMap<String, String>>,
        commits: Mutex<Vec<(String, String)>>,
        fail_commits: bool,
    }

    impl MockWorkingCopy {
        fn with_files(files: &[(&str, &str)]) -> Self {
            Self {
                files: Mutex::new(
                    files
                        .iter()
                        .map(|(p, c)| (p.to_string(), c.to_string()))
                        .collect(),
                ),
                ..Default::default()
            }
        }

        fn content(&self, path: &str) -> Option<String> {
            self.files.lock().unwrap().get(path).cloned()
        }
    }

    #[async_trait]
    impl WorkingCopy for MockWorkingCopy {
        async fn prepare_branch(&self, _branch: &str) -> Result<(), WorkingCopyError> {
            Ok(())
        }

        async fn read_file(&self, path: &str) -> Result<Option<String>, WorkingCopyError> {
            Ok(self.content(path))
        }

        async fn write_file(&self, path: &str, content: &str) -> Result<(), WorkingCopyError> {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_string(), content.to_string());
            Ok(())
        }

        async fn commit(&self, path: &str, message: &str) -> Result<String, WorkingCopyError> {
            if self.fail_commits {
                return Err(WorkingCopyError::Commit("hook rejected".to_string()));
            }
            let mut commits = self.commits.lock().unwrap();
            commits.push((path.to_string(), message.to_string()));
            Ok(format!("{:040x}", commits.len()))
        }

        async fn push(&self, _remote: &str, _branch: &str) -> Result<(), WorkingCopyError> {
            Ok(())
        }
    }

    fn fix(file: &str, line: u32, new_text: &str) -> Fix {
        Fix {
            file: file.to_string(),
            line,
            issue_type: IssueType::Syntax,
            severity: Severity::High,
            message: "missing colon".to_string(),
            old_text: None,
            new_text: new_text.to_string(),
            backend: BackendId::from("a"),
        }
    }

    async fn apply(wc: Arc<MockWorkingCopy>, fixes: &[Fix]) -> ApplyOutcome {
        PatchApplicator::new(wc)
            .apply(fixes, &NoProgress, &NoRunEventLogger)
            .await
    }

    #[test]
    fn test_replace_line_keeps_terminators() {
        assert_eq!(replace_line("a\nb\nc\n", 2, "B").as_deref(), Some("a\nB\nc\n"));
        assert_eq!(replace_line("a\r\nb\r\n", 1, "A").as_deref(), Some("A\r\nb\r\n"));
        assert_eq!(replace_line("a\nb", 2, "B\n").as_deref(), Some("a\nB"));
    }

    #[test]
    fn test_replace_line_out_of_range() {
        assert_eq!(replace_line("a\nb\n", 0, "x"), None);
        assert_eq!(replace_line("a\nb\n", 3, "x"), None);
        assert_eq!(replace_line("", 1, "x"), None);
    }

    #[tokio::test]
    async fn test_applies_and_commits_each_fix() {
        let wc = Arc::new(MockWorkingCopy::with_files(&[("m.py", "def f()\n    pass\n")]));
        let outcome = apply(Arc::clone(&wc), &[fix("m.py", 1, "def f():")]).await;

        assert_eq!(outcome.commits.len(), 1);
        assert!(outcome.skipped.is_empty());
        assert_eq!(wc.content("m.py").as_deref(), Some("def f():\n    pass\n"));

        let commit = &outcome.commits[0];
        assert_eq!(commit.short_hash.len(), 7);
        assert_eq!(
            commit.message,
            "SYNTAX error in m.py line 1 → Fix: missing colon"
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_skipped_and_batch_continues() {
        let wc = Arc::new(MockWorkingCopy::with_files(&[("x.py", "a\nb\n")]));
        let fixes = [fix("gone.py", 1, "z"), fix("x.py", 2, "B")];

        let outcome = apply(Arc::clone(&wc), &fixes).await;
        assert_eq!(outcome.commits.len(), 1);
        assert_eq!(outcome.commits[0].file, "x.py");
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].1, SkipReason::MissingFile);
        assert_eq!(wc.content("x.py").as_deref(), Some("a\nB\n"));
    }

    #[tokio::test]
    async fn test_line_out_of_range_is_skipped() {
        let wc = Arc::new(MockWorkingCopy::with_files(&[("x.py", "a\nb\n")]));
        let outcome = apply(Arc::clone(&wc), &[fix("x.py", 9, "z")]).await;

        assert!(outcome.commits.is_empty());
        assert_eq!(
            outcome.skipped[0].1,
            SkipReason::LineOutOfRange {
                line: 9,
                line_count: 2
            }
        );
        assert_eq!(wc.content("x.py").as_deref(), Some("a\nb\n"));
    }

    #[tokio::test]
    async fn test_commit_failure_restores_file() {
        let wc = Arc::new(MockWorkingCopy {
            fail_commits: true,
            ..MockWorkingCopy::with_files(&[("x.py", "a\nb\n")])
        });
        let outcome = apply(Arc::clone(&wc), &[fix("x.py", 1, "A")]).await;

        assert!(outcome.commits.is_empty());
        assert!(matches!(outcome.skipped[0].1, SkipReason::WorkingCopy(_)));
        assert_eq!(wc.content("x.py").as_deref(), Some("a\nb\n"));
    }

    #[tokio::test]
    async fn test_sequential_fixes_in_one_file() {
        let wc = Arc::new(MockWorkingCopy::with_files(&[("x.py", "a\nb\nc\n")]));
        let outcome = apply(
            Arc::clone(&wc),
            &[fix("x.py", 1, "A"), fix("x.py", 3, "C")],
        )
        .await;

        assert_eq!(outcome.commits.len(), 2);
        assert_eq!(wc.content("x.py").as_deref(), Some("A\nb\nC\n"));
        assert_eq!(wc.commits.lock().unwrap().len(), 2);
    }
}
