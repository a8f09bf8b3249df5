//! Git-backed working copy
//!
//! Drives the `git` CLI through `tokio::process`. Each fix becomes one
//! commit touching exactly one path.

use super::paths::resolve;
use async_trait::async_trait;
use autofix_application::ports::working_copy::{WorkingCopy, WorkingCopyError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// A local git checkout
pub struct GitWorkingCopy {
    root: PathBuf,
    author: Option<(String, String)>,
}

impl GitWorkingCopy {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            author: None,
        }
    }

    /// Commit as `name <email>` instead of the repository's configured identity
    pub fn with_author(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.author = Some((name.into(), email.into()));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run git in the checkout; returns trimmed stdout or trimmed stderr
    async fn git(&self, args: &[&str]) -> Result<String, String> {
        let mut cmd = Command::new("git");
        if let Some((name, email)) = &self.author {
            cmd.arg("-c")
                .arg(format!("user.name={}", name))
                .arg("-c")
                .arg(format!("user.email={}", email));
        }
        cmd.args(args).current_dir(&self.root);

        debug!("git {}", args.join(" "));
        let output = cmd
            .output()
            .await
            .map_err(|e| format!("Failed to execute git: {}", e))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            };
            Err(format!("git {} failed: {}", args.join(" "), detail))
        }
    }
}

#[async_trait]
impl WorkingCopy for GitWorkingCopy {
    async fn prepare_branch(&self, branch: &str) -> Result<(), WorkingCopyError> {
        match self.git(&["checkout", "-b", branch]).await {
            Ok(_) => {
                info!("Created branch {}", branch);
                Ok(())
            }
            Err(create_err) => {
                debug!("{}; switching to existing branch", create_err);
                self.git(&["checkout", branch])
                    .await
                    .map(|_| info!("Switched to existing branch {}", branch))
                    .map_err(WorkingCopyError::Branch)
            }
        }
    }

    async fn read_file(&self, path: &str) -> Result<Option<String>, WorkingCopyError> {
        let full = resolve(&self.root, path)?;
        match tokio::fs::read_to_string(&full).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WorkingCopyError::Io {
                path: path.to_string(),
                message: e.to_string(),
            }),
        }
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), WorkingCopyError> {
        let full = resolve(&self.root, path)?;
        tokio::fs::write(&full, content)
            .await
            .map_err(|e| WorkingCopyError::Io {
                path: path.to_string(),
                message: e.to_string(),
            })
    }

    async fn commit(&self, path: &str, message: &str) -> Result<String, WorkingCopyError> {
        resolve(&self.root, path)?;
        self.git(&["add", "--", path])
            .await
            .map_err(WorkingCopyError::Commit)?;
        self.git(&["commit", "-m", message, "--", path])
            .await
            .map_err(WorkingCopyError::Commit)?;
        self.git(&["rev-parse", "HEAD"])
            .await
            .map_err(WorkingCopyError::Commit)
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<(), WorkingCopyError> {
        self.git(&["push", "-u", remote, branch])
            .await
            .map(|_| info!("Pushed {} to {}", branch, remote))
            .map_err(WorkingCopyError::Push)
    }
}
