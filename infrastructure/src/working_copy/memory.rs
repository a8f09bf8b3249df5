//! In-memory working copy for dry runs and tests

use super::paths::resolve;
use async_trait::async_trait;
use autofix_application::ports::working_copy::{WorkingCopy, WorkingCopyError};
use autofix_domain::CodeFile;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// A commit recorded by [`InMemoryWorkingCopy`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryCommit {
    pub hash: String,
    pub branch: Option<String>,
    pub file: String,
    pub message: String,
}

#[derive(Default)]
struct Inner {
    files: HashMap<String, String>,
    branch: Option<String>,
    commits: Vec<MemoryCommit>,
    pushes: Vec<(String, String)>,
}

/// Working copy held entirely in memory.
///
/// Commit hashes are the hex SHA-256 of the parent hash, path, message and
/// committed content, so identical histories produce identical hashes.
#[derive(Default)]
pub struct InMemoryWorkingCopy {
    inner: Mutex<Inner>,
}

impl InMemoryWorkingCopy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_files(files: impl IntoIterator<Item = CodeFile>) -> Self {
        let wc = Self::new();
        {
            let mut inner = wc.lock();
            for file in files {
                inner.files.insert(file.path, file.content);
            }
        }
        wc
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.lock().files.get(path).cloned()
    }

    pub fn current_branch(&self) -> Option<String> {
        self.lock().branch.clone()
    }

    pub fn commits(&self) -> Vec<MemoryCommit> {
        self.lock().commits.clone()
    }

    /// `(remote, branch)` pairs pushed so far
    pub fn pushes(&self) -> Vec<(String, String)> {
        self.lock().pushes.clone()
    }
}

fn check_path(path: &str) -> Result<(), WorkingCopyError> {
    resolve(Path::new(""), path).map(|_| ())
}

#[async_trait]
impl WorkingCopy for InMemoryWorkingCopy {
    async fn prepare_branch(&self, branch: &str) -> Result<(), WorkingCopyError> {
        if branch.trim().is_empty() {
            return Err(WorkingCopyError::Branch("empty branch name".to_string()));
        }
        self.lock().branch = Some(branch.to_string());
        Ok(())
    }

    async fn read_file(&self, path: &str) -> Result<Option<String>, WorkingCopyError> {
        check_path(path)?;
        Ok(self.content(path))
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), WorkingCopyError> {
        check_path(path)?;
        self.lock()
            .files
            .insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn commit(&self, path: &str, message: &str) -> Result<String, WorkingCopyError> {
        check_path(path)?;
        let mut inner = self.lock();
        let content = inner
            .files
            .get(path)
            .ok_or_else(|| WorkingCopyError::Commit(format!("pathspec '{}' did not match", path)))?;

        let mut hasher = Sha256::new();
        if let Some(parent) = inner.commits.last() {
            hasher.update(parent.hash.as_bytes());
        }
        hasher.update(path.as_bytes());
        hasher.update([0]);
        hasher.update(message.as_bytes());
        hasher.update([0]);
        hasher.update(content.as_bytes());
        let hash = hex::encode(hasher.finalize());

        let commit = MemoryCommit {
            hash: hash.clone(),
            branch: inner.branch.clone(),
            file: path.to_string(),
            message: message.to_string(),
        };
        inner.commits.push(commit);
        Ok(hash)
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<(), WorkingCopyError> {
        self.lock()
            .pushes
            .push((remote.to_string(), branch.to_string()));
        Ok(())
    }
}
