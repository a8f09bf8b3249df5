//! Local directory code source

use async_trait::async_trait;
use autofix_application::ports::code_source::{CodeSource, CodeSourceError};
use autofix_domain::CodeFile;
use glob::{MatchOptions, Pattern, glob_with};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Extensions reviewed by default
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "java", "go", "rb", "php", "c", "cpp", "cs", "rs",
];

/// Default cap on the number of files per run
pub const DEFAULT_MAX_FILES: usize = 20;

/// Directories never descended into
const SKIP_DIRS: &[&str] = &[".git", ".hg", ".svn", "node_modules", "target"];

/// Reads review files from a directory tree.
///
/// Files are returned sorted by relative path (`/`-separated) and capped
/// at `max_files`. Non-UTF-8 files are skipped with a warning.
pub struct LocalCodeSource {
    root: PathBuf,
    extensions: Vec<String>,
    max_files: usize,
}

impl LocalCodeSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_files: DEFAULT_MAX_FILES,
        }
    }

    /// Replace the extension filter (leading dots are ignored)
    pub fn with_extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn wants(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    fn scan(&self) -> Result<Vec<CodeFile>, CodeSourceError> {
        let root_display = self.root.display().to_string();
        if !self.root.is_dir() {
            return Err(CodeSourceError::NotFound(root_display));
        }
        std::fs::read_dir(&self.root).map_err(|e| CodeSourceError::Read {
            path: root_display.clone(),
            message: e.to_string(),
        })?;

        let pattern = format!(
            "{}/**/*",
            Pattern::escape(&self.root.to_string_lossy())
        );
        let options = MatchOptions {
            require_literal_leading_dot: false,
            ..MatchOptions::new()
        };
        let entries = glob_with(&pattern, options).map_err(|e| CodeSourceError::Read {
            path: root_display.clone(),
            message: e.to_string(),
        })?;

        let mut candidates: Vec<(String, PathBuf)> = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    debug!("Skipping unreadable path: {}", e);
                    continue;
                }
            };
            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };
            if is_skipped(relative) || !path.is_file() || !self.wants(&path) {
                continue;
            }
            if let Some(rel) = relative_key(relative) {
                candidates.push((rel, path));
            }
        }
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        let mut files = Vec::new();
        for (rel, path) in candidates {
            if files.len() >= self.max_files {
                info!("File cap of {} reached, ignoring the rest", self.max_files);
                break;
            }
            match std::fs::read(&path) {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(content) => files.push(CodeFile::new(rel, content)),
                    Err(_) => warn!("Skipping non-UTF-8 file {}", rel),
                },
                Err(e) => warn!("Skipping {}: {}", rel, e),
            }
        }

        Ok(files)
    }
}

fn is_skipped(relative: &Path) -> bool {
    relative.components().any(|c| match c {
        Component::Normal(name) => name
            .to_str()
            .map(|n| SKIP_DIRS.contains(&n))
            .unwrap_or(false),
        _ => false,
    })
}

/// `/`-separated relative path, or `None` for non-UTF-8 names
fn relative_key(relative: &Path) -> Option<String> {
    let parts: Option<Vec<&str>> = relative
        .components()
        .map(|c| match c {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })
        .collect();
    parts.map(|p| p.join("/"))
}

#[async_trait]
impl CodeSource for LocalCodeSource {
    async fn load(&self) -> Result<Vec<CodeFile>, CodeSourceError> {
        let source = LocalCodeSource {
            root: self.root.clone(),
            extensions: self.extensions.clone(),
            max_files: self.max_files,
        };
        let root = self.root.display().to_string();

        tokio::task::spawn_blocking(move || source.scan())
            .await
            .map_err(|e| CodeSourceError::Read {
                path: root,
                message: e.to_string(),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_loads_code_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/main.py", b"print(1)\n");
        write(dir.path(), "app.js", b"let a = 1;\n");
        write(dir.path(), "README.md", b"# docs\n");

        let files = LocalCodeSource::new(dir.path()).load().await.unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["app.js", "src/main.py"]);
        assert_eq!(files[1].content, "print(1)\n");
    }

    #[tokio::test]
    async fn test_skips_vcs_and_dependency_dirs() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".git/hooks/pre-commit.py", b"x\n");
        write(dir.path(), "node_modules/lib/index.js", b"x\n");
        write(dir.path(), "target/debug/build.rs", b"x\n");
        write(dir.path(), "lib.rs", b"fn main() {}\n");

        let files = LocalCodeSource::new(dir.path()).load().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "lib.rs");
    }

    #[tokio::test]
    async fn test_caps_file_count() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..30 {
            write(dir.path(), &format!("f{:02}.py", i), b"pass\n");
        }

        let files = LocalCodeSource::new(dir.path()).load().await.unwrap();
        assert_eq!(files.len(), DEFAULT_MAX_FILES);
        assert_eq!(files[0].path, "f00.py");

        let files = LocalCodeSource::new(dir.path())
            .with_max_files(3)
            .load()
            .await
            .unwrap();
        assert_eq!(files.len(), 3);
    }

    #[tokio::test]
    async fn test_skips_non_utf8_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.py", &[0xff, 0xfe, 0x00]);
        write(dir.path(), "good.py", b"ok\n");

        let files = LocalCodeSource::new(dir.path()).load().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "good.py");
    }

    #[tokio::test]
    async fn test_custom_extensions() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.py", b"x\n");
        write(dir.path(), "b.kt", b"x\n");

        let files = LocalCodeSource::new(dir.path())
            .with_extensions(&[".KT".to_string()])
            .load()
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "b.kt");
    }

    #[tokio::test]
    async fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = LocalCodeSource::new(dir.path().join("nope")).load().await;
        assert!(matches!(result, Err(CodeSourceError::NotFound(_))));
    }
}
