use autofix_application::ports::working_copy::WorkingCopyError;
use std::path::{Component, Path, PathBuf};

/// Resolve a relative file path under `root`, rejecting escapes
pub(crate) fn resolve(root: &Path, relative: &str) -> Result<PathBuf, WorkingCopyError> {
    let candidate = Path::new(relative);
    let escapes = relative.is_empty()
        || candidate
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

    if escapes {
        return Err(WorkingCopyError::Io {
            path: relative.to_string(),
            message: "path must stay inside the working copy".to_string(),
        });
    }
    Ok(root.join(candidate))
}
