use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory names that are never annotated: build products and vendored code.
pub const SKIP_DIRS: &[&str] = &[".build", "Pods", "DerivedData"];

/// Safety checks to prevent rewriting files outside the target root.
#[derive(Debug, Clone)]
pub struct OutputGuard {
    /// Absolute path to the annotation root
    root: PathBuf,
    /// Canonical paths to forbidden directories
    forbidden_paths: Vec<PathBuf>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("Path is outside the annotation root: {path} (root: {root})")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Path is in forbidden directory: {path} (forbidden: {forbidden})")]
    ForbiddenPath { path: PathBuf, forbidden: PathBuf },

    #[error("Failed to canonicalize path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

impl OutputGuard {
    /// Create a guard for the given root.
    ///
    /// The root is canonicalized to handle symlinks correctly, and build
    /// directories directly under it become forbidden.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let root = root.as_ref().canonicalize()?;

        let mut forbidden_paths = Vec::new();
        for dir in SKIP_DIRS {
            if let Ok(canonical) = root.join(dir).canonicalize() {
                forbidden_paths.push(canonical);
            }
        }

        Ok(Self {
            root,
            forbidden_paths,
        })
    }

    /// Check if a path is safe to rewrite.
    ///
    /// Returns the canonicalized absolute path if safe. Canonicalization
    /// happens at validation time; call [`OutputGuard::revalidate`]
    /// immediately before the write to close the TOCTOU window.
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();

        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        let canonical = absolute.canonicalize()?;
        self.check_canonical(&canonical)?;

        Ok(canonical)
    }

    /// Re-validate a previously-validated canonical path.
    pub fn revalidate(&self, path: &Path) -> Result<PathBuf, SafetyError> {
        let canonical = path.canonicalize()?;
        self.check_canonical(&canonical)?;
        Ok(canonical)
    }

    fn check_canonical(&self, canonical: &Path) -> Result<(), SafetyError> {
        if !canonical.starts_with(&self.root) {
            return Err(SafetyError::OutsideRoot {
                path: canonical.to_path_buf(),
                root: self.root.clone(),
            });
        }

        for forbidden in &self.forbidden_paths {
            if canonical.starts_with(forbidden) {
                return Err(SafetyError::ForbiddenPath {
                    path: canonical.to_path_buf(),
                    forbidden: forbidden.clone(),
                });
            }
        }

        Ok(())
    }

    /// Get the annotation root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn validate_path_inside_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let guard = OutputGuard::new(root).unwrap();

        let file = root.join("Sources/Greeter.swift");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, b"").unwrap();

        assert!(guard.validate_path(&file).is_ok());
    }

    #[test]
    fn validate_path_outside_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("project");
        fs::create_dir_all(&root).unwrap();
        let guard = OutputGuard::new(&root).unwrap();

        let outside = temp_dir.path().join("Outside.swift");
        fs::write(&outside, b"").unwrap();

        let result = guard.validate_path(&outside);
        assert!(matches!(result, Err(SafetyError::OutsideRoot { .. })));
    }

    #[test]
    fn validate_path_forbidden_build_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let build = root.join(".build");
        fs::create_dir_all(&build).unwrap();

        // Guard created after the directory exists so it lands in the
        // forbidden list.
        let guard = OutputGuard::new(root).unwrap();

        let file = build.join("checkouts/Generated.swift");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, b"").unwrap();

        let result = guard.validate_path(&file);
        assert!(matches!(result, Err(SafetyError::ForbiddenPath { .. })));
    }

    #[test]
    fn validate_relative_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let guard = OutputGuard::new(root).unwrap();

        let file = root.join("Greeter.swift");
        fs::write(&file, b"").unwrap();

        assert!(guard.validate_path("Greeter.swift").is_ok());
    }

    #[test]
    #[cfg(unix)]
    fn validate_symlink_escape() {
        use std::os::unix::fs::symlink;

        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("project");
        fs::create_dir_all(&root).unwrap();

        let outside = temp_dir.path().join("Outside.swift");
        fs::write(&outside, b"").unwrap();

        let link = root.join("Escape.swift");
        symlink(&outside, &link).unwrap();

        let guard = OutputGuard::new(&root).unwrap();
        let result = guard.validate_path(&link);

        // Canonicalization resolves the link outside the root.
        assert!(matches!(result, Err(SafetyError::OutsideRoot { .. })));
    }
}
