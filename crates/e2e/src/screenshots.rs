//! Screenshot layout on disk
//!
//! Screenshots are diagnostics only: they are named per suite and case,
//! counted for the report, and never influence a verdict.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Root directory for screenshots, one subdirectory per suite module
#[derive(Debug, Clone)]
pub struct ScreenshotStore {
    root: PathBuf,
}

impl ScreenshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one suite's screenshots
    pub fn suite_dir(&self, module_id: &str) -> PathBuf {
        self.root.join(sanitize(module_id))
    }

    /// Path for a named checkpoint of one case
    pub fn path_for(&self, module_id: &str, case_id: &str, name: &str) -> PathBuf {
        self.suite_dir(module_id)
            .join(format!("{}_{}.png", sanitize(case_id), sanitize(name)))
    }

    /// Number of `.png` files anywhere under the root (0 if it does not exist).
    /// The extension match is case-sensitive.
    pub fn count(&self) -> usize {
        WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "png")
                    .unwrap_or(false)
            })
            .count()
    }
}

impl Default for ScreenshotStore {
    fn default() -> Self {
        Self::new("screenshots")
    }
}

/// Keep file names portable
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_path_layout() {
        let store = ScreenshotStore::new("shots");
        assert_eq!(
            store.path_for("billpay", "TC_BILL_02", "form filled"),
            PathBuf::from("shots/billpay/TC_BILL_02_form_filled.png")
        );
    }

    #[test]
    fn test_count_is_recursive_and_lowercase_png_only() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScreenshotStore::new(tmp.path());
        fs::create_dir_all(tmp.path().join("login/nested")).unwrap();
        fs::write(tmp.path().join("login/a.png"), b"x").unwrap();
        fs::write(tmp.path().join("login/nested/b.PNG"), b"x").unwrap();
        fs::write(tmp.path().join("login/notes.txt"), b"x").unwrap();
        fs::write(tmp.path().join("top.png"), b"x").unwrap();
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_count_missing_root_is_zero() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScreenshotStore::new(tmp.path().join("never-created"));
        assert_eq!(store.count(), 0);
    }
}
