//! [`TestWorkspace`] for CLI and workflow tests.

use std::fs;
use std::path::{Path, PathBuf};

use sonar_sync_core::config::{DEFAULT_XML_FILE, DOTENV_FILE, PROJECT_CONFIG_FILE};
use tempfile::TempDir;

use crate::profile::ProfileBuilder;

/// A temporary working directory with helpers to lay out the files the
/// CLI looks for: the XML export, `sonar-sync.toml` and `.env`.
///
/// # Example
///
/// ```rust,no_run
/// use sonar_sync_test_utils::{ProfileBuilder, TestWorkspace};
///
/// let ws = TestWorkspace::new();
/// ws.write_profile(&ProfileBuilder::new().csharp(&["S107"]));
/// ws.write_config("[api]\norganization = \"acme\"\n");
/// ws.assert_file_exists("csharp_sonarqube_rules.xml");
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write the profile at the default XML location and return its path.
    pub fn write_profile(&self, profile: &ProfileBuilder) -> PathBuf {
        let path = self.path(DEFAULT_XML_FILE);
        profile.write(&path);
        path
    }

    pub fn write_config(&self, content: &str) -> PathBuf {
        self.write_file(PROJECT_CONFIG_FILE, content)
    }

    pub fn write_dotenv(&self, content: &str) -> PathBuf {
        self.write_file(DOTENV_FILE, content)
    }

    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Files in `dir` (relative to root) whose name starts with `prefix`, sorted.
    pub fn files_with_prefix(&self, dir: &str, prefix: &str) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(self.path(dir)) else {
            return Vec::new();
        };
        let mut found: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(prefix))
            })
            .collect();
        found.sort();
        found
    }

    /// Parse the single report in `dir` whose name starts with `prefix`.
    ///
    /// # Panics
    /// Panics unless exactly one such file exists and holds valid JSON.
    pub fn read_report(&self, dir: &str, prefix: &str) -> serde_json::Value {
        let files = self.files_with_prefix(dir, prefix);
        assert_eq!(
            files.len(),
            1,
            "Expected one {}* report in {}, found {:?}",
            prefix,
            self.path(dir).display(),
            files
        );
        let content = fs::read_to_string(&files[0]).unwrap();
        serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("Invalid JSON in {}: {}", files[0].display(), e))
    }

    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, relative: &str) {
        let full_path = self.path(relative);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }
}
