use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};

/// A file produced by the generator.
pub trait GeneratedFile {
    /// Path of the file inside the base directory.
    fn path(&self, base: &Path) -> PathBuf;

    /// How an existing file at that path is treated.
    fn rules(&self) -> FileRules {
        FileRules::default()
    }

    /// Render the file content.
    fn render(&self) -> String;

    /// Write the file below `base`, honoring its rules.
    fn write(&self, base: &Path) -> Result<WriteResult> {
        let path = self.path(base);
        write_with_rules(&path, self.rules(), || self.render())
    }
}

fn write_with_rules(
    path: &Path,
    rules: FileRules,
    content: impl FnOnce() -> String,
) -> Result<WriteResult> {
    if rules.overwrite == Overwrite::IfMissing && path.exists() {
        return Ok(WriteResult::Skipped);
    }
    write_file(path, &content())?;
    Ok(WriteResult::Written)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).wrap_err_with(|| format!("Failed to write {}", path.display()))
}

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written
    Written,
    /// File was left alone because it already exists
    Skipped,
}

/// A file with a fixed path and content
pub struct File {
    path: PathBuf,
    content: String,
    rules: FileRules,
}

impl File {
    /// Create a file that is always overwritten.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            rules: FileRules::default(),
        }
    }

    /// Only create the file when nothing exists at its path yet.
    pub fn if_missing(mut self) -> Self {
        self.rules.overwrite = Overwrite::IfMissing;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Write the file according to its rules
    pub fn write(&self) -> Result<WriteResult> {
        write_with_rules(&self.path, self.rules.clone(), || self.content.clone())
    }
}

/// Rules that determine how a file should be written
#[derive(Debug, Clone, Default)]
pub struct FileRules {
    pub overwrite: Overwrite,
}

/// How to handle existing files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Overwrite {
    /// Always overwrite (generated code)
    #[default]
    Always,
    /// Only create if the file doesn't exist (user-owned config)
    IfMissing,
}
