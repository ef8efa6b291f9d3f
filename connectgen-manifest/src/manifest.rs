//! Manifest types for connectgen.toml.

use std::{
    path::{Component, Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::Deserialize;

use crate::{Error, Result, error::SourceContext};

/// Default name of the manifest file.
pub const MANIFEST_FILE: &str = "connectgen.toml";

/// Root manifest for connectgen.toml. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub generate: GenerateSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// `[generate]`: where schemas live and where clients are written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateSection {
    /// Directory of .proto files
    pub proto_path: PathBuf,
    /// Directory receiving generated clients and clients.ts
    pub out_dir: PathBuf,
    /// Appended verbatim to the `buf generate` command line
    pub extra_flags: String,
    /// Delete `out_dir` before each generation
    pub clean: bool,
    /// Command used to run buf
    pub compiler: String,
    /// Formatter run on clients.ts; empty disables formatting
    pub formatter: String,
}

impl Default for GenerateSection {
    fn default() -> Self {
        Self {
            proto_path: PathBuf::from("proto"),
            out_dir: PathBuf::from("src/.generated-clients"),
            extra_flags: String::new(),
            clean: true,
            compiler: "npx buf".to_string(),
            formatter: "npx prettier --write".to_string(),
        }
    }
}

/// `[watch]`: file watching behavior.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchSection {
    /// Quiet period after the last schema change before regenerating
    pub debounce_ms: u64,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self { debounce_ms: 100 }
    }
}

/// What one generation run needs to know. Fixed for the life of a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    pub proto_path: PathBuf,
    pub out_dir: PathBuf,
    pub extra_flags: String,
    pub clean: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Manifest::default().generation_config()
    }
}

impl GenerationConfig {
    /// Reject directory layouts where cleaning `out_dir` would delete the
    /// schemas or the project itself.
    pub fn validate(&self) -> std::result::Result<(), Invalid> {
        if is_blank(&self.proto_path) {
            return Err(Invalid::new("proto_path", "proto_path must not be empty"));
        }
        if is_blank(&self.out_dir) {
            return Err(Invalid::new("out_dir", "out_dir must not be empty"));
        }

        let out_dir = normalize(&self.out_dir);
        let proto_path = normalize(&self.proto_path);
        // `.`, `..` and the like resolve to the project root or above it.
        if !out_dir.is_absolute() && !has_named_component(&out_dir) {
            return Err(Invalid::new(
                "out_dir",
                "out_dir must not be the project root or one of its parents",
            ));
        }
        if out_dir == proto_path {
            return Err(Invalid::new("out_dir", "out_dir must differ from proto_path"));
        }
        if proto_path.starts_with(&out_dir) {
            return Err(Invalid::new("out_dir", "out_dir must not contain proto_path"));
        }
        Ok(())
    }
}

/// External commands invoked during generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub compiler: String,
    pub formatter: Option<String>,
}

/// A manifest key whose value is not acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalid {
    pub key: &'static str,
    pub message: String,
}

impl Invalid {
    fn new(key: &'static str, message: &str) -> Self {
        Self {
            key,
            message: message.to_string(),
        }
    }
}

impl Manifest {
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            proto_path: self.generate.proto_path.clone(),
            out_dir: self.generate.out_dir.clone(),
            extra_flags: self.generate.extra_flags.clone(),
            clean: self.generate.clean,
        }
    }

    pub fn toolchain(&self) -> Toolchain {
        let formatter = self.generate.formatter.trim();
        Toolchain {
            compiler: self.generate.compiler.trim().to_string(),
            formatter: (!formatter.is_empty()).then(|| formatter.to_string()),
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.watch.debounce_ms)
    }

    /// Check values serde cannot: empty paths, overlapping directories, zero delays.
    pub fn validate(&self) -> std::result::Result<(), Invalid> {
        self.generation_config().validate()?;
        if self.generate.compiler.trim().is_empty() {
            return Err(Invalid::new("compiler", "compiler must not be empty"));
        }
        if self.watch.debounce_ms == 0 {
            return Err(Invalid::new(
                "debounce_ms",
                "debounce_ms must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Parse a manifest file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        Self::from_str_with_filename(&content, &path.display().to_string())
    }

    /// Parse a manifest file, falling back to defaults when it does not exist.
    pub fn from_file_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse manifest content with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        let ctx = SourceContext::new(content, filename);
        let manifest: Manifest = toml::from_str(content).map_err(|e| ctx.parse_error(e))?;
        manifest
            .validate()
            .map_err(|invalid| ctx.invalid_value(invalid.key, invalid.message))?;
        Ok(manifest)
    }
}

impl FromStr for Manifest {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_with_filename(s, MANIFEST_FILE)
    }
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str().is_empty()
}

/// Lexically fold `.` and `..` so `./src/` and `src/gen/..` compare equal.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = normalized.components().next_back();
                if matches!(last, Some(Component::Normal(_))) {
                    normalized.pop();
                } else if !matches!(last, Some(Component::RootDir | Component::Prefix(_))) {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn has_named_component(path: &Path) -> bool {
    path.components().any(|c| matches!(c, Component::Normal(_)))
}

/// Manifest written by `connectgen init`, documenting every key with its default.
pub const DEFAULT_MANIFEST: &str = r#"[generate]
# Directory of .proto files
proto_path = "proto"
# Generated clients and clients.ts are written here
out_dir = "src/.generated-clients"
# Appended verbatim to `buf generate`, e.g. "--debug"
extra_flags = ""
# Delete out_dir before every generation
clean = true
# How buf is invoked
compiler = "npx buf"
# Formatter run on clients.ts; set to "" to skip
formatter = "npx prettier --write"

[watch]
# Quiet period after the last .proto change before regenerating
debounce_ms = 100
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_manifest_uses_defaults() {
        let manifest = Manifest::from_str("").unwrap();
        assert_eq!(manifest, Manifest::default());

        let config = manifest.generation_config();
        assert_eq!(config.proto_path, PathBuf::from("proto"));
        assert_eq!(config.out_dir, PathBuf::from("src/.generated-clients"));
        assert_eq!(config.extra_flags, "");
        assert!(config.clean);
        assert_eq!(manifest.debounce(), Duration::from_millis(100));
    }

    #[test]
    fn test_default_manifest_matches_defaults() {
        let manifest = Manifest::from_str(DEFAULT_MANIFEST).unwrap();
        assert_eq!(manifest, Manifest::default());
    }

    #[test]
    fn test_partial_section() {
        let manifest = Manifest::from_str(
            r#"
            [generate]
            proto_path = "schemas"
            clean = false
            extra_flags = "--debug"
            "#,
        )
        .unwrap();

        let config = manifest.generation_config();
        assert_eq!(config.proto_path, PathBuf::from("schemas"));
        assert_eq!(config.out_dir, PathBuf::from("src/.generated-clients"));
        assert_eq!(config.extra_flags, "--debug");
        assert!(!config.clean);
    }

    #[test]
    fn test_toolchain_empty_formatter_disables_it() {
        let manifest = Manifest::from_str("[generate]\nformatter = \"\"\n").unwrap();
        let toolchain = manifest.toolchain();
        assert_eq!(toolchain.compiler, "npx buf");
        assert_eq!(toolchain.formatter, None);
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let err = Manifest::from_str("[generate]\nprotoPath = \"x\"\n").unwrap_err();
        assert!(matches!(*err, Error::Parse { .. }));
    }

    #[test]
    fn test_out_dir_equal_to_proto_path() {
        let err = Manifest::from_str("[generate]\nproto_path = \"p\"\nout_dir = \"p\"\n").unwrap_err();
        match *err {
            Error::Validation { message, span, .. } => {
                assert_eq!(message, "out_dir must differ from proto_path");
                assert!(span.is_some());
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_out_dir_equal_after_normalizing() {
        let mut manifest = Manifest::default();
        manifest.generate.proto_path = PathBuf::from("./proto/");
        manifest.generate.out_dir = PathBuf::from("proto/gen/..");
        let invalid = manifest.validate().unwrap_err();
        assert_eq!(invalid.key, "out_dir");
        assert_eq!(invalid.message, "out_dir must differ from proto_path");
    }

    #[test]
    fn test_out_dir_containing_proto_path() {
        let err = Manifest::from_str(
            "[generate]\nproto_path = \"src/proto\"\nout_dir = \"src\"\n",
        )
        .unwrap_err();
        match *err {
            Error::Validation { message, .. } => {
                assert_eq!(message, "out_dir must not contain proto_path");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_out_dir_at_project_root() {
        for out_dir in [".", "./", "gen/..", ".."] {
            let mut manifest = Manifest::default();
            manifest.generate.out_dir = PathBuf::from(out_dir);
            let invalid = manifest.validate().unwrap_err();
            assert_eq!(invalid.key, "out_dir", "out_dir = {out_dir:?}");
            assert_eq!(
                invalid.message,
                "out_dir must not be the project root or one of its parents"
            );
        }
    }

    #[test]
    fn test_sibling_out_dir_is_accepted() {
        let mut manifest = Manifest::default();
        manifest.generate.proto_path = PathBuf::from("src/proto");
        manifest.generate.out_dir = PathBuf::from("src/proto-gen");
        assert!(manifest.validate().is_ok());

        manifest.generate.out_dir = PathBuf::from("../shared/gen");
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_zero_debounce() {
        let err = Manifest::from_str("[watch]\ndebounce_ms = 0\n").unwrap_err();
        assert!(matches!(*err, Error::Validation { .. }));
    }

    #[test]
    fn test_validate_blank_compiler() {
        let mut manifest = Manifest::default();
        manifest.generate.compiler = "  ".to_string();
        assert_eq!(manifest.validate().unwrap_err().key, "compiler");
    }
}
