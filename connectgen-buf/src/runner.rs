//! The `buf generate` invocation.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::{
    CompilerError,
    shell::{quote, shell},
    template::{TemplateSource, resolve_template},
};

/// Command used to invoke buf when none is configured.
pub const DEFAULT_COMPILER: &str = "npx buf";

/// Suffix of the compiler outputs that may declare a service.
pub const GENERATED_SUFFIX: &str = "_pb.ts";

/// A `_pb.ts` file written by the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledFile {
    path: PathBuf,
}

impl CompiledFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct Run {
    /// Template the compiler was given
    pub template: TemplateSource,
    /// Compiled files under the output directory, in traversal order
    pub files: Vec<CompiledFile>,
}

/// Invokes the compiler from a project root.
///
/// Relative `proto_path` and `out_dir` arguments are resolved against the
/// root, and the compiler runs with the root as its working directory.
#[derive(Debug, Clone)]
pub struct Runner {
    root: PathBuf,
    compiler: String,
}

impl Runner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            compiler: DEFAULT_COMPILER.to_string(),
        }
    }

    /// Use a different compiler command line, e.g. `buf` or `./bin/buf`.
    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = compiler.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    /// Run `buf generate` once and collect its outputs.
    ///
    /// `flags` is appended to the command line verbatim. The temporary
    /// template is removed whether or not the compiler succeeds.
    pub fn run(&self, proto_path: &Path, out_dir: &Path, flags: &str) -> Result<Run, CompilerError> {
        let out_abs = self.root.join(out_dir);
        fs::create_dir_all(&out_abs).map_err(|source| CompilerError::OutDir {
            path: out_abs.clone(),
            source,
        })?;

        let template = resolve_template(&self.root, proto_path, out_dir);
        let template_err = |source| CompilerError::Template {
            dir: out_abs.clone(),
            source,
        };
        let mut file = tempfile::Builder::new()
            .prefix("buf.gen.")
            .suffix(&format!(".{}", template.extension()))
            .tempfile_in(&out_abs)
            .map_err(template_err)?;
        file.write_all(template.content().as_bytes())
            .map_err(template_err)?;
        file.flush().map_err(template_err)?;
        // Closed so the compiler can open it anywhere; removed when dropped.
        let template_path = file.into_temp_path();

        let command = self.command_line(proto_path, &template_path, flags);
        self.invoke(&command)?;
        drop(template_path);

        let files = collect_outputs(&out_abs)?;
        info!("buf generated {} file(s) in {}", files.len(), out_dir.display());

        Ok(Run {
            template: template.source().clone(),
            files,
        })
    }

    fn command_line(&self, proto_path: &Path, template: &Path, flags: &str) -> String {
        let mut line = format!(
            "{} generate {} --template {}",
            self.compiler,
            quote(&proto_path.to_string_lossy()),
            quote(&template.to_string_lossy())
        );
        let flags = flags.trim();
        if !flags.is_empty() {
            line.push(' ');
            line.push_str(flags);
        }
        line
    }

    fn invoke(&self, command: &str) -> Result<(), CompilerError> {
        debug!("Running {command}");
        let output = shell(command)
            .current_dir(&self.root)
            .output()
            .map_err(|source| {
                error!("Failed to start `{command}`: {source}");
                CompilerError::Spawn {
                    command: command.to_string(),
                    source,
                }
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!("buf: {}", stdout.trim());
        }

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        error!("`{command}` failed ({}): {}", output.status, stderr.trim());
        Err(CompilerError::Failed {
            command: command.to_string(),
            status: output.status,
            stderr,
        })
    }
}

fn collect_outputs(out_dir: &Path) -> Result<Vec<CompiledFile>, CompilerError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(out_dir).sort_by_file_name() {
        let entry = entry.map_err(|source| CompilerError::Walk {
            path: out_dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file()
            && entry
                .file_name()
                .to_string_lossy()
                .ends_with(GENERATED_SUFFIX)
        {
            files.push(CompiledFile {
                path: entry.into_path(),
            });
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_command_line() {
        let runner = Runner::new("/project");
        let line = runner.command_line(
            Path::new("proto"),
            Path::new("gen/buf.gen.abc.yaml"),
            " --debug --error-format json ",
        );
        assert_eq!(
            line,
            "npx buf generate proto --template gen/buf.gen.abc.yaml --debug --error-format json"
        );
    }

    #[test]
    fn test_command_line_without_flags() {
        let runner = Runner::new("/project").with_compiler("buf");
        let line = runner.command_line(Path::new("proto"), Path::new("t.yaml"), "");
        assert_eq!(line, "buf generate proto --template t.yaml");
    }

    #[test]
    fn test_collect_outputs_in_name_order() {
        let temp = TempDir::new().unwrap();
        let out = temp.path();
        fs::create_dir_all(out.join("foo/v1")).unwrap();
        fs::write(out.join("foo/v1/foo_pb.ts"), "").unwrap();
        fs::write(out.join("bar_pb.ts"), "").unwrap();
        fs::write(out.join("bar_pb.js"), "").unwrap();
        fs::write(out.join("clients.ts"), "").unwrap();

        let files: Vec<_> = collect_outputs(out)
            .unwrap()
            .into_iter()
            .map(CompiledFile::into_path)
            .collect();
        assert_eq!(files, vec![out.join("bar_pb.ts"), out.join("foo/v1/foo_pb.ts")]);
    }

    #[test]
    fn test_collect_outputs_ignores_directories_with_suffix() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("odd_pb.ts")).unwrap();
        assert!(collect_outputs(temp.path()).unwrap().is_empty());
    }
}
