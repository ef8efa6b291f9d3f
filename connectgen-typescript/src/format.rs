//! Cosmetic formatting of written files.

use std::path::Path;

/// An external formatter command such as `npx prettier --write`.
///
/// The file path is appended as the last argument. Formatting is purely
/// cosmetic: every failure is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    program: String,
    args: Vec<String>,
}

impl Formatter {
    /// Parse a whitespace-separated command line. Returns `None` when empty.
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Run the formatter on `file` from `cwd`; returns whether it succeeded.
    pub fn format(&self, cwd: &Path, file: &Path) -> bool {
        std::process::Command::new(&self.program)
            .args(&self.args)
            .arg(file)
            .current_dir(cwd)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let f = Formatter::parse("npx prettier --write").unwrap();
        assert_eq!(f.program, "npx");
        assert_eq!(f.args, vec!["prettier", "--write"]);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Formatter::parse("   "), None);
    }

    #[test]
    fn test_missing_program_is_not_an_error() {
        let f = Formatter::parse("connectgen-no-such-formatter --write").unwrap();
        assert!(!f.format(Path::new("."), Path::new("clients.ts")));
    }
}
