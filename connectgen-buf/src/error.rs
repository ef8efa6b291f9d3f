use std::{path::PathBuf, process::ExitStatus};

use thiserror::Error;

/// Failure of one `buf generate` run. Always fatal for the generation cycle.
#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("failed to create output directory '{path}'")]
    OutDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write temporary template in '{dir}'")]
    Template {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}{}", stderr_suffix(.stderr))]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("failed to read generated files in '{path}'")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(":\n{stderr}")
    }
}
