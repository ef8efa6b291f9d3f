//! Command lines run through the platform shell.

use std::process::Command;

/// A command running `line` under `sh -c` (or `cmd /C` on Windows).
pub(crate) fn shell(line: &str) -> Command {
    #[cfg(windows)]
    {
        let mut command = Command::new("cmd");
        command.args(["/C", line]);
        command
    }
    #[cfg(not(windows))]
    {
        let mut command = Command::new("sh");
        command.args(["-c", line]);
        command
    }
}

/// Quote one argument for [`shell`]. Plain arguments are left untouched.
pub(crate) fn quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@+,\\".contains(c));
    if plain {
        return arg.to_string();
    }

    if cfg!(windows) {
        format!("\"{arg}\"")
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
