//! Naming helpers for identifiers and module paths in generated code.

use std::path::{Component, Path};

/// Lower-case only the first character (e.g., "FooBar" -> "fooBar").
///
/// The fold is ASCII-only; every other character is left untouched, so
/// "FOo" becomes "fOo" rather than "foo".
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_ascii_lowercase().to_string() + chars.as_str(),
    }
}

/// Build a relative module specifier for `file` as seen from `base`.
///
/// The result always uses `/` separators, starts with `./` and has the file
/// extension removed, e.g. `<base>/foo/v1/foo_pb.ts` -> `./foo/v1/foo_pb`.
/// Returns `None` when `file` is not inside `base`.
pub fn to_import_path(base: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(base).ok()?.with_extension("");

    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        return None;
    }

    Some(format!("./{}", segments.join("/")))
}
