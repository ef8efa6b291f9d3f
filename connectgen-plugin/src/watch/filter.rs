use std::path::{Path, PathBuf};

/// Suffix of schema files whose changes trigger regeneration.
pub const SCHEMA_SUFFIX: &str = ".proto";

/// Kind of filesystem change, reduced to what the filter cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
    Other,
}

/// One changed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub kind: ChangeKind,
    pub path: PathBuf,
}

impl WatchEvent {
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// Decides which events may trigger regeneration.
///
/// Anything under the output directory is rejected so a cycle can never
/// re-trigger itself, whether the watcher reports paths relative to the
/// project root, absolute, or canonicalized.
#[derive(Debug, Clone)]
pub struct ChangeFilter {
    root: PathBuf,
    out_dirs: Vec<PathBuf>,
}

impl ChangeFilter {
    pub fn new(root: &Path, out_dir: &Path) -> Self {
        let absolute = root.join(out_dir);
        let mut out_dirs = vec![out_dir.to_path_buf(), absolute.clone()];
        if let Ok(canonical) = absolute.canonicalize() {
            out_dirs.push(canonical);
        }
        Self {
            root: root.to_path_buf(),
            out_dirs,
        }
    }

    pub fn accepts(&self, event: &WatchEvent) -> bool {
        matches!(
            event.kind,
            ChangeKind::Created | ChangeKind::Modified | ChangeKind::Removed
        ) && event.path.to_string_lossy().ends_with(SCHEMA_SUFFIX)
            && !self.is_output(&event.path)
    }

    fn is_output(&self, path: &Path) -> bool {
        let absolute = self.root.join(path);
        self.out_dirs
            .iter()
            .any(|dir| path.starts_with(dir) || absolute.starts_with(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ChangeFilter {
        ChangeFilter::new(Path::new("/project"), Path::new("src/.generated-clients"))
    }

    #[test]
    fn test_accepts_schema_changes() {
        let filter = filter();
        for kind in [ChangeKind::Created, ChangeKind::Modified, ChangeKind::Removed] {
            assert!(filter.accepts(&WatchEvent::new(kind, "/project/proto/foo.proto")));
        }
        assert!(filter.accepts(&WatchEvent::new(ChangeKind::Modified, "proto/foo.proto")));
    }

    #[test]
    fn test_rejects_other_kinds() {
        assert!(!filter().accepts(&WatchEvent::new(ChangeKind::Other, "proto/foo.proto")));
    }

    #[test]
    fn test_rejects_other_files() {
        let filter = filter();
        assert!(!filter.accepts(&WatchEvent::new(ChangeKind::Modified, "proto/foo.proto.swp")));
        assert!(!filter.accepts(&WatchEvent::new(ChangeKind::Modified, "proto/buf.yaml")));
    }

    #[test]
    fn test_rejects_output_dir() {
        let filter = filter();
        assert!(!filter.accepts(&WatchEvent::new(
            ChangeKind::Created,
            "src/.generated-clients/foo.proto"
        )));
        assert!(!filter.accepts(&WatchEvent::new(
            ChangeKind::Created,
            "/project/src/.generated-clients/foo/v1/foo.proto"
        )));
    }

    #[test]
    fn test_output_dir_inside_proto_path() {
        let filter = ChangeFilter::new(Path::new("/project"), Path::new("proto/gen"));
        assert!(!filter.accepts(&WatchEvent::new(ChangeKind::Modified, "/project/proto/gen/a.proto")));
        assert!(filter.accepts(&WatchEvent::new(ChangeKind::Modified, "/project/proto/a.proto")));
    }
}
