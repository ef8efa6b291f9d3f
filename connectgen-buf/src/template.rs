//! Generation template lookup.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use tracing::info;

/// Template file names, in the order they are tried within a directory.
pub const TEMPLATE_NAMES: [&str; 3] = ["buf.gen.yaml", "buf.gen.yml", "buf.gen.json"];

/// Where a [`Template`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    File(PathBuf),
    Default,
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateSource::File(path) => write!(f, "{}", path.display()),
            TemplateSource::Default => write!(f, "default template"),
        }
    }
}

/// Text of a buf generation template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: TemplateSource,
    content: String,
}

impl Template {
    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Extension for the transient copy, so buf parses it with the right format.
    pub fn extension(&self) -> &str {
        match &self.source {
            TemplateSource::File(path) => path
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or("yaml"),
            TemplateSource::Default => "yaml",
        }
    }
}

/// Find the template for a run.
///
/// The working directory is searched before `proto_path`; within each, the
/// names in [`TEMPLATE_NAMES`] are tried in order and the first readable file
/// wins. Falls back to [`default_template`] when nothing is found.
pub fn resolve_template(cwd: &Path, proto_path: &Path, out_dir: &Path) -> Template {
    let proto_dir = cwd.join(proto_path);
    let candidates = TEMPLATE_NAMES
        .iter()
        .map(|name| cwd.join(name))
        .chain(TEMPLATE_NAMES.iter().map(|name| proto_dir.join(name)));

    for path in candidates {
        if let Ok(content) = fs::read_to_string(&path) {
            info!("Using {}", path.display());
            return Template {
                source: TemplateSource::File(path),
                content,
            };
        }
    }

    info!("Using default buf template");
    Template {
        source: TemplateSource::Default,
        content: default_template(out_dir),
    }
}

/// Template routing protoc-gen-es TypeScript output into `out_dir`.
pub fn default_template(out_dir: &Path) -> String {
    format!(
        "version: v2\n\
         plugins:\n\
         \x20 - local: protoc-gen-es\n\
         \x20   include_imports: true\n\
         \x20   opt: target=ts\n\
         \x20   out: {}\n",
        out_dir.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("proto")).unwrap();
        temp
    }

    #[test]
    fn test_default_template() {
        assert_eq!(
            default_template(Path::new("src/.generated-clients")),
            "version: v2\n\
             plugins:\n\
             \x20 - local: protoc-gen-es\n\
             \x20   include_imports: true\n\
             \x20   opt: target=ts\n\
             \x20   out: src/.generated-clients\n"
        );
    }

    #[test]
    fn test_falls_back_to_default() {
        let temp = setup();
        let template = resolve_template(temp.path(), Path::new("proto"), Path::new("gen"));
        assert_eq!(template.source(), &TemplateSource::Default);
        assert!(template.content().contains("out: gen"));
        assert_eq!(template.extension(), "yaml");
    }

    #[test]
    fn test_root_beats_proto_dir() {
        let temp = setup();
        fs::write(temp.path().join("proto/buf.gen.yaml"), "proto").unwrap();
        fs::write(temp.path().join("buf.gen.json"), "root").unwrap();

        let template = resolve_template(temp.path(), Path::new("proto"), Path::new("gen"));
        assert_eq!(template.content(), "root");
        assert_eq!(
            template.source(),
            &TemplateSource::File(temp.path().join("buf.gen.json"))
        );
        assert_eq!(template.extension(), "json");
    }

    #[test]
    fn test_proto_dir_beats_default() {
        let temp = setup();
        fs::write(temp.path().join("proto/buf.gen.yml"), "proto").unwrap();

        let template = resolve_template(temp.path(), Path::new("proto"), Path::new("gen"));
        assert_eq!(template.content(), "proto");
        assert_eq!(template.extension(), "yml");
    }

    #[test]
    fn test_name_order_within_directory() {
        let temp = setup();
        fs::write(temp.path().join("buf.gen.yml"), "yml").unwrap();
        fs::write(temp.path().join("buf.gen.yaml"), "yaml").unwrap();

        let template = resolve_template(temp.path(), Path::new("proto"), Path::new("gen"));
        assert_eq!(template.content(), "yaml");
    }

    #[test]
    fn test_directory_named_like_template_is_skipped() {
        let temp = setup();
        fs::create_dir_all(temp.path().join("buf.gen.yaml")).unwrap();
        fs::write(temp.path().join("proto/buf.gen.yaml"), "proto").unwrap();

        let template = resolve_template(temp.path(), Path::new("proto"), Path::new("gen"));
        assert_eq!(template.content(), "proto");
    }
}
