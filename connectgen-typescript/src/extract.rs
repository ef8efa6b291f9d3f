//! Service discovery over `buf`-generated `_pb.ts` files.
//!
//! Generated files are scanned as text: they are not part of any module graph
//! yet and may reference types that do not exist until the registry is written.
//! The only shape recognized is
//!
//! ```text
//! export const <Name>Service : GenService <
//! ```
//!
//! with arbitrary whitespace around `:` and `<` and at least one whitespace
//! character after `export` and `const`.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use connectgen_core::{lower_first, to_import_path};
use indexmap::IndexMap;
use tracing::warn;

const SERVICE_SUFFIX: &str = "Service";
const DESCRIPTOR_TYPE: &str = "GenService";

/// A service discovered in a generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Service name without suffix, e.g. `Foo`.
    pub base_name: String,
    /// Registry key, e.g. `foo`.
    pub instance_name: String,
    /// Exported descriptor constant, e.g. `FooService`.
    pub service_identifier: String,
    /// Module specifier relative to the output directory, e.g. `./foo/v1/foo_pb`.
    pub import_path: String,
}

impl ServiceDescriptor {
    pub fn new(base_name: impl Into<String>, import_path: impl Into<String>) -> Self {
        let base_name = base_name.into();
        Self {
            instance_name: lower_first(&base_name),
            service_identifier: format!("{}{}", base_name, SERVICE_SUFFIX),
            import_path: import_path.into(),
            base_name,
        }
    }
}

/// How far a candidate `export` got before it stopped matching.
///
/// Variants are ordered by grammar progress, so the greatest one is the
/// closest miss in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeclMismatch {
    /// No `export` keyword in the file.
    NoExport,
    /// `export` not followed by whitespace and `const`.
    ExpectedConst,
    /// `const` not followed by whitespace and an identifier.
    ExpectedIdentifier,
    /// The identifier does not end in `Service` or is only `Service`.
    MissingServiceSuffix,
    /// No `:` type annotation after the identifier.
    ExpectedColon,
    /// The annotation is not `GenService`.
    ExpectedDescriptorType,
    /// `GenService` without type arguments.
    ExpectedTypeArguments,
}

impl fmt::Display for DeclMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::NoExport => "no export statement",
            Self::ExpectedConst => "no exported const",
            Self::ExpectedIdentifier => "exported const has no name",
            Self::MissingServiceSuffix => "no exported const named *Service",
            Self::ExpectedColon => "*Service const has no type annotation",
            Self::ExpectedDescriptorType => "*Service const is not typed as GenService",
            Self::ExpectedTypeArguments => "GenService annotation has no type arguments",
        };
        f.write_str(msg)
    }
}

/// Find the first `export const <Name>Service: GenService<` declaration and
/// return `<Name>`.
pub fn parse_service_decl(source: &str) -> Result<&str, DeclMismatch> {
    let mut closest = DeclMismatch::NoExport;

    for (pos, _) in source.match_indices("export") {
        if source[..pos].chars().next_back().is_some_and(is_word_char) {
            continue;
        }

        let mut cursor = Cursor::new(source, pos + "export".len());
        match cursor.service_decl() {
            Ok(name) => return Ok(name),
            Err(mismatch) => closest = closest.max(mismatch),
        }
    }

    Err(closest)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A position in the source text, advanced by the grammar rules.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str, pos: usize) -> Self {
        Self { src, pos }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Skip whitespace and return how much was skipped.
    fn whitespace(&mut self) -> usize {
        let rest = self.rest();
        let skipped = rest.len() - rest.trim_start().len();
        self.pos += skipped;
        skipped
    }

    fn word(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    fn punct(&mut self, c: char) -> bool {
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// Everything after `export`.
    fn service_decl(&mut self) -> Result<&'a str, DeclMismatch> {
        if self.whitespace() == 0 || self.word() != Some("const") {
            return Err(DeclMismatch::ExpectedConst);
        }
        if self.whitespace() == 0 {
            return Err(DeclMismatch::ExpectedIdentifier);
        }

        let ident = self.word().ok_or(DeclMismatch::ExpectedIdentifier)?;
        let base_name = ident
            .strip_suffix(SERVICE_SUFFIX)
            .filter(|base| !base.is_empty())
            .ok_or(DeclMismatch::MissingServiceSuffix)?;

        self.whitespace();
        if !self.punct(':') {
            return Err(DeclMismatch::ExpectedColon);
        }

        self.whitespace();
        if self.word() != Some(DESCRIPTOR_TYPE) {
            return Err(DeclMismatch::ExpectedDescriptorType);
        }

        self.whitespace();
        if !self.punct('<') {
            return Err(DeclMismatch::ExpectedTypeArguments);
        }

        Ok(base_name)
    }
}

/// Why a generated file did not contribute a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The file could not be read.
    Unreadable(String),
    /// The file is not below the output directory.
    OutsideOutDir,
    /// No service declaration matched.
    NoServiceExport(DeclMismatch),
    /// Another file already produced this registry key.
    DuplicateInstance { instance_name: String, first: PathBuf },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable(err) => write!(f, "could not be read: {}", err),
            Self::OutsideOutDir => f.write_str("is outside the output directory"),
            Self::NoServiceExport(mismatch) => write!(f, "has no service export ({})", mismatch),
            Self::DuplicateInstance {
                instance_name,
                first,
            } => write!(
                f,
                "defines '{}' which is already provided by {}",
                instance_name,
                first.display()
            ),
        }
    }
}

/// A generated file that was skipped during extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Result of scanning a set of generated files.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Discovered services, in the order of the input files.
    pub services: Vec<ServiceDescriptor>,
    /// Files without a usable service, in the order of the input files.
    pub skipped: Vec<SkippedFile>,
}

/// Discover one service per generated file.
///
/// Files that cannot be used are logged and reported in
/// [`Extraction::skipped`]; they never abort the scan. When two files yield
/// the same instance name the first one wins.
pub fn extract_services(out_dir: &Path, files: &[PathBuf]) -> Extraction {
    let mut found: IndexMap<String, (ServiceDescriptor, &Path)> = IndexMap::new();
    let mut skipped = Vec::new();

    for path in files {
        let reason = match describe(out_dir, path) {
            Ok(service) => match found.get(&service.instance_name) {
                Some((_, first)) => SkipReason::DuplicateInstance {
                    instance_name: service.instance_name.clone(),
                    first: first.to_path_buf(),
                },
                None => {
                    found.insert(service.instance_name.clone(), (service, path.as_path()));
                    continue;
                }
            },
            Err(reason) => reason,
        };

        warn!("Skipping {}: file {}", path.display(), reason);
        skipped.push(SkippedFile {
            path: path.clone(),
            reason,
        });
    }

    Extraction {
        services: found.into_values().map(|(service, _)| service).collect(),
        skipped,
    }
}

fn describe(out_dir: &Path, path: &Path) -> Result<ServiceDescriptor, SkipReason> {
    let source =
        std::fs::read_to_string(path).map_err(|e| SkipReason::Unreadable(e.to_string()))?;
    let base_name = parse_service_decl(&source).map_err(SkipReason::NoServiceExport)?;
    let import_path = to_import_path(out_dir, path).ok_or(SkipReason::OutsideOutDir)?;

    Ok(ServiceDescriptor::new(base_name, import_path))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const FOO_PB: &str = r#"// @generated by protoc-gen-es v2
import type { GenFile, GenService } from "@bufbuild/protobuf/codegenv2";

export const file_foo_v1_foo: GenFile = /*@__PURE__*/ fileDesc("...");

export const FooService: GenService<{
  greet: { methodKind: "unary"; input: typeof GreetRequestSchema; output: typeof GreetResponseSchema };
}> = /*@__PURE__*/ serviceDesc(file_foo_v1_foo, 0);
"#;

    #[test]
    fn test_parse_generated_service() {
        assert_eq!(parse_service_decl(FOO_PB), Ok("Foo"));
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let src = "export\tconst\n  UserProfileService  :\n GenService\t<{}>";
        assert_eq!(parse_service_decl(src), Ok("UserProfile"));
    }

    #[test]
    fn test_parse_keeps_inner_service_word() {
        let src = "export const ServiceRegistryService: GenService<{}>";
        assert_eq!(parse_service_decl(src), Ok("ServiceRegistry"));
    }

    #[test]
    fn test_parse_skips_non_matching_exports() {
        let src = "export const FooSchema: GenMessage<Foo> = x;\nexport const BarService: GenService<{}>";
        assert_eq!(parse_service_decl(src), Ok("Bar"));
    }

    #[test]
    fn test_mismatch_no_export() {
        assert_eq!(parse_service_decl("const x = 1;"), Err(DeclMismatch::NoExport));
    }

    #[test]
    fn test_mismatch_export_inside_word() {
        let src = "reexport const FooService: GenService<{}>";
        assert_eq!(parse_service_decl(src), Err(DeclMismatch::NoExport));
    }

    #[test]
    fn test_mismatch_not_const() {
        let src = "export type Foo = string;";
        assert_eq!(parse_service_decl(src), Err(DeclMismatch::ExpectedConst));
    }

    #[test]
    fn test_mismatch_message_only_file() {
        let src = "export const GreetRequestSchema: GenMessage<GreetRequest> = x;";
        assert_eq!(
            parse_service_decl(src),
            Err(DeclMismatch::MissingServiceSuffix)
        );
    }

    #[test]
    fn test_mismatch_bare_service_name() {
        let src = "export const Service: GenService<{}>";
        assert_eq!(
            parse_service_decl(src),
            Err(DeclMismatch::MissingServiceSuffix)
        );
    }

    #[test]
    fn test_mismatch_untyped_service() {
        let src = "export const FooService = serviceDesc(file, 0);";
        assert_eq!(parse_service_decl(src), Err(DeclMismatch::ExpectedColon));
    }

    #[test]
    fn test_mismatch_wrong_descriptor_type() {
        let src = "export const FooService: GenServiceLike<{}>";
        assert_eq!(
            parse_service_decl(src),
            Err(DeclMismatch::ExpectedDescriptorType)
        );
    }

    #[test]
    fn test_mismatch_missing_type_arguments() {
        let src = "export const FooService: GenService;";
        assert_eq!(
            parse_service_decl(src),
            Err(DeclMismatch::ExpectedTypeArguments)
        );
    }

    #[test]
    fn test_closest_mismatch_wins() {
        let src = "export type A = 1;\nexport const FooService = x;";
        assert_eq!(parse_service_decl(src), Err(DeclMismatch::ExpectedColon));
    }

    #[test]
    fn test_descriptor_names() {
        let service = ServiceDescriptor::new("FOo", "./foo_pb");
        assert_eq!(service.base_name, "FOo");
        assert_eq!(service.instance_name, "fOo");
        assert_eq!(service.service_identifier, "FOoService");
        assert_eq!(service.import_path, "./foo_pb");
    }

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_extract_skips_files_without_service() {
        let temp = TempDir::new().unwrap();
        let out = temp.path();
        let files = vec![
            write(out, "foo/v1/foo_pb.ts", FOO_PB),
            write(out, "common/v1/types_pb.ts", "export const X: GenMessage<X> = m;"),
            write(
                out,
                "bar/v1/bar_pb.ts",
                "export const BarService: GenService<{}> = s;",
            ),
        ];

        let extraction = extract_services(out, &files);

        assert_eq!(
            extraction.services,
            vec![
                ServiceDescriptor::new("Foo", "./foo/v1/foo_pb"),
                ServiceDescriptor::new("Bar", "./bar/v1/bar_pb"),
            ]
        );
        assert_eq!(extraction.skipped.len(), 1);
        assert_eq!(extraction.skipped[0].path, files[1]);
        assert_eq!(
            extraction.skipped[0].reason,
            SkipReason::NoServiceExport(DeclMismatch::MissingServiceSuffix)
        );
    }

    #[test]
    fn test_extract_missing_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        let files = vec![temp.path().join("gone_pb.ts")];

        let extraction = extract_services(temp.path(), &files);

        assert!(extraction.services.is_empty());
        assert!(matches!(
            extraction.skipped[0].reason,
            SkipReason::Unreadable(_)
        ));
    }

    #[test]
    fn test_extract_duplicate_instance_keeps_first() {
        let temp = TempDir::new().unwrap();
        let out = temp.path();
        let files = vec![
            write(out, "a/foo_pb.ts", "export const FooService: GenService<{}>"),
            write(out, "b/foo_pb.ts", "export const fooService: GenService<{}>"),
        ];

        let extraction = extract_services(out, &files);

        assert_eq!(extraction.services.len(), 1);
        assert_eq!(extraction.services[0].import_path, "./a/foo_pb");
        assert_eq!(
            extraction.skipped[0].reason,
            SkipReason::DuplicateInstance {
                instance_name: "foo".to_string(),
                first: files[0].clone(),
            }
        );
    }

    #[test]
    fn test_extract_empty_input() {
        let temp = TempDir::new().unwrap();
        let extraction = extract_services(temp.path(), &[]);
        assert!(extraction.services.is_empty());
        assert!(extraction.skipped.is_empty());
    }
}
