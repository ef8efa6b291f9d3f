//! CodeFile abstraction for structured TypeScript file generation.

use connectgen_codegen::{CodeBuilder, CodeFragment, Renderable};

use crate::ast::Import;

/// A structured representation of a TypeScript file.
///
/// Organizes code into a header comment, imports and body. Body elements are
/// separated by one blank line.
///
/// # Example
///
/// ```
/// use connectgen_typescript::{CodeFile, ast::{Fn, Import}};
///
/// let code = CodeFile::new()
///     .import(Import::new("@connectrpc/connect").named("createClient"))
///     .add(Fn::new("noop"))
///     .render();
///
/// assert_eq!(
///     code,
///     "import { createClient } from \"@connectrpc/connect\";\n\nexport function noop() {\n}\n"
/// );
/// ```
#[derive(Default)]
pub struct CodeFile {
    header: Option<String>,
    imports: Vec<Import>,
    body: Vec<Vec<CodeFragment>>,
}

impl CodeFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a comment line printed above everything else.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn import(mut self, import: Import) -> Self {
        self.imports.push(import);
        self
    }

    pub fn imports(mut self, imports: impl IntoIterator<Item = Import>) -> Self {
        self.imports.extend(imports);
        self
    }

    /// Add a body element (any Renderable).
    #[allow(clippy::should_implement_trait)]
    pub fn add<R: Renderable>(mut self, node: R) -> Self {
        self.body.push(node.to_fragments());
        self
    }

    /// Render the file with TypeScript indentation (2 spaces).
    pub fn render(&self) -> String {
        let mut builder = CodeBuilder::typescript();

        if let Some(header) = &self.header {
            builder.push_line(header);
            if !self.imports.is_empty() || !self.body.is_empty() {
                builder.push_blank();
            }
        }

        for import in &self.imports {
            builder.emit(import);
        }

        if !self.imports.is_empty() && !self.body.is_empty() {
            builder.push_blank();
        }

        for (i, fragments) in self.body.iter().enumerate() {
            if i > 0 {
                builder.push_blank();
            }
            for fragment in fragments {
                builder.apply_fragment(fragment.clone());
            }
        }

        builder.build()
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.imports.is_empty() && self.body.is_empty()
    }
}
