//! TypeScript import builder.

use connectgen_codegen::{CodeBuilder, CodeFragment, Renderable};

/// Builder for TypeScript import statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    from: String,
    named: Vec<String>,
}

impl Import {
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            named: Vec::new(),
        }
    }

    /// Import a named export.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.named.push(name.into());
        self
    }

    pub fn module(&self) -> &str {
        &self.from
    }

    pub fn names(&self) -> &[String] {
        &self.named
    }

    fn statement(&self) -> String {
        if self.named.is_empty() {
            format!("import \"{}\";", self.from)
        } else {
            format!("import {{ {} }} from \"{}\";", self.named.join(", "), self.from)
        }
    }

    /// Build the import as a string.
    pub fn build(&self) -> String {
        let mut builder = CodeBuilder::typescript();
        builder.emit(self);
        builder.build()
    }
}

impl Renderable for Import {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        vec![CodeFragment::Line(self.statement())]
    }
}
