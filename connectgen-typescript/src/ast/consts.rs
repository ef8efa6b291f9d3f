//! TypeScript const declaration builder.

use connectgen_codegen::{CodeBuilder, CodeFragment, Renderable};

use super::JsObject;

/// Builder for TypeScript const declarations.
#[derive(Debug, Clone)]
pub struct Const {
    name: String,
    value: JsObject,
    exported: bool,
    as_const: bool,
}

impl Const {
    /// A const initialized with an object literal.
    pub fn object(name: impl Into<String>, value: JsObject) -> Self {
        Self {
            name: name.into(),
            value,
            exported: true,
            as_const: false,
        }
    }

    /// Make this const private (not exported).
    pub fn private(mut self) -> Self {
        self.exported = false;
        self
    }

    /// Append an `as const` assertion to the initializer.
    pub fn as_const(mut self) -> Self {
        self.as_const = true;
        self
    }

    /// Build the const declaration as a string.
    pub fn build(&self) -> String {
        let mut builder = CodeBuilder::typescript();
        builder.emit(self);
        builder.build()
    }
}

impl Renderable for Const {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let export = if self.exported { "export " } else { "" };
        let assertion = if self.as_const { " as const" } else { "" };
        let head = format!("{}const {} = ", export, self.name);

        if self.value.is_empty() {
            return vec![CodeFragment::Line(format!("{head}{{}}{assertion};"))];
        }

        vec![CodeFragment::Block {
            header: format!("{head}{{"),
            body: self.value.property_lines().map(CodeFragment::Line).collect(),
            close: Some(format!("}}{assertion};")),
        }]
    }
}
