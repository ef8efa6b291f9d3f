//! TypeScript interface builder.

use connectgen_codegen::{CodeBuilder, CodeFragment, Renderable};

/// A field in a TypeScript interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceField {
    pub name: String,
    pub ty: String,
}

impl InterfaceField {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }

    fn declaration(&self) -> String {
        format!("{}: {};", self.name, self.ty)
    }
}

/// Builder for TypeScript interfaces.
#[derive(Debug, Clone)]
pub struct Interface {
    name: String,
    fields: Vec<InterfaceField>,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a required field.
    pub fn field(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.fields.push(InterfaceField::new(name, ty));
        self
    }

    pub fn fields(&self) -> &[InterfaceField] {
        &self.fields
    }

    /// Build the interface as a string.
    pub fn build(&self) -> String {
        let mut builder = CodeBuilder::typescript();
        builder.emit(self);
        builder.build()
    }
}

impl Renderable for Interface {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        if self.fields.is_empty() {
            return vec![CodeFragment::Line(format!("export interface {} {{}}", self.name))];
        }

        vec![CodeFragment::braced(
            format!("export interface {} {{", self.name),
            self.fields
                .iter()
                .map(|f| CodeFragment::Line(f.declaration()))
                .collect(),
        )]
    }
}
