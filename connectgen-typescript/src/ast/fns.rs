//! TypeScript function builder.

use connectgen_codegen::{CodeBuilder, CodeFragment, Renderable};

/// A parameter in a TypeScript function or method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: String,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

pub(crate) fn param_list(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| format!("{}: {}", p.name, p.ty))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builder for top-level TypeScript functions.
#[derive(Debug, Clone)]
pub struct Fn {
    name: String,
    params: Vec<Param>,
    return_type: Option<String>,
    body: Vec<String>,
}

impl Fn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type: None,
            body: Vec::new(),
        }
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    /// Add a line to the function body.
    pub fn body_line(mut self, line: impl Into<String>) -> Self {
        self.body.push(line.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> String {
        let params = param_list(&self.params);

        match &self.return_type {
            Some(ret) => format!("export function {}({}): {} {{", self.name, params, ret),
            None => format!("export function {}({}) {{", self.name, params),
        }
    }

    /// Build the function as a string.
    pub fn build(&self) -> String {
        let mut builder = CodeBuilder::typescript();
        builder.emit(self);
        builder.build()
    }
}

impl Renderable for Fn {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        vec![CodeFragment::braced(
            self.signature(),
            self.body.iter().map(CodeFragment::line).collect(),
        )]
    }
}
