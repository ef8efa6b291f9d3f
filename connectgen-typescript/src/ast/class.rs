//! TypeScript class builder.

use connectgen_codegen::{CodeBuilder, CodeFragment, Renderable};

use super::fns::{Param, param_list};

/// A field declared in a class body.
#[derive(Debug, Clone)]
pub struct ClassField {
    name: String,
    ty: String,
    private: bool,
    init: Option<String>,
}

impl ClassField {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            private: false,
            init: None,
        }
    }

    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Field initializer expression.
    pub fn init(mut self, expr: impl Into<String>) -> Self {
        self.init = Some(expr.into());
        self
    }

    fn declaration(&self) -> String {
        let private = if self.private { "private " } else { "" };
        match &self.init {
            Some(init) => format!("{}{}: {} = {};", private, self.name, self.ty, init),
            None => format!("{}{}: {};", private, self.name, self.ty),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MethodKind {
    Constructor,
    Method,
    Getter,
}

/// A constructor, method or getter in a class body.
#[derive(Debug, Clone)]
pub struct Method {
    kind: MethodKind,
    name: String,
    generics: Option<String>,
    params: Vec<Param>,
    return_type: Option<String>,
    body: Vec<CodeFragment>,
}

impl Method {
    fn with_kind(kind: MethodKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            generics: None,
            params: Vec::new(),
            return_type: None,
            body: Vec::new(),
        }
    }

    pub fn constructor() -> Self {
        Self::with_kind(MethodKind::Constructor, "constructor")
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(MethodKind::Method, name)
    }

    pub fn getter(name: impl Into<String>) -> Self {
        Self::with_kind(MethodKind::Getter, name)
    }

    /// Generic parameter list without the angle brackets, e.g. `K extends keyof T`.
    pub fn generics(mut self, generics: impl Into<String>) -> Self {
        self.generics = Some(generics.into());
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    pub fn body_line(mut self, line: impl Into<String>) -> Self {
        self.body.push(CodeFragment::line(line));
        self
    }

    /// Add a nested fragment (e.g. an `if` block) to the body.
    pub fn body_fragment(mut self, fragment: CodeFragment) -> Self {
        self.body.push(fragment);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_getter(&self) -> bool {
        self.kind == MethodKind::Getter
    }

    fn signature(&self) -> String {
        let prefix = if self.kind == MethodKind::Getter {
            "get "
        } else {
            ""
        };
        let generics = self
            .generics
            .as_ref()
            .map(|g| format!("<{}>", g))
            .unwrap_or_default();
        let ret = self
            .return_type
            .as_ref()
            .map(|r| format!(": {}", r))
            .unwrap_or_default();

        format!(
            "{}{}{}({}){} {{",
            prefix,
            self.name,
            generics,
            param_list(&self.params),
            ret
        )
    }
}

impl Renderable for Method {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        vec![CodeFragment::braced(self.signature(), self.body.clone())]
    }
}

/// Builder for TypeScript classes.
///
/// Members are rendered in declaration order: fields, then the constructor,
/// then methods, with a blank line between each group member.
#[derive(Debug, Clone)]
pub struct Class {
    name: String,
    exported: bool,
    fields: Vec<ClassField>,
    constructor: Option<Method>,
    methods: Vec<Method>,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exported: true,
            fields: Vec::new(),
            constructor: None,
            methods: Vec::new(),
        }
    }

    pub fn private(mut self) -> Self {
        self.exported = false;
        self
    }

    pub fn field(mut self, field: ClassField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn constructor(mut self, constructor: Method) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Build the class as a string.
    pub fn build(&self) -> String {
        let mut builder = CodeBuilder::typescript();
        builder.emit(self);
        builder.build()
    }
}

impl Renderable for Class {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let export = if self.exported { "export " } else { "" };
        let header = format!("{}class {} {{", export, self.name);

        let mut groups: Vec<Vec<CodeFragment>> = Vec::new();
        if !self.fields.is_empty() {
            groups.push(
                self.fields
                    .iter()
                    .map(|f| CodeFragment::Line(f.declaration()))
                    .collect(),
            );
        }
        groups.extend(
            self.constructor
                .iter()
                .chain(self.methods.iter())
                .map(|member| member.to_fragments()),
        );

        if groups.is_empty() {
            return vec![CodeFragment::Line(format!("{}}}", header))];
        }

        let mut body = Vec::new();
        for (i, group) in groups.into_iter().enumerate() {
            if i > 0 {
                body.push(CodeFragment::Blank);
            }
            body.extend(group);
        }

        vec![CodeFragment::braced(header, body)]
    }
}
