//! TypeScript/JavaScript object literal builder.

/// An object literal whose values are raw expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsObject {
    properties: Vec<(String, String)>,
}

impl JsObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property with a raw expression value (will not be quoted).
    pub fn raw(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Property lines, each with a trailing comma.
    pub(crate) fn property_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.properties
            .iter()
            .map(|(key, value)| format!("{}: {},", key, value))
    }
}
