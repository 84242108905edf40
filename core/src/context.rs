//! Variable environment for one or more evaluations.

use crate::error::BridgeError;
use cel_interpreter::Value;
use hashbrown::HashMap;
use tracing::trace;

/// Words that can never name a variable.
const RESERVED: &[&str] = &[
    "true", "false", "null", "in", "as", "break", "const", "continue", "else", "for",
    "function", "if", "import", "let", "loop", "package", "namespace", "return", "var",
    "void", "while",
];

/// Named bindings handed to the evaluator.
///
/// Names are unique; binding an existing name replaces its value.
#[derive(Debug, Default)]
pub struct Context {
    bindings: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, replacing any previous binding.
    pub fn bind(&mut self, name: &str, value: Value) -> Result<(), BridgeError> {
        validate_identifier(name)?;
        trace!(name, "binding variable");
        self.bindings.insert(name.to_owned(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Remove every binding. The context stays usable.
    pub fn reset(&mut self) {
        self.bindings.clear();
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bound names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub(crate) fn bindings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Check that `name` is usable as a variable: a letter or `_` followed by
/// letters, digits or `_`, and not a reserved word.
pub fn validate_identifier(name: &str) -> Result<(), BridgeError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(BridgeError::Binding("variable name is empty".into()));
    };
    if !(first.is_alphabetic() || first == '_') {
        return Err(BridgeError::Binding(format!(
            "variable name '{}' must start with a letter or '_'",
            name
        )));
    }
    if let Some(bad) = chars.find(|c| !(c.is_alphanumeric() || *c == '_')) {
        return Err(BridgeError::Binding(format!(
            "variable name '{}' contains invalid character {:?}",
            name, bad
        )));
    }
    if RESERVED.contains(&name) {
        return Err(BridgeError::Binding(format!(
            "variable name '{}' is a reserved word",
            name
        )));
    }
    Ok(())
}
