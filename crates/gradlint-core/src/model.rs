//! Optional live project model for best-effort expression evaluation.
//!
//! The engine never embeds an interpreter. When a caller can evaluate script
//! expressions against a real project, it supplies this narrow contract; any
//! error is caught at the call site, logged, and treated as "unresolvable".
//! Access is read-only and single-reader; the core adds no synchronization.

use gradlint_error::Result;

/// Values an evaluator may produce for a dependency-like expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A coordinate string, e.g. `"org.foo:bar:1.0"`.
    Str(String),
    /// Structured fields, e.g. `[("group", "org.foo"), ("name", "bar")]`.
    Map(Vec<(String, String)>),
}

pub trait ProjectModel {
    /// The project's real configuration names, replacing the built-in
    /// default set during recognition.
    fn configuration_names(&self) -> Vec<String>;

    /// Best-effort evaluation of an arbitrary expression. Implementations
    /// should return an error rather than panic; failure to evaluate is
    /// never fatal to a traversal.
    fn evaluate(&self, expression: &str) -> Result<Value>;
}
