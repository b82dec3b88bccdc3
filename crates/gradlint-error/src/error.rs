//! The main Error type for gradlint.

use crate::ErrorKind;
use std::fmt;

/// Unified error type for all gradlint operations.
pub struct Error {
    kind: ErrorKind,
    message: String,
    operation: &'static str,
    context: Vec<(&'static str, String)>,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Error {
    /// Create a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            operation: "",
            context: Vec::new(),
            source: None,
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the operation that caused this error.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Get the context key-value pairs.
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// Set the operation that caused this error.
    ///
    /// If an operation was already set, the previous one is moved to context
    /// as "called" to preserve the call chain.
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        if !self.operation.is_empty() {
            self.context.push(("called", self.operation.to_string()));
        }
        self.operation = operation;
        self
    }

    /// Add context to the error.
    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }

    /// Set the source error.
    ///
    /// # Panics (debug only)
    /// Panics in debug mode if source was already set.
    pub fn set_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        debug_assert!(self.source.is_none(), "source error already set");
        self.source = Some(Box::new(source));
        self
    }

    /// Get the source error (if any).
    pub fn source_ref(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.source.as_ref().map(|e| e.as_ref())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.operation.is_empty() {
            write!(f, " at {}", self.operation)?;
        }

        if !self.context.is_empty() {
            write!(f, ", context {{ ")?;
            for (i, (key, value)) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", key, value)?;
            }
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} at {}", self.kind, self.operation)?;

        if !self.message.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Message: {}", self.message)?;
        }

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Context:")?;
            for (key, value) in &self.context {
                writeln!(f, "        {}: {}", key, value)?;
            }
        }

        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "    Source: {:?}", source)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::new(ErrorKind::IoFailed, err.to_string())
            .with_operation("io")
            .set_source(err)
    }
}

impl Error {
    /// Create an Unexpected error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    /// Create a ParseFailed error.
    pub fn parse_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseFailed, message)
    }

    /// Create a SyntaxError.
    pub fn syntax_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SyntaxError, message)
    }

    /// Create an EvalFailed error.
    pub fn eval_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EvalFailed, message)
    }

    /// Create an ApiMisuse error.
    pub fn api_misuse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ApiMisuse, message)
    }

    /// Create an AnchorMissing error.
    pub fn anchor_missing(label: impl Into<String>) -> Self {
        let label = label.into();
        Self::new(
            ErrorKind::AnchorMissing,
            format!("anchor '{}' was never bookmarked", label),
        )
        .with_context("label", label)
    }

    /// Create a ConfigInvalid error.
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create an InvalidArgument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Create an UnknownConfiguration error.
    pub fn unknown_configuration(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            ErrorKind::UnknownConfiguration,
            format!("configuration '{}' is not defined", name),
        )
        .with_context("configuration", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::new(ErrorKind::ParseFailed, "unterminated string");
        assert_eq!(err.kind(), ErrorKind::ParseFailed);
        assert_eq!(err.message(), "unterminated string");
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::new(ErrorKind::EvalFailed, "unresolvable")
            .with_operation("visit::dependency")
            .with_context("expression", "deps.spring")
            .with_context("configuration", "compile");

        assert_eq!(err.operation(), "visit::dependency");
        assert_eq!(err.context().len(), 2);
        assert_eq!(err.context()[0], ("expression", "deps.spring".to_string()));
    }

    #[test]
    fn test_operation_chaining() {
        let err = Error::new(ErrorKind::ParseFailed, "failed")
            .with_operation("groovy::lex")
            .with_operation("groovy::parse");

        assert_eq!(err.operation(), "groovy::parse");
        assert_eq!(err.context().len(), 1);
        assert_eq!(err.context()[0], ("called", "groovy::lex".to_string()));
    }

    #[test]
    fn test_display() {
        let err = Error::new(ErrorKind::SyntaxError, "unexpected token")
            .with_operation("groovy::parse")
            .with_context("line", "12");

        let display = format!("{}", err);
        assert!(display.contains("SyntaxError"));
        assert!(display.contains("groovy::parse"));
        assert!(display.contains("line: 12"));
        assert!(display.contains("unexpected token"));
    }

    #[test]
    fn test_convenience_constructors() {
        let err = Error::anchor_missing("first_plugin");
        assert_eq!(err.kind(), ErrorKind::AnchorMissing);
        assert!(err.message().contains("first_plugin"));

        let err = Error::unknown_configuration("compile");
        assert_eq!(err.kind(), ErrorKind::UnknownConfiguration);
    }

    #[test]
    fn test_set_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing script");
        let err = Error::new(ErrorKind::IoFailed, "read failed").set_source(io_err);
        assert!(err.source_ref().is_some());
    }
}
