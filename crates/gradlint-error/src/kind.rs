//! Error kinds for gradlint operations.

use strum_macros::{Display, IntoStaticStr};

/// The kind of error that occurred.
///
/// Callers can match on the kind to decide how to react; most kinds are
/// input problems, while `ApiMisuse` marks a contract violation by a rule
/// author and should never be swallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An unexpected error occurred - catch-all for unhandled cases
    Unexpected,

    /// Invalid engine or rule configuration
    ConfigInvalid,

    /// Invalid argument passed to a function
    InvalidArgument,

    /// Failed to parse a build script
    ParseFailed,

    /// Invalid syntax inside an otherwise parseable script
    SyntaxError,

    /// Encoding error (invalid UTF-8, etc.)
    EncodingError,

    /// Best-effort project-model evaluation failed
    EvalFailed,

    /// A dependency referenced a configuration the project does not define
    UnknownConfiguration,

    /// A rule bypassed the violation/edit API; programming error, not input error
    ApiMisuse,

    /// An edit anchor referenced a node position that was never captured
    AnchorMissing,

    /// IO operation failed
    IoFailed,
}

impl ErrorKind {
    /// Returns the error kind as a static string.
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Check whether this kind marks a bug in a rule rather than bad input.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, ErrorKind::ApiMisuse | ErrorKind::AnchorMissing)
    }
}
