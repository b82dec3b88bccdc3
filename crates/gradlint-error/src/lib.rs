//! # gradlint-error
//!
//! Unified error handling for gradlint.
//!
//! ## Design
//!
//! - **ErrorKind**: know what went wrong (e.g. ParseFailed, EvalFailed)
//! - **Error context**: operation name plus key/value pairs to locate the cause
//! - **Error source**: wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use gradlint_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::ParseFailed, "unterminated string")
//!         .with_operation("groovy::lex")
//!         .with_context("line", "7"))
//! }
//! ```
//!
//! All fallible functions in the workspace return `Result<T, Error>`; external
//! errors are attached with `set_source` rather than converted via `From`.

mod error;
mod kind;

pub use error::Error;
pub use kind::ErrorKind;

/// Result type alias using the gradlint Error.
pub type Result<T> = std::result::Result<T, Error>;
