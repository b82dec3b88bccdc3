//! Parser front-end producing the [`gradlint_core::ScriptTree`] the lint
//! engine consumes.
//!
//! Covers the Groovy-flavored build-script subset the lint vocabulary is
//! defined over. Anything outside the subset parses to opaque nodes rather
//! than failing, so real-world scripts lint even when they use constructs no
//! rule cares about.

mod parse;
mod token;

pub use parse::parse;
pub use token::{Token, TokenKind, tokenize, unescape};
