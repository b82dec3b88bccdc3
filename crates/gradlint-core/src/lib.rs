//! Core engine for rule-based build-script analysis and auto-remediation.
//!
//! The pipeline is: an external parser produces a [`ScriptTree`]; the
//! [`StructuralVisitor`](visit::StructuralVisitor) walks it once, normalizing
//! the several surface syntaxes for blocks, plugin/dependency/task
//! declarations into uniform [`Rule`] callbacks; rules capture bookmarks and
//! record [`Violation`]s, each optionally carrying anchored [`Edit`]s; the
//! [`patch`] module applies an edit list to the original text, producing the
//! corrected script without re-parsing.

pub mod bookmark;
pub mod construct;
pub mod context;
pub mod engine;
pub mod ir;
pub mod model;
pub mod patch;
pub mod rule;
pub mod span;
pub mod version;
pub mod violation;
pub mod visit;

pub use bookmark::Bookmarks;
pub use construct::{
    ApplyPlugin, ConfigurationExclude, ConstructKind, DependencyDeclaration, ExtensionProperty,
    PluginDeclaration, TaskDeclaration,
};
pub use context::{RuleContext, ScopeFlags};
pub use engine::{LintOptions, apply_fixes, run_rule};
pub use ir::{Assign, Call, ChainedCall, Literal, NamedArg, Node, NodeKind, ScriptTree};
pub use model::{ProjectModel, Value};
pub use patch::apply_edits;
pub use rule::Rule;
pub use span::{NodeId, Span};
pub use version::GradleVersion;
pub use violation::{Edit, EditAnchor, Violation, Violations};
