//! Per-traversal context handed to rule callbacks.

use crate::bookmark::Bookmarks;
use crate::ir::ScriptTree;
use crate::span::{NodeId, Span};
use crate::version::GradleVersion;
use crate::violation::{Violation, Violations};

/// Snapshot of which block kinds are currently open. The counters themselves
/// live in the visitor's traversal state; rules only see this read-only copy,
/// refreshed before every callback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeFlags {
    pub in_buildscript: bool,
    pub in_dependencies: bool,
    pub in_configurations: bool,
    pub in_plugins: bool,
}

/// Everything a rule may touch during one traversal of one script: the tree,
/// its private bookmark store, and its violation recorder. A context is
/// created fresh per run and consumed when the run finishes, so no traversal
/// state can leak across files or rule instances.
pub struct RuleContext<'t> {
    tree: &'t ScriptTree,
    bookmarks: Bookmarks,
    violations: Violations,
    scope: ScopeFlags,
    tool_version: Option<GradleVersion>,
}

impl<'t> RuleContext<'t> {
    pub fn new(
        tree: &'t ScriptTree,
        rule_name: &'static str,
        tool_version: Option<GradleVersion>,
    ) -> Self {
        Self {
            tree,
            bookmarks: Bookmarks::new(),
            violations: Violations::new(rule_name),
            scope: ScopeFlags::default(),
            tool_version,
        }
    }

    pub fn tree(&self) -> &'t ScriptTree {
        self.tree
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.tree.span(id)
    }

    /// Which block kinds the traversal is currently inside.
    pub fn scope(&self) -> ScopeFlags {
        self.scope
    }

    /// The declared tool version, when the caller supplied one.
    pub fn tool_version(&self) -> Option<GradleVersion> {
        self.tool_version
    }

    /// First-wins bookmark write.
    pub fn bookmark_first(&mut self, label: &'static str, node: NodeId) {
        self.bookmarks.record_first(label, node);
    }

    /// Last-wins bookmark write.
    pub fn bookmark_last(&mut self, label: &'static str, node: NodeId) {
        self.bookmarks.record_last(label, node);
    }

    /// Read a bookmark back.
    pub fn bookmark(&self, label: &str) -> Option<NodeId> {
        self.bookmarks.get(label)
    }

    /// Record a violation anchored at `anchor` (if any), returning a handle
    /// for attaching edits. This is the only sanctioned way for a rule to
    /// report; see [`Violations::add_for_node`] for the path that is not.
    pub fn add_violation(
        &mut self,
        message: impl Into<String>,
        anchor: Option<NodeId>,
    ) -> &mut Violation {
        let anchor = anchor.map(|id| self.tree.span(id));
        self.violations.add(message, anchor)
    }

    /// True while an `ignore(...)` region covering this rule is open.
    pub fn is_suppressed(&self) -> bool {
        self.violations.is_suppressed()
    }

    pub(crate) fn set_scope(&mut self, scope: ScopeFlags) {
        self.scope = scope;
    }

    pub(crate) fn push_suppression(&mut self, names: Vec<String>) {
        self.violations.push_suppression(names);
    }

    pub(crate) fn pop_suppression(&mut self) {
        self.violations.pop_suppression();
    }

    /// Consume the context, yielding the surfaced violations.
    pub fn finish(self) -> Vec<Violation> {
        self.violations.into_surfaced()
    }
}
