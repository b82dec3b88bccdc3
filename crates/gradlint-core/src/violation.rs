//! Violations and the edits that remediate them.

use std::fmt;

use crate::span::{NodeId, Span};

/// Where an edit's text is inserted. Anchors always refer to positions in the
/// original parse; the only synthetic position is the document start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAnchor {
    /// Offset zero, before the first line, with no indentation applied.
    DocumentStart,
    /// Immediately before the anchored node's starting line.
    Before(Span),
    /// Immediately after the anchored node's ending line.
    After(Span),
}

/// An instruction to insert `text` (possibly multi-line) at an anchor.
/// Edits never reference positions computed from a previously applied edit;
/// they are position-stable relative to the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub anchor: EditAnchor,
    pub text: String,
}

impl Edit {
    pub fn before(span: Span, text: impl Into<String>) -> Self {
        Self {
            anchor: EditAnchor::Before(span),
            text: text.into(),
        }
    }

    pub fn after(span: Span, text: impl Into<String>) -> Self {
        Self {
            anchor: EditAnchor::After(span),
            text: text.into(),
        }
    }

    pub fn at_document_start(text: impl Into<String>) -> Self {
        Self {
            anchor: EditAnchor::DocumentStart,
            text: text.into(),
        }
    }
}

/// A rule-check failure, optionally anchored for reporting and optionally
/// carrying a remediation plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub rule: &'static str,
    pub message: String,
    pub anchor: Option<Span>,
    /// Set when the violation was recorded inside a suppression region;
    /// suppressed violations are never surfaced to the caller.
    pub suppressed: bool,
    pub edits: Vec<Edit>,
}

impl Violation {
    /// Attach a remediation edit.
    pub fn fix(&mut self, edit: Edit) -> &mut Self {
        self.edits.push(edit);
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.anchor {
            Some(span) => write!(
                f,
                "{}:{} [{}] {}",
                span.start_line, span.start_col, self.rule, self.message
            ),
            None => write!(f, "[{}] {}", self.rule, self.message),
        }
    }
}

/// One lexical suppression region opened by an `ignore(...)` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SuppressScope {
    /// Zero name arguments: every rule is suppressed.
    All,
    /// Only the named rules are suppressed.
    Named(Vec<String>),
}

/// Collects the violations one rule produces during one traversal, honoring
/// the active suppression scope.
#[derive(Debug)]
pub struct Violations {
    rule: &'static str,
    items: Vec<Violation>,
    scopes: Vec<SuppressScope>,
}

impl Violations {
    pub fn new(rule: &'static str) -> Self {
        Self {
            rule,
            items: Vec::new(),
            scopes: Vec::new(),
        }
    }

    /// Record a violation. The violation is created unconditionally and a
    /// mutable handle returned so edits can always be attached; when a
    /// suppression scope covers this rule the violation is marked and will
    /// not be surfaced.
    pub fn add(&mut self, message: impl Into<String>, anchor: Option<Span>) -> &mut Violation {
        let suppressed = self.is_suppressed();
        self.items.push(Violation {
            rule: self.rule,
            message: message.into(),
            anchor,
            suppressed,
            edits: Vec::new(),
        });
        self.items.last_mut().unwrap()
    }

    /// The generic node+message entry point is a contract violation: rules
    /// must go through [`Violations::add`] so the message/edit API stays the
    /// single path. It exists only to fail loudly.
    pub fn add_for_node(&mut self, node: NodeId, _message: &str) -> &mut Violation {
        panic!(
            "rule '{}' used the generic node+message violation path for {}; \
             use Violations::add (or RuleContext::add_violation) instead",
            self.rule, node
        );
    }

    /// True when any open region suppresses this rule.
    pub fn is_suppressed(&self) -> bool {
        self.scopes.iter().any(|scope| match scope {
            SuppressScope::All => true,
            SuppressScope::Named(names) => names.iter().any(|n| n == self.rule),
        })
    }

    /// Open a suppression region; `names` empty means every rule.
    pub(crate) fn push_suppression(&mut self, names: Vec<String>) {
        if names.is_empty() {
            self.scopes.push(SuppressScope::All);
        } else {
            self.scopes.push(SuppressScope::Named(names));
        }
    }

    pub(crate) fn pop_suppression(&mut self) {
        self.scopes.pop();
    }

    /// Every recorded violation, suppressed ones included.
    pub fn all(&self) -> &[Violation] {
        &self.items
    }

    /// The violations to report: suppression affects surfacing only.
    pub fn into_surfaced(self) -> Vec<Violation> {
        self.items.into_iter().filter(|v| !v.suppressed).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    #[test]
    fn test_add_returns_handle_for_edits() {
        let mut vs = Violations::new("demo");
        let span = Span::new(1, 1, 1, 10);
        vs.add("missing plugin", Some(span))
            .fix(Edit::before(span, "id 'x'"));
        assert_eq!(vs.all().len(), 1);
        assert_eq!(vs.all()[0].edits.len(), 1);
    }

    #[test]
    fn test_suppression_all_rules() {
        let mut vs = Violations::new("demo");
        vs.push_suppression(vec![]);
        vs.add("inside region", None);
        vs.pop_suppression();
        vs.add("outside region", None);

        assert_eq!(vs.all().len(), 2);
        assert!(vs.all()[0].suppressed);
        assert!(!vs.all()[1].suppressed);

        let surfaced = vs.into_surfaced();
        assert_eq!(surfaced.len(), 1);
        assert_eq!(surfaced[0].message, "outside region");
    }

    #[test]
    fn test_suppression_named_rules() {
        let mut vs = Violations::new("demo");
        vs.push_suppression(vec!["other".into()]);
        assert!(!vs.is_suppressed());
        vs.push_suppression(vec!["demo".into()]);
        assert!(vs.is_suppressed());
        vs.pop_suppression();
        vs.pop_suppression();
        assert!(!vs.is_suppressed());
    }

    #[test]
    #[should_panic(expected = "generic node+message violation path")]
    fn test_generic_entry_point_fails_loudly() {
        let mut vs = Violations::new("demo");
        vs.add_for_node(NodeId(0), "nope");
    }

    #[test]
    fn test_display() {
        let mut vs = Violations::new("required-plugin");
        vs.add("script does not declare plugin", Some(Span::new(3, 5, 3, 9)));
        assert_eq!(
            vs.all()[0].to_string(),
            "3:5 [required-plugin] script does not declare plugin"
        );
    }
}
