//! The parsed build-script tree the engine operates on.
//!
//! This is the contract with the external parser: a flat arena of [`Node`]s
//! keyed by [`NodeId`], each carrying a [`Span`] into the original source.
//! The engine only ever reads it; positions stay valid for the whole
//! traversal and for edit anchoring afterwards.

use smallvec::SmallVec;

use crate::span::{NodeId, Span};

/// A single parsed node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub span: Span,
    pub kind: NodeKind,
}

/// The shapes a build-script parser can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Whole-file statement list; the tree root.
    Script(SmallVec<[NodeId; 8]>),
    Call(Call),
    Assign(Assign),
    /// `{ ... }` block of statements.
    Closure(SmallVec<[NodeId; 8]>),
    /// Named-argument map, e.g. `plugin: 'java', version: '1.0'`.
    NamedArgs(Vec<NamedArg>),
    Literal(Literal),
    /// Dotted reference like `deps.spring` or a bare identifier.
    Path(Vec<String>),
    /// Expression the parser could not interpret; raw text preserved for
    /// best-effort evaluation.
    Opaque(String),
}

/// A method call in any of the accepted surface forms: parenthesized,
/// command-style juxtaposed arguments, or closure-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Receiver path, empty for unqualified calls. `tasks.create(..)` has
    /// receiver `["tasks"]` and name `create`.
    pub receiver: Vec<String>,
    pub name: String,
    pub args: SmallVec<[NodeId; 4]>,
    /// Chained juxtaposed calls, e.g. `version '1.0'` in
    /// `id 'java' version '1.0'`.
    pub chain: Vec<ChainedCall>,
    /// Trailing block argument, if any.
    pub closure: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainedCall {
    pub name: String,
    pub arg: NodeId,
}

/// `target = value`, with the target as a dotted path.
#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub target: Vec<String>,
    pub value: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedArg {
    pub key: String,
    pub value: NodeId,
}

/// Literal constants the engine understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str { value: String, interpolated: bool },
    Number(f64),
    Bool(bool),
}

/// Flat arena holding one parsed script.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScriptTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl ScriptTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its handle.
    pub fn add(&mut self, span: Span, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { id, span, kind });
        id
    }

    /// Mark the root node; expected to be a [`NodeKind::Script`].
    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The call payload, if this node is a call.
    pub fn call(&self, id: NodeId) -> Option<&Call> {
        match self.kind(id) {
            NodeKind::Call(call) => Some(call),
            _ => None,
        }
    }

    /// The literal payload, if this node is a literal.
    pub fn literal(&self, id: NodeId) -> Option<&Literal> {
        match self.kind(id) {
            NodeKind::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// String literal value plus its interpolation flag.
    pub fn string_value(&self, id: NodeId) -> Option<(&str, bool)> {
        match self.kind(id) {
            NodeKind::Literal(Literal::Str {
                value,
                interpolated,
            }) => Some((value.as_str(), *interpolated)),
            _ => None,
        }
    }

    /// Named-argument entries, if this node is a named-argument map.
    pub fn named_args(&self, id: NodeId) -> Option<&[NamedArg]> {
        match self.kind(id) {
            NodeKind::NamedArgs(entries) => Some(entries.as_slice()),
            _ => None,
        }
    }

    /// Render a node back into expression text for best-effort evaluation.
    /// Paths become dotted names; opaque nodes keep their raw text.
    pub fn expression_text(&self, id: NodeId) -> Option<String> {
        match self.kind(id) {
            NodeKind::Path(segments) => Some(segments.join(".")),
            NodeKind::Opaque(text) => Some(text.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_tree_accessors() {
        let mut tree = ScriptTree::new();
        let lit = tree.add(
            Span::new(1, 7, 1, 12),
            NodeKind::Literal(Literal::Str {
                value: "java".into(),
                interpolated: false,
            }),
        );
        let call = tree.add(
            Span::new(1, 1, 1, 12),
            NodeKind::Call(Call {
                receiver: vec![],
                name: "id".into(),
                args: smallvec![lit],
                chain: vec![],
                closure: None,
            }),
        );
        let root = tree.add(Span::new(1, 1, 1, 12), NodeKind::Script(smallvec![call]));
        tree.set_root(root);

        assert_eq!(tree.root(), Some(root));
        assert_eq!(tree.call(call).unwrap().name, "id");
        assert_eq!(tree.string_value(lit), Some(("java", false)));
        assert_eq!(tree.span(call).start_col, 1);
        assert!(tree.call(lit).is_none());
    }

    #[test]
    fn test_expression_text() {
        let mut tree = ScriptTree::new();
        let path = tree.add(
            Span::point(1, 1),
            NodeKind::Path(vec!["deps".into(), "spring".into()]),
        );
        let opaque = tree.add(Span::point(2, 1), NodeKind::Opaque("1 + 2".into()));
        assert_eq!(tree.expression_text(path).as_deref(), Some("deps.spring"));
        assert_eq!(tree.expression_text(opaque).as_deref(), Some("1 + 2"));
    }
}
