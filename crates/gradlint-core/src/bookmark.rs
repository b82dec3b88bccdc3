//! Bookmarks: per-traversal named references to tree nodes.
//!
//! A rule captures positions during the walk and reads them back in its
//! `script_complete` callback, when presence/absence of every construct is
//! known. The write policy is explicit per call site rather than implied by
//! the label name: `record_first` keeps the earliest node seen under a label,
//! `record_last` keeps the most recent one. A store belongs to exactly one
//! rule instance and one traversal; [`RuleContext`](crate::context::RuleContext)
//! creates a fresh one per run so labels never leak across files.

use std::collections::HashMap;

use crate::span::NodeId;

#[derive(Debug, Default)]
pub struct Bookmarks {
    slots: HashMap<&'static str, NodeId>,
}

impl Bookmarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// First-wins write: set only if the label is absent. Used for "first
    /// occurrence" anchors; once set, the entry is immutable for the rest of
    /// the traversal.
    pub fn record_first(&mut self, label: &'static str, node: NodeId) {
        self.slots.entry(label).or_insert(node);
    }

    /// Last-wins write: always overwrite. Used for "most recent" anchors such
    /// as an append point after the last statement of a kind.
    pub fn record_last(&mut self, label: &'static str, node: NodeId) {
        self.slots.insert(label, node);
    }

    pub fn get(&self, label: &str) -> Option<NodeId> {
        self.slots.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.slots.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
