//! The rule interface: one default no-op callback per construct kind.
//!
//! The structural visitor performs the recognition; a rule only reacts.
//! A concrete rule overrides the callbacks it needs, records bookmarks and
//! violations through the [`RuleContext`], and makes its remediation
//! decisions in [`Rule::script_complete`], the single callback guaranteed to
//! run after the whole script has been walked.

use crate::construct::{
    ApplyPlugin, ConfigurationExclude, DependencyDeclaration, ExtensionProperty,
    PluginDeclaration, TaskDeclaration,
};
use crate::context::RuleContext;
use crate::span::NodeId;

pub trait Rule {
    /// Stable rule name, also matched by `ignore('name')` suppression
    /// directives.
    fn name(&self) -> &'static str;

    /// A `buildscript { }` block was opened; `node` is the whole call.
    fn visit_buildscript(&mut self, _ctx: &mut RuleContext<'_>, _node: NodeId) {}

    /// A `repositories { }` block was opened.
    fn visit_repositories(&mut self, _ctx: &mut RuleContext<'_>, _node: NodeId) {}

    /// A `dependencies { }` block was opened.
    fn visit_dependencies_block(&mut self, _ctx: &mut RuleContext<'_>, _node: NodeId) {}

    /// A `plugins { }` block was opened.
    fn visit_plugins_block(&mut self, _ctx: &mut RuleContext<'_>, _node: NodeId) {}

    /// A top-level `apply plugin: '...'` statement.
    fn visit_apply_plugin(
        &mut self,
        _ctx: &mut RuleContext<'_>,
        _node: NodeId,
        _apply: &ApplyPlugin,
    ) {
    }

    /// A declaration inside a `plugins { }` block.
    fn visit_plugin(
        &mut self,
        _ctx: &mut RuleContext<'_>,
        _node: NodeId,
        _plugin: &PluginDeclaration,
    ) {
    }

    /// A dependency declaration, in either surface form.
    fn visit_dependency(
        &mut self,
        _ctx: &mut RuleContext<'_>,
        _node: NodeId,
        _dependency: &DependencyDeclaration,
    ) {
    }

    /// A task declaration, in whichever argument shape it used.
    fn visit_task(&mut self, _ctx: &mut RuleContext<'_>, _node: NodeId, _task: &TaskDeclaration) {}

    /// A configuration exclude inside `configurations { }`.
    fn visit_configuration_exclude(
        &mut self,
        _ctx: &mut RuleContext<'_>,
        _node: NodeId,
        _exclude: &ConfigurationExclude,
    ) {
    }

    /// An extension-property write.
    fn visit_extension_property(
        &mut self,
        _ctx: &mut RuleContext<'_>,
        _node: NodeId,
        _property: &ExtensionProperty,
    ) {
    }

    /// Invoked exactly once after the traversal finishes; the place to make
    /// remediation decisions from the bookmarks gathered above.
    fn script_complete(&mut self, _ctx: &mut RuleContext<'_>) {}
}
