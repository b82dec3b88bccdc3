//! The structural visitor: one top-down walk that recognizes the construct
//! vocabulary across its surface syntaxes and emits normalized callbacks.
//!
//! Recognition happens here; reaction happens in the [`Rule`]. The two stages
//! stay separate so rules never reimplement syntax matching. Recognition
//! candidates are tried in a fixed priority order per call site:
//!
//! 1. `buildscript`/`repositories`/`dependencies`/`plugins` with a trailing
//!    block opens that block kind.
//! 2. inside a dependencies (or buildscript) block, a call named after a
//!    known configuration (or `classpath`) with arguments is a dependency.
//! 3. inside a plugins block, a call with a string argument is a plugin
//!    declaration.
//! 4. a top-level `apply` with a `plugin:` named argument.
//! 5. `task ...` / `tasks.create(...)` in one of the accepted shapes.
//! 6. `<configuration>.exclude ...` inside a configurations block.
//! 7. an extension-property write (assignment or single-argument call).
//! 8. `ignore(...)` on a suppression receiver opens a suppression region.
//!
//! Everything else falls through to ordinary structural descent, so nested
//! constructs are still found.

use crate::construct::{
    ApplyPlugin, ConfigurationExclude, ConstructKind, DependencyDeclaration, ExtensionProperty,
    PluginDeclaration, TaskDeclaration,
};
use crate::context::{RuleContext, ScopeFlags};
use crate::engine::LintOptions;
use crate::ir::{Assign, Call, NodeKind, ScriptTree};
use crate::model::Value;
use crate::rule::Rule;
use crate::span::NodeId;

/// Traversal-local state. Owned by one visitor instance for one script; the
/// counters nest (a block inside a block of the same kind keeps the flag up).
#[derive(Debug, Default)]
struct TraversalState {
    /// Names of currently open, unrecognized closures; used for
    /// extension-property recognition.
    closure_stack: Vec<String>,
    buildscript: u32,
    dependencies: u32,
    configurations: u32,
    plugins: u32,
}

impl TraversalState {
    fn flags(&self) -> ScopeFlags {
        ScopeFlags {
            in_buildscript: self.buildscript > 0,
            in_dependencies: self.dependencies > 0,
            in_configurations: self.configurations > 0,
            in_plugins: self.plugins > 0,
        }
    }

    fn at_top_level(&self) -> bool {
        self.closure_stack.is_empty()
            && self.buildscript == 0
            && self.dependencies == 0
            && self.configurations == 0
            && self.plugins == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Buildscript,
    Repositories,
    Dependencies,
    Plugins,
    Configurations,
}

pub struct StructuralVisitor<'a> {
    tree: &'a ScriptTree,
    options: &'a LintOptions<'a>,
    configurations: Vec<String>,
    state: TraversalState,
}

impl<'a> StructuralVisitor<'a> {
    pub fn new(tree: &'a ScriptTree, options: &'a LintOptions<'a>) -> Self {
        Self {
            tree,
            options,
            configurations: options.effective_configurations(),
            state: TraversalState::default(),
        }
    }

    /// Trace record for each construct the walk recognizes.
    fn dispatched(&self, kind: ConstructKind, id: NodeId) {
        tracing::trace!(construct = %kind, node = %id, "construct recognized");
    }

    /// Walk the whole tree, then fire the rule's `script_complete`.
    pub fn walk(&mut self, rule: &mut dyn Rule, ctx: &mut RuleContext<'_>) {
        if let Some(root) = self.tree.root() {
            self.visit_node(root, rule, ctx);
        }
        ctx.set_scope(self.state.flags());
        rule.script_complete(ctx);
    }

    fn visit_node(&mut self, id: NodeId, rule: &mut dyn Rule, ctx: &mut RuleContext<'_>) {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::Script(stmts) | NodeKind::Closure(stmts) => {
                for &stmt in stmts.iter() {
                    self.visit_node(stmt, rule, ctx);
                }
            }
            NodeKind::Call(call) => self.handle_call(id, call, rule, ctx),
            NodeKind::Assign(assign) => self.handle_assign(id, assign, rule, ctx),
            NodeKind::NamedArgs(entries) => {
                for entry in entries {
                    self.visit_node(entry.value, rule, ctx);
                }
            }
            NodeKind::Literal(_) | NodeKind::Path(_) | NodeKind::Opaque(_) => {}
        }
    }

    fn handle_call(
        &mut self,
        id: NodeId,
        call: &'a Call,
        rule: &mut dyn Rule,
        ctx: &mut RuleContext<'_>,
    ) {
        let tree = self.tree;
        ctx.set_scope(self.state.flags());

        // 1. named blocks with a trailing closure
        if call.receiver.is_empty() {
            if let Some(body) = call.closure {
                let block = match call.name.as_str() {
                    "buildscript" => Some(BlockKind::Buildscript),
                    "repositories" => Some(BlockKind::Repositories),
                    "dependencies" => Some(BlockKind::Dependencies),
                    "plugins" => Some(BlockKind::Plugins),
                    "configurations" => Some(BlockKind::Configurations),
                    _ => None,
                };
                if let Some(block) = block {
                    self.open_block(block, id, body, rule, ctx);
                    return;
                }
            }
        }

        // 2. dependency declaration inside dependencies/buildscript
        if call.receiver.is_empty()
            && !call.args.is_empty()
            && (self.state.dependencies > 0 || self.state.buildscript > 0)
            && self.is_configuration_name(&call.name)
        {
            if let Some(dep) = self.parse_dependency(call) {
                self.dispatched(ConstructKind::DependencyDeclaration, id);
                rule.visit_dependency(ctx, id, &dep);
            }
            if let Some(body) = call.closure {
                self.visit_node(body, rule, ctx);
            }
            return;
        }

        // 3. plugin declaration inside a plugins block
        if self.state.plugins > 0 && call.receiver.is_empty() {
            let first_str = call
                .args
                .iter()
                .find_map(|&arg| tree.string_value(arg));
            if let Some((plugin_id, _)) = first_str {
                let version = call
                    .chain
                    .iter()
                    .find(|chained| chained.name == "version")
                    .and_then(|chained| tree.string_value(chained.arg))
                    .map(|(text, _)| text.to_string());
                let plugin = PluginDeclaration {
                    id: plugin_id.to_string(),
                    version,
                };
                self.dispatched(ConstructKind::PluginDeclaration, id);
                rule.visit_plugin(ctx, id, &plugin);
                return;
            }
        }

        // 4. top-level apply plugin statement
        if call.receiver.is_empty() && call.name == "apply" && self.state.at_top_level() {
            let plugin = call.args.iter().find_map(|&arg| {
                tree.named_args(arg)
                    .and_then(|entries| entries.iter().find(|e| e.key == "plugin"))
                    .and_then(|entry| tree.string_value(entry.value))
                    .map(|(text, _)| text.to_string())
            });
            if let Some(plugin) = plugin {
                self.dispatched(ConstructKind::ApplyPluginStatement, id);
                rule.visit_apply_plugin(ctx, id, &ApplyPlugin { plugin });
                return;
            }
        }

        // 5. task declaration
        let is_task_call = (call.receiver.is_empty() && call.name == "task")
            || (call.receiver.len() == 1 && call.receiver[0] == "tasks" && call.name == "create");
        if is_task_call {
            if let Some(task) = self.parse_task(call) {
                self.dispatched(ConstructKind::TaskDeclaration, id);
                rule.visit_task(ctx, id, &task);
                self.descend_task_closures(call, rule, ctx);
                return;
            }
            tracing::debug!(name = %call.name, "task declaration in unrecognized shape; descending");
        }

        // 6. configuration exclude
        if self.state.configurations > 0 && call.name == "exclude" && !call.receiver.is_empty() {
            let configuration = call.receiver.last().map(String::as_str).unwrap_or("");
            if configuration == "all" || self.is_configuration_name(configuration) {
                let exclude = ConfigurationExclude {
                    configuration: configuration.to_string(),
                    group: self.named_string_arg(call, "group"),
                    module: self.named_string_arg(call, "module"),
                };
                self.dispatched(ConstructKind::ConfigurationExclude, id);
                rule.visit_configuration_exclude(ctx, id, &exclude);
                return;
            }
        }

        // 7. extension-property write via single-argument call
        if !self.state.closure_stack.is_empty()
            && call.receiver.is_empty()
            && call.args.len() == 1
            && call.chain.is_empty()
            && call.closure.is_none()
            && tree.named_args(call.args[0]).is_none()
            && !self.is_reserved_name(&call.name)
        {
            let property = ExtensionProperty {
                prefix: self.state.closure_stack.clone(),
                name: call.name.clone(),
                value: tree.literal(call.args[0]).cloned(),
            };
            self.dispatched(ConstructKind::ExtensionProperty, id);
            rule.visit_extension_property(ctx, id, &property);
            return;
        }

        // 8. suppression region
        if call.name == "ignore" && self.is_suppression_receiver(&call.receiver) {
            if let Some(body) = call.closure {
                let names: Vec<String> = call
                    .args
                    .iter()
                    .filter_map(|&arg| tree.string_value(arg))
                    .map(|(text, _)| text.to_string())
                    .collect();
                ctx.push_suppression(names);
                self.visit_node(body, rule, ctx);
                ctx.pop_suppression();
                return;
            }
        }

        // ordinary structural descent
        for &arg in call.args.iter() {
            self.visit_node(arg, rule, ctx);
        }
        for chained in &call.chain {
            self.visit_node(chained.arg, rule, ctx);
        }
        if let Some(body) = call.closure {
            self.state.closure_stack.push(call.name.clone());
            self.visit_node(body, rule, ctx);
            self.state.closure_stack.pop();
        }
    }

    fn handle_assign(
        &mut self,
        id: NodeId,
        assign: &'a Assign,
        rule: &mut dyn Rule,
        ctx: &mut RuleContext<'_>,
    ) {
        let tree = self.tree;
        ctx.set_scope(self.state.flags());

        if assign.target.is_empty() {
            self.visit_node(assign.value, rule, ctx);
            return;
        }
        let last = assign.target.len() - 1;
        let emit = if !self.state.closure_stack.is_empty() {
            // `name = value` inside a named closure
            let mut prefix = self.state.closure_stack.clone();
            prefix.extend(assign.target[..last].iter().cloned());
            Some(prefix)
        } else if assign.target.len() >= 2 && self.state.at_top_level() {
            // top-level property-path syntax, e.g. `someExt.someProp = 'x'`
            Some(assign.target[..last].to_vec())
        } else {
            None
        };

        if let Some(prefix) = emit {
            let property = ExtensionProperty {
                prefix,
                name: assign.target[last].clone(),
                // only literal constants resolve to a value
                value: tree.literal(assign.value).cloned(),
            };
            self.dispatched(ConstructKind::ExtensionProperty, id);
            rule.visit_extension_property(ctx, id, &property);
        }
        self.visit_node(assign.value, rule, ctx);
    }

    fn open_block(
        &mut self,
        block: BlockKind,
        id: NodeId,
        body: NodeId,
        rule: &mut dyn Rule,
        ctx: &mut RuleContext<'_>,
    ) {
        match block {
            BlockKind::Buildscript => self.state.buildscript += 1,
            BlockKind::Dependencies => self.state.dependencies += 1,
            BlockKind::Plugins => self.state.plugins += 1,
            BlockKind::Configurations => self.state.configurations += 1,
            BlockKind::Repositories => {}
        }
        ctx.set_scope(self.state.flags());
        match block {
            BlockKind::Buildscript => {
                self.dispatched(ConstructKind::BuildscriptBlock, id);
                rule.visit_buildscript(ctx, id);
            }
            BlockKind::Repositories => {
                self.dispatched(ConstructKind::RepositoriesBlock, id);
                rule.visit_repositories(ctx, id);
            }
            BlockKind::Dependencies => {
                self.dispatched(ConstructKind::DependenciesBlock, id);
                rule.visit_dependencies_block(ctx, id);
            }
            BlockKind::Plugins => {
                self.dispatched(ConstructKind::PluginsBlock, id);
                rule.visit_plugins_block(ctx, id);
            }
            BlockKind::Configurations => {}
        }
        self.visit_node(body, rule, ctx);
        match block {
            BlockKind::Buildscript => self.state.buildscript -= 1,
            BlockKind::Dependencies => self.state.dependencies -= 1,
            BlockKind::Plugins => self.state.plugins -= 1,
            BlockKind::Configurations => self.state.configurations -= 1,
            BlockKind::Repositories => {}
        }
        ctx.set_scope(self.state.flags());
    }

    fn is_configuration_name(&self, name: &str) -> bool {
        name == "classpath" || self.configurations.iter().any(|c| c == name)
    }

    fn is_reserved_name(&self, name: &str) -> bool {
        matches!(
            name,
            "buildscript"
                | "repositories"
                | "dependencies"
                | "plugins"
                | "configurations"
                | "apply"
                | "task"
                | "ignore"
                | "exclude"
        ) || self.is_configuration_name(name)
    }

    fn is_suppression_receiver(&self, receiver: &[String]) -> bool {
        if receiver.is_empty() {
            return false;
        }
        let joined = receiver.join(".");
        self.options
            .suppression_receivers
            .iter()
            .any(|r| *r == joined)
    }

    fn named_string_arg(&self, call: &Call, key: &str) -> Option<String> {
        let tree = self.tree;
        call.args.iter().find_map(|&arg| {
            tree.named_args(arg)
                .and_then(|entries| entries.iter().find(|e| e.key == key))
                .and_then(|entry| tree.string_value(entry.value))
                .map(|(text, _)| text.to_string())
        })
    }

    /// Parse a dependency from the structured named-argument form, the
    /// single-string coordinate form, or (with a live model) a best-effort
    /// evaluation of an arbitrary expression. Unresolvable expressions are
    /// skipped, never fatal.
    fn parse_dependency(&self, call: &Call) -> Option<DependencyDeclaration> {
        let tree = self.tree;
        let first = call.args[0];

        if let Some(entries) = tree.named_args(first) {
            let field = |key: &str| -> Option<String> {
                entries
                    .iter()
                    .find(|e| e.key == key)
                    .and_then(|e| tree.string_value(e.value))
                    .map(|(text, _)| text.to_string())
            };
            return Some(DependencyDeclaration {
                configuration: call.name.clone(),
                group: field("group"),
                name: field("name"),
                version: field("version"),
                classifier: field("classifier"),
                extension: field("ext").or_else(|| field("extension")),
            });
        }

        if let Some((notation, _)) = tree.string_value(first) {
            let parsed = DependencyDeclaration::parse_notation(&call.name, notation);
            if parsed.is_none() {
                tracing::debug!(configuration = %call.name, notation, "unparseable dependency notation; skipping");
            }
            return parsed;
        }

        let Some(model) = self.options.model else {
            tracing::debug!(configuration = %call.name, "non-literal dependency and no project model; skipping");
            return None;
        };
        let Some(expression) = tree.expression_text(first) else {
            tracing::debug!(configuration = %call.name, "dependency expression has no textual form; skipping");
            return None;
        };
        match model.evaluate(&expression) {
            Ok(Value::Str(notation)) => {
                DependencyDeclaration::parse_notation(&call.name, &notation)
            }
            Ok(Value::Map(pairs)) => {
                let field = |key: &str| -> Option<String> {
                    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
                };
                Some(DependencyDeclaration {
                    configuration: call.name.clone(),
                    group: field("group"),
                    name: field("name"),
                    version: field("version"),
                    classifier: field("classifier"),
                    extension: field("ext").or_else(|| field("extension")),
                })
            }
            Err(err) => {
                tracing::debug!(%err, %expression, "dependency expression unresolvable; skipping");
                None
            }
        }
    }

    /// Try the accepted task-declaration shapes in fixed priority order and
    /// take the first match.
    fn parse_task(&self, call: &Call) -> Option<TaskDeclaration> {
        let tree = self.tree;
        let first = *call.args.first()?;

        // bare identifier, including one that parsed as a zero-argument call
        // carrying the task's configuration closure
        match tree.kind(first) {
            NodeKind::Path(segments) if segments.len() == 1 => {
                return Some(TaskDeclaration {
                    name: Some(segments[0].clone()),
                    args: Vec::new(),
                });
            }
            NodeKind::Call(inner)
                if inner.receiver.is_empty() && inner.args.is_empty() && inner.chain.is_empty() =>
            {
                return Some(TaskDeclaration {
                    name: Some(inner.name.clone()),
                    args: Vec::new(),
                });
            }
            _ => {}
        }

        // string literal name
        if let Some((name, _)) = tree.string_value(first) {
            return Some(TaskDeclaration {
                name: Some(name.to_string()),
                args: Vec::new(),
            });
        }

        // leading map of named args, then the name
        if let Some(entries) = tree.named_args(first) {
            let name = call.args.get(1).and_then(|&second| match tree.kind(second) {
                NodeKind::Path(segments) if segments.len() == 1 => Some(segments[0].clone()),
                _ => tree.string_value(second).map(|(s, _)| s.to_string()),
            })?;
            return Some(TaskDeclaration {
                name: Some(name),
                args: entries.iter().map(|e| (e.key.clone(), e.value)).collect(),
            });
        }

        // call-like name with trailing type argument: `task copy(type: Copy)`
        if let NodeKind::Call(inner) = tree.kind(first) {
            let args = inner
                .args
                .iter()
                .find_map(|&arg| tree.named_args(arg))
                .map(|entries| {
                    entries
                        .iter()
                        .map(|e| (e.key.clone(), e.value))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            return Some(TaskDeclaration {
                name: Some(inner.name.clone()),
                args,
            });
        }

        None
    }

    /// After emitting a task declaration, still walk any configuration
    /// closures so nested constructs are found.
    fn descend_task_closures(
        &mut self,
        call: &'a Call,
        rule: &mut dyn Rule,
        ctx: &mut RuleContext<'_>,
    ) {
        let tree = self.tree;
        for &arg in call.args.iter() {
            if let NodeKind::Call(inner) = tree.kind(arg) {
                if let Some(body) = inner.closure {
                    self.visit_node(body, rule, ctx);
                }
            }
        }
        if let Some(body) = call.closure {
            self.visit_node(body, rule, ctx);
        }
    }
}
