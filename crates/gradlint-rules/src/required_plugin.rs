//! Requires a plugin to be applied, and applies it when it is not.
//!
//! Detection accepts both application syntaxes. Remediation picks the least
//! surprising strategy for the script at hand:
//!
//! - a `plugins { }` block with declarations gets one more at its top;
//! - a script using `apply plugin:` statements gets another one, plus the
//!   buildscript classpath entry the plugin needs;
//! - a script using neither gets a whole `plugins { }` block when the tool
//!   version supports that syntax (or is unknown), and the legacy
//!   buildscript-plus-apply arrangement otherwise.
//!
//! All decisions happen at completion time from bookmarks gathered during
//! the walk, and every edit anchors to the original parse.

use serde::Deserialize;

use gradlint_core::{
    ApplyPlugin, DependencyDeclaration, Edit, NodeId, PluginDeclaration, Rule, RuleContext,
};
use gradlint_error::{Error, Result};

const PLUGINS_BLOCK: &str = "plugins_block";
const FIRST_PLUGIN: &str = "first_plugin";
const FIRST_APPLY: &str = "first_apply";
const LAST_APPLY: &str = "last_apply";
const BUILDSCRIPT: &str = "buildscript";
const BUILDSCRIPT_REPOSITORIES: &str = "buildscript_repositories";
const BUILDSCRIPT_DEPENDENCIES: &str = "buildscript_dependencies";
const FIRST_BUILDSCRIPT_DEPENDENCY: &str = "first_buildscript_dependency";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequiredPluginConfig {
    /// Plugin id that must be applied, e.g. `com.example.demo`.
    pub plugin_id: String,
    /// Version for the generated `plugins { }` declaration.
    #[serde(default)]
    pub plugin_version: Option<String>,
    /// Buildscript classpath coordinate the plugin ships in, as
    /// `group:name:version`.
    pub classpath: String,
    /// Optional configuration snippet appended after the application site.
    #[serde(default)]
    pub template: Option<String>,
}

impl RequiredPluginConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|err| {
            Error::config_invalid(err.to_string()).with_operation("required_plugin::from_toml")
        })
    }
}

pub struct RequiredPluginRule {
    config: RequiredPluginConfig,
    applied: bool,
    classpath_present: bool,
}

impl RequiredPluginRule {
    pub fn new(config: RequiredPluginConfig) -> Self {
        Self {
            config,
            applied: false,
            classpath_present: false,
        }
    }

    fn declaration_line(&self) -> String {
        match &self.config.plugin_version {
            Some(version) => format!("id '{}' version '{}'", self.config.plugin_id, version),
            None => format!("id '{}'", self.config.plugin_id),
        }
    }

    fn apply_line(&self) -> String {
        format!("apply plugin: '{}'", self.config.plugin_id)
    }

    /// Edits ensuring the buildscript classpath carries the plugin artifact.
    /// Empty when an equivalent module (any version) is already declared.
    fn plan_classpath(&self, ctx: &RuleContext<'_>) -> Vec<Edit> {
        if self.classpath_present {
            return Vec::new();
        }
        let tree = ctx.tree();
        let line = format!("classpath '{}'", self.config.classpath);
        if ctx.bookmark(BUILDSCRIPT).is_none() {
            tracing::debug!(
                classpath = %self.config.classpath,
                "no buildscript block; synthesizing one at the document start"
            );
            return vec![Edit::at_document_start(format!(
                "buildscript {{\n    dependencies {{\n        {line}\n    }}\n}}"
            ))];
        }
        if let Some(first) = ctx.bookmark(FIRST_BUILDSCRIPT_DEPENDENCY) {
            // a populated dependencies block; slot in above the first entry
            vec![Edit::before(tree.span(first), line)]
        } else if let Some(repos) = ctx.bookmark(BUILDSCRIPT_REPOSITORIES) {
            // dependencies sub-block missing or empty; a fresh one goes right
            // after the repositories sub-block
            vec![Edit::after(
                tree.span(repos),
                format!("dependencies {{\n    {line}\n}}"),
            )]
        } else {
            // no anchor to hang the dependency on; skip this step and let the
            // remaining edits still apply
            tracing::warn!(
                classpath = %self.config.classpath,
                "buildscript block has no repositories sub-block; skipping classpath insertion"
            );
            Vec::new()
        }
    }
}

impl Rule for RequiredPluginRule {
    fn name(&self) -> &'static str {
        "required-plugin"
    }

    fn visit_buildscript(&mut self, ctx: &mut RuleContext<'_>, node: NodeId) {
        ctx.bookmark_first(BUILDSCRIPT, node);
    }

    fn visit_repositories(&mut self, ctx: &mut RuleContext<'_>, node: NodeId) {
        if ctx.scope().in_buildscript {
            ctx.bookmark_first(BUILDSCRIPT_REPOSITORIES, node);
        }
    }

    fn visit_dependencies_block(&mut self, ctx: &mut RuleContext<'_>, node: NodeId) {
        if ctx.scope().in_buildscript {
            ctx.bookmark_first(BUILDSCRIPT_DEPENDENCIES, node);
        }
    }

    fn visit_plugins_block(&mut self, ctx: &mut RuleContext<'_>, node: NodeId) {
        if !ctx.scope().in_buildscript {
            ctx.bookmark_first(PLUGINS_BLOCK, node);
        }
    }

    fn visit_plugin(&mut self, ctx: &mut RuleContext<'_>, node: NodeId, plugin: &PluginDeclaration) {
        if ctx.scope().in_buildscript {
            return;
        }
        ctx.bookmark_first(FIRST_PLUGIN, node);
        if plugin.id == self.config.plugin_id {
            self.applied = true;
        }
    }

    fn visit_apply_plugin(&mut self, ctx: &mut RuleContext<'_>, node: NodeId, apply: &ApplyPlugin) {
        ctx.bookmark_first(FIRST_APPLY, node);
        ctx.bookmark_last(LAST_APPLY, node);
        if apply.plugin == self.config.plugin_id {
            self.applied = true;
        }
    }

    fn visit_dependency(
        &mut self,
        ctx: &mut RuleContext<'_>,
        node: NodeId,
        dependency: &DependencyDeclaration,
    ) {
        if !ctx.scope().in_buildscript {
            return;
        }
        ctx.bookmark_first(FIRST_BUILDSCRIPT_DEPENDENCY, node);
        if dependency.same_module(&self.config.classpath) {
            self.classpath_present = true;
        }
    }

    fn script_complete(&mut self, ctx: &mut RuleContext<'_>) {
        if self.applied {
            return;
        }
        let tree = ctx.tree();
        let message = format!("required plugin '{}' is not applied", self.config.plugin_id);
        let template = self.config.template.clone();

        // a plugins block with at least one declaration takes a new one at
        // its top; an empty block has no node to anchor on and falls through
        // to the synthesized-block strategy
        if let Some(block) = ctx.bookmark(PLUGINS_BLOCK)
            && let Some(first) = ctx.bookmark(FIRST_PLUGIN)
        {
            let violation = ctx.add_violation(message, Some(block));
            violation.fix(Edit::before(tree.span(first), self.declaration_line()));
            if let Some(template) = template {
                violation.fix(Edit::after(tree.span(block), template));
            }
            return;
        }

        // a script in the apply style gets another apply statement
        if let Some(first_apply) = ctx.bookmark(FIRST_APPLY) {
            let last_apply = ctx.bookmark(LAST_APPLY).unwrap_or(first_apply);
            let mut edits = self.plan_classpath(ctx);
            edits.push(Edit::before(tree.span(first_apply), self.apply_line()));
            if let Some(template) = template {
                edits.push(Edit::after(tree.span(last_apply), template));
            }
            let violation = ctx.add_violation(message, Some(first_apply));
            for edit in edits {
                violation.fix(edit);
            }
            return;
        }

        // neither syntax present; an undeclared tool version is assumed
        // modern enough for the plugins syntax
        let modern = ctx
            .tool_version()
            .is_none_or(|version| version.supports_plugins_dsl());
        let buildscript = ctx.bookmark(BUILDSCRIPT);
        if modern {
            let mut text = format!("plugins {{\n    {}\n}}", self.declaration_line());
            if let Some(template) = template {
                text.push('\n');
                text.push_str(&template);
            }
            let edit = match buildscript {
                Some(block) => Edit::after(tree.span(block), text),
                None => Edit::at_document_start(text),
            };
            ctx.add_violation(message, None).fix(edit);
        } else {
            let mut edits = self.plan_classpath(ctx);
            edits.push(match buildscript {
                Some(block) => Edit::after(tree.span(block), self.apply_line()),
                None => Edit::at_document_start(self.apply_line()),
            });
            if let Some(template) = template {
                edits.push(match buildscript {
                    Some(block) => Edit::after(tree.span(block), template),
                    None => Edit::at_document_start(template),
                });
            }
            let violation = ctx.add_violation(message, None);
            for edit in edits {
                violation.fix(edit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_toml() {
        let config = RequiredPluginConfig::from_toml(
            r#"
plugin_id = "com.example.demo"
plugin_version = "1.0"
classpath = "com.example:demo-plugin:1.0"
"#,
        )
        .unwrap();
        assert_eq!(config.plugin_id, "com.example.demo");
        assert_eq!(config.plugin_version.as_deref(), Some("1.0"));
        assert!(config.template.is_none());
    }

    #[test]
    fn test_config_rejects_missing_and_unknown_fields() {
        assert!(RequiredPluginConfig::from_toml("plugin_id = \"x\"").is_err());
        assert!(
            RequiredPluginConfig::from_toml(
                "plugin_id = \"x\"\nclasspath = \"g:n:1\"\nbogus = true"
            )
            .is_err()
        );
    }

    #[test]
    fn test_declaration_lines() {
        let rule = RequiredPluginRule::new(
            RequiredPluginConfig::from_toml(
                "plugin_id = \"com.example.demo\"\nclasspath = \"com.example:demo-plugin:1.0\"",
            )
            .unwrap(),
        );
        assert_eq!(rule.declaration_line(), "id 'com.example.demo'");
        assert_eq!(rule.apply_line(), "apply plugin: 'com.example.demo'");
    }
}
