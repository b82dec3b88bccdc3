//! Entry points: run a rule over a parsed script and apply the fixes.

use crate::construct::DEFAULT_CONFIGURATIONS;
use crate::context::RuleContext;
use crate::ir::ScriptTree;
use crate::model::ProjectModel;
use crate::patch;
use crate::rule::Rule;
use crate::version::GradleVersion;
use crate::violation::{Edit, Violation};
use crate::visit::StructuralVisitor;

/// Caller-supplied knobs for a lint run. The defaults are enough for linting
/// a script in isolation; a live [`ProjectModel`] and a tool version unlock
/// expression evaluation and version-gated remediation.
pub struct LintOptions<'a> {
    /// The build tool version the script targets, when known.
    pub tool_version: Option<GradleVersion>,
    /// Optional evaluator for non-literal expressions.
    pub model: Option<&'a dyn ProjectModel>,
    /// Receiver names whose `ignore(...)` calls open suppression regions.
    pub suppression_receivers: Vec<String>,
    /// Configuration names recognized as dependency declarations when no
    /// model supplies the real set.
    pub configurations: Vec<String>,
}

impl Default for LintOptions<'_> {
    fn default() -> Self {
        Self {
            tool_version: None,
            model: None,
            suppression_receivers: vec!["gradleLint".to_string()],
            configurations: DEFAULT_CONFIGURATIONS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl<'a> LintOptions<'a> {
    pub fn with_tool_version(mut self, version: GradleVersion) -> Self {
        self.tool_version = Some(version);
        self
    }

    pub fn with_model(mut self, model: &'a dyn ProjectModel) -> Self {
        self.model = Some(model);
        self
    }

    /// The configuration vocabulary for this run: the model's real names when
    /// a model is attached and reports any, the configured set otherwise.
    pub(crate) fn effective_configurations(&self) -> Vec<String> {
        if let Some(model) = self.model {
            let names = model.configuration_names();
            if !names.is_empty() {
                return names;
            }
        }
        self.configurations.clone()
    }
}

/// Run one rule over one parsed script: a single traversal, then the rule's
/// completion pass, yielding the surfaced (non-suppressed) violations.
pub fn run_rule(
    tree: &ScriptTree,
    rule: &mut dyn Rule,
    options: &LintOptions<'_>,
) -> Vec<Violation> {
    let name = rule.name();
    tracing::debug!(rule = name, nodes = tree.len(), "starting lint traversal");
    let mut ctx = RuleContext::new(tree, name, options.tool_version);
    StructuralVisitor::new(tree, options).walk(rule, &mut ctx);
    let violations = ctx.finish();
    tracing::debug!(rule = name, count = violations.len(), "lint traversal finished");
    violations
}

/// Gather every edit attached to the given violations and apply them to the
/// original source in one pass.
pub fn apply_fixes(source: &str, violations: &[Violation]) -> String {
    let edits: Vec<Edit> = violations
        .iter()
        .flat_map(|violation| violation.edits.iter().cloned())
        .collect();
    patch::apply_edits(source, &edits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = LintOptions::default();
        assert_eq!(options.suppression_receivers, vec!["gradleLint"]);
        assert!(options.configurations.iter().any(|c| c == "compile"));
        assert!(options.tool_version.is_none());
    }

    #[test]
    fn test_model_configurations_take_precedence() {
        use crate::model::{ProjectModel, Value};
        use gradlint_error::{Error, Result};

        struct Model;
        impl ProjectModel for Model {
            fn configuration_names(&self) -> Vec<String> {
                vec!["implementation".into(), "api".into()]
            }
            fn evaluate(&self, expression: &str) -> Result<Value> {
                Err(Error::eval_failed(format!("cannot evaluate '{expression}'")))
            }
        }

        let model = Model;
        let options = LintOptions::default().with_model(&model);
        assert_eq!(
            options.effective_configurations(),
            vec!["implementation".to_string(), "api".to_string()]
        );
    }
}
