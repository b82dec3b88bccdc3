//! End-to-end parses of realistic build scripts, checked through the lint
//! visitor so parser and recognizer are exercised together.

use gradlint_core::{
    ApplyPlugin, ConfigurationExclude, DependencyDeclaration, ExtensionProperty, LintOptions,
    NodeId, PluginDeclaration, Rule, RuleContext, TaskDeclaration, run_rule,
    visit::StructuralVisitor,
};
use pretty_assertions::assert_eq;

/// Records every normalized callback as one line of text.
#[derive(Default)]
struct Trace {
    events: Vec<String>,
}

impl Rule for Trace {
    fn name(&self) -> &'static str {
        "trace"
    }

    fn visit_buildscript(&mut self, _ctx: &mut RuleContext<'_>, _node: NodeId) {
        self.events.push("buildscript".into());
    }

    fn visit_repositories(&mut self, _ctx: &mut RuleContext<'_>, _node: NodeId) {
        self.events.push("repositories".into());
    }

    fn visit_dependencies_block(&mut self, _ctx: &mut RuleContext<'_>, _node: NodeId) {
        self.events.push("dependencies".into());
    }

    fn visit_plugins_block(&mut self, _ctx: &mut RuleContext<'_>, _node: NodeId) {
        self.events.push("plugins".into());
    }

    fn visit_apply_plugin(&mut self, _ctx: &mut RuleContext<'_>, _node: NodeId, apply: &ApplyPlugin) {
        self.events.push(format!("apply {}", apply.plugin));
    }

    fn visit_plugin(&mut self, _ctx: &mut RuleContext<'_>, _node: NodeId, plugin: &PluginDeclaration) {
        match &plugin.version {
            Some(version) => self.events.push(format!("plugin {} {}", plugin.id, version)),
            None => self.events.push(format!("plugin {}", plugin.id)),
        }
    }

    fn visit_dependency(
        &mut self,
        _ctx: &mut RuleContext<'_>,
        _node: NodeId,
        dependency: &DependencyDeclaration,
    ) {
        self.events.push(format!(
            "dep {} {}:{}:{}",
            dependency.configuration,
            dependency.group.as_deref().unwrap_or("?"),
            dependency.name.as_deref().unwrap_or("?"),
            dependency.version.as_deref().unwrap_or("?"),
        ));
    }

    fn visit_task(&mut self, _ctx: &mut RuleContext<'_>, _node: NodeId, task: &TaskDeclaration) {
        self.events
            .push(format!("task {}", task.name.as_deref().unwrap_or("?")));
    }

    fn visit_configuration_exclude(
        &mut self,
        _ctx: &mut RuleContext<'_>,
        _node: NodeId,
        exclude: &ConfigurationExclude,
    ) {
        self.events.push(format!(
            "exclude {} {}",
            exclude.configuration,
            exclude.module.as_deref().unwrap_or("?")
        ));
    }

    fn visit_extension_property(
        &mut self,
        _ctx: &mut RuleContext<'_>,
        _node: NodeId,
        property: &ExtensionProperty,
    ) {
        self.events
            .push(format!("prop {}.{}", property.prefix.join("."), property.name));
    }
}

fn trace(source: &str) -> Vec<String> {
    let tree = gradlint_groovy::parse(source).unwrap();
    let options = LintOptions::default();
    let mut rule = Trace::default();
    let mut ctx = RuleContext::new(&tree, "trace", None);
    StructuralVisitor::new(&tree, &options).walk(&mut rule, &mut ctx);
    rule.events
}

#[test]
fn test_full_script_event_stream() {
    let source = textwrap::dedent(
        r#"
        buildscript {
            repositories {
                mavenCentral()
            }
            dependencies {
                classpath 'com.example:build-tools:2.0'
            }
        }

        apply plugin: 'java'
        apply plugin: 'groovy'

        dependencies {
            compile 'org.springframework:spring-core:4.3.9.RELEASE'
            testCompile group: 'junit', name: 'junit', version: '4.12'
        }

        task integrationTest(type: Test) {
            description 'runs the slow tests'
        }
        "#,
    );
    assert_eq!(
        trace(&source),
        vec![
            "buildscript",
            "repositories",
            "dependencies",
            "dep classpath com.example:build-tools:2.0",
            "apply java",
            "apply groovy",
            "dependencies",
            "dep compile org.springframework:spring-core:4.3.9.RELEASE",
            "dep testCompile junit:junit:4.12",
            "task integrationTest",
        ]
    );
}

#[test]
fn test_plugins_dsl_script() {
    let source = r#"
plugins {
    id 'java'
    id 'com.example.demo' version '3.1.0'
}

group = 'com.example'
"#;
    assert_eq!(
        trace(source),
        vec!["plugins", "plugin java", "plugin com.example.demo 3.1.0"]
    );
}

#[test]
fn test_configuration_excludes_and_properties() {
    let source = r#"
configurations {
    compile.exclude group: 'commons-logging', module: 'commons-logging'
    all.exclude module: 'log4j'
}

ext {
    springVersion = '4.3.9.RELEASE'
}

someExt.someProp = 'value'
"#;
    assert_eq!(
        trace(source),
        vec![
            "exclude compile commons-logging",
            "exclude all log4j",
            "prop ext.springVersion",
            "prop someExt.someProp",
        ]
    );
}

#[test]
fn test_unresolvable_dependency_is_skipped_quietly() {
    let source = "dependencies {\n    compile deps.spring\n}\n";
    assert_eq!(trace(source), vec!["dependencies"]);
}

#[test]
fn test_run_rule_entry_point() {
    struct NoJunit;
    impl Rule for NoJunit {
        fn name(&self) -> &'static str {
            "no-junit"
        }
        fn visit_dependency(
            &mut self,
            ctx: &mut RuleContext<'_>,
            node: NodeId,
            dependency: &DependencyDeclaration,
        ) {
            if dependency.group.as_deref() == Some("junit") {
                ctx.add_violation("prefer the JUnit 5 artifacts", Some(node));
            }
        }
    }

    let source = "dependencies {\n    testCompile 'junit:junit:4.12'\n}\n";
    let tree = gradlint_groovy::parse(source).unwrap();
    let violations = run_rule(&tree, &mut NoJunit, &LintOptions::default());
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].to_string(), "2:5 [no-junit] prefer the JUnit 5 artifacts");
}

#[test]
fn test_suppression_region() {
    struct NoJunit;
    impl Rule for NoJunit {
        fn name(&self) -> &'static str {
            "no-junit"
        }
        fn visit_dependency(
            &mut self,
            ctx: &mut RuleContext<'_>,
            node: NodeId,
            dependency: &DependencyDeclaration,
        ) {
            if dependency.group.as_deref() == Some("junit") {
                ctx.add_violation("prefer the JUnit 5 artifacts", Some(node));
            }
        }
    }

    let source = "gradleLint.ignore('no-junit') {\n    dependencies {\n        testCompile 'junit:junit:4.12'\n    }\n}\n";
    let tree = gradlint_groovy::parse(source).unwrap();
    let violations = run_rule(&tree, &mut NoJunit, &LintOptions::default());
    assert!(violations.is_empty());

    // an unrelated name does not suppress
    let source = "gradleLint.ignore('other-rule') {\n    dependencies {\n        testCompile 'junit:junit:4.12'\n    }\n}\n";
    let tree = gradlint_groovy::parse(source).unwrap();
    let violations = run_rule(&tree, &mut NoJunit, &LintOptions::default());
    assert_eq!(violations.len(), 1);

    // a bare ignore() with no names suppresses every rule
    let source = "gradleLint.ignore {\n    dependencies {\n        testCompile 'junit:junit:4.12'\n    }\n}\n";
    let tree = gradlint_groovy::parse(source).unwrap();
    let violations = run_rule(&tree, &mut NoJunit, &LintOptions::default());
    assert!(violations.is_empty());
}
