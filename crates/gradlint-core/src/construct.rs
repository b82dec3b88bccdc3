//! Normalized construct payloads emitted by the structural visitor.
//!
//! The visitor recognizes these regardless of which surface syntax expressed
//! them; rules only ever see the normalized form.

use std::sync::OnceLock;

use regex::Regex;
use strum_macros::{Display, EnumIter, IntoStaticStr};

use crate::ir::Literal;

/// The vocabulary of constructs the visitor recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ConstructKind {
    BuildscriptBlock,
    RepositoriesBlock,
    DependenciesBlock,
    PluginsBlock,
    ApplyPluginStatement,
    PluginDeclaration,
    DependencyDeclaration,
    TaskDeclaration,
    ConfigurationExclude,
    ExtensionProperty,
}

/// `apply plugin: 'java'` normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyPlugin {
    pub plugin: String,
}

/// A declaration inside a `plugins { }` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDeclaration {
    pub id: String,
    pub version: Option<String>,
}

/// A dependency declaration, parsed from either the structured named-argument
/// form or a single `group:name:version:classifier@ext` string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DependencyDeclaration {
    pub configuration: String,
    pub group: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub classifier: Option<String>,
    pub extension: Option<String>,
}

fn notation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // group:name:version:classifier@ext, every segment optional except name
        Regex::new(r"^(?:([^:@\s]*):)?([^:@\s]+)(?::([^:@\s]*))?(?::([^:@\s]+))?(?:@([^:@\s]+))?$")
            .unwrap()
    })
}

fn non_empty(m: Option<regex::Match<'_>>) -> Option<String> {
    m.map(|m| m.as_str()).filter(|s| !s.is_empty()).map(String::from)
}

impl DependencyDeclaration {
    /// Parse the colon-delimited coordinate notation. Returns `None` when the
    /// string does not look like a coordinate at all.
    pub fn parse_notation(configuration: &str, notation: &str) -> Option<Self> {
        let caps = notation_regex().captures(notation.trim())?;
        Some(Self {
            configuration: configuration.to_string(),
            group: non_empty(caps.get(1)),
            name: non_empty(caps.get(2)),
            version: non_empty(caps.get(3)),
            classifier: non_empty(caps.get(4)),
            extension: non_empty(caps.get(5)),
        })
    }

    /// True when this declaration names the same module as `coordinate`
    /// (`group:name[:version...]`), ignoring version and classifier.
    pub fn same_module(&self, coordinate: &str) -> bool {
        let Some(other) = DependencyDeclaration::parse_notation("", coordinate) else {
            return false;
        };
        self.group == other.group && self.name == other.name && self.name.is_some()
    }
}

/// A `task` declaration in whichever argument shape it used; `args` keeps the
/// named-argument entries as `(key, value-node)` pairs for rules that care.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDeclaration {
    pub name: Option<String>,
    pub args: Vec<(String, crate::span::NodeId)>,
}

/// `<configuration>.exclude group: '...', module: '...'` inside a
/// `configurations { }` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationExclude {
    pub configuration: String,
    pub group: Option<String>,
    pub module: Option<String>,
}

/// An extension-property write, either `name = value` inside a named closure
/// or dotted `a.b.c = value` at top level. `value` is captured only for
/// literal constants.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionProperty {
    /// Enclosing closure names plus any path segments before the final name.
    pub prefix: Vec<String>,
    pub name: String,
    pub value: Option<Literal>,
}

/// The default configuration set used when no live project model supplies
/// the real configuration names.
pub const DEFAULT_CONFIGURATIONS: &[&str] = &[
    "archives",
    "default",
    "compile",
    "runtime",
    "testCompile",
    "testRuntime",
];
