//! Plugin resolution
//!
//! Configured plugin names resolve against an explicit registry populated at
//! startup, one table per role. This keeps the late-binding-by-name
//! ergonomics of the config file without any runtime reflection: a dotted
//! name `a.b.c` addresses namespace `a.b` and implementation `C` (the
//! capitalized leaf segment), and built-ins register in the root namespace.
//!
//! Resolution failure is fatal by design. A half-assembled pipeline has
//! undefined data-flow semantics, so an unknown name or a name registered
//! under a different role aborts assembly.

use crate::error::{Error, Result};
use crate::plugin::{PluginConfig, Sink, Source, Transform};
use std::collections::HashMap;
use std::fmt;

type SourceCtor = Box<dyn Fn(PluginConfig) -> Result<Box<dyn Source>>>;
type TransformCtor = Box<dyn Fn(PluginConfig) -> Result<Box<dyn Transform>>>;
type SinkCtor = Box<dyn Fn(PluginConfig) -> Result<Box<dyn Sink>>>;

/// A plugin name split into its namespace path and capitalized identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PluginName {
    pub namespace: String,
    pub ident: String,
}

impl PluginName {
    /// Parse a configured name: everything before the last `.` is the
    /// namespace (empty for bare names), and the final segment capitalizes
    /// into the implementation identifier.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (namespace, leaf) = match raw.rsplit_once('.') {
            Some((namespace, leaf)) => (namespace, leaf),
            None => ("", raw),
        };
        Self {
            namespace: namespace.to_string(),
            ident: capitalize(leaf),
        }
    }
}

impl fmt::Display for PluginName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.ident)
        } else {
            write!(f, "{}.{}", self.namespace, self.ident)
        }
    }
}

/// Uppercase the first character, lowercase the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Maps plugin names to constructors, one table per role.
#[derive(Default)]
pub struct Registry {
    sources: HashMap<PluginName, SourceCtor>,
    transforms: HashMap<PluginName, TransformCtor>,
    sinks: HashMap<PluginName, SinkCtor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with every built-in plugin.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        crate::plugins::register_builtins(&mut registry);
        registry
    }

    pub fn register_source<F>(&mut self, name: &str, ctor: F)
    where
        F: Fn(PluginConfig) -> Result<Box<dyn Source>> + 'static,
    {
        self.sources.insert(PluginName::parse(name), Box::new(ctor));
    }

    pub fn register_transform<F>(&mut self, name: &str, ctor: F)
    where
        F: Fn(PluginConfig) -> Result<Box<dyn Transform>> + 'static,
    {
        self.transforms.insert(PluginName::parse(name), Box::new(ctor));
    }

    pub fn register_sink<F>(&mut self, name: &str, ctor: F)
    where
        F: Fn(PluginConfig) -> Result<Box<dyn Sink>> + 'static,
    {
        self.sinks.insert(PluginName::parse(name), Box::new(ctor));
    }

    /// Resolve and instantiate a source plugin.
    pub fn resolve_source(&self, name: &str, config: PluginConfig) -> Result<Box<dyn Source>> {
        let parsed = PluginName::parse(name);
        let ctor = self
            .sources
            .get(&parsed)
            .ok_or_else(|| self.not_found("source", name, &parsed))?;
        ctor(config)
    }

    /// Resolve and instantiate a transform plugin.
    pub fn resolve_transform(&self, name: &str, config: PluginConfig) -> Result<Box<dyn Transform>> {
        let parsed = PluginName::parse(name);
        let ctor = self
            .transforms
            .get(&parsed)
            .ok_or_else(|| self.not_found("transform", name, &parsed))?;
        ctor(config)
    }

    /// Resolve and instantiate a sink plugin.
    pub fn resolve_sink(&self, name: &str, config: PluginConfig) -> Result<Box<dyn Sink>> {
        let parsed = PluginName::parse(name);
        let ctor = self
            .sinks
            .get(&parsed)
            .ok_or_else(|| self.not_found("sink", name, &parsed))?;
        ctor(config)
    }

    /// Distinguish "unknown name" from "known name, wrong role" in the
    /// fatal error message.
    fn not_found(&self, role: &str, raw: &str, parsed: &PluginName) -> Error {
        let other_role = self.sources.contains_key(parsed)
            || self.transforms.contains_key(parsed)
            || self.sinks.contains_key(parsed);
        if other_role {
            Error::Resolve(format!(
                "plugin '{}' ({}) does not provide the {} capability",
                raw, parsed, role
            ))
        } else {
            Error::Resolve(format!("no {} plugin registered for '{}' ({})", role, raw, parsed))
        }
    }
}
