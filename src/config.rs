//! Layered configuration store
//!
//! Sections are flat string maps: `main` and `plugins` always exist, plus
//! one section per configured plugin instance. Lookups fall back to a static
//! default table when a key is absent from its section.
//!
//! The store is built once at startup and read-mostly afterwards; the only
//! later mutation is the per-plugin `loglevel` key the orchestrator injects
//! during assembly.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// Static fallback defaults, consulted when a key is absent from its section.
const DEFAULTS: &[(&str, &str, &str)] = &[
    ("main", "logfile", "/var/log/flowpipe/flowpipe.log"),
    ("main", "loglevel", "info"),
    ("plugins", "input", "fileread"),
    ("plugins", "decode", "noop"),
    ("plugins", "output", "print"),
];

/// Section-structured key/value configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl ConfigStore {
    /// Load a store from a config file.
    ///
    /// An absent path, or a file that cannot be read, yields an empty store
    /// seeded with the `main` and `plugins` sections. The unreadable-file
    /// case is deliberately not fatal; it matches long-standing behavior
    /// that existing deployments rely on.
    pub fn load(path: Option<&Path>) -> Self {
        let mut store = match path {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(text) => Self::parse(&text),
                Err(e) => {
                    warn!("Could not read config file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            None => Self::default(),
        };
        store.ensure_section("main");
        store.ensure_section("plugins");
        store
    }

    /// Parse section-delimited `key=value` text.
    ///
    /// `[name]` opens a section; keys seen before any header land in `main`.
    /// Blank lines and lines starting with `#` or `;` are skipped.
    fn parse(text: &str) -> Self {
        let mut store = Self::default();
        let mut current = "main".to_string();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current = name.trim().to_string();
                store.ensure_section(&current);
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                store.set(&current, key.trim(), value.trim());
            }
        }
        store
    }

    /// Apply startup overrides of the form `section.key=value` or
    /// `key=value` (section defaults to `main`), last write wins.
    ///
    /// Malformed entries (no `=`, or an empty key after the last `.`) are
    /// silently dropped.
    pub fn apply_overrides<S: AsRef<str>>(&mut self, overrides: &[S]) {
        for opt in overrides {
            let Some((key, value)) = opt.as_ref().split_once('=') else {
                continue;
            };
            let (section, key) = match key.rsplit_once('.') {
                Some((section, key)) => {
                    let section = if section.is_empty() { "main" } else { section };
                    (section, key)
                }
                None => ("main", key),
            };
            if key.is_empty() {
                continue;
            }
            self.set(section, key, value);
        }
    }

    /// Look up a key, falling back to the static default table.
    pub fn get(&self, section: &str, key: &str) -> Result<&str> {
        if let Some(value) = self.sections.get(section).and_then(|s| s.get(key)) {
            return Ok(value.as_str());
        }
        DEFAULTS
            .iter()
            .find(|(s, k, _)| *s == section && *k == key)
            .map(|(_, _, v)| *v)
            .ok_or_else(|| Error::Config(format!("no value for {}.{}", section, key)))
    }

    /// Set a key, creating the section if needed.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// Create an empty section if it does not exist yet.
    pub fn ensure_section(&mut self, name: &str) {
        self.sections.entry(name.to_string()).or_default();
    }

    /// Snapshot of a section's keys, empty if the section is absent.
    pub fn section(&self, name: &str) -> BTreeMap<String, String> {
        self.sections.get(name).cloned().unwrap_or_default()
    }
}
