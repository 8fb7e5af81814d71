//! Configuration surface: "named setting with default" lookups.
//!
//! Settings are addressed by slash-separated paths such as
//! `anonymous-authentication/anonymous-user`. Every source answers the same
//! question ("is this path defined, and to what?"), so sources can be stacked
//! with [`LayeredSettings`].

use std::collections::HashMap;

use serde_json::Value as JsonValue;

use crate::error::{CoreError, CoreResult};

/// A source of named settings.
pub trait SystemSettings: Send + Sync {
    /// Look up a setting by path. `None` means "not defined here".
    fn system_setting(&self, path: &str) -> Option<String>;

    /// Look up a setting, falling back to `default` when it is not defined.
    fn system_setting_or(&self, path: &str, default: &str) -> String {
        self.system_setting(path)
            .unwrap_or_else(|| default.to_string())
    }
}

impl<S: SystemSettings + ?Sized> SystemSettings for std::sync::Arc<S> {
    fn system_setting(&self, path: &str) -> Option<String> {
        (**self).system_setting(path)
    }
}

/// In-memory settings.
///
/// An empty `MapSettings` behaves like "no settings service": every lookup
/// falls back to its default.
#[derive(Debug, Clone, Default)]
pub struct MapSettings {
    values: HashMap<String, String>,
}

impl MapSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(path.into(), value.into());
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<String>) {
        self.values.insert(path.into(), value.into());
    }
}

impl SystemSettings for MapSettings {
    fn system_setting(&self, path: &str) -> Option<String> {
        self.values.get(path).cloned()
    }
}

/// Settings read from process environment variables.
///
/// A path maps to `PREFIX_SEGMENT_SEGMENT`: segments are upper-cased and every
/// `/`, `-` or `.` becomes `_`. With prefix `RUNAS`,
/// `anonymous-authentication/anonymous-user` is read from
/// `RUNAS_ANONYMOUS_AUTHENTICATION_ANONYMOUS_USER`.
#[derive(Debug, Clone)]
pub struct EnvSettings {
    prefix: String,
    source: fn(&str) -> Option<String>,
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

impl EnvSettings {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_source(prefix, process_env)
    }

    /// Read variables through `source` instead of the process environment.
    pub fn with_source(prefix: impl Into<String>, source: fn(&str) -> Option<String>) -> Self {
        Self {
            prefix: prefix.into(),
            source,
        }
    }

    pub fn var_name(&self, path: &str) -> String {
        let body: String = path
            .chars()
            .map(|c| match c {
                '/' | '-' | '.' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();

        if self.prefix.is_empty() {
            body
        } else {
            format!("{}_{}", self.prefix, body)
        }
    }
}

impl Default for EnvSettings {
    fn default() -> Self {
        Self::new("RUNAS")
    }
}

impl SystemSettings for EnvSettings {
    fn system_setting(&self, path: &str) -> Option<String> {
        (self.source)(&self.var_name(path))
    }
}

/// Settings backed by a JSON document.
///
/// Path segments walk nested objects; leaves may be strings, numbers or
/// booleans. `null`, arrays and objects at the leaf are treated as undefined.
#[derive(Debug, Clone)]
pub struct JsonSettings {
    root: JsonValue,
}

impl JsonSettings {
    pub fn from_value(root: JsonValue) -> CoreResult<Self> {
        if !root.is_object() {
            return Err(CoreError::settings_source(
                "settings document must be a JSON object",
            ));
        }
        Ok(Self { root })
    }

    pub fn from_json_str(raw: &str) -> CoreResult<Self> {
        let root: JsonValue = serde_json::from_str(raw)
            .map_err(|e| CoreError::settings_source(format!("invalid settings JSON: {e}")))?;
        Self::from_value(root)
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CoreError::settings_source(format!("cannot read {}: {e}", path.display()))
        })?;
        tracing::debug!(file = %path.display(), "loaded settings document");
        Self::from_json_str(&raw)
    }
}

impl SystemSettings for JsonSettings {
    fn system_setting(&self, path: &str) -> Option<String> {
        let mut node = &self.root;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            node = node.get(segment)?;
        }

        match node {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            JsonValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Stack of settings sources; the first source defining a path wins.
#[derive(Default)]
pub struct LayeredSettings {
    layers: Vec<Box<dyn SystemSettings>>,
}

impl LayeredSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a lower-priority layer.
    pub fn layer(mut self, source: impl SystemSettings + 'static) -> Self {
        self.layers.push(Box::new(source));
        self
    }
}

impl core::fmt::Debug for LayeredSettings {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayeredSettings")
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl SystemSettings for LayeredSettings {
    fn system_setting(&self, path: &str) -> Option<String> {
        self.layers.iter().find_map(|l| l.system_setting(path))
    }
}
