//! The configuration descriptor handed to the build-file generator.
//!
//! Resolvers each produce a [`Fragment`]; the assembler folds them into one
//! [`ConfigDescriptor`]. A variable key may be written once per run. A second
//! write is a bug in the resolver, so it panics rather than returning an
//! error.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

/// A scalar descriptor value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Int(i64),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::Int(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

/// Booleans are rendered as the strings the generator expects.
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Str(if b { "true" } else { "false" }.to_string())
    }
}

/// Output of a single resolver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub variables: BTreeMap<String, Value>,
    pub include_dirs: Vec<String>,
    pub libraries: Vec<String>,
    pub defines: BTreeSet<String>,
}

impl Fragment {
    pub fn new() -> Self {
        Fragment::default()
    }

    /// Set a variable.
    ///
    /// # Panics
    ///
    /// Panics if `key` was already set in this fragment.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let previous = self.variables.insert(key.to_string(), value.into());
        assert!(
            previous.is_none(),
            "descriptor variable `{}` written twice",
            key
        );
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }

    pub fn include_dir(&mut self, dir: impl Into<String>) {
        self.include_dirs.push(dir.into());
    }

    pub fn library(&mut self, flag: impl Into<String>) {
        self.libraries.push(flag.into());
    }

    pub fn define(&mut self, name: impl Into<String>) {
        self.defines.insert(name.into());
    }
}

/// The merged descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigDescriptor {
    pub variables: BTreeMap<String, Value>,
    pub include_dirs: Vec<String>,
    pub libraries: Vec<String>,
    pub defines: BTreeSet<String>,
}

impl ConfigDescriptor {
    /// Append a fragment.
    ///
    /// Include directories already present are not repeated, so an earlier
    /// entry can never be shadowed by a later duplicate. Library flags keep
    /// their order.
    ///
    /// # Panics
    ///
    /// Panics if the fragment sets a variable that is already present.
    pub fn merge(&mut self, fragment: Fragment) {
        for (key, value) in fragment.variables {
            assert!(
                !self.variables.contains_key(&key),
                "descriptor variable `{}` written by two resolvers",
                key
            );
            self.variables.insert(key, value);
        }

        for dir in fragment.include_dirs {
            if !self.include_dirs.contains(&dir) {
                self.include_dirs.push(dir);
            }
        }

        self.libraries.extend(fragment.libraries);
        self.defines.extend(fragment.defines);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }

    /// Look up a variable rendered as a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Serialize as pretty JSON with a trailing newline.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }
}

/// ICU sidecar consumed by the ICU generator file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IcuConfig {
    pub variables: BTreeMap<String, serde_json::Value>,
}

impl IcuConfig {
    pub fn new() -> Self {
        IcuConfig::default()
    }

    /// Mark that the pre-bundled small ICU is in use.
    pub fn set_small_canned(&mut self) {
        self.variables
            .insert("icu_small_canned".to_string(), serde_json::Value::from(1));
    }

    pub fn is_small_canned(&self) -> bool {
        self.variables.contains_key("icu_small_canned")
    }

    /// Record the source file list for one ICU module.
    pub fn set_sources(&mut self, module: &str, files: Vec<String>) {
        self.variables.insert(
            format!("icu_src_{}", module),
            serde_json::Value::from(files),
        );
    }

    pub fn sources(&self, module: &str) -> Option<Vec<&str>> {
        self.variables
            .get(&format!("icu_src_{}", module))?
            .as_array()
            .map(|files| files.iter().filter_map(|f| f.as_str()).collect())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }
}
