use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::error::DebugError;

/// Values longer than this are truncated in the snapshot to bound file size.
pub const VALUE_TRUNCATE_LEN: usize = 500;

/// The engine's currently visible variable bindings, as display strings.
pub trait VariableSource {
    fn variables(&self) -> Result<BTreeMap<String, String>, DebugError>;
}

/// A `VariableSource` fed externally, e.g. by the wire adapter.
#[derive(Debug, Clone, Default)]
pub struct StoredVariables {
    inner: Arc<Mutex<BTreeMap<String, String>>>,
}

impl StoredVariables {
    pub fn replace(&self, values: BTreeMap<String, String>) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = values;
        }
    }
}

impl VariableSource for StoredVariables {
    fn variables(&self) -> Result<BTreeMap<String, String>, DebugError> {
        self.inner
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| DebugError::Variables("variable store lock poisoned".to_string()))
    }
}

/// Variables grouped by scope, as written to the snapshot file.
///
/// Scope is decided by the engine's name-prefix convention: `${TEST...}` is
/// test-scoped, `${SUITE...}` suite-scoped, any other `$`/`@`/`&` name is a
/// local, and bare names are globals.
#[derive(Debug, Default, Serialize)]
pub struct VariableSnapshot {
    pub test: BTreeMap<String, String>,
    pub suite: BTreeMap<String, String>,
    pub global: BTreeMap<String, String>,
    pub local: BTreeMap<String, String>,
}

impl VariableSnapshot {
    pub fn classify(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut snapshot = Self::default();
        for (name, value) in vars {
            let value = truncate_chars(&value, VALUE_TRUNCATE_LEN);
            let scope = if name.starts_with("${TEST") {
                &mut snapshot.test
            } else if name.starts_with("${SUITE") {
                &mut snapshot.suite
            } else if name.starts_with(['$', '@', '&']) {
                &mut snapshot.local
            } else {
                &mut snapshot.global
            };
            scope.insert(name, value);
        }
        snapshot
    }

    pub fn count(&self) -> usize {
        self.test.len() + self.suite.len() + self.global.len() + self.local.len()
    }
}

/// Query the source and write the full snapshot as one whole-file JSON
/// overwrite. Returns the number of variables exported.
pub fn export_snapshot(path: &Path, source: &dyn VariableSource) -> Result<usize, DebugError> {
    let vars = source.variables()?;
    let snapshot = VariableSnapshot::classify(vars);
    let count = snapshot.count();

    let json =
        serde_json::to_string_pretty(&snapshot).map_err(|e| DebugError::json(path, e))?;

    // Write-then-rename so the controller never observes a torn file.
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json).map_err(|e| DebugError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| DebugError::io(path, e))?;

    Ok(count)
}

/// Char-boundary-safe truncation with a `...` marker.
pub(crate) fn truncate_chars(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let kept: String = value.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
