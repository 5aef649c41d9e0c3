use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::events::{KeywordAttrs, LogAttrs, SuiteAttrs, TestAttrs};

/// One engine lifecycle notification, as a JSON Lines object on stdin.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    StartSuite {
        name: String,
        #[serde(default)]
        attrs: SuiteAttrs,
    },
    EndSuite {
        name: String,
        #[serde(default)]
        attrs: SuiteAttrs,
    },
    StartTest {
        name: String,
        #[serde(default)]
        attrs: TestAttrs,
    },
    EndTest {
        name: String,
        #[serde(default)]
        attrs: TestAttrs,
    },
    StartKeyword {
        name: String,
        #[serde(default)]
        attrs: KeywordAttrs,
    },
    EndKeyword {
        name: String,
        #[serde(default)]
        attrs: KeywordAttrs,
    },
    LogMessage {
        #[serde(default)]
        attrs: LogAttrs,
    },
    /// Current variable bindings, pushed by the engine side so they are
    /// available when a pause exports a snapshot.
    Variables {
        #[serde(default)]
        values: BTreeMap<String, Value>,
    },
    Close,
}

/// Render a wire value the way the snapshot expects: strings as-is,
/// everything else in its JSON spelling.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
