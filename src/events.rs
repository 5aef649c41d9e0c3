use serde::{Deserialize, Serialize};

/// Execution status as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
    #[serde(rename = "SKIP")]
    Skip,
    #[serde(rename = "NOT RUN")]
    #[serde(other)]
    NotRun,
}

impl Status {
    pub fn is_fail(self) -> bool {
        self == Status::Fail
    }
}

/// The closed set of keyword kinds the engine emits.
///
/// Control constructs are a fixed vocabulary; `Other` only absorbs wire
/// values a future engine version might add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeywordKind {
    #[default]
    #[serde(rename = "KEYWORD")]
    Keyword,
    #[serde(rename = "SETUP")]
    Setup,
    #[serde(rename = "TEARDOWN")]
    Teardown,
    #[serde(rename = "FOR")]
    For,
    #[serde(rename = "FOR ITERATION")]
    ForIteration,
    #[serde(rename = "WHILE")]
    While,
    #[serde(rename = "IF")]
    If,
    #[serde(rename = "ELSE IF")]
    ElseIf,
    #[serde(rename = "ELSE")]
    Else,
    #[serde(rename = "TRY")]
    Try,
    #[serde(rename = "EXCEPT")]
    Except,
    #[serde(rename = "FINALLY")]
    Finally,
    #[serde(rename = "OTHER")]
    #[serde(other)]
    Other,
}

/// Attributes delivered with suite start/end notifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteAttrs {
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub source: String,
}

/// Attributes delivered with test start/end notifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestAttrs {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub longname: String,
    #[serde(default)]
    pub starttime: String,
    #[serde(default)]
    pub endtime: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub lineno: u32,
}

/// Attributes delivered with keyword start/end notifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordAttrs {
    #[serde(rename = "type", default)]
    pub kind: KeywordKind,
    #[serde(default)]
    pub kwname: String,
    #[serde(default)]
    pub libname: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub lineno: u32,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub message: String,
}

impl KeywordAttrs {
    /// The name the engine displays, falling back to the full name.
    pub fn display_name<'a>(&'a self, name: &'a str) -> &'a str {
        if self.kwname.is_empty() {
            name
        } else {
            &self.kwname
        }
    }
}

/// Attributes delivered with log-message notifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogAttrs {
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub message: String,
}
