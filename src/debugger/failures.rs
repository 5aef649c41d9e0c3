use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::debugger::stack::{CallStack, KeywordFrame};
use crate::error::DebugError;
use crate::events::{KeywordAttrs, Status, TestAttrs};

/// Schema version of the run-end report.
pub const REPORT_VERSION: u32 = 2;

/// Flat summary of one failing keyword, deepest last within a test.
#[derive(Debug, Clone, Serialize)]
pub struct FailedKeyword {
    pub name: String,
    pub kwname: String,
    pub libname: String,
    pub source: String,
    pub lineno: u32,
    pub status: Status,
    pub message: String,
    pub args: Vec<String>,
    #[serde(rename = "type")]
    pub kind: crate::events::KeywordKind,
}

/// The innermost frame of a captured stack, marked as the failure point.
#[derive(Debug, Clone, Serialize)]
pub struct FailurePoint {
    #[serde(flatten)]
    pub frame: KeywordFrame,
    pub is_failure_point: bool,
    pub message: String,
    pub status: Status,
}

/// A call-stack entry: a plain frame, or the marked failure point (last).
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StackEntry {
    Frame(KeywordFrame),
    Failure(FailurePoint),
}

impl StackEntry {
    pub fn is_failure_point(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn frame(&self) -> &KeywordFrame {
        match self {
            Self::Frame(frame) => frame,
            Self::Failure(point) => &point.frame,
        }
    }
}

/// Per-test record stored in the run-end report.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub name: String,
    pub status: Status,
    pub message: String,
    pub longname: String,
    pub starttime: String,
    pub endtime: String,
    pub source: String,
    pub lineno: u32,
    pub failed_keywords: Vec<FailedKeyword>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    version: u32,
    test_results: &'a BTreeMap<String, TestResult>,
    call_stacks: &'a BTreeMap<String, Vec<StackEntry>>,
}

/// Captures every keyword failure with the full call path active at that
/// moment, independent of pausing, and writes the run-end report.
///
/// Stacks are keyed `{test}_{seq}` with a monotonically increasing sequence
/// so repeated failures inside one test (e.g. a failing loop body) do not
/// overwrite each other.
#[derive(Debug)]
pub struct FailureRecorder {
    output_file: PathBuf,
    current_test: Option<String>,
    last_fail_message: Option<String>,
    failed_keywords: Vec<FailedKeyword>,
    test_results: BTreeMap<String, TestResult>,
    call_stacks: BTreeMap<String, Vec<StackEntry>>,
}

impl FailureRecorder {
    pub fn new(output_file: PathBuf) -> Self {
        Self {
            output_file,
            current_test: None,
            last_fail_message: None,
            failed_keywords: Vec::new(),
            test_results: BTreeMap::new(),
            call_stacks: BTreeMap::new(),
        }
    }

    pub fn on_test_start(&mut self, name: &str) {
        self.current_test = Some(name.to_string());
        self.last_fail_message = None;
        self.failed_keywords.clear();
    }

    /// FAIL-level log messages carry the original failure text; keep the
    /// latest one so the failure point can prefer it over the terser
    /// keyword-end message attribute.
    pub fn on_log_message(&mut self, level: &str, message: &str) {
        if level == "FAIL" {
            self.last_fail_message = Some(message.to_string());
        }
    }

    /// Record one keyword failure. Called on keyword-end with FAIL status,
    /// before the frame is popped.
    pub fn on_keyword_fail(&mut self, name: &str, attrs: &KeywordAttrs, stack: &CallStack) {
        let message = self
            .last_fail_message
            .clone()
            .unwrap_or_else(|| attrs.message.clone());

        // The legacy summary list only carries keywords with a source
        // location; the stack capture below is unconditional.
        if !attrs.source.is_empty() {
            self.failed_keywords.push(FailedKeyword {
                name: name.to_string(),
                kwname: attrs.display_name(name).to_string(),
                libname: attrs.libname.clone(),
                source: attrs.source.clone(),
                lineno: attrs.lineno,
                status: Status::Fail,
                message: message.clone(),
                args: attrs.args.clone(),
                kind: attrs.kind,
            });
        }

        let Some(test) = self.current_test.clone() else {
            return;
        };

        // The failing keyword is the innermost live frame; mark it rather
        // than appending a duplicate so the entry list reads as the exact
        // call path, outermost to innermost.
        let mut frames = stack.snapshot();
        let failing = frames.pop().unwrap_or_else(|| {
            let mut frame = KeywordFrame::from_start(name, attrs);
            frame.depth = stack.depth() + 1;
            frame
        });

        let mut entries: Vec<StackEntry> = frames.into_iter().map(StackEntry::Frame).collect();
        entries.push(StackEntry::Failure(FailurePoint {
            frame: failing,
            is_failure_point: true,
            message,
            status: Status::Fail,
        }));

        let key = format!("{}_{}", test, self.call_stacks.len());
        self.call_stacks.insert(key, entries);
    }

    pub fn on_test_end(&mut self, name: &str, attrs: &TestAttrs) {
        let mut result = TestResult {
            name: name.to_string(),
            status: attrs.status,
            message: attrs.message.clone(),
            longname: attrs.longname.clone(),
            starttime: attrs.starttime.clone(),
            endtime: attrs.endtime.clone(),
            source: attrs.source.clone(),
            lineno: attrs.lineno,
            failed_keywords: std::mem::take(&mut self.failed_keywords),
            stack_trace_key: None,
        };

        if attrs.status.is_fail() && !result.failed_keywords.is_empty() {
            let key = format!("{name}_0");
            if self.call_stacks.contains_key(&key) {
                result.stack_trace_key = Some(key);
            }
        }

        self.test_results.insert(name.to_string(), result);
        self.current_test = None;
    }

    pub fn test_results(&self) -> &BTreeMap<String, TestResult> {
        &self.test_results
    }

    pub fn call_stacks(&self) -> &BTreeMap<String, Vec<StackEntry>> {
        &self.call_stacks
    }

    /// Write the `{version, test_results, call_stacks}` report.
    pub fn write_report(&self) -> Result<(), DebugError> {
        let report = RunReport {
            version: REPORT_VERSION,
            test_results: &self.test_results,
            call_stacks: &self.call_stacks,
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| DebugError::json(&self.output_file, e))?;
        fs::write(&self.output_file, json).map_err(|e| DebugError::io(&self.output_file, e))
    }
}
