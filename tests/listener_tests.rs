use std::collections::BTreeMap;
use std::fs;

use keyword_debugger::debugger::{
    export_snapshot, normalize_source, BreakpointStore, CallStack, FailureRecorder, KeywordFrame,
    StackEntry, StepCommand, StepState, StoredVariables, VariableSnapshot, VariableSource,
};
use keyword_debugger::{DebugError, KeywordAttrs, KeywordKind, Status, TestAttrs};
use tempfile::TempDir;

// Helper to build keyword-start attributes
fn kw_attrs(kwname: &str, source: &str, lineno: u32) -> KeywordAttrs {
    KeywordAttrs {
        kwname: kwname.to_string(),
        libname: "MyLibrary".to_string(),
        source: source.to_string(),
        lineno,
        args: vec!["arg1".to_string()],
        ..KeywordAttrs::default()
    }
}

fn failing_attrs(kwname: &str, source: &str, lineno: u32, message: &str) -> KeywordAttrs {
    KeywordAttrs {
        status: Status::Fail,
        message: message.to_string(),
        ..kw_attrs(kwname, source, lineno)
    }
}

#[cfg(test)]
mod breakpoint_tests {
    use super::*;

    #[test]
    fn test_load_and_match_mixed_separators() {
        let dir = TempDir::new().expect("tempdir");
        let bp_file = dir.path().join("breakpoints.json");
        fs::write(&bp_file, r#"{"suite\\resources\\lib.resource": [10, 20]}"#)
            .expect("write breakpoints");

        let mut store = BreakpointStore::new(bp_file);
        let count = store.load().expect("load should succeed");
        assert_eq!(count, 2, "Should load both line numbers");

        assert!(
            store.matches("suite/resources/lib.resource", 10),
            "Forward-slash lookup should hit a backslash definition"
        );
        assert!(
            store.matches("suite\\resources\\lib.resource", 20),
            "Backslash lookup should hit too"
        );
        assert!(!store.matches("suite/resources/lib.resource", 15));
        assert!(!store.matches("suite/resources/other.resource", 10));
    }

    #[test]
    fn test_garbled_file_keeps_previous_set() {
        let dir = TempDir::new().expect("tempdir");
        let bp_file = dir.path().join("breakpoints.json");
        fs::write(&bp_file, r#"{"lib.resource": [10]}"#).expect("write breakpoints");

        let mut store = BreakpointStore::new(bp_file.clone());
        store.load().expect("initial load");
        assert!(store.matches("lib.resource", 10));

        fs::write(&bp_file, "{not json at all").expect("write garbage");
        let result = store.load();
        assert!(result.is_err(), "Garbled file should report an error");
        assert!(matches!(result.unwrap_err(), DebugError::Json { .. }));
        assert!(
            store.matches("lib.resource", 10),
            "Previous set must survive a bad reload"
        );
    }

    #[test]
    fn test_missing_file_is_empty_definition() {
        let dir = TempDir::new().expect("tempdir");
        let mut store = BreakpointStore::new(dir.path().join("nope.json"));
        let count = store.load().expect("missing file is not an error");
        assert_eq!(count, 0);
        assert!(store.is_empty());
        assert!(!store.matches("lib.resource", 10));
    }

    #[test]
    fn test_reload_is_idempotent() {
        let dir = TempDir::new().expect("tempdir");
        let bp_file = dir.path().join("breakpoints.json");
        fs::write(&bp_file, r#"{"a.robot": [1, 2], "b.robot": [3]}"#).expect("write");

        let mut store = BreakpointStore::new(bp_file);
        store.reload();
        let first = store.count();
        store.reload();
        assert_eq!(store.count(), first, "Reload with unchanged file is a no-op");
        assert!(store.matches("a.robot", 1));
        assert!(store.matches("b.robot", 3));
    }

    #[test]
    fn test_normalize_source_rules() {
        assert_eq!(normalize_source("a\\b\\c.robot"), normalize_source("a/b/c.robot"));
        assert_eq!(normalize_source("./a/b.robot"), "a/b.robot");
        assert_eq!(normalize_source("a/./b.robot"), "a/b.robot");
        assert_eq!(normalize_source("/a/../b.robot"), "/b.robot");
        assert_eq!(normalize_source("C:\\suite\\lib.resource"), "C:/suite/lib.resource");
    }
}

#[cfg(test)]
mod stack_tests {
    use super::*;

    #[test]
    fn test_depth_follows_push_pop_balance() {
        let mut stack = CallStack::new();
        assert_eq!(stack.depth(), 0);
        assert!(stack.is_empty());

        let d1 = stack.push(KeywordFrame::from_start("A", &kw_attrs("A", "s.robot", 1)));
        assert_eq!(d1, 1);
        let d2 = stack.push(KeywordFrame::from_start("B", &kw_attrs("B", "s.robot", 2)));
        assert_eq!(d2, 2);
        assert_eq!(stack.depth(), 2);

        let popped = stack.pop().expect("frame");
        assert_eq!(popped.kwname, "B");
        assert_eq!(popped.depth, 2);
        assert_eq!(stack.depth(), 1);

        stack.pop();
        assert_eq!(stack.depth(), 0);
        assert!(stack.is_empty(), "Stack must be empty at depth 0");
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut stack = CallStack::new();
        stack.push(KeywordFrame::from_start("A", &kw_attrs("A", "s.robot", 1)));
        let snapshot = stack.snapshot();

        stack.pop();
        assert_eq!(stack.depth(), 0);
        assert_eq!(snapshot.len(), 1, "Snapshot must not alias the live stack");
        assert_eq!(snapshot[0].kwname, "A");
    }

    #[test]
    fn test_reset_clears_between_tests() {
        let mut stack = CallStack::new();
        stack.push(KeywordFrame::from_start("A", &kw_attrs("A", "s.robot", 1)));
        stack.push(KeywordFrame::from_start("B", &kw_attrs("B", "s.robot", 2)));
        stack.reset();
        assert!(stack.is_empty());
        // Depth numbering restarts after reset
        let d = stack.push(KeywordFrame::from_start("C", &kw_attrs("C", "s.robot", 3)));
        assert_eq!(d, 1);
    }
}

#[cfg(test)]
mod stepping_tests {
    use super::*;

    #[test]
    fn test_step_over_waits_for_same_depth() {
        let mut state = StepState::arm(StepCommand::Over, 2);
        assert_eq!(state, StepState::StepOver(2));

        assert_eq!(state.check_start(3), None, "Deeper start must not pause");
        assert_eq!(state, StepState::StepOver(2), "Missed check leaves state armed");

        assert_eq!(state.check_start(2), Some(StepCommand::Over));
        assert_eq!(state, StepState::Idle, "Pause consumes the step state");
        assert_eq!(state.check_start(2), None, "Single-shot: no second pause");
    }

    #[test]
    fn test_step_over_fires_on_shallower_start() {
        // The stepped-over keyword was the last of its block; the next start
        // is at the caller's depth.
        let mut state = StepState::arm(StepCommand::Over, 2);
        assert_eq!(state.check_start(1), Some(StepCommand::Over));
    }

    #[test]
    fn test_step_into_fires_on_very_next_start() {
        let mut state = StepState::arm(StepCommand::Into, 1);
        assert_eq!(state, StepState::StepInto);
        assert_eq!(state.check_start(5), Some(StepCommand::Into));
        assert_eq!(state, StepState::Idle);
    }

    #[test]
    fn test_step_out_waits_for_unwind() {
        let mut state = StepState::arm(StepCommand::Out, 2);
        assert_eq!(state, StepState::StepOut(1));

        assert_eq!(state.check_end(2), None, "Current frame's end is not the target");
        assert_eq!(state.check_end(1), Some(StepCommand::Out));
        assert_eq!(state, StepState::Idle);
    }

    #[test]
    fn test_step_out_at_top_level_never_fires() {
        let mut state = StepState::arm(StepCommand::Out, 1);
        assert_eq!(state, StepState::StepOut(0));
        assert_eq!(state.check_end(1), None);
        assert_eq!(state.check_end(2), None);
    }

    #[test]
    fn test_idle_never_pauses() {
        let mut state = StepState::Idle;
        assert_eq!(state.check_start(1), None);
        assert_eq!(state.check_end(1), None);
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(StepCommand::parse("over"), Some(StepCommand::Over));
        assert_eq!(StepCommand::parse("into"), Some(StepCommand::Into));
        assert_eq!(StepCommand::parse("out"), Some(StepCommand::Out));
        assert_eq!(StepCommand::parse("continue"), None);
        assert_eq!(StepCommand::parse(""), None);
    }
}

#[cfg(test)]
mod variable_tests {
    use super::*;

    #[test]
    fn test_scope_classification() {
        let vars = BTreeMap::from([
            ("${TEST_NAME}".to_string(), "My Test".to_string()),
            ("${SUITE_SOURCE}".to_string(), "/suites/s.robot".to_string()),
            ("${local_var}".to_string(), "x".to_string()),
            ("@{items}".to_string(), "['a', 'b']".to_string()),
            ("&{mapping}".to_string(), "{'k': 'v'}".to_string()),
            ("OUTPUT_DIR".to_string(), "/tmp/out".to_string()),
        ]);

        let snapshot = VariableSnapshot::classify(vars);
        assert_eq!(snapshot.test.len(), 1);
        assert_eq!(snapshot.suite.len(), 1);
        assert_eq!(snapshot.local.len(), 3);
        assert_eq!(snapshot.global.len(), 1);
        assert_eq!(snapshot.count(), 6);
    }

    #[test]
    fn test_long_values_are_truncated() {
        let vars = BTreeMap::from([("${big}".to_string(), "x".repeat(600))]);
        let snapshot = VariableSnapshot::classify(vars);

        let value = snapshot.local.get("${big}").expect("classified as local");
        assert_eq!(value.chars().count(), 500, "Cap at the truncation length");
        assert!(value.ends_with("..."), "Truncation is marked");
    }

    #[test]
    fn test_export_writes_whole_file_json() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("variables.json");

        let source = StoredVariables::default();
        source.replace(BTreeMap::from([
            ("${TEST_NAME}".to_string(), "T".to_string()),
            ("${x}".to_string(), "1".to_string()),
        ]));

        let count = export_snapshot(&path, &source).expect("export");
        assert_eq!(count, 2);

        let raw = fs::read_to_string(&path).expect("snapshot file");
        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("valid JSON");
        for scope in ["test", "suite", "global", "local"] {
            assert!(parsed.get(scope).is_some(), "Missing top-level scope {scope}");
        }
        assert_eq!(parsed["test"]["${TEST_NAME}"], "T");
        assert_eq!(parsed["local"]["${x}"], "1");
    }

    #[test]
    fn test_export_reports_query_failure() {
        struct Broken;
        impl VariableSource for Broken {
            fn variables(&self) -> Result<BTreeMap<String, String>, DebugError> {
                Err(DebugError::Variables("engine gone".to_string()))
            }
        }

        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("variables.json");
        let result = export_snapshot(&path, &Broken);
        assert!(result.is_err(), "Query failure surfaces as an error");
        assert!(!path.exists(), "No partial snapshot on failure");
    }
}

#[cfg(test)]
mod failure_tests {
    use super::*;

    fn record_nested_failure(recorder: &mut FailureRecorder, test: &str) {
        recorder.on_test_start(test);

        let mut stack = CallStack::new();
        stack.push(KeywordFrame::from_start("A", &kw_attrs("A", "suite/t.robot", 5)));
        stack.push(KeywordFrame::from_start("B", &kw_attrs("B", "suite/lib.resource", 12)));

        recorder.on_log_message("FAIL", "boom");
        recorder.on_keyword_fail(
            "B",
            &failing_attrs("B", "suite/lib.resource", 12, "short"),
            &stack,
        );
    }

    #[test]
    fn test_failure_captures_exact_call_path() {
        let dir = TempDir::new().expect("tempdir");
        let mut recorder = FailureRecorder::new(dir.path().join("out.json"));
        record_nested_failure(&mut recorder, "T");

        let entries = recorder.call_stacks().get("T_0").expect("stack key T_0");
        assert_eq!(entries.len(), 2, "Exact call path: A then B");
        assert_eq!(entries[0].frame().kwname, "A");
        assert!(!entries[0].is_failure_point());

        assert_eq!(entries[1].frame().kwname, "B");
        assert_eq!(entries[1].frame().depth, 2);
        assert!(entries[1].is_failure_point(), "Last frame is the failure point");
        match &entries[1] {
            StackEntry::Failure(point) => {
                assert_eq!(point.message, "boom", "FAIL log message wins over attrs");
                assert_eq!(point.status, Status::Fail);
            }
            StackEntry::Frame(_) => panic!("last entry must be the failure point"),
        }
    }

    #[test]
    fn test_test_end_links_stack_and_keeps_failed_keywords() {
        let dir = TempDir::new().expect("tempdir");
        let mut recorder = FailureRecorder::new(dir.path().join("out.json"));
        record_nested_failure(&mut recorder, "T");

        recorder.on_test_end(
            "T",
            &TestAttrs {
                status: Status::Fail,
                message: "boom".to_string(),
                ..TestAttrs::default()
            },
        );

        let result = recorder.test_results().get("T").expect("test result");
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.failed_keywords.len(), 1);
        assert_eq!(result.failed_keywords[0].kwname, "B");
        assert_eq!(result.stack_trace_key.as_deref(), Some("T_0"));
    }

    #[test]
    fn test_repeated_failures_get_distinct_keys() {
        let dir = TempDir::new().expect("tempdir");
        let mut recorder = FailureRecorder::new(dir.path().join("out.json"));
        recorder.on_test_start("Loop Test");

        let mut stack = CallStack::new();
        stack.push(KeywordFrame::from_start("Body", &kw_attrs("Body", "t.robot", 3)));

        recorder.on_keyword_fail(
            "Body",
            &failing_attrs("Body", "t.robot", 3, "first"),
            &stack,
        );
        recorder.on_keyword_fail(
            "Body",
            &failing_attrs("Body", "t.robot", 3, "second"),
            &stack,
        );

        assert!(recorder.call_stacks().contains_key("Loop Test_0"));
        assert!(
            recorder.call_stacks().contains_key("Loop Test_1"),
            "Second failure must not overwrite the first"
        );
    }

    #[test]
    fn test_unsourced_failure_skips_legacy_list_but_keeps_stack() {
        let dir = TempDir::new().expect("tempdir");
        let mut recorder = FailureRecorder::new(dir.path().join("out.json"));
        recorder.on_test_start("T");

        let mut stack = CallStack::new();
        stack.push(KeywordFrame::from_start("K", &kw_attrs("K", "", 0)));
        recorder.on_keyword_fail("K", &failing_attrs("K", "", 0, "boom"), &stack);

        assert!(
            recorder.call_stacks().contains_key("T_0"),
            "Stack capture is unconditional"
        );

        recorder.on_test_end(
            "T",
            &TestAttrs {
                status: Status::Fail,
                ..TestAttrs::default()
            },
        );
        let result = recorder.test_results().get("T").expect("test result");
        assert!(
            result.failed_keywords.is_empty(),
            "Legacy summary list only carries sourced keywords"
        );
    }

    #[test]
    fn test_message_falls_back_to_attrs_without_fail_log() {
        let dir = TempDir::new().expect("tempdir");
        let mut recorder = FailureRecorder::new(dir.path().join("out.json"));
        recorder.on_test_start("T");

        let mut stack = CallStack::new();
        stack.push(KeywordFrame::from_start("K", &kw_attrs("K", "t.robot", 1)));
        recorder.on_keyword_fail("K", &failing_attrs("K", "t.robot", 1, "attr text"), &stack);

        match &recorder.call_stacks()["T_0"][0] {
            StackEntry::Failure(point) => assert_eq!(point.message, "attr text"),
            StackEntry::Frame(_) => panic!("expected failure point"),
        }
    }

    #[test]
    fn test_report_file_schema() {
        let dir = TempDir::new().expect("tempdir");
        let out = dir.path().join("listener_output.json");
        let mut recorder = FailureRecorder::new(out.clone());
        record_nested_failure(&mut recorder, "T");
        recorder.on_test_end(
            "T",
            &TestAttrs {
                status: Status::Fail,
                message: "boom".to_string(),
                ..TestAttrs::default()
            },
        );

        recorder.write_report().expect("report write");
        let raw = fs::read_to_string(&out).expect("report file");
        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("valid JSON");

        assert_eq!(parsed["version"], 2);
        assert_eq!(parsed["test_results"]["T"]["status"], "FAIL");
        let stack = parsed["call_stacks"]["T_0"].as_array().expect("stack array");
        assert_eq!(stack.len(), 2);
        assert_eq!(stack[1]["is_failure_point"], true);
        assert_eq!(stack[1]["message"], "boom");
        assert_eq!(stack[1]["type"], "KEYWORD");
    }
}

#[cfg(test)]
mod event_parsing_tests {
    use super::*;

    #[test]
    fn test_keyword_kind_wire_strings() {
        let kind: KeywordKind = serde_json::from_str(r#""FOR ITERATION""#).expect("parse");
        assert_eq!(kind, KeywordKind::ForIteration);

        let kind: KeywordKind = serde_json::from_str(r#""TEARDOWN""#).expect("parse");
        assert_eq!(kind, KeywordKind::Teardown);

        let kind: KeywordKind = serde_json::from_str(r#""SOMETHING NEW""#).expect("parse");
        assert_eq!(kind, KeywordKind::Other, "Unknown kinds map to Other");
    }

    #[test]
    fn test_status_wire_strings() {
        let status: Status = serde_json::from_str(r#""NOT RUN""#).expect("parse");
        assert_eq!(status, Status::NotRun);

        let status: Status = serde_json::from_str(r#""FAIL""#).expect("parse");
        assert!(status.is_fail());
    }

    #[test]
    fn test_keyword_attrs_defaults() {
        let attrs: KeywordAttrs = serde_json::from_str(r#"{"kwname": "Log"}"#).expect("parse");
        assert_eq!(attrs.kind, KeywordKind::Keyword);
        assert_eq!(attrs.status, Status::Pass);
        assert_eq!(attrs.lineno, 0);
        assert_eq!(attrs.display_name("Lib.Log"), "Log");

        let bare: KeywordAttrs = serde_json::from_str("{}").expect("parse");
        assert_eq!(bare.display_name("Lib.Log"), "Lib.Log");
    }
}
