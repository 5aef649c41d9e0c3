use tracing::{debug, error, info, warn};

use crate::config::DebugConfig;
use crate::debugger::breakpoints::BreakpointStore;
use crate::debugger::failures::FailureRecorder;
use crate::debugger::pause::{PauseGate, Resume};
use crate::debugger::stack::{CallStack, KeywordFrame};
use crate::debugger::stepping::{StepCommand, StepState};
use crate::debugger::variables::{export_snapshot, VariableSource};
use crate::events::{KeywordAttrs, LogAttrs, SuiteAttrs, TestAttrs};

const LOG_DISPLAY_LEN: usize = 150;

/// The debug listener: one explicitly constructed context object receiving
/// every engine lifecycle notification for a single test run.
///
/// Nothing here may propagate an error back to the engine: a debugging aid
/// must never abort the run it is observing. Every fallible operation is
/// handled at the callback boundary and logged.
pub struct DebugListener {
    config: DebugConfig,
    breakpoints: BreakpointStore,
    stack: CallStack,
    stepping: StepState,
    gate: PauseGate,
    recorder: FailureRecorder,
    variables: Box<dyn VariableSource>,
}

impl DebugListener {
    pub fn new(config: DebugConfig, variables: Box<dyn VariableSource>) -> Self {
        Self {
            breakpoints: BreakpointStore::new(config.breakpoint_file.clone()),
            stack: CallStack::new(),
            stepping: StepState::Idle,
            gate: PauseGate::new(&config),
            recorder: FailureRecorder::new(config.output_file.clone()),
            variables,
            config,
        }
    }

    /// Session startup: sweep stale markers and load breakpoints.
    pub fn start(&mut self) {
        self.gate.clear_stale_marker();
        match self.breakpoints.load() {
            Ok(count) => info!(
                count,
                breakpoint_file = %self.config.breakpoint_file.display(),
                "debug listener started"
            ),
            Err(e) => warn!(error = %e, "debug listener started without breakpoints"),
        }
    }

    /// Session end: persist the run-end report.
    pub fn close(&mut self) {
        if let Err(e) = self.recorder.write_report() {
            error!(error = %e, "failed to write run-end report");
        }
    }

    pub fn start_suite(&mut self, name: &str, _attrs: &SuiteAttrs) {
        debug!(suite = name, "suite started");
    }

    pub fn end_suite(&mut self, name: &str, attrs: &SuiteAttrs) {
        debug!(suite = name, status = ?attrs.status, "suite ended");
    }

    pub fn start_test(&mut self, name: &str, attrs: &TestAttrs) {
        self.stack.reset();
        self.recorder.on_test_start(name);
        debug!(test = name, tags = ?attrs.tags, "test started");
    }

    pub fn end_test(&mut self, name: &str, attrs: &TestAttrs) {
        self.recorder.on_test_end(name, attrs);
        info!(test = name, status = ?attrs.status, "test ended");
    }

    /// Keyword start: push the frame, then decide on at most one pause.
    /// Breakpoints are checked before step targets; a breakpoint hit services
    /// the pause for this event and leaves stepping state untouched.
    pub fn start_keyword(&mut self, name: &str, attrs: &KeywordAttrs) {
        let frame = KeywordFrame::from_start(name, attrs);
        let depth = self.stack.push(frame);
        debug!(
            keyword = attrs.display_name(name),
            depth,
            source = %attrs.source,
            lineno = attrs.lineno,
            "keyword started"
        );

        if !attrs.source.is_empty()
            && attrs.lineno > 0
            && self.breakpoints.matches(&attrs.source, attrs.lineno)
        {
            let reason = format!(
                "Breakpoint hit: {}:{} in {}",
                source_basename(&attrs.source),
                attrs.lineno,
                attrs.display_name(name)
            );
            self.pause(&reason);
            return;
        }

        if let Some(command) = self.stepping.check_start(depth) {
            let reason = format!("Step {}: {}", command.as_str(), attrs.display_name(name));
            self.pause(&reason);
        }
    }

    /// Keyword end: step-out check and failure capture run against the
    /// pre-pop depth; the pop itself is unconditional so the stack stays
    /// balanced whatever happened in between.
    pub fn end_keyword(&mut self, name: &str, attrs: &KeywordAttrs) {
        let depth = self.stack.depth();

        if let Some(command) = self.stepping.check_end(depth) {
            let reason = format!("Step {}: {}", command.as_str(), attrs.display_name(name));
            self.pause(&reason);
        }

        if attrs.status.is_fail() {
            warn!(
                keyword = attrs.display_name(name),
                depth,
                message = %truncated(&attrs.message),
                "keyword failed"
            );
            self.recorder.on_keyword_fail(name, attrs, &self.stack);
        }

        self.stack.pop();
    }

    pub fn log_message(&mut self, attrs: &LogAttrs) {
        self.recorder.on_log_message(&attrs.level, &attrs.message);
        match attrs.level.as_str() {
            "WARN" => warn!(message = %truncated(&attrs.message), "engine warning"),
            "ERROR" => error!(message = %truncated(&attrs.message), "engine error"),
            _ => {}
        }
    }

    fn pause(&mut self, reason: &str) {
        match export_snapshot(&self.config.variable_file, self.variables.as_ref()) {
            Ok(count) => debug!(count, "variable snapshot exported"),
            Err(e) => warn!(error = %e, "variable snapshot skipped"),
        }

        match self.gate.pause(reason, &mut self.breakpoints) {
            Resume::Continue => {}
            Resume::Step(command) => {
                self.stepping = StepState::arm(command, self.stack.depth());
            }
        }
    }

    pub fn current_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn call_stack(&self) -> Vec<KeywordFrame> {
        self.stack.snapshot()
    }

    pub fn stepping(&self) -> StepState {
        self.stepping
    }

    pub fn breakpoint_count(&self) -> usize {
        self.breakpoints.count()
    }

    pub fn recorder(&self) -> &FailureRecorder {
        &self.recorder
    }
}

fn source_basename(source: &str) -> &str {
    source.rsplit(['/', '\\']).next().unwrap_or(source)
}

fn truncated(message: &str) -> String {
    crate::debugger::variables::truncate_chars(message, LOG_DISPLAY_LEN)
}
