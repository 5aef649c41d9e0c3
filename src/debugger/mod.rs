mod breakpoints;
mod context;
mod failures;
mod pause;
mod stack;
mod stepping;
mod variables;

pub use breakpoints::{normalize_source, BreakpointStore};
pub use context::DebugListener;
pub use failures::{
    FailedKeyword, FailurePoint, FailureRecorder, StackEntry, TestResult, REPORT_VERSION,
};
pub use pause::{PauseGate, Resume};
pub use stack::{CallStack, KeywordFrame};
pub use stepping::{StepCommand, StepState};
pub use variables::{
    export_snapshot, StoredVariables, VariableSnapshot, VariableSource, VALUE_TRUNCATE_LEN,
};
