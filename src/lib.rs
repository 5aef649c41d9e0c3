//! Interactive keyword-level debugging for a test-execution engine.
//!
//! The engine calls into this crate synchronously on each lifecycle event
//! (suite/test/keyword start and end, log messages). The crate tracks the
//! live keyword call stack, pauses at breakpoints and step targets, exports
//! variable snapshots while paused, and records the full call path of every
//! keyword failure for a run-end report.
//!
//! The controller side (an editor or CLI in another process) drives
//! pause/resume/step through shared files:
//!
//! - breakpoints: JSON `{source path: [line, ...]}` read by this crate
//! - pause marker: written here on pause, removed externally to continue
//! - step marker: `over` / `into` / `out`, consumed here
//! - variable snapshot: JSON written here on each pause

pub mod config;
pub mod debugger;
pub mod error;
pub mod events;
pub mod wire;

pub use config::DebugConfig;
pub use debugger::{
    BreakpointStore, CallStack, DebugListener, FailureRecorder, KeywordFrame, PauseGate, Resume,
    StepCommand, StepState, StoredVariables, VariableSource,
};
pub use error::DebugError;
pub use events::{KeywordAttrs, KeywordKind, LogAttrs, Status, SuiteAttrs, TestAttrs};
