use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PAUSE_FILE: &str = ".rf_debug_pause";
pub const DEFAULT_BREAKPOINT_FILE: &str = ".rf_debug_breakpoints.json";
pub const DEFAULT_VARIABLE_FILE: &str = ".rf_debug_variables.json";
pub const DEFAULT_STEP_FILE: &str = ".rf_debug_step";
pub const DEFAULT_OUTPUT_FILE: &str = "listener_output.json";

/// Shared-file paths and pause-loop tuning for one debug session.
///
/// The controller process owns the breakpoint and step files; this process
/// owns the pause marker, the variable snapshot, and the run-end report.
#[derive(Debug, Clone)]
pub struct DebugConfig {
    pub pause_file: PathBuf,
    pub breakpoint_file: PathBuf,
    pub variable_file: PathBuf,
    pub step_file: PathBuf,
    pub output_file: PathBuf,
    /// Sleep between polls while paused.
    pub poll_interval: Duration,
    /// Reload breakpoints every this many poll ticks (0 disables).
    pub reload_every_ticks: u32,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            pause_file: PathBuf::from(DEFAULT_PAUSE_FILE),
            breakpoint_file: PathBuf::from(DEFAULT_BREAKPOINT_FILE),
            variable_file: PathBuf::from(DEFAULT_VARIABLE_FILE),
            step_file: PathBuf::from(DEFAULT_STEP_FILE),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            poll_interval: Duration::from_millis(100),
            reload_every_ticks: 30,
        }
    }
}

impl DebugConfig {
    /// Defaults with the documented `RF_DEBUG_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = env::var_os("RF_DEBUG_PAUSE_FILE") {
            config.pause_file = PathBuf::from(path);
        }
        if let Some(path) = env::var_os("RF_DEBUG_BP_FILE") {
            config.breakpoint_file = PathBuf::from(path);
        }
        if let Some(path) = env::var_os("RF_DEBUG_VAR_FILE") {
            config.variable_file = PathBuf::from(path);
        }
        if let Some(path) = env::var_os("RF_DEBUG_STEP_FILE") {
            config.step_file = PathBuf::from(path);
        }
        if let Some(path) = env::var_os("RF_DEBUG_OUTPUT_FILE") {
            config.output_file = PathBuf::from(path);
        }
        config
    }

    /// Defaults with every shared file placed under `dir`.
    pub fn rooted_at(dir: &Path) -> Self {
        Self {
            pause_file: dir.join(DEFAULT_PAUSE_FILE),
            breakpoint_file: dir.join(DEFAULT_BREAKPOINT_FILE),
            variable_file: dir.join(DEFAULT_VARIABLE_FILE),
            step_file: dir.join(DEFAULT_STEP_FILE),
            output_file: dir.join(DEFAULT_OUTPUT_FILE),
            ..Self::default()
        }
    }
}
