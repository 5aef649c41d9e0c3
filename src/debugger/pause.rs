use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::DebugConfig;
use crate::debugger::breakpoints::BreakpointStore;
use crate::debugger::stepping::StepCommand;

/// How a pause ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    /// The controller removed the pause marker.
    Continue,
    /// The controller issued a step command.
    Step(StepCommand),
}

/// Blocks the engine thread against the controller's marker files.
///
/// The pause marker's existence is the sole authority for "engine thread is
/// blocked": this side writes it on pause and the controller removes it to
/// resume. A step command arrives as a separate marker file whose content is
/// `over`, `into` or `out`; it is consumed (deleted) on read and also ends
/// the pause, at which point the pause marker is removed here so it cannot
/// claim a blocked thread that is running again.
pub struct PauseGate {
    pause_file: PathBuf,
    step_file: PathBuf,
    poll_interval: Duration,
    reload_every_ticks: u32,
}

impl PauseGate {
    pub fn new(config: &DebugConfig) -> Self {
        Self {
            pause_file: config.pause_file.clone(),
            step_file: config.step_file.clone(),
            poll_interval: config.poll_interval,
            reload_every_ticks: config.reload_every_ticks,
        }
    }

    /// Remove a pause marker left behind by a crashed prior session.
    ///
    /// Without this sweep a stale marker would satisfy the poll loop's exit
    /// condition immediately on the first pause of a fresh run, or worse,
    /// make the controller believe the engine is already blocked.
    pub fn clear_stale_marker(&self) {
        if self.pause_file.exists() {
            warn!(
                path = %self.pause_file.display(),
                "found leftover pause marker from a previous session, removing it"
            );
            if let Err(e) = fs::remove_file(&self.pause_file) {
                error!(error = %e, "failed to remove stale pause marker");
            }
        }
    }

    /// Write the pause marker and block until the controller acts.
    ///
    /// There is no timeout: a debugging session waits for a human. The only
    /// exits are external removal of the pause marker (continue) or arrival
    /// of a step command. Breakpoints are reloaded on a fixed tick cadence so
    /// ones added mid-pause take effect without restarting the run.
    pub fn pause(&self, reason: &str, breakpoints: &mut BreakpointStore) -> Resume {
        info!(reason, "execution paused, waiting for controller");

        if let Err(e) = fs::write(&self.pause_file, reason) {
            // Without a visible marker the controller has nothing to clear,
            // so blocking here would deadlock the run.
            error!(
                error = %e,
                path = %self.pause_file.display(),
                "failed to write pause marker, continuing without pausing"
            );
            return Resume::Continue;
        }

        let mut ticks: u32 = 0;
        while self.pause_file.exists() {
            thread::sleep(self.poll_interval);
            ticks = ticks.wrapping_add(1);

            if self.reload_every_ticks > 0 && ticks % self.reload_every_ticks == 0 {
                breakpoints.reload();
            }

            if self.step_file.exists() {
                match fs::read_to_string(&self.step_file) {
                    Ok(raw) => {
                        if let Err(e) = fs::remove_file(&self.step_file) {
                            warn!(error = %e, "failed to consume step marker");
                        }
                        match StepCommand::parse(raw.trim()) {
                            Some(command) => {
                                if let Err(e) = fs::remove_file(&self.pause_file) {
                                    warn!(error = %e, "failed to remove pause marker on step");
                                }
                                debug!(command = command.as_str(), "step command received");
                                info!("execution resumed");
                                return Resume::Step(command);
                            }
                            None => {
                                warn!(raw = raw.trim(), "ignoring unknown step command");
                            }
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to read step marker");
                    }
                }
            }
        }

        info!("execution resumed");
        Resume::Continue
    }
}
