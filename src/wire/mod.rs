mod protocol;

use std::io::BufRead;

use tracing::debug;

use crate::debugger::{DebugListener, StoredVariables};
use crate::error::DebugError;

pub use protocol::{display_value, EngineEvent};

/// Drive a listener from a JSON Lines event stream.
///
/// Lines that fail to parse are skipped (a newer engine may emit events this
/// build does not know). EOF is equivalent to an explicit `close` event.
pub fn run<R: BufRead>(
    reader: R,
    listener: &mut DebugListener,
    variables: &StoredVariables,
) -> Result<(), DebugError> {
    listener.start();

    let mut outcome = Ok(());
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                // The report still gets written below; a broken stream must
                // not swallow what was already recorded.
                outcome = Err(DebugError::io("<event stream>", e));
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<EngineEvent>(&line) {
            Ok(event) => {
                if dispatch(event, listener, variables) {
                    break;
                }
            }
            Err(e) => debug!(error = %e, "skipping unrecognized event line"),
        }
    }

    listener.close();
    outcome
}

/// Returns true when the stream signalled close.
fn dispatch(event: EngineEvent, listener: &mut DebugListener, variables: &StoredVariables) -> bool {
    match event {
        EngineEvent::StartSuite { name, attrs } => listener.start_suite(&name, &attrs),
        EngineEvent::EndSuite { name, attrs } => listener.end_suite(&name, &attrs),
        EngineEvent::StartTest { name, attrs } => listener.start_test(&name, &attrs),
        EngineEvent::EndTest { name, attrs } => listener.end_test(&name, &attrs),
        EngineEvent::StartKeyword { name, attrs } => listener.start_keyword(&name, &attrs),
        EngineEvent::EndKeyword { name, attrs } => listener.end_keyword(&name, &attrs),
        EngineEvent::LogMessage { attrs } => listener.log_message(&attrs),
        EngineEvent::Variables { values } => {
            variables.replace(
                values
                    .into_iter()
                    .map(|(name, value)| (name, display_value(&value)))
                    .collect(),
            );
        }
        EngineEvent::Close => return true,
    }
    false
}
