/// Step command as written by the controller into the step marker file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepCommand {
    Over,
    Into,
    Out,
}

impl StepCommand {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "over" => Some(Self::Over),
            "into" => Some(Self::Into),
            "out" => Some(Self::Out),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Over => "over",
            Self::Into => "into",
            Self::Out => "out",
        }
    }
}

/// Single-shot stepping state machine.
///
/// Armed from a step command consumed during a pause; the first event that
/// satisfies the armed condition pauses and resets the state to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepState {
    #[default]
    Idle,
    /// Pause at the next keyword-start at this depth or shallower.
    StepOver(usize),
    /// Pause at the very next keyword-start.
    StepInto,
    /// Pause at the next keyword-end once depth has unwound to the target.
    StepOut(usize),
}

impl StepState {
    /// Arm from a command received while paused at `depth`.
    pub fn arm(command: StepCommand, depth: usize) -> Self {
        match command {
            StepCommand::Over => Self::StepOver(depth),
            StepCommand::Into => Self::StepInto,
            StepCommand::Out => Self::StepOut(depth.saturating_sub(1)),
        }
    }

    /// Pause decision for a keyword-start observed at `depth`.
    pub fn check_start(&mut self, depth: usize) -> Option<StepCommand> {
        match *self {
            Self::StepOver(target) if depth <= target => {
                *self = Self::Idle;
                Some(StepCommand::Over)
            }
            Self::StepInto => {
                *self = Self::Idle;
                Some(StepCommand::Into)
            }
            _ => None,
        }
    }

    /// Pause decision for a keyword-end whose frame sits at `depth` (pre-pop).
    pub fn check_end(&mut self, depth: usize) -> Option<StepCommand> {
        match *self {
            Self::StepOut(target) if depth <= target => {
                *self = Self::Idle;
                Some(StepCommand::Out)
            }
            _ => None,
        }
    }
}
