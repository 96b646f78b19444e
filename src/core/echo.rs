// Echo mode phase machine: alternate "listen to the demo" and "your turn"
// every fixed number of complete bars.

pub const BARS_PER_PHASE: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Listen,
    Play,
}

impl Phase {
    fn flipped(self) -> Self {
        match self {
            Phase::Listen => Phase::Play,
            Phase::Play => Phase::Listen,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PhaseController {
    phase: Phase,
    bars_completed: usize,
}

impl Default for PhaseController {
    fn default() -> Self {
        Self { phase: Phase::Listen, bars_completed: 0 }
    }
}

impl PhaseController {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Back to Listen with a fresh bar counter. Used when echo mode is
    /// (re)enabled, on restart, and on session start.
    pub fn reset(&mut self) {
        self.phase = Phase::Listen;
        self.bars_completed = 0;
    }

    /// Called once per completed bar while echo mode is on. Returns the new
    /// phase when the threshold is reached; the caller must hard-reset
    /// scoring state on every flip.
    pub fn on_bar_completed(&mut self) -> Option<Phase> {
        self.bars_completed += 1;
        if self.bars_completed >= BARS_PER_PHASE {
            self.bars_completed = 0;
            self.phase = self.phase.flipped();
            Some(self.phase)
        } else {
            None
        }
    }
}
