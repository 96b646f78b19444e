// The current key plan:
//
//   Space         //  Tap (starts a session if none is running)
//   Enter         //  StartStop
//   g             //  NewExercise
//   r             //  Restart
//   1 2 3         //  SelectLevel(1..3)
//   [ / ]         //  AdjustBpm(-5 or +5)
//   { / }         //  AdjustBars(-1 or +1)
//   e             //  ToggleEcho
//   m             //  ToggleStrict (reading mode vs free mode)
//   p             //  ToggleNotes
//   , / .         //  AdjustVolMetro(-0.05 or +0.05)
//   < / >         //  AdjustVolNotes(-0.05 or +0.05)
//   Esc           //  Quit
//
// The TUI only resolves keys into these events and renders DisplayState;
// the middle layer owns all of the trainer state.

use crate::core::{Phase, ScoreReport, Step, StepResult};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Tap,
    StartStop,
    NewExercise,
    Restart,
    SelectLevel(u8),
    AdjustBpm(i32),
    AdjustBars(i32),
    ToggleEcho,
    ToggleStrict,
    ToggleNotes,
    AdjustVolMetro(f32),
    AdjustVolNotes(f32),
    Quit,
}

// Snapshot the TUI renders every frame; it never reaches back into the core.
#[derive(Clone, Debug)]
pub struct DisplayState {
    pub running: bool,
    pub bpm: u32,
    pub level: u8,
    pub bars: usize,
    pub echo_mode: bool,
    pub strict_mode: bool,
    pub play_notes: bool,
    pub vol_metro: f32,
    pub vol_notes: f32,
    pub phase: Option<Phase>,
    pub step_index: usize,
    pub steps: Vec<Step>,
    pub results: Vec<StepResult>,
    pub score: ScoreReport,
    pub perfect: bool,
    pub celebrate: bool,
}
