// Session: ties the generator, step clock, phase machine, and score board
// together behind a poll-style API. The host calls `advance(now_ms)` every
// frame and `tap(now_ms)` on input; both return the audio commands to send.
// No timers live here; the perfect pulse and the celebration are deadlines
// checked against the timestamps the host feeds in.

use rand::Rng;

use crate::audio_api::{AudioCommand, GainChannel, ToneKind};

use super::clock::{StepClock, step_duration_ms, wrap_step};
use super::echo::{Phase, PhaseController};
use super::exercise::{self, Exercise, Level, MAX_BARS, MIN_BARS, Step};
use super::scoring::{ScoreBoard, ScoreReport, StepResult};

pub const MIN_BPM: u32 = 40;
pub const MAX_BPM: u32 = 220;

/// Perfect pulse stays up (and further triggers are ignored) for this long.
const PERFECT_PULSE_MS: f64 = 650.0;
/// The celebration clears this long after the score last qualified.
const CELEBRATE_MS: f64 = 900.0;
const CELEBRATE_SCORE: u32 = 90;

#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub bpm: u32,
    pub level: Level,
    pub bars_count: usize,
    pub echo_mode: bool,
    pub strict_mode: bool,
    pub play_notes: bool,
    pub vol_metro: f32,
    pub vol_notes: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bpm: 90,
            level: Level::Quarters,
            bars_count: MIN_BARS,
            echo_mode: false,
            strict_mode: true,
            play_notes: true,
            vol_metro: 0.8,
            vol_notes: 0.6,
        }
    }
}

impl Config {
    pub fn clamped(mut self) -> Self {
        self.bpm = self.bpm.clamp(MIN_BPM, MAX_BPM);
        self.bars_count = self.bars_count.clamp(MIN_BARS, MAX_BARS);
        self.vol_metro = self.vol_metro.clamp(0.0, 1.0);
        self.vol_notes = self.vol_notes.clamp(0.0, 1.0);
        self
    }
}

// Everything that changes while the clock runs, reset wholesale on restart.
#[derive(Clone, Copy, Debug, Default)]
struct RunState {
    running: bool,
    started_at_ms: f64,
    clock: StepClock,
    phase: PhaseController,
    perfect_until: Option<f64>,
    celebrate_until: Option<f64>,
}

pub struct Session {
    config: Config,
    exercise: Exercise,
    run: RunState,
    board: ScoreBoard,
}

impl Session {
    pub fn new(config: Config, rng: &mut impl Rng) -> Self {
        let config = config.clamped();
        let exercise = exercise::generate(config.level, config.bars_count, rng);
        let board = ScoreBoard::new(exercise.len());
        Self { config, exercise, run: RunState::default(), board }
    }

    // ── observers ────────────────────────────────────────────────

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    pub fn results(&self) -> &[StepResult] {
        self.board.results()
    }

    pub fn is_running(&self) -> bool {
        self.run.running
    }

    pub fn current_step(&self) -> usize {
        self.run.clock.current_step().unwrap_or(0)
    }

    /// Only meaningful while echo mode is on.
    pub fn phase(&self) -> Option<Phase> {
        self.config.echo_mode.then(|| self.run.phase.phase())
    }

    pub fn perfect_flag(&self) -> bool {
        self.run.perfect_until.is_some()
    }

    pub fn celebrate_flag(&self) -> bool {
        self.run.celebrate_until.is_some()
    }

    pub fn score_report(&self) -> ScoreReport {
        if self.config.echo_mode && self.run.phase.phase() != Phase::Play {
            ScoreReport::Listening
        } else if self.config.strict_mode {
            self.board.strict_report(&self.exercise)
        } else {
            self.board.free_report()
        }
    }

    // ── session control ──────────────────────────────────────────

    pub fn start(&mut self, now_ms: f64) -> Vec<AudioCommand> {
        self.run.started_at_ms = now_ms;
        self.run.running = true;
        self.run.clock.reset();
        if self.config.echo_mode {
            self.run.phase.reset();
            self.board.reset(self.exercise.len());
            self.run.perfect_until = None;
        }
        self.gain_commands()
    }

    pub fn stop(&mut self) {
        self.run.running = false;
    }

    /// Clear scoring and clock position but keep the exercise (and the clock
    /// epoch: a running session keeps ticking from the same start).
    pub fn restart(&mut self) {
        self.hard_reset();
    }

    pub fn new_exercise(&mut self, rng: &mut impl Rng) {
        self.exercise = exercise::generate(self.config.level, self.config.bars_count, rng);
        self.hard_reset();
    }

    fn hard_reset(&mut self) {
        self.board.reset(self.exercise.len());
        self.run.clock.reset();
        self.run.phase.reset();
        self.run.perfect_until = None;
        self.run.celebrate_until = None;
    }

    // ── configuration (clamped here, at the boundary) ────────────

    pub fn set_bpm(&mut self, bpm: u32) {
        self.config.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
    }

    pub fn set_level(&mut self, level: Level) {
        // takes effect on the next new exercise, not retroactively
        self.config.level = level;
    }

    pub fn set_bars_count(&mut self, bars: usize, rng: &mut impl Rng) {
        self.config.bars_count = bars.clamp(MIN_BARS, MAX_BARS);
        self.new_exercise(rng);
    }

    pub fn toggle_echo(&mut self) -> Vec<AudioCommand> {
        self.config.echo_mode = !self.config.echo_mode;
        self.hard_reset();
        self.gain_commands()
    }

    pub fn toggle_strict(&mut self) {
        self.config.strict_mode = !self.config.strict_mode;
        self.hard_reset();
    }

    pub fn toggle_play_notes(&mut self) -> Vec<AudioCommand> {
        if self.config.echo_mode {
            // overridden by the phase while echo is on
            return Vec::new();
        }
        self.config.play_notes = !self.config.play_notes;
        self.gain_commands()
    }

    pub fn set_vol_metro(&mut self, value: f32) -> Vec<AudioCommand> {
        self.config.vol_metro = value.clamp(0.0, 1.0);
        self.gain_commands()
    }

    pub fn set_vol_notes(&mut self, value: f32) -> Vec<AudioCommand> {
        self.config.vol_notes = value.clamp(0.0, 1.0);
        self.gain_commands()
    }

    // notes bus follows the gating: muted whenever notes would not sound
    fn notes_gated_on(&self) -> bool {
        if self.config.echo_mode {
            self.run.phase.phase() == Phase::Listen
        } else {
            self.config.play_notes
        }
    }

    fn gain_commands(&self) -> Vec<AudioCommand> {
        let notes = if self.notes_gated_on() { self.config.vol_notes } else { 0.0 };
        vec![
            AudioCommand::SetGain { channel: GainChannel::Metro, value: self.config.vol_metro },
            AudioCommand::SetGain { channel: GainChannel::Notes, value: notes },
        ]
    }

    // ── the clock poll ───────────────────────────────────────────

    /// Host-driven tick. Call as often as practical (~60/s); repeat calls
    /// within the same step are no-ops.
    pub fn advance(&mut self, now_ms: f64) -> Vec<AudioCommand> {
        let mut cmds = Vec::new();

        // deadline housekeeping runs even when stopped
        if self.run.perfect_until.is_some_and(|d| now_ms >= d) {
            self.run.perfect_until = None;
        }
        if self.run.celebrate_until.is_some_and(|d| now_ms >= d) {
            self.run.celebrate_until = None;
        }

        if !self.run.running {
            return cmds;
        }

        let elapsed = now_ms - self.run.started_at_ms;
        let tick =
            self.run.clock.advance(elapsed, self.config.bpm as f64, self.exercise.len());

        // phase flip lands before the new step's events, and suppresses
        // finalization of the step that straddles the boundary
        let mut flipped = false;
        if tick.bar_completed
            && self.config.echo_mode
            && self.run.phase.on_bar_completed().is_some()
        {
            self.board.reset(self.exercise.len());
            self.run.perfect_until = None;
            flipped = true;
            cmds.extend(self.gain_commands());
        }

        if let Some(tr) = tick.transition {
            if !flipped {
                if let Some(finished) = tr.finished {
                    self.finalize_step(finished);
                }
            }

            if tr.step_in_bar % 2 == 0 {
                cmds.push(AudioCommand::PlayTone(if tr.step_in_bar == 0 {
                    ToneKind::MetroAccent
                } else {
                    ToneKind::MetroBeat
                }));
            }

            if self.notes_gated_on() {
                match self.exercise.step(tr.global_step) {
                    Some(Step::Eighth) => cmds.push(AudioCommand::PlayTone(ToneKind::NoteEighth)),
                    Some(Step::Quarter) => cmds.push(AudioCommand::PlayTone(ToneKind::NoteQuarter)),
                    _ => {}
                }
            }
        }

        self.update_celebration(now_ms);
        cmds
    }

    /// The clock left `index`: in strict mode (and outside the listen phase)
    /// an un-tapped onset becomes a miss. A recorded hit always wins.
    fn finalize_step(&mut self, index: usize) {
        if self.config.echo_mode && self.run.phase.phase() != Phase::Play {
            return;
        }
        if !self.config.strict_mode {
            return;
        }
        if self.exercise.step(index).is_some_and(Step::is_onset) {
            self.board.mark_missed_if_unhit(index);
        }
    }

    // ── tap input ────────────────────────────────────────────────

    /// Safe to call any time; a tap while stopped implicitly starts a run.
    pub fn tap(&mut self, now_ms: f64) -> Vec<AudioCommand> {
        let mut cmds = Vec::new();
        if !self.run.running {
            cmds.extend(self.start(now_ms));
        }

        let elapsed = now_ms - self.run.started_at_ms;
        let step_ms = step_duration_ms(self.config.bpm as f64);
        let nearest = (elapsed / step_ms).round() as i64;
        let error_ms = elapsed - nearest as f64 * step_ms;
        let index = wrap_step(nearest, self.exercise.len());
        let expected = self.exercise.step(index).unwrap_or(Step::Rest);

        if self.config.echo_mode && self.run.phase.phase() != Phase::Play {
            self.board.record_listen(now_ms, error_ms);
            return cmds;
        }

        if !self.config.strict_mode {
            // free mode: every tap is a timing sample, nothing is judged
            self.board.record_free(now_ms, error_ms);
            return cmds;
        }

        if expected.is_onset() {
            let perfect = self.board.record_hit(index, now_ms, error_ms);
            if perfect && self.run.perfect_until.is_none() {
                self.run.perfect_until = Some(now_ms + PERFECT_PULSE_MS);
            }
        } else {
            self.board.record_extra(now_ms, error_ms);
        }
        cmds
    }

    fn update_celebration(&mut self, now_ms: f64) {
        if !self.config.strict_mode {
            return;
        }
        if let ScoreReport::Strict { score, .. } = self.score_report() {
            if score >= CELEBRATE_SCORE {
                self.run.celebrate_until = Some(now_ms + CELEBRATE_MS);
            }
        }
    }
}
