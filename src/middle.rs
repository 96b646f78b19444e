// Middle layer: owns the Session and resolves semantic input events into
// calls on it. The TUI stays dumb on one side, the audio engine only sees
// commands on the other.

use crate::audio_api::AudioCommand;
use crate::core::{Config, Level, Session};
use crate::shared::{DisplayState, InputEvent};

pub struct Middle {
    session: Session,
}

impl Middle {
    pub fn with_config(config: Config) -> Self {
        Self { session: Session::new(config, &mut rand::rng()) }
    }

    pub fn config(&self) -> &Config {
        self.session.config()
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    /// Resolve one input event into session calls, returning the audio
    /// commands it produced.
    pub fn handle_input(&mut self, event: InputEvent, now_ms: f64) -> Vec<AudioCommand> {
        let session = &mut self.session;
        match event {
            InputEvent::Tap => session.tap(now_ms),
            InputEvent::StartStop => {
                if session.is_running() {
                    session.stop();
                    Vec::new()
                } else {
                    session.start(now_ms)
                }
            }
            InputEvent::NewExercise => {
                session.new_exercise(&mut rand::rng());
                Vec::new()
            }
            InputEvent::Restart => {
                session.restart();
                Vec::new()
            }
            InputEvent::SelectLevel(n) => {
                session.set_level(Level::from_number(n));
                Vec::new()
            }
            InputEvent::AdjustBpm(delta) => {
                let bpm = session.config().bpm.saturating_add_signed(delta);
                session.set_bpm(bpm);
                Vec::new()
            }
            InputEvent::AdjustBars(delta) => {
                let bars = session.config().bars_count.saturating_add_signed(delta as isize);
                session.set_bars_count(bars, &mut rand::rng());
                Vec::new()
            }
            InputEvent::ToggleEcho => session.toggle_echo(),
            InputEvent::ToggleStrict => {
                session.toggle_strict();
                Vec::new()
            }
            InputEvent::ToggleNotes => session.toggle_play_notes(),
            InputEvent::AdjustVolMetro(delta) => {
                let v = session.config().vol_metro + delta;
                session.set_vol_metro(v)
            }
            InputEvent::AdjustVolNotes(delta) => {
                let v = session.config().vol_notes + delta;
                session.set_vol_notes(v)
            }
            InputEvent::Quit => Vec::new(),
        }
    }

    pub fn advance(&mut self, now_ms: f64) -> Vec<AudioCommand> {
        self.session.advance(now_ms)
    }

    pub fn display_state(&self) -> DisplayState {
        let config = self.session.config();
        DisplayState {
            running: self.session.is_running(),
            bpm: config.bpm,
            level: config.level.number(),
            bars: config.bars_count,
            echo_mode: config.echo_mode,
            strict_mode: config.strict_mode,
            play_notes: config.play_notes,
            vol_metro: config.vol_metro,
            vol_notes: config.vol_notes,
            phase: self.session.phase(),
            step_index: self.session.current_step(),
            steps: self.session.exercise().steps().to_vec(),
            results: self.session.results().to_vec(),
            score: self.session.score_report(),
            perfect: self.session.perfect_flag(),
            celebrate: self.session.celebrate_flag(),
        }
    }
}
