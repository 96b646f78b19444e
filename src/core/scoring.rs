// Tap evaluation and score aggregation. The board owns per-step results,
// the parallel "already hit" flags, the extras counter, and a bounded tap
// history; the session decides which recording path a tap takes.

use std::collections::VecDeque;

use super::exercise::Exercise;

/// Only the most recent taps feed the timing statistics.
pub const TAP_HISTORY_CAP: usize = 50;
/// A hit within this signed error window triggers the perfect pulse.
pub const PERFECT_WINDOW_MS: f64 = 45.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StepResult {
    #[default]
    None,
    Hit,
    Miss,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapKind {
    Hit,
    Extra,
    Listen,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TapEvent {
    pub when_ms: f64,
    pub error_ms: f64,
    pub kind: TapKind,
}

/// Score snapshot, recomputed on demand. "No data yet" is distinct from a
/// zero score so the presentation can prompt instead of shaming.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScoreReport {
    /// Echo mode, not in the play phase: taps are not being judged.
    Listening,
    /// Free mode with no taps recorded yet.
    NoData,
    Free {
        score: u32,
        mean_abs_ms: f64,
        taps: usize,
    },
    Strict {
        score: u32,
        onsets: usize,
        hits: usize,
        misses: usize,
        extras: u32,
        mean_abs_ms: Option<f64>,
    },
}

#[derive(Clone, Debug, Default)]
pub struct ScoreBoard {
    results: Vec<StepResult>,
    hit_flags: Vec<bool>,
    extras: u32,
    taps: VecDeque<TapEvent>,
}

impl ScoreBoard {
    pub fn new(exercise_len: usize) -> Self {
        Self {
            results: vec![StepResult::None; exercise_len],
            hit_flags: vec![false; exercise_len],
            extras: 0,
            taps: VecDeque::new(),
        }
    }

    /// Hard reset, resized to the (possibly new) exercise.
    pub fn reset(&mut self, exercise_len: usize) {
        self.results.clear();
        self.results.resize(exercise_len, StepResult::None);
        self.hit_flags.clear();
        self.hit_flags.resize(exercise_len, false);
        self.extras = 0;
        self.taps.clear();
    }

    pub fn results(&self) -> &[StepResult] {
        &self.results
    }

    pub fn extras(&self) -> u32 {
        self.extras
    }

    pub fn taps(&self) -> impl Iterator<Item = &TapEvent> {
        self.taps.iter()
    }

    pub fn tap_count(&self) -> usize {
        self.taps.len()
    }

    /// The clock left `index` without a tap landing on it. A hit that was
    /// already recorded is never downgraded.
    pub fn mark_missed_if_unhit(&mut self, index: usize) {
        if index >= self.results.len() || self.hit_flags[index] {
            return;
        }
        if self.results[index] != StepResult::Hit {
            self.results[index] = StepResult::Miss;
        }
    }

    /// A tap landed on an onset step. Marking a hit is permanent for the
    /// index: it overrides a prior miss and repeat hits are harmless.
    /// Returns true when the tap is inside the perfect window.
    pub fn record_hit(&mut self, index: usize, when_ms: f64, error_ms: f64) -> bool {
        if index < self.results.len() {
            self.hit_flags[index] = true;
            self.results[index] = StepResult::Hit;
        }
        self.push_tap(TapEvent { when_ms, error_ms, kind: TapKind::Hit });
        error_ms.abs() <= PERFECT_WINDOW_MS
    }

    /// A tap landed on a rest or tie slot.
    pub fn record_extra(&mut self, when_ms: f64, error_ms: f64) {
        self.extras += 1;
        self.push_tap(TapEvent { when_ms, error_ms, kind: TapKind::Extra });
    }

    /// Free mode: every tap is a timing sample, nothing else moves.
    pub fn record_free(&mut self, when_ms: f64, error_ms: f64) {
        self.push_tap(TapEvent { when_ms, error_ms, kind: TapKind::Hit });
    }

    /// Listen phase: recorded for the history but excluded from scoring.
    pub fn record_listen(&mut self, when_ms: f64, error_ms: f64) {
        self.push_tap(TapEvent { when_ms, error_ms, kind: TapKind::Listen });
    }

    fn push_tap(&mut self, tap: TapEvent) {
        if self.taps.len() == TAP_HISTORY_CAP {
            self.taps.pop_front();
        }
        self.taps.push_back(tap);
    }

    fn mean_abs_hit_error(&self) -> Option<f64> {
        let errors: Vec<f64> = self
            .taps
            .iter()
            .filter(|t| t.kind == TapKind::Hit)
            .map(|t| t.error_ms.abs())
            .collect();
        if errors.is_empty() {
            None
        } else {
            Some(errors.iter().sum::<f64>() / errors.len() as f64)
        }
    }

    pub fn free_report(&self) -> ScoreReport {
        match self.mean_abs_hit_error() {
            None => ScoreReport::NoData,
            Some(mean_abs) => {
                let score = (100.0 * (1.0 - (mean_abs / 150.0).clamp(0.0, 1.0))).round() as u32;
                ScoreReport::Free { score, mean_abs_ms: mean_abs, taps: self.taps.len() }
            }
        }
    }

    pub fn strict_report(&self, exercise: &Exercise) -> ScoreReport {
        let onsets = exercise.onset_count();
        let hits = self.results.iter().filter(|r| **r == StepResult::Hit).count();
        let misses = self.results.iter().filter(|r| **r == StepResult::Miss).count();
        let mean_abs = self.mean_abs_hit_error();

        let reading_acc = if onsets > 0 { hits as f64 / onsets as f64 } else { 0.0 };
        let timing_bonus = match mean_abs {
            None => 0.6,
            Some(m) => (1.0 - m / 120.0).clamp(0.0, 1.0),
        };
        let penalty =
            (misses as f64 * 0.15 + self.extras as f64 * 0.10).clamp(0.0, 0.9);
        let score = (100.0 * (reading_acc * 0.7 + timing_bonus * 0.3 - penalty).clamp(0.0, 1.0))
            .round() as u32;

        ScoreReport::Strict {
            score,
            onsets,
            hits,
            misses,
            extras: self.extras,
            mean_abs_ms: mean_abs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::exercise::Step;

    fn exercise_of(steps: Vec<Step>) -> Exercise {
        Exercise::from_steps(steps)
    }

    #[test]
    fn a_hit_is_never_downgraded_to_a_miss() {
        let mut board = ScoreBoard::new(8);
        board.record_hit(3, 0.0, 12.0);
        board.mark_missed_if_unhit(3);
        board.mark_missed_if_unhit(3);
        assert_eq!(board.results()[3], StepResult::Hit);
    }

    #[test]
    fn a_hit_overrides_a_prior_miss() {
        let mut board = ScoreBoard::new(8);
        board.mark_missed_if_unhit(2);
        assert_eq!(board.results()[2], StepResult::Miss);
        board.record_hit(2, 100.0, -20.0);
        assert_eq!(board.results()[2], StepResult::Hit);
    }

    #[test]
    fn perfect_window_is_45ms_inclusive() {
        let mut board = ScoreBoard::new(8);
        assert!(board.record_hit(0, 0.0, 45.0));
        assert!(board.record_hit(1, 0.0, -45.0));
        assert!(!board.record_hit(2, 0.0, 45.1));
    }

    #[test]
    fn tap_history_is_capped_at_fifty_dropping_the_oldest() {
        let mut board = ScoreBoard::new(8);
        for i in 0..60 {
            board.record_free(i as f64, i as f64);
        }
        assert_eq!(board.tap_count(), TAP_HISTORY_CAP);
        assert_eq!(board.taps().next().unwrap().when_ms, 10.0);
    }

    #[test]
    fn free_report_matches_the_formula() {
        let mut board = ScoreBoard::new(8);
        let errors = [10.0, -5.0, 30.0, -45.0, 0.0, 12.0, -8.0, 20.0, -15.0, 6.0];
        for (i, e) in errors.iter().enumerate() {
            board.record_free(i as f64, *e);
        }
        let mean_abs = errors.iter().map(|e: &f64| e.abs()).sum::<f64>() / errors.len() as f64;
        match board.free_report() {
            ScoreReport::Free { score, mean_abs_ms, taps } => {
                assert!((mean_abs_ms - mean_abs).abs() < 1e-9);
                assert_eq!(score, (100.0 * (1.0 - mean_abs / 150.0)).round() as u32);
                assert_eq!(taps, errors.len());
            }
            other => panic!("expected a free report, got {other:?}"),
        }
    }

    #[test]
    fn free_report_with_no_taps_is_no_data_not_zero() {
        let board = ScoreBoard::new(8);
        assert_eq!(board.free_report(), ScoreReport::NoData);
    }

    #[test]
    fn strict_report_uses_the_default_timing_bonus_without_samples() {
        let ex = exercise_of(vec![
            Step::Quarter, Step::Tie, Step::Eighth, Step::Eighth,
            Step::Rest, Step::Eighth, Step::Quarter, Step::Tie,
        ]);
        let board = ScoreBoard::new(ex.len());
        match board.strict_report(&ex) {
            ScoreReport::Strict { score, onsets, hits, misses, extras, mean_abs_ms } => {
                assert_eq!(onsets, 5);
                assert_eq!((hits, misses, extras), (0, 0, 0));
                assert_eq!(mean_abs_ms, None);
                // reading 0.0 * 0.7 + default bonus 0.6 * 0.3 = 0.18
                assert_eq!(score, 18);
            }
            other => panic!("expected a strict report, got {other:?}"),
        }
    }

    #[test]
    fn strict_report_applies_miss_and_extra_penalties() {
        let ex = exercise_of(vec![
            Step::Eighth, Step::Eighth, Step::Eighth, Step::Eighth,
            Step::Rest, Step::Rest, Step::Rest, Step::Rest,
        ]);
        let mut board = ScoreBoard::new(ex.len());
        board.record_hit(0, 0.0, 0.0);
        board.record_hit(1, 0.0, 0.0);
        board.mark_missed_if_unhit(2);
        board.mark_missed_if_unhit(3);
        board.record_extra(0.0, 10.0);
        match board.strict_report(&ex) {
            ScoreReport::Strict { score, hits, misses, extras, .. } => {
                assert_eq!((hits, misses, extras), (2, 2, 1));
                // 0.5*0.7 + 1.0*0.3 - (2*0.15 + 0.10) = 0.25
                assert_eq!(score, 25);
            }
            other => panic!("expected a strict report, got {other:?}"),
        }
    }

    #[test]
    fn strict_score_with_no_onsets_has_zero_reading_accuracy() {
        let ex = exercise_of(vec![Step::Rest; 8]);
        let board = ScoreBoard::new(ex.len());
        match board.strict_report(&ex) {
            ScoreReport::Strict { score, onsets, .. } => {
                assert_eq!(onsets, 0);
                assert_eq!(score, 18);
            }
            other => panic!("expected a strict report, got {other:?}"),
        }
    }
}
