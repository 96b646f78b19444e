// Step clock: turns wall-clock elapsed time into a wrapping step index at
// the tempo-derived eighth-note cadence and reports boundary crossings.
// Pure with respect to time: the host feeds timestamps in, nothing here
// sleeps or schedules.

use super::exercise::STEPS_PER_BAR;

/// Duration of one eighth-note step in milliseconds.
pub fn step_duration_ms(bpm: f64) -> f64 {
    60_000.0 / bpm / 2.0
}

/// Non-negative wrap of a raw step count over the exercise length.
/// A length of 0 is treated as 1 so the modulo never divides by zero.
pub fn wrap_step(raw_step: i64, exercise_len: usize) -> usize {
    let total = exercise_len.max(1) as i64;
    (((raw_step % total) + total) % total) as usize
}

/// What a single clock poll observed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tick {
    /// A 7 -> 0 step-in-bar crossing happened: a bar just completed.
    pub bar_completed: bool,
    /// The step index changed since the previous poll.
    pub transition: Option<Transition>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Step we just left, if this run has produced one before.
    pub finished: Option<usize>,
    pub global_step: usize,
    pub step_in_bar: usize,
}

/// Tracks the last observed step so repeat polls within the same step are
/// no-ops. Reset on restart so the first poll of a run always transitions.
#[derive(Clone, Copy, Debug, Default)]
pub struct StepClock {
    last_global_step: Option<usize>,
    last_step_in_bar: Option<usize>,
}

impl StepClock {
    pub fn reset(&mut self) {
        self.last_global_step = None;
        self.last_step_in_bar = None;
    }

    pub fn current_step(&self) -> Option<usize> {
        self.last_global_step
    }

    pub fn advance(&mut self, elapsed_ms: f64, bpm: f64, exercise_len: usize) -> Tick {
        let step_ms = step_duration_ms(bpm);
        let raw_step = (elapsed_ms / step_ms).floor() as i64;
        let global_step = wrap_step(raw_step, exercise_len);
        let step_in_bar = global_step % STEPS_PER_BAR;

        // bar boundary first, so phase flips land before the new step's events
        let bar_completed =
            self.last_step_in_bar == Some(STEPS_PER_BAR - 1) && step_in_bar == 0;

        let transition = if self.last_global_step != Some(global_step) {
            let finished = self.last_global_step;
            self.last_global_step = Some(global_step);
            self.last_step_in_bar = Some(step_in_bar);
            Some(Transition { finished, global_step, step_in_bar })
        } else {
            None
        };

        Tick { bar_completed, transition }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_duration_at_60_bpm_is_500ms() {
        assert_eq!(step_duration_ms(60.0), 500.0);
    }

    #[test]
    fn boundary_between_steps_three_and_four() {
        let mut clock = StepClock::default();
        clock.advance(1999.0, 60.0, 64);
        assert_eq!(clock.current_step(), Some(3));
        let tick = clock.advance(2000.0, 60.0, 64);
        assert_eq!(clock.current_step(), Some(4));
        assert_eq!(tick.transition.unwrap().finished, Some(3));
    }

    #[test]
    fn first_poll_always_transitions_with_no_finished_step() {
        let mut clock = StepClock::default();
        let tick = clock.advance(0.0, 90.0, 64);
        let tr = tick.transition.unwrap();
        assert_eq!(tr.global_step, 0);
        assert_eq!(tr.finished, None);
        assert!(!tick.bar_completed);
    }

    #[test]
    fn repeat_polls_within_a_step_are_no_ops() {
        let mut clock = StepClock::default();
        clock.advance(0.0, 60.0, 64);
        let tick = clock.advance(499.0, 60.0, 64);
        assert_eq!(tick.transition, None);
        assert!(!tick.bar_completed);
    }

    #[test]
    fn wraps_over_the_exercise_length() {
        // 16 steps, 500ms each: elapsed 8000 is raw step 16 -> wrapped 0
        let mut clock = StepClock::default();
        clock.advance(7999.0, 60.0, 16);
        assert_eq!(clock.current_step(), Some(15));
        let tick = clock.advance(8000.0, 60.0, 16);
        assert_eq!(tick.transition.unwrap().global_step, 0);
        assert!(tick.bar_completed);
    }

    #[test]
    fn bar_completion_fires_on_the_seven_to_zero_crossing_only() {
        let mut clock = StepClock::default();
        for step in 0..8 {
            let tick = clock.advance(step as f64 * 500.0, 60.0, 64);
            assert!(!tick.bar_completed, "no bar completed during the first bar");
            assert!(tick.transition.is_some());
        }
        let tick = clock.advance(8.0 * 500.0, 60.0, 64);
        assert!(tick.bar_completed);
        assert_eq!(tick.transition.unwrap().step_in_bar, 0);
    }

    #[test]
    fn zero_length_exercise_does_not_divide_by_zero() {
        assert_eq!(wrap_step(1234, 0), 0);
        let mut clock = StepClock::default();
        let tick = clock.advance(5000.0, 120.0, 0);
        assert_eq!(tick.transition.unwrap().global_step, 0);
    }
}
