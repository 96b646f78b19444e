// Procedural exercise generation: fixed-length sequences of rhythm steps,
// 8 steps per bar (4/4 at eighth-note resolution), built bar by bar.

use rand::Rng;

pub const STEPS_PER_BAR: usize = 8;
pub const MIN_BARS: usize = 8;
pub const MAX_BARS: usize = 16;

/// One slot of the step grid.
///
/// `Quarter` sounds and occupies its own slot plus the following `Tie` slot;
/// `Eighth` sounds and occupies one slot; `Rest` and `Tie` are silent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Quarter,
    Eighth,
    Rest,
    Tie,
}

impl Step {
    // only these two expect a tap
    pub fn is_onset(self) -> bool {
        matches!(self, Step::Quarter | Step::Eighth)
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Step::Quarter => "\u{2669}",  // ♩
            Step::Eighth => "\u{266A}",   // ♪
            Step::Rest => "\u{1D13D}",    // 𝄽
            Step::Tie => "",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Quarters,     // 1: quarters + rests on the beats
    Eighths,      // 2: eighths + rests on every slot
    Mixed,        // 3: irregular mix of both
}

impl Level {
    pub fn from_number(n: u8) -> Self {
        match n {
            2 => Level::Eighths,
            3 => Level::Mixed,
            _ => Level::Quarters,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Level::Quarters => 1,
            Level::Eighths => 2,
            Level::Mixed => 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exercise {
    steps: Vec<Step>,
}

impl Exercise {
    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, index: usize) -> Option<Step> {
        self.steps.get(index).copied()
    }

    pub fn bars(&self) -> usize {
        self.steps.len() / STEPS_PER_BAR
    }

    pub fn onset_count(&self) -> usize {
        self.steps.iter().filter(|s| s.is_onset()).count()
    }
}

// Generate `bars_count` independent bars and concatenate them. All randomness
// comes from the caller's rng so exercises are reproducible under a fixed seed.
pub fn generate(level: Level, bars_count: usize, rng: &mut impl Rng) -> Exercise {
    let bars = bars_count.clamp(MIN_BARS, MAX_BARS);
    let mut steps = Vec::with_capacity(bars * STEPS_PER_BAR);
    for _ in 0..bars {
        generate_bar(level, rng, &mut steps);
    }
    Exercise { steps }
}

fn generate_bar(level: Level, rng: &mut impl Rng, out: &mut Vec<Step>) {
    match level {
        Level::Quarters => {
            // one draw per beat; a quarter always drags its tie slot along
            for _beat in 0..4 {
                if rng.random::<f64>() < 0.25 {
                    out.push(Step::Rest);
                    out.push(Step::Tie);
                } else {
                    out.push(Step::Quarter);
                    out.push(Step::Tie);
                }
            }
        }
        Level::Eighths => {
            for _ in 0..STEPS_PER_BAR {
                if rng.random::<f64>() < 0.30 {
                    out.push(Step::Rest);
                } else {
                    out.push(Step::Eighth);
                }
            }
        }
        Level::Mixed => {
            let mut i = 0;
            while i < STEPS_PER_BAR {
                let roll = rng.random::<f64>();
                if roll < 0.3 && i % 2 == 0 {
                    if rng.random::<f64>() < 0.2 {
                        out.push(Step::Rest);
                    } else {
                        out.push(Step::Quarter);
                    }
                    out.push(Step::Tie);
                    i += 2;
                } else {
                    if rng.random::<f64>() < 0.3 {
                        out.push(Step::Rest);
                    } else {
                        out.push(Step::Eighth);
                    }
                    i += 1;
                }
            }
        }
    }
}
