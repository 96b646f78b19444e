// Tone engine that runs inside the audio callback. Four fixed tone kinds,
// each a short exponentially decaying sine, rendered from a fixed voice
// pool so the callback never allocates. Two gain buses (metronome, notes)
// sit between the voices and the output.

use crate::audio_api::{AudioCommand, GainChannel, ToneKind};

const MAX_VOICES: usize = 16; // hard cap so we won't malloc in the callback
const TONE_DURATION_S: f32 = 0.03;

// frequency / amplitude / envelope decay per tone kind
struct ToneSpec {
    freq: f32,
    amp: f32,
    decay: f32,
}

fn tone_spec(kind: ToneKind) -> ToneSpec {
    match kind {
        ToneKind::MetroAccent => ToneSpec { freq: 1900.0, amp: 0.9, decay: 90.0 },
        ToneKind::MetroBeat => ToneSpec { freq: 1250.0, amp: 0.6, decay: 120.0 },
        ToneKind::NoteEighth => ToneSpec { freq: 700.0, amp: 0.7, decay: 95.0 },
        ToneKind::NoteQuarter => ToneSpec { freq: 480.0, amp: 0.85, decay: 70.0 },
    }
}

#[derive(Clone, Copy)]
struct Voice {
    phase: f32,
    phase_inc: f32,
    amp: f32,
    decay_per_sample: f32,
    samples_left: u32,
    bus: GainChannel,
    alive: bool,
}

const SILENT: Voice = Voice {
    phase: 0.0,
    phase_inc: 0.0,
    amp: 0.0,
    decay_per_sample: 1.0,
    samples_left: 0,
    bus: GainChannel::Metro,
    alive: false,
};

pub struct Engine {
    sample_rate: f32,
    voices: [Voice; MAX_VOICES],
    gain_metro: f32,
    gain_notes: f32,
}

impl Engine {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate as f32,
            voices: [SILENT; MAX_VOICES],
            gain_metro: 0.8,
            gain_notes: 0.6,
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::PlayTone(kind) => self.trigger(kind),
            AudioCommand::SetGain { channel, value } => {
                let value = value.clamp(0.0, 1.0);
                match channel {
                    GainChannel::Metro => self.gain_metro = value,
                    GainChannel::Notes => self.gain_notes = value,
                }
            }
        }
    }

    fn trigger(&mut self, kind: ToneKind) {
        let spec = tone_spec(kind);
        // steal slot 0 if the pool is full; tones are 30ms, it won't be missed
        let slot = self.voices.iter().position(|v| !v.alive).unwrap_or(0);
        self.voices[slot] = Voice {
            phase: 0.0,
            phase_inc: std::f32::consts::TAU * spec.freq / self.sample_rate,
            amp: spec.amp,
            // per-sample factor for the exp(-t * decay) envelope
            decay_per_sample: (-spec.decay / self.sample_rate).exp(),
            samples_left: (self.sample_rate * TONE_DURATION_S) as u32,
            bus: kind.channel(),
            alive: true,
        };
    }

    pub fn next_sample(&mut self) -> f32 {
        let mut out = 0.0f32;
        for v in &mut self.voices {
            if !v.alive {
                continue;
            }
            let bus_gain = match v.bus {
                GainChannel::Metro => self.gain_metro,
                GainChannel::Notes => self.gain_notes,
            };
            out += v.amp * v.phase.sin() * bus_gain;
            v.phase += v.phase_inc;
            if v.phase > std::f32::consts::TAU {
                v.phase -= std::f32::consts::TAU;
            }
            v.amp *= v.decay_per_sample;
            v.samples_left = v.samples_left.saturating_sub(1);
            if v.samples_left == 0 || v.amp < 0.0005 {
                v.alive = false;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_triggered_tone_produces_sound_then_dies_out() {
        let mut engine = Engine::new(44_100);
        engine.handle_cmd(AudioCommand::PlayTone(ToneKind::MetroAccent));
        let heard: f32 = (0..1000).map(|_| engine.next_sample().abs()).sum();
        assert!(heard > 0.0);
        // past the 30ms window every voice is dead
        for _ in 0..44_100 / 10 {
            engine.next_sample();
        }
        assert!(engine.voices.iter().all(|v| !v.alive));
        assert_eq!(engine.next_sample(), 0.0);
    }

    #[test]
    fn a_zeroed_bus_silences_its_tones() {
        let mut engine = Engine::new(44_100);
        engine.handle_cmd(AudioCommand::SetGain { channel: GainChannel::Notes, value: 0.0 });
        engine.handle_cmd(AudioCommand::PlayTone(ToneKind::NoteQuarter));
        let heard: f32 = (0..2000).map(|_| engine.next_sample().abs()).sum();
        assert_eq!(heard, 0.0);

        // the metro bus is unaffected
        engine.handle_cmd(AudioCommand::PlayTone(ToneKind::MetroBeat));
        let heard: f32 = (0..2000).map(|_| engine.next_sample().abs()).sum();
        assert!(heard > 0.0);
    }

    #[test]
    fn gain_values_are_clamped() {
        let mut engine = Engine::new(48_000);
        engine.handle_cmd(AudioCommand::SetGain { channel: GainChannel::Metro, value: 3.0 });
        assert_eq!(engine.gain_metro, 1.0);
        engine.handle_cmd(AudioCommand::SetGain { channel: GainChannel::Metro, value: -1.0 });
        assert_eq!(engine.gain_metro, 0.0);
    }
}
