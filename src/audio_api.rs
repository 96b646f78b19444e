// Protocol between the trainer and the audio engine. The engine can't do
// anything blocking in its callback, so everything it needs arrives as one
// of these commands over a bounded channel.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToneKind {
    MetroAccent,
    MetroBeat,
    NoteEighth,
    NoteQuarter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GainChannel {
    Metro,
    Notes,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AudioCommand {
    PlayTone(ToneKind),
    SetGain { channel: GainChannel, value: f32 },
}

impl ToneKind {
    pub fn channel(self) -> GainChannel {
        match self {
            ToneKind::MetroAccent | ToneKind::MetroBeat => GainChannel::Metro,
            ToneKind::NoteEighth | ToneKind::NoteQuarter => GainChannel::Notes,
        }
    }
}
