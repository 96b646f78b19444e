use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Receiver;

use crate::audio_api::AudioCommand;

mod engine;

use engine::Engine;

// Owns the output stream and the command channel into it. The stream is
// acquired lazily on the first session start; if no device is available the
// trainer keeps running and tone commands just go nowhere.
pub struct AudioOutput {
    tx: crossbeam_channel::Sender<AudioCommand>,
    pending_rx: Option<Receiver<AudioCommand>>,
    stream: Option<cpal::Stream>,
    failed: bool,
}

impl AudioOutput {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(1024);
        Self { tx, pending_rx: Some(rx), stream: None, failed: false }
    }

    pub fn send(&self, cmd: AudioCommand) {
        let _ = self.tx.try_send(cmd);
    }

    // Idempotent: the first call builds and plays the stream, later calls
    // (and calls after a failed attempt) do nothing.
    pub fn ensure_started(&mut self) {
        if self.stream.is_some() || self.failed {
            return;
        }
        let rx = match self.pending_rx.take() {
            Some(rx) => rx,
            None => return,
        };
        match build_output_stream(rx) {
            Ok(stream) => self.stream = Some(stream),
            Err(e) => {
                // session runs on in silence
                eprintln!("rhythmo: audio unavailable, running silent: {e}");
                self.failed = true;
            }
        }
    }
}

fn build_output_stream(rx: Receiver<AudioCommand>) -> anyhow::Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let supported = device.default_output_config().context("no default output config")?;

    if supported.sample_format() != cpal::SampleFormat::F32 {
        anyhow::bail!("unsupported sample format (only f32 supported for now)");
    }

    let config: cpal::StreamConfig = supported.into();
    let channels = config.channels as usize;
    let mut engine = Engine::new(config.sample_rate);

    let err_fn = |err| eprintln!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }
            for frame in data.chunks_mut(channels) {
                let s = engine.next_sample();
                for out in frame {
                    *out = s;
                }
            }
        },
        err_fn,
        None,
    )?;
    stream.play().context("failed to play output stream")?;

    Ok(stream)
}
