mod audio;
mod audio_api;
mod core;
mod middle;
mod settings;
mod shared;
mod tui;

use std::path::PathBuf;
use std::time::Instant;

use crossterm::terminal;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use middle::Middle;
use shared::InputEvent;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope

    let base_dir: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    let config = settings::load_settings(&base_dir)
        .map(settings::Settings::into_config)
        .unwrap_or_default();
    let mut middle = Middle::with_config(config);
    let mut audio = audio::AudioOutput::new();

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    // the clock everything runs on: monotonic milliseconds since startup
    let epoch = Instant::now();
    let tick_rate = std::time::Duration::from_millis(16); // ~60fps

    loop {
        let ds = middle.display_state();
        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds);
        })?;

        let events = tui::input::poll_input(tick_rate)?;
        for event in events {
            if event == InputEvent::Quit {
                let _ = settings::save_settings(
                    &base_dir,
                    &settings::Settings::from(middle.config()),
                );
                drop(term);
                return Ok(());
            }
            // taps and starts are what first need sound
            if matches!(event, InputEvent::Tap | InputEvent::StartStop) {
                audio.ensure_started();
            }
            let now_ms = epoch.elapsed().as_secs_f64() * 1000.0;
            for cmd in middle.handle_input(event, now_ms) {
                audio.send(cmd);
            }
        }

        let now_ms = epoch.elapsed().as_secs_f64() * 1000.0;
        for cmd in middle.advance(now_ms) {
            audio.send(cmd);
        }
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
