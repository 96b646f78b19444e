use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::shared::InputEvent;

// poll for input within the frame budget and resolve keys into semantic
// events for the middle layer (see the key plan in shared.rs)
pub fn poll_input(timeout: Duration) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code));
    }
    Ok(vec![])
}

fn handle_key(code: KeyCode) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc => vec![InputEvent::Quit],
        KeyCode::Char(' ') => vec![InputEvent::Tap],
        KeyCode::Enter => vec![InputEvent::StartStop],

        KeyCode::Char('g') => vec![InputEvent::NewExercise],
        KeyCode::Char('r') => vec![InputEvent::Restart],

        KeyCode::Char(c @ ('1' | '2' | '3')) => {
            vec![InputEvent::SelectLevel(c as u8 - b'0')]
        }

        KeyCode::Char('[') => vec![InputEvent::AdjustBpm(-5)],
        KeyCode::Char(']') => vec![InputEvent::AdjustBpm(5)],
        KeyCode::Char('{') => vec![InputEvent::AdjustBars(-1)],
        KeyCode::Char('}') => vec![InputEvent::AdjustBars(1)],

        KeyCode::Char('e') => vec![InputEvent::ToggleEcho],
        KeyCode::Char('m') => vec![InputEvent::ToggleStrict],
        KeyCode::Char('p') => vec![InputEvent::ToggleNotes],

        KeyCode::Char(',') => vec![InputEvent::AdjustVolMetro(-0.05)],
        KeyCode::Char('.') => vec![InputEvent::AdjustVolMetro(0.05)],
        KeyCode::Char('<') => vec![InputEvent::AdjustVolNotes(-0.05)],
        KeyCode::Char('>') => vec![InputEvent::AdjustVolNotes(0.05)],

        _ => vec![],
    }
}
