use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::core::{Phase, STEPS_PER_BAR, ScoreReport, Step, StepResult};
use crate::shared::DisplayState;

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),  // settings / status line
            Constraint::Min(10),    // step grid, one bar per row
            Constraint::Length(6),  // score panel
        ])
        .split(area);

    draw_status(frame, sections[0], state);
    draw_grid(frame, sections[1], state);
    draw_score(frame, sections[2], state);
}

fn draw_status(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let run = if state.running { "RUNNING" } else { "STOPPED" };
    let notes = if state.echo_mode {
        "auto"
    } else if state.play_notes {
        "on"
    } else {
        "off"
    };
    let mode = if state.strict_mode { "reading" } else { "free" };

    let mut spans = vec![Span::raw(format!(
        "{run}  bpm {}  level {}  bars {}  mode {mode}  notes {notes}  vol {:.0}/{:.0}",
        state.bpm,
        state.level,
        state.bars,
        state.vol_metro * 100.0,
        state.vol_notes * 100.0,
    ))];
    match state.phase {
        Some(Phase::Listen) => spans.push(Span::styled(
            "   LISTEN — notes are played for you",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Some(Phase::Play) => spans.push(Span::styled(
            "   YOUR TURN — notes are muted, tap along",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        None => {}
    }
    if state.perfect {
        spans.push(Span::styled(
            "  PERFECT!",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
    }
    if state.celebrate {
        spans.push(Span::styled(
            "  *** 90+ ***",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ));
    }

    let block = Block::default().borders(Borders::ALL).title("rhythmo");
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

// one bar per row; ♩ drags an empty tie cell along, ♪ is one cell, 𝄽 a rest
fn draw_grid(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let mut lines = Vec::new();
    for (bar_idx, bar) in state.steps.chunks(STEPS_PER_BAR).enumerate() {
        let mut spans = vec![Span::styled(
            format!("{:>2} |", bar_idx + 1),
            Style::default().fg(Color::DarkGray),
        )];
        for (i, step) in bar.iter().enumerate() {
            let global = bar_idx * STEPS_PER_BAR + i;
            spans.push(step_cell(*step, global, state));
            if i % 2 == 1 {
                spans.push(Span::styled("|", Style::default().fg(Color::DarkGray)));
            }
        }
        lines.push(Line::from(spans));
    }

    let block = Block::default().borders(Borders::ALL).title("exercise (4/4)");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn step_cell(step: Step, global: usize, state: &DisplayState) -> Span<'static> {
    let glyph = match step {
        Step::Tie => " ",
        s => s.glyph(),
    };
    let mut style = match state.results.get(global) {
        Some(StepResult::Hit) => Style::default().fg(Color::Green),
        Some(StepResult::Miss) => Style::default().fg(Color::Red),
        _ if step == Step::Rest => Style::default().fg(Color::DarkGray),
        _ => Style::default().fg(Color::White),
    };
    if state.running && global == state.step_index {
        style = style.bg(Color::Blue).add_modifier(Modifier::BOLD);
    }
    Span::styled(format!(" {glyph} "), style)
}

fn draw_score(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let lines = match state.score {
        ScoreReport::Listening => vec![Line::from(
            "listening to the demo — taps are not scored during LISTEN",
        )],
        ScoreReport::NoData => vec![Line::from("tap along to see your timing score")],
        ScoreReport::Free { score, mean_abs_ms, taps } => vec![
            Line::from(format!("score {score}/100 (free)")),
            Line::from(format!("mean error {mean_abs_ms:.1} ms over {taps} taps")),
        ],
        ScoreReport::Strict { score, onsets, hits, misses, extras, mean_abs_ms } => {
            let mean = match mean_abs_ms {
                Some(m) => format!("{m:.1} ms"),
                None => "—".to_string(),
            };
            vec![
                Line::from(format!("score {score}/100")),
                Line::from(format!(
                    "notes {hits}/{onsets}   miss {misses}   extra {extras}   mean {mean}"
                )),
            ]
        }
    };
    let block = Block::default().borders(Borders::ALL).title("tap");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
