pub mod board;
pub mod screen;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};
use recall::{difficulty::Difficulty, run_log::ResultRecord};
use unicode_width::UnicodeWidthStr;

use crate::{
    ui::board::{card_rects, CardFace, CardView},
    App,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Rect the cards are drawn into, for a frame of size `area`.
/// Mouse hit testing has to use the same split as rendering.
pub fn board_area(area: Rect) -> Rect {
    game_chunks(area)[2]
}

fn game_chunks(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // score / clicks
            Constraint::Length(1), // timer
            Constraint::Min(3),    // board
            Constraint::Length(1), // legend
        ])
        .split(area)
}

/// `mr-mime` -> `Mr Mime`
pub fn display_name(name: &str) -> String {
    name.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .join(" ")
}

/// Cut `text` down to at most `width` terminal columns.
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    for c in text.chars() {
        if out.width() + c.to_string().width() > width.saturating_sub(1) {
            break;
        }
        out.push(c);
    }
    out.push('…');
    out
}

pub fn render_game(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = game_chunks(area);
    let Some(session) = app.controller.session() else {
        return;
    };

    Paragraph::new(Span::styled(session.status_line(), bold_style))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    Paragraph::new(Span::styled(
        session.timer_line(app.controller.now()),
        dim_bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let rects = card_rects(chunks[2], app.board.len(), app.config.grid_columns);
    for (pos, (card, rect)) in app.board.cards().iter().zip(rects).enumerate() {
        let name = card
            .token
            .and_then(|t| session.token(t))
            .map(|t| display_name(&t.name))
            .unwrap_or_default();
        render_card(card, &name, pos == app.cursor, rect, buf);
    }

    Paragraph::new(Span::styled(
        "(arrows) move / (space) flip / (q) quit round",
        italic_style,
    ))
    .render(chunks[3], buf);
}

fn render_card(card: &CardView, name: &str, focused: bool, area: Rect, buf: &mut Buffer) {
    let border_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let (label, label_style) = match card.face {
        CardFace::Down => ("?".to_string(), Style::default().add_modifier(Modifier::DIM)),
        CardFace::Up => (
            name.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        CardFace::Matched => (
            name.to_string(),
            Style::default().fg(Color::Green).add_modifier(Modifier::DIM),
        ),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if card.face == CardFace::Matched {
            BorderType::Plain
        } else {
            BorderType::Rounded
        })
        .border_style(border_style);
    let inner = block.inner(area);
    block.render(area, buf);

    if inner.height == 0 {
        return;
    }
    let middle = Rect {
        y: inner.y + inner.height / 2,
        height: 1,
        ..inner
    };
    Paragraph::new(Span::styled(fit(&label, inner.width as usize), label_style))
        .alignment(Alignment::Center)
        .render(middle, buf);
}

pub fn render_setup(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // padding
            Constraint::Length(1), // difficulty picker
            Constraint::Length(1), // selected preset details
            Constraint::Length(1), // status / error
            Constraint::Min(1),    // run log
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled("recall", magenta_style.patch(bold_style)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let spans = Difficulty::ALL.iter().map(|d| {
        if *d == app.difficulty {
            Span::styled(
                format!("[{d}]"),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(format!(" {d} "), Style::default().add_modifier(Modifier::DIM))
        }
    });
    let picker: Vec<Span> = Itertools::intersperse(spans, Span::raw("  ")).collect();
    Paragraph::new(Line::from(picker))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let preset = app.difficulty.preset();
    Paragraph::new(Span::styled(
        format!("{} pairs in {} s", preset.pair_count, preset.duration_secs),
        italic_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    if let Some(status) = &app.status {
        Paragraph::new(Span::styled(status.as_str(), Style::default().fg(Color::Red)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[4], buf);
    }

    let log = app.controller.run_log();
    let title = format!(" Runs ({} won / {}) ", log.wins(), log.len());
    let entries: Vec<Line> = log.newest_first().flat_map(log_entry_lines).collect();
    Paragraph::new(entries)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true })
        .render(chunks[5], buf);

    Paragraph::new(Span::styled(
        "(left/right) difficulty / (enter) start / (esc) quit",
        italic_style,
    ))
    .render(chunks[6], buf);
}

fn log_entry_lines(record: &ResultRecord) -> [Line<'static>; 4] {
    let headline_style = if record.won {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    };
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    [
        Line::from(Span::styled(record.headline(), headline_style)),
        Line::from(Span::styled(record.settings_line(), italic_style)),
        Line::from(Span::styled(record.time_line(), italic_style)),
        Line::from(Span::styled(
            record.completed_at.format("%a %b %e %Y %H:%M:%S").to_string(),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ]
}
