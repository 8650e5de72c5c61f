pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

const CONFIRM_RESET: &str = "Reset saved progress? (y)es / any other key to cancel";

pub(crate) fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub(crate) fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

pub(crate) fn correct_style() -> Style {
    bold().fg(Color::Green)
}

pub(crate) fn incorrect_style() -> Style {
    bold().fg(Color::Red)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // title + score
                Constraint::Min(1),    // current panel
                Constraint::Length(1), // key legend
            ])
            .split(area);

        render_header(self, chunks[0], buf);

        let screen = screen::current_screen(self.phase());
        screen.render(self, chunks[1], buf);

        Paragraph::new(Span::styled(
            screen.legend(),
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

        if self.confirm_reset {
            render_confirm(area, buf);
        }
    }
}

fn render_header(app: &App, area: Rect, buf: &mut Buffer) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    Paragraph::new(Span::styled("quizr", bold().fg(Color::Magenta))).render(halves[0], buf);

    Paragraph::new(Span::styled(format!("Score: {}", app.view.score), bold()))
        .alignment(Alignment::Right)
        .render(halves[1], buf);
}

fn render_confirm(area: Rect, buf: &mut Buffer) {
    let popup = centered(area, CONFIRM_RESET.width() as u16 + 4, 3);
    Clear.render(popup, buf);
    Paragraph::new(Span::styled(CONFIRM_RESET, bold().fg(Color::Yellow)))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Confirm"))
        .render(popup, buf);
}

/// A `width` x `height` rect in the middle of `area`, clipped to it
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Rows `text` needs when wrapped to `width` columns
pub(crate) fn wrapped_lines(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    text.width().div_ceil(width).max(1) as u16
}
