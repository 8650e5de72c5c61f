use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use crate::app::App;
use crate::controller::QuestionView;
use crate::session::Phase;
use crate::ui::{bold, correct_style, dim, incorrect_style, wrapped_lines};

/// One panel of the quiz: draws itself and names its keys
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
    fn legend(&self) -> &'static str;
}

/// Domain filters, question count and shuffle toggle
pub struct StartScreen;

impl Screen for StartScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let panel = &app.start;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(panel.domains.len() as u16 + 2),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        let lines: Vec<Line> = panel
            .domains
            .iter()
            .enumerate()
            .map(|(idx, d)| {
                let mark = if d.checked { "[x]" } else { "[ ]" };
                let style = if idx == panel.cursor {
                    bold().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(format!("{mark} {}", d.name), style))
            })
            .collect();

        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Domains"))
            .render(chunks[0], buf);

        let settings = Line::from(vec![
            Span::raw("Questions: "),
            Span::styled(format!("{}_", panel.count_input), bold()),
            Span::raw("   Shuffle: "),
            Span::styled(if panel.shuffle { "ON" } else { "OFF" }, bold()),
        ]);
        Paragraph::new(settings)
            .block(Block::default().borders(Borders::ALL).title("Settings"))
            .render(chunks[1], buf);

        if let Some(message) = &app.message {
            Paragraph::new(Span::styled(message.as_str(), bold().fg(Color::Yellow)))
                .alignment(Alignment::Center)
                .render(chunks[2], buf);
        }
    }

    fn legend(&self) -> &'static str {
        "↑/↓ move  (space) toggle  (a)ll  (c)lear  (s)huffle  +/- or digits count  (enter) start  (esc)ape"
    }
}

/// The question card
pub struct QuestionScreen;

impl Screen for QuestionScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let Some(question) = &app.view.question else {
            return;
        };

        let question_lines = wrapped_lines(&question.text, area.width);
        let explanation_lines = if app.show_explanation {
            wrapped_lines(&question.explanation, area.width.saturating_sub(2)) + 2
        } else {
            0
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),                                 // resume banner
                Constraint::Length(1),                                 // domain
                Constraint::Length(3),                                 // progress
                Constraint::Length(question_lines + 1),                // question
                Constraint::Length(question.options.len() as u16 + 2), // options
                Constraint::Length(explanation_lines),
                Constraint::Min(0),
            ])
            .split(area);

        if let Some(resumed) = &app.view.resumed {
            Paragraph::new(Span::styled(
                resumed.describe(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);
        }

        Paragraph::new(Span::styled(format!("Domain: {}", question.domain), dim()))
            .render(chunks[1], buf);

        Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Progress"))
            .gauge_style(Style::default().fg(Color::Magenta))
            .percent(app.view.progress_percent.min(100))
            .label(app.view.progress_label.clone())
            .render(chunks[2], buf);

        Paragraph::new(Span::styled(question.text.as_str(), bold()))
            .wrap(Wrap { trim: true })
            .render(chunks[3], buf);

        render_options(question, app.option_cursor, chunks[4], buf);

        if app.show_explanation {
            Paragraph::new(question.explanation.as_str())
                .wrap(Wrap { trim: true })
                .style(Style::default().add_modifier(Modifier::ITALIC))
                .block(Block::default().borders(Borders::ALL).title("Explanation"))
                .render(chunks[5], buf);
        }
    }

    fn legend(&self) -> &'static str {
        "1-9 or ↑/↓+(enter) answer  (e)xplanation  (n)ext  (R)eset progress  (esc)ape"
    }
}

fn render_options(question: &QuestionView, cursor: usize, area: Rect, buf: &mut Buffer) {
    let answered = question.answered.as_ref();

    let lines: Vec<Line> = question
        .options
        .iter()
        .enumerate()
        .map(|(idx, option)| {
            let text = format!("{}. {}", idx + 1, option);
            let style = match answered {
                Some(a) if *option == a.correct_option => correct_style(),
                Some(a) if *option == a.selected => incorrect_style(),
                Some(_) => dim(),
                None if idx == cursor => bold().add_modifier(Modifier::REVERSED),
                None => Style::default(),
            };
            Line::from(Span::styled(text, style))
        })
        .collect();

    let title = match answered {
        Some(a) if a.is_correct => Span::styled("Correct!", correct_style()),
        Some(_) => Span::styled("Incorrect", incorrect_style()),
        None => Span::raw("Options"),
    };

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .render(area, buf);
}

/// Final score
pub struct EndScreen;

impl Screen for EndScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let (score, total) = app.view.final_score.unwrap_or((app.view.score, app.view.total));
        let percent = crate::util::percent(score, total);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        Paragraph::new(Span::styled(
            format!("You scored {score} / {total}"),
            bold().fg(Color::Magenta),
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        Paragraph::new(Span::styled(format!("{percent}%"), dim()))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }

    fn legend(&self) -> &'static str {
        "(r)etry  (R)eset progress  (esc)ape"
    }
}

/// The screen to draw for a session phase
pub fn current_screen(phase: Phase) -> Box<dyn Screen> {
    match phase {
        Phase::NotStarted => Box::new(StartScreen),
        Phase::InProgress => Box::new(QuestionScreen),
        Phase::Finished => Box::new(EndScreen),
    }
}
