use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::period::Period;

use super::state::App;

// ─── Color palette ──────────────────────────────────────────────────

const ACCENT: Color = Color::Cyan;
const RED: Color = Color::Red;
const DIM: Color = Color::DarkGray;
const YELLOW: Color = Color::Yellow;
const WHITE: Color = Color::White;

// ─── Main render ────────────────────────────────────────────────────

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Root layout: prompt(3) + input(3) + output(flex) + status(1)
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Prompt
            Constraint::Length(3), // Input
            Constraint::Min(5),    // Output
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_prompt(frame, root[0]);
    render_input(frame, app, root[1]);
    render_output(frame, app, root[2]);
    render_status_bar(frame, app, root[3]);

    if let Some(message) = app.error {
        render_error(frame, message, area);
    }
}

fn render_prompt(frame: &mut Frame, area: Rect) {
    let choices = Period::ALL
        .iter()
        .map(|p| format!("'{}'", p))
        .collect::<Vec<_>>()
        .join(", ");

    let prompt = Paragraph::new(vec![
        Line::from(Span::styled(
            "Enter the period of time:",
            Style::default().fg(WHITE).bold(),
        )),
        Line::from(Span::styled(format!("({})", choices), Style::default().fg(DIM))),
    ])
    .alignment(Alignment::Center);

    frame.render_widget(prompt, area);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let border = if app.running { DIM } else { ACCENT };
    let block = Block::default()
        .title(" Period ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border));

    let input = Paragraph::new(app.input.as_str()).block(block);
    frame.render_widget(input, area);

    if !app.running && app.error.is_none() {
        let typed = u16::try_from(app.input.chars().count()).unwrap_or(u16::MAX);
        let x = area.x.saturating_add(1).saturating_add(typed);
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn render_output(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Results ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(DIM));

    let body = if app.output.is_empty() {
        Paragraph::new(Span::styled("No results yet.", Style::default().fg(DIM)))
    } else {
        Paragraph::new(app.output.as_str()).scroll((app.scroll, 0))
    };

    frame.render_widget(body.block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if app.running {
        Line::from(vec![
            Span::styled(format!(" {} ", app.spinner()), Style::default().fg(YELLOW)),
            Span::styled("Fetching order history...", Style::default().fg(YELLOW)),
        ])
    } else {
        Line::from(vec![
            Span::styled(" Enter ", Style::default().fg(ACCENT).bold()),
            Span::styled("execute  ", Style::default().fg(DIM)),
            Span::styled("↑/↓ ", Style::default().fg(ACCENT).bold()),
            Span::styled("scroll  ", Style::default().fg(DIM)),
            Span::styled("Esc ", Style::default().fg(ACCENT).bold()),
            Span::styled("quit  ", Style::default().fg(DIM)),
            Span::styled(format!("CSV: {}", app.output_path), Style::default().fg(DIM)),
        ])
    };

    frame.render_widget(Paragraph::new(status), area);
}

fn render_error(frame: &mut Frame, message: &str, area: Rect) {
    let popup = centered_rect(50, 7, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(RED));

    let text = Paragraph::new(vec![
        Line::from(Span::styled(message, Style::default().fg(WHITE))),
        Line::from(""),
        Line::from(Span::styled("[Enter] OK", Style::default().fg(DIM))),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(block);

    frame.render_widget(text, popup);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let scaled = u32::from(area.width) * u32::from(percent_x) / 100;
    let width = u16::try_from(scaled)
        .unwrap_or(area.width)
        .max(30)
        .min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
