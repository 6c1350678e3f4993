//! TUI layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::runtime::App;
use super::style;
use crate::card::{CardView, Slide};

/// Renders the full TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(8),    // card
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    match app.view() {
        CardView::Empty { title, message } => render_empty(frame, &title, &message, chunks[1]),
        CardView::Slide {
            title,
            show_controls,
            slide,
        } => render_slide(frame, &title, show_controls, &slide, chunks[1]),
    }
    render_footer(frame, chunks[2]);
}

/// Header bar: label, demo progress, latest PV reading, run state.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let state_label = if app.is_finished() {
        "■ DONE"
    } else if app.paused {
        "‖ PAUSED"
    } else {
        "▶ RUNNING"
    };

    let reading = match &app.last {
        Some(tick) => format!(
            "{} {}",
            tick.source.state,
            tick.source.unit.as_deref().unwrap_or("")
        ),
        None => "-".to_string(),
    };

    let header = Line::from(vec![
        Span::styled(
            " SOLAR-RANGE ",
            Style::default()
                .fg(style::HEADER_FG)
                .bg(style::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(&app.label, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            " │ t={}/{} │ pv {} │ {}ms │ {} ",
            app.timestep,
            app.total_steps,
            reading,
            app.tick_interval_ms(),
            state_label,
        )),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn render_empty(frame: &mut Frame, title: &str, message: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "));
    let body = Paragraph::new(message.to_string())
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(body, area);
}

/// One slide: icon and name, the large value, the secondary line, page dots.
fn render_slide(frame: &mut Frame, title: &str, show_controls: bool, slide: &Slide, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // icon + name
            Constraint::Length(2), // value
            Constraint::Min(1),    // secondary
            Constraint::Length(1), // dots
        ])
        .split(inner);

    let name = Line::from(vec![
        Span::styled(
            format!("[{}] ", style::icon_label(&slide.icon)),
            Style::default().fg(style::FOOTER_FG),
        ),
        Span::styled(&slide.name, Style::default().add_modifier(Modifier::BOLD)),
    ]);
    frame.render_widget(Paragraph::new(name).alignment(Alignment::Center), rows[0]);

    let value_color = if slide.available {
        style::VALUE_OK
    } else {
        style::VALUE_UNAVAILABLE
    };
    let mut value = vec![Span::styled(
        &slide.value,
        Style::default()
            .fg(value_color)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(unit) = slide.unit.as_deref().filter(|_| slide.available) {
        value.push(Span::raw(format!(" {unit}")));
    }
    frame.render_widget(
        Paragraph::new(Line::from(value)).alignment(Alignment::Center),
        rows[1],
    );

    if let Some(secondary) = &slide.secondary {
        frame.render_widget(
            Paragraph::new(secondary.as_str())
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            rows[2],
        );
    }

    let mut nav: Vec<Span> = Vec::new();
    if show_controls && slide.count > 1 {
        nav.push(Span::raw("‹ "));
    }
    for (dot, active) in style::dots(slide.index, slide.count) {
        let color = if active {
            style::DOT_ACTIVE
        } else {
            style::DOT_INACTIVE
        };
        nav.push(Span::styled(format!("{dot} "), Style::default().fg(color)));
    }
    if show_controls && slide.count > 1 {
        nav.push(Span::raw("›"));
    }
    frame.render_widget(
        Paragraph::new(Line::from(nav)).alignment(Alignment::Center),
        rows[3],
    );
}

/// Footer with keybinding hints.
fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Line::from(Span::styled(
        " ←/→: slide │ 1-9,0: jump │ Space: pause │ +/-: speed │ r: restart │ q: quit",
        Style::default().fg(style::FOOTER_FG),
    ));
    frame.render_widget(Paragraph::new(footer), area);
}
