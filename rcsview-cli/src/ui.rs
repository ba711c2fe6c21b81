use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use rcsview::{Notice, Suggestion, ViewKind};

use crate::app::{App, Mode};

const SPINNER: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

const ACCENT: Color = Color::Rgb(119, 51, 214);
const CHIP: Color = Color::Rgb(36, 36, 36);
const BUBBLE: Color = Color::Rgb(53, 199, 89);

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // status bar
        Constraint::Length(2), // candidate file chips
        Constraint::Min(3),    // preview
        Constraint::Length(1), // credential row
        Constraint::Length(1), // help bar
    ])
    .split(frame.area());

    draw_status_bar(frame, app, chunks[0]);
    draw_files(frame, app, chunks[1]);
    draw_preview(frame, app, chunks[2]);
    draw_credential(frame, app, chunks[3]);
    draw_help_bar(frame, app, chunks[4]);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        " rcsview",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];

    if app.surface.sending() {
        let spinner_char = SPINNER[app.tick % SPINNER.len()];
        spans.push(Span::styled(
            format!("  {spinner_char} Sending Message..."),
            Style::default().fg(Color::Yellow),
        ));
    }

    match &app.notice {
        Some(Notice::Info(text)) => spans.push(Span::styled(
            format!("  {text}"),
            Style::default().fg(Color::Green),
        )),
        Some(Notice::Error(text)) => spans.push(Span::styled(
            format!("  {text}"),
            Style::default().fg(Color::Red),
        )),
        None => {}
    }

    let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Rgb(30, 30, 40)));
    frame.render_widget(bar, area);
}

fn draw_files(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans: Vec<Span> = Vec::new();
    for (i, path) in app.surface.candidates().iter().enumerate() {
        let name = path.rsplit('/').next().unwrap_or(path.as_str());
        let selected = app.surface.selected() == Some(path.as_str());
        let focused = i == app.file_cursor;

        let mut style = Style::default().fg(Color::White).bg(if selected {
            ACCENT
        } else {
            CHIP
        });
        if focused {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        spans.push(Span::styled(format!(" {name} "), style));
        spans.push(Span::raw(" "));
    }
    if spans.is_empty() {
        spans.push(Span::styled(
            " no *.rcs.json documents in workspace",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let row = Paragraph::new(Line::from(spans)).wrap(Wrap { trim: false });
    frame.render_widget(row, area);
}

fn draw_preview(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.surface.view_kind() {
        ViewKind::Message => message_lines(app),
        ViewKind::Carousel => carousel_lines(app),
        ViewKind::Raw => raw_lines(app),
    };

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::NONE));
    frame.render_widget(paragraph, area);
}

fn from_to_line(app: &App, lines: &mut Vec<Line>) {
    let doc = app.surface.document();
    if doc.from.is_none() && doc.to.is_none() {
        return;
    }
    let from = doc.from.as_deref().unwrap_or("?");
    let to = doc.to.as_deref().unwrap_or("?");
    lines.push(Line::from(Span::styled(
        format!("{from} → {to}"),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));
}

fn chips_line<'a>(replies: &'a [Suggestion], lines: &mut Vec<Line<'a>>) {
    if replies.is_empty() {
        return;
    }
    let mut spans: Vec<Span> = Vec::new();
    for reply in replies {
        spans.push(Span::styled(
            format!(" {} ", reply.title),
            Style::default().fg(Color::White).bg(CHIP),
        ));
        spans.push(Span::raw(" "));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(spans));
}

fn raw_json_tail<'a>(app: &'a App, lines: &mut Vec<Line<'a>>) {
    lines.push(Line::from(""));
    for line in app.surface.text().lines() {
        lines.push(Line::from(Span::styled(
            line,
            Style::default().fg(Color::DarkGray),
        )));
    }
}

fn message_lines(app: &App) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    from_to_line(app, &mut lines);

    let doc = app.surface.document();
    if let Some(text) = &doc.text {
        lines.push(Line::from(Span::styled(
            format!(" {text} "),
            Style::default().fg(Color::White).bg(BUBBLE),
        )));
    }
    chips_line(&doc.quick_replies, &mut lines);
    raw_json_tail(app, &mut lines);
    lines
}

fn carousel_lines(app: &App) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    from_to_line(app, &mut lines);

    let count = app.surface.card_count();
    if let Some(card) = app.surface.current_card() {
        lines.push(Line::from(Span::styled(
            &*card.title,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        if let Some(subtitle) = &card.subtitle {
            lines.push(Line::from(Span::styled(
                &**subtitle,
                Style::default().fg(Color::Gray),
            )));
        }
        if let Some(url) = &card.media_url {
            lines.push(Line::from(Span::styled(
                format!("▨ {url}"),
                Style::default().fg(Color::DarkGray),
            )));
        }
        if !card.buttons.is_empty() {
            let mut spans: Vec<Span> = Vec::new();
            for button in &card.buttons {
                spans.push(Span::styled(
                    format!(" {} ", button.title),
                    Style::default().fg(Color::White).bg(CHIP),
                ));
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }
    }

    // Position dots; navigation is hidden for a single card.
    if count > 1 {
        let mut dots = String::new();
        for i in 0..count {
            dots.push(if i == app.surface.cursor() { '●' } else { '○' });
            dots.push(' ');
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("← {dots}→"),
            Style::default().fg(Color::DarkGray),
        )));
    }

    chips_line(&app.surface.document().quick_replies, &mut lines);
    raw_json_tail(app, &mut lines);
    lines
}

fn raw_lines(app: &App) -> Vec<Line<'_>> {
    app.surface
        .text()
        .lines()
        .map(|line| Line::from(Span::raw(line)))
        .collect()
}

fn draw_credential(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.mode {
        Mode::EditCredential => Line::from(vec![
            Span::styled(" API key> ", Style::default().fg(Color::Cyan)),
            Span::styled(rcsview::surface::mask(&app.input), Style::default().fg(Color::White)),
            Span::styled("▏", Style::default().fg(Color::Cyan)),
        ]),
        Mode::Normal => {
            let masked = app.surface.masked_credential();
            let display = if masked.is_empty() {
                Span::styled("(not set)", Style::default().fg(Color::DarkGray))
            } else {
                Span::styled(masked, Style::default().fg(Color::White))
            };
            Line::from(vec![
                Span::styled(" API key: ", Style::default().fg(Color::Cyan)),
                display,
            ])
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_help_bar(frame: &mut Frame, app: &App, area: Rect) {
    let key = |k: &'static str| {
        Span::styled(k, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    };
    let label =
        |t: &'static str| Span::styled(t, Style::default().fg(Color::DarkGray));

    let help = if app.mode == Mode::EditCredential {
        Line::from(vec![
            key(" Enter"),
            label(" save key  "),
            key("Esc"),
            label(" cancel"),
        ])
    } else {
        Line::from(vec![
            key(" Tab"),
            label(" next file  "),
            key("Enter"),
            label(" view  "),
            key("←→"),
            label(" cards  "),
            key("e"),
            label(" api key  "),
            key("s"),
            label(" send  "),
            key("q"),
            label(" quit"),
        ])
    };

    let bar = Paragraph::new(help).style(Style::default().bg(Color::Rgb(30, 30, 40)));
    frame.render_widget(bar, area);
}
