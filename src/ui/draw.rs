//! Rendering of the launcher screen
//!
//! ```text
//! spellbook  3/12 commands
//! ┌───────────────────────────────┐
//! │▸ git log %(branch)   history  │
//! │  git pull            update   │
//! └───────────────────────────────┘
//! > git log ma  -n 10
//!   Tab next · Backspace undo · Enter run · Esc cancel
//! ```

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use super::app::AppState;
use crate::completion::SegmentKind;
use crate::config::Command;
use crate::search;

const IDLE_HINT: &str = "↑/↓ select · Tab/Enter complete · Esc quit";
const COMPLETING_HINT: &str = "Tab next · Backspace undo · Enter run · Esc cancel";

pub fn draw(frame: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_list(frame, app, chunks[1]);
    draw_input(frame, app, chunks[2]);
    draw_status(frame, app, chunks[3]);
}

fn draw_header(frame: &mut Frame, app: &AppState, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            "spellbook",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}/{} commands", app.filtered.len(), app.commands.len()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_list(frame: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));

    if app.filtered.is_empty() {
        let empty = Paragraph::new("No matching commands")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    // Highlight only while the buffer is the query
    let query = if app.input.is_completing() {
        ""
    } else {
        app.input.text()
    };
    let width = app
        .filtered_commands()
        .map(|c| c.command.chars().count())
        .max()
        .unwrap_or(0);

    let items: Vec<ListItem<'_>> = app
        .filtered_commands()
        .map(|command| command_item(command, query, width))
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(app.selected));

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Rgb(42, 88, 116))
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn command_item<'a>(command: &'a Command, query: &str, width: usize) -> ListItem<'a> {
    let matched = if query.is_empty() {
        Vec::new()
    } else {
        search::match_indices(&command.command, query)
    };

    let mut spans: Vec<Span<'a>> = command
        .command
        .chars()
        .enumerate()
        .map(|(idx, ch)| {
            let style = if matched.contains(&idx) {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Span::styled(ch.to_string(), style)
        })
        .collect();

    if !command.description.is_empty() {
        let pad = width.saturating_sub(command.command.chars().count()) + 2;
        spans.push(Span::raw(" ".repeat(pad)));
        spans.push(Span::styled(
            command.description.as_str(),
            Style::default().fg(Color::DarkGray),
        ));
    }

    ListItem::new(Line::from(spans))
}

fn draw_input(frame: &mut Frame, app: &AppState, area: Rect) {
    let text = app.input.text();
    let mut spans = vec![Span::styled(
        app.prompt.as_str(),
        Style::default().fg(Color::Magenta),
    )];

    if !app.input.is_completing() {
        if text.is_empty() {
            spans.push(Span::styled(
                app.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            ));
        } else {
            spans.push(Span::raw(text));
        }
    } else {
        for segment in app.input.segments() {
            let piece: String = text
                .chars()
                .skip(segment.range.start)
                .take(segment.range.len())
                .collect();
            let style = match segment.kind {
                SegmentKind::Literal => Style::default().fg(Color::White),
                SegmentKind::Variable => Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
                SegmentKind::Pending => Style::default().fg(Color::White),
            };
            spans.push(Span::styled(piece, style));
        }
        if let Some(preview) = app.input.next_literal_preview() {
            spans.push(Span::styled(preview, Style::default().fg(Color::DarkGray)));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);

    let offset = app.prompt.chars().count() + app.input.cursor();
    let x = area
        .x
        .saturating_add(u16::try_from(offset).unwrap_or(u16::MAX))
        .min(area.right().saturating_sub(1));
    frame.set_cursor_position((x, area.y));
}

fn draw_status(frame: &mut Frame, app: &AppState, area: Rect) {
    let line = if let Some(message) = app.status() {
        Line::from(Span::styled(
            format!("  {}", message),
            Style::default().fg(Color::Red),
        ))
    } else if app.input.is_completing() {
        let mut spans = Vec::new();
        if let Some(name) = app.input.current_variable() {
            spans.push(Span::styled(
                format!("  {} ", name),
                Style::default().fg(Color::Green),
            ));
        }
        spans.push(Span::styled(
            format!("  {}", COMPLETING_HINT),
            Style::default().fg(Color::DarkGray),
        ));
        Line::from(spans)
    } else {
        Line::from(Span::styled(
            format!("  {}", IDLE_HINT),
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn render(app: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn app() -> AppState {
        AppState::new(&Config {
            commands: vec![
                Command::new("git log %(branch) -n 10", "history"),
                Command::new("ls -la", "list files"),
            ],
            ..Default::default()
        })
    }

    #[test]
    fn test_idle_screen() {
        let screen = render(&app());
        assert!(screen.contains("2/2 commands"));
        assert!(screen.contains("git log %(branch) -n 10"));
        assert!(screen.contains("list files"));
        assert!(screen.contains("> type command"));
        assert!(screen.contains("Esc quit"));
    }

    #[test]
    fn test_completion_screen_shows_preview() {
        let mut app = app();
        app.on_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        app.on_key(KeyEvent::new(KeyCode::Char('m'), KeyModifiers::NONE));

        let screen = render(&app);
        assert!(screen.contains("> git log m -n 10"));
        assert!(screen.contains("branch"));
        assert!(screen.contains("Enter run"));
    }

    #[test]
    fn test_empty_list_message() {
        let mut app = app();
        for c in "zzz".chars() {
            app.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        let screen = render(&app);
        assert!(screen.contains("No matching commands"));
        assert!(screen.contains("0/2 commands"));
    }
}
