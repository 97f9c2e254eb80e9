use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use boh_core::models::ChatRole;

use crate::app::{App, AppState};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    render_transcript(frame, app, chunks[0]);
    render_input(frame, app, chunks[1]);
}

fn render_transcript(frame: &mut Frame, app: &App, area: Rect) {
    let transcript = &app.chat.transcript;
    let mut lines: Vec<Line> = Vec::new();

    for message in transcript.messages() {
        let (who, style) = match message.role {
            ChatRole::User => ("You", styles::highlight_style()),
            ChatRole::Assistant => ("Assistant", styles::title_style()),
        };
        lines.push(Line::from(Span::styled(format!("{}:", who), style)));
        lines.extend(message.content.lines().map(|l| Line::from(format!("  {}", l))));
        lines.push(Line::from(""));
    }
    if transcript.is_awaiting_reply() {
        lines.push(Line::from(Span::styled("Assistant is typing…", styles::muted_style())));
    }

    let block = Block::default()
        .title(" BOH AI Assistant ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(app.state != AppState::Editing));

    // Keep the newest lines in view; `scroll` counts lines up from the bottom.
    let inner_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2) as usize;
    let total = wrapped_height(&lines, inner_width);
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    let bottom = total.saturating_sub(inner_height);
    let offset = bottom.saturating_sub(app.chat.scroll);
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);

    frame.render_widget(paragraph.scroll((offset, 0)), area);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.state == AppState::Editing;
    let line = if editing {
        Line::from(vec![
            Span::raw(" > "),
            Span::raw(app.chat.input.clone()),
            Span::styled("▌", styles::highlight_style()),
        ])
    } else if app.chat.input.is_empty() {
        Line::from(Span::styled(" Press Enter to ask a question", styles::muted_style()))
    } else {
        Line::from(vec![Span::raw(" > "), Span::styled(app.chat.input.clone(), styles::muted_style())])
    };

    let block = Block::default()
        .title(if editing { " Message (Enter to send, Esc to stop) " } else { " Message " })
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(editing));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Rows `lines` take once wrapped to `width` columns.
fn wrapped_height(lines: &[Line], width: usize) -> usize {
    if width == 0 {
        return lines.len();
    }
    lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_height() {
        let lines = vec![Line::from("abcdefghij"), Line::from(""), Line::from("abc")];
        assert_eq!(wrapped_height(&lines, 4), 3 + 1 + 1);
        assert_eq!(wrapped_height(&lines, 20), 3);
    }
}
