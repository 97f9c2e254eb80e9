use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState, InviteFocus, InviteState, LoginFocus, Tab};

use super::styles;
use super::tabs::{archived, chat, knowledge, meetings, reports};

const LOGO: [&str; 3] = ["╔╗ ╔═╗╦ ╦", "╠╩╗║ ║╠═╣", "╚═╝╚═╝╩ ╩"];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::AcceptingInvite => {
            if let Some(invite) = app.invite.as_ref() {
                render_invite_overlay(frame, invite);
            }
        }
        AppState::Confirming => render_confirm_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Editing | AppState::Searching | AppState::Quitting => {}
    }
}

fn logo_lines(indent: usize) -> Vec<Line<'static>> {
    LOGO.iter()
        .map(|row| Line::from(Span::styled(format!("{}{}", " ".repeat(indent), row), styles::title_style())))
        .collect()
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  BOH Member Desk";
    let user = match app.session.username() {
        Some(name) if app.is_admin() => format!("{} (admin)  ", name),
        Some(name) => format!("{}  ", name),
        None => String::new(),
    };
    let help_hint = "[?] Help";
    let used = title.chars().count() + user.chars().count() + help_hint.len() + 4;

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(user, styles::highlight_style()),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in Tab::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        if *tab == app.current_tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Reports => reports::render(frame, app, area),
        Tab::Meetings => meetings::render(frame, app, area),
        Tab::Archived => archived::render(frame, app, area),
        Tab::Knowledge => knowledge::render(frame, app, area),
        Tab::Chat => chat::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (left_text, left_style) = match app.notifications.latest() {
        Some(note) => (format!(" {} ", note.message), styles::notification_style(note.level)),
        None => (" Ready ".to_string(), styles::muted_style()),
    };

    let busy = if app.is_busy() { "Working… | " } else { "" };
    let right_text = format!(" {}[u]pdate | [L]ogout | [q]uit ", busy);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(Paragraph::new(status_line).style(styles::status_bar_style()), area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(56, 36, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");
    let mut lines = logo_lines(21);
    lines.push(Line::from(Span::styled(
        format!("                  version {}", version),
        styles::muted_style(),
    )));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(" Navigation", styles::highlight_style())));
    lines.push(help_line("1-5", "Switch tabs"));
    lines.push(help_line("Tab/←/→", "Prev/next tab (←/→ edit filters on Reports)"));
    lines.push(help_line("↑/↓", "Move selection"));
    lines.push(help_line("Enter", "Open / send"));
    lines.push(help_line("Esc", "Go back / cancel"));
    lines.push(help_line("u", "Reload current tab"));
    lines.push(help_line("L", "Log out"));
    lines.push(help_line("q", "Quit"));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(" Reports", styles::highlight_style())));
    lines.push(help_line("a/d/r", "Download attendance/dues/prospects CSV"));
    lines.push(help_line("v / p", "Dues preview / print it"));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(" Meetings", styles::highlight_style())));
    lines.push(help_line("y / Y", "Older / newer year"));
    lines.push(help_line("n / x", "Add / delete meeting (admin)"));
    lines.push(help_line("p/e/a", "Present / excused / absent (admin)"));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(" Archived", styles::highlight_style())));
    lines.push(help_line("/", "Search"));
    lines.push(help_line("r / D", "Restore / delete forever (admin)"));
    lines.push(help_line("e", "Export CSV"));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(" AI Knowledge", styles::highlight_style())));
    lines.push(help_line("f", "Cycle category filter"));
    lines.push(help_line("n / e / x", "New / edit / delete entry"));
    lines.push(help_line("t / i", "Toggle active / initialize"));
    lines.push(help_line("Ctrl+S", "Save the open form"));
    lines.push(Line::from(""));

    lines.push(Line::from(vec![
        Span::styled("         Press ", styles::muted_style()),
        Span::styled("?", styles::help_key_style()),
        Span::styled(" or ", styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(" to close", styles::muted_style()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// `Label: [value▌]` input line.
pub(crate) fn field_line(label: &str, value: &str, width: usize, focused: bool) -> Line<'static> {
    let cursor = if focused { "▌" } else { "" };
    let shown: String = if value.chars().count() > width {
        value.chars().skip(value.chars().count() - width).collect()
    } else {
        value.to_string()
    };
    Line::from(vec![
        Span::styled(format!("  {}: [", label), styles::muted_style()),
        Span::styled(format!("{:<width$}{}", shown, cursor, width = width), styles::field_style(focused)),
        Span::styled("]", styles::muted_style()),
    ])
}

/// `[ ▶ Label ◀ ]` button line.
pub(crate) fn button_line(label: &str, indent: usize, focused: bool) -> Line<'static> {
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    Line::from(vec![
        Span::raw(format!("{}[", " ".repeat(indent))),
        Span::styled(text, styles::field_style(focused)),
        Span::raw("]"),
    ])
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 13 } else { 11 };
    let area = centered_rect_fixed(46, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines(17);
    lines.push(Line::from(""));

    let masked = "*".repeat(app.login_password.chars().count());
    lines.push(field_line(
        "Username",
        &app.login_username,
        18,
        app.login_focus == LoginFocus::Username,
    ));
    lines.push(field_line("Password", &masked, 18, app.login_focus == LoginFocus::Password));
    lines.push(Line::from(""));
    lines.push(button_line("Login", 14, app.login_focus == LoginFocus::Button));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }

    let block = Block::default()
        .title(" Log in ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn render_invite_overlay(frame: &mut Frame, invite: &InviteState) {
    let area = centered_rect_fixed(54, 16, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];
    match (&invite.invite, invite.loading) {
        (_, true) => lines.push(Line::from(Span::styled("  Checking invitation…", styles::muted_style()))),
        (Some(details), false) => {
            lines.push(Line::from(vec![
                Span::styled("  Invited: ", styles::muted_style()),
                Span::raw(details.email.clone()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  Role:    ", styles::muted_style()),
                Span::raw(details.role.clone()),
            ]));
        }
        (None, false) => lines.push(Line::from("")),
    }
    lines.push(Line::from(""));

    lines.push(field_line("Username        ", &invite.username.display(), 22, invite.focus == InviteFocus::Username));
    lines.push(field_line("Password        ", &invite.password.display(), 22, invite.focus == InviteFocus::Password));
    lines.push(field_line("Confirm password", &invite.confirm.display(), 22, invite.focus == InviteFocus::Confirm));
    lines.push(Line::from(""));
    let label = if invite.submitting { "Creating…" } else { "Create Account" };
    lines.push(button_line(label, 16, invite.focus == InviteFocus::Button));

    if let Some(ref error) = invite.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  Esc to cancel", styles::muted_style())));

    let block = Block::default()
        .title(" Accept Invitation ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_confirm_overlay(frame: &mut Frame, app: &App) {
    let Some(action) = app.pending_confirm.as_ref() else {
        return;
    };
    let area = centered_rect_fixed(56, 9, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!(" {}", action.prompt()), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to confirm, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(format!(" {} ", action.title()))
        .title_style(styles::error_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

/// Create a centered rectangle with fixed dimensions
pub(crate) fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 10, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines(17);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "   Are you sure you want to quit?",
        styles::highlight_style(),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("   Press ", styles::muted_style()),
        Span::styled("[Y]", styles::help_key_style()),
        Span::styled(" to quit, ", styles::muted_style()),
        Span::styled("[N]", styles::help_key_style()),
        Span::styled(" to cancel", styles::muted_style()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let r = centered_rect_fixed(46, 10, outer);
        assert_eq!(r, Rect::new(27, 15, 46, 10));

        let small = Rect::new(0, 0, 20, 5);
        let r = centered_rect_fixed(46, 10, small);
        assert_eq!(r.width, 20);
        assert_eq!(r.height, 5);
    }

    #[test]
    fn test_field_line_keeps_tail_of_long_values() {
        let line = field_line("Name", "abcdefgh", 4, false);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("[efgh]"));
    }
}
