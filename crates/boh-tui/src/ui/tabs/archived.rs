use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    render_search(frame, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    render_list(frame, app, body[0]);
    render_detail(frame, app, body[1]);
}

fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    let searching = app.state == AppState::Searching;
    let query = &app.archived.search;

    let line = if query.is_empty() && !searching {
        Line::from(Span::styled(" Press / to search by handle, name or title", styles::muted_style()))
    } else {
        let cursor = if searching { "▌" } else { "" };
        Line::from(vec![
            Span::styled(" Search: ", styles::muted_style()),
            Span::styled(format!("{}{}", query, cursor), styles::search_style()),
        ])
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(searching));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let archived = &app.archived;
    let filtered = archived.filtered();

    let items: Vec<ListItem> = filtered
        .iter()
        .map(|member| {
            let line = Line::from(vec![
                Span::raw(member.heading()),
                Span::styled(format!("  {}", member.chapter), styles::muted_style()),
            ]);
            ListItem::new(line).style(styles::list_item_style())
        })
        .collect();

    let title = if archived.loading {
        " Archived Members (loading…) ".to_string()
    } else if archived.search.is_empty() {
        format!(" Archived Members ({}) ", archived.members.len())
    } else {
        format!(" Archived Members ({} of {}) ", filtered.len(), archived.members.len())
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if filtered.is_empty() && !archived.loading {
        let text = if archived.members.is_empty() {
            " No archived members"
        } else {
            " No archived members match your search"
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(text, styles::muted_style()))).block(block),
            area,
        );
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(styles::selected_style());

    let mut state = ListState::default();
    state.select(Some(archived.selection));
    frame.render_stateful_widget(list, area, &mut state);
}

fn detail_line(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), styles::muted_style()),
        Span::raw(value),
    ])
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let (title, lines) = match app.archived.selected() {
        Some(member) => {
            let mut lines = vec![
                Line::from(Span::styled(member.heading(), styles::title_style())),
                Line::from(""),
                detail_line("Chapter:", member.chapter.to_string()),
                detail_line("Title:", member.title.clone()),
                detail_line("Archived:", member.archived_at_display()),
                detail_line("By:", member.deleted_by.clone().unwrap_or_else(|| "-".to_string())),
                Line::from(""),
                Line::from(Span::styled("Reason:", styles::muted_style())),
                Line::from(
                    member
                        .deletion_reason
                        .clone()
                        .filter(|r| !r.trim().is_empty())
                        .unwrap_or_else(|| "No reason given".to_string()),
                ),
                Line::from(""),
            ];
            if app.is_admin() {
                lines.push(Line::from(vec![
                    Span::styled("[r] ", styles::help_key_style()),
                    Span::raw("Restore  "),
                    Span::styled("[D] ", styles::help_key_style()),
                    Span::styled("Delete forever", styles::error_style()),
                ]));
            }
            let export = if app.archived.exporting { "Exporting…" } else { "Export CSV" };
            lines.push(Line::from(vec![
                Span::styled("[e] ", styles::help_key_style()),
                Span::raw(export),
            ]));
            (format!(" {} ", member.handle), lines)
        }
        None => (
            " No Member Selected ".to_string(),
            vec![Line::from(Span::styled(
                "Select an archived member from the list",
                styles::muted_style(),
            ))],
        ),
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}
