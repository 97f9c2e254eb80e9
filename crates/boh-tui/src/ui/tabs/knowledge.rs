use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use boh_core::models::{CategoryFilter, KnowledgeCategory, KnowledgeEntry};

use crate::app::{App, EditorField, KnowledgeEditor, KnowledgeState};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let knowledge = &app.knowledge;

    if knowledge.access_denied {
        render_access_denied(frame, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    render_filter_bar(frame, knowledge, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    render_list(frame, knowledge, body[0]);
    render_detail(frame, knowledge.selected(), body[1]);

    if let Some(ref editor) = knowledge.editor {
        render_editor(frame, editor);
    }
}

fn render_access_denied(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(" Access Denied", styles::error_style())),
        Line::from(""),
        Line::from(" Only NPrez, NVP, or NSEC can manage AI knowledge."),
    ];
    let block = Block::default()
        .title(" AI Knowledge ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_filter_bar(frame: &mut Frame, knowledge: &KnowledgeState, area: Rect) {
    let mut spans = vec![Span::styled(" [f] ", styles::help_key_style())];

    let all_style = styles::tab_style(knowledge.filter == CategoryFilter::All);
    spans.push(Span::styled(format!("All ({})", knowledge.entries.len()), all_style));

    for category in KnowledgeCategory::ALL {
        spans.push(Span::styled(" | ", styles::muted_style()));
        let selected = knowledge.filter == CategoryFilter::Only(category);
        spans.push(Span::styled(
            format!("{} ({})", category.label(), knowledge.category_count(category)),
            styles::tab_style(selected),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_list(frame: &mut Frame, knowledge: &KnowledgeState, area: Rect) {
    let filtered = knowledge.filtered();

    let items: Vec<ListItem> = filtered
        .iter()
        .map(|entry| {
            let mut spans = vec![Span::raw(entry.title.clone())];
            if entry.admin_only {
                spans.push(Span::styled(" [admin]", styles::highlight_style()));
            }
            let style = if entry.is_active {
                styles::list_item_style()
            } else {
                styles::muted_style()
            };
            if !entry.is_active {
                spans.push(Span::styled(" (inactive)", styles::muted_style()));
            }
            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();

    let title = if knowledge.loading {
        " Entries (loading…) ".to_string()
    } else {
        format!(" Entries ({}) ", filtered.len())
    };
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if filtered.is_empty() && !knowledge.loading {
        let mut lines = vec![Line::from(Span::styled(" No knowledge entries", styles::muted_style()))];
        if knowledge.entries.is_empty() {
            let text = if knowledge.initializing {
                " Initializing default entries…"
            } else {
                " Press [i] to load the default entries"
            };
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(text, styles::highlight_style())));
        }
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(styles::selected_style());
    let mut state = ListState::default();
    state.select(Some(knowledge.selection));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_detail(frame: &mut Frame, selected: Option<&KnowledgeEntry>, area: Rect) {
    let (title, lines) = match selected {
        Some(entry) => {
            let status = if entry.is_active {
                Span::styled("Active", styles::success_style())
            } else {
                Span::styled("Inactive", styles::muted_style())
            };
            let mut lines = vec![
                Line::from(vec![
                    Span::styled("Category: ", styles::muted_style()),
                    Span::raw(entry.category.label()),
                ]),
                Line::from(vec![Span::styled("Status:   ", styles::muted_style()), status]),
            ];
            if entry.admin_only {
                lines.push(Line::from(Span::styled("Admin only", styles::highlight_style())));
            }
            if let Some(ref by) = entry.updated_by {
                let at = entry.updated_at.as_deref().unwrap_or("");
                lines.push(Line::from(Span::styled(
                    format!("Updated by {} {}", by, at),
                    styles::muted_style(),
                )));
            }
            lines.push(Line::from(""));
            lines.extend(entry.content.lines().map(|l| Line::from(l.to_string())));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "[e]dit  [t]oggle active  [x] delete  [n]ew",
                styles::muted_style(),
            )));
            (format!(" {} ", entry.title), lines)
        }
        None => (
            " No Entry Selected ".to_string(),
            vec![Line::from(Span::styled(
                "Select an entry, or press [n] to add one",
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

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

fn render_editor(frame: &mut Frame, editor: &KnowledgeEditor) {
    let area = centered_rect_fixed(72, 22, frame.area());
    frame.render_widget(Clear, area);

    let focus = editor.focus;
    let cursor = |field: EditorField| if focus == field { "▌" } else { "" };
    let label = |text: &'static str, field: EditorField| {
        Span::styled(format!(" {:<10}", text), styles::field_style(focus == field))
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            label("Title", EditorField::Title),
            Span::raw(format!("{}{}", editor.title.value(), cursor(EditorField::Title))),
        ]),
        Line::from(vec![label("Content", EditorField::Content)]),
    ];

    let content = editor.content.value();
    let content_lines: Vec<&str> = content.split('\n').collect();
    // Show the tail so the cursor stays on screen.
    let start = content_lines.len().saturating_sub(8);
    let last = content_lines.len().saturating_sub(1);
    for (i, text) in content_lines.iter().enumerate().skip(start) {
        let tail = if i == last { cursor(EditorField::Content) } else { "" };
        lines.push(Line::from(format!("   {}{}", text, tail)));
    }
    for _ in content_lines.len() - start..8 {
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![
        label("Category", EditorField::Category),
        Span::raw(format!("◀ {} ▶", editor.draft.category.label())),
    ]));
    lines.push(Line::from(vec![
        label("Active", EditorField::Active),
        Span::raw(checkbox(editor.draft.is_active)),
    ]));
    lines.push(Line::from(vec![
        label("Admin only", EditorField::AdminOnly),
        Span::raw(checkbox(editor.draft.admin_only)),
    ]));
    lines.push(Line::from(""));

    let hint = if editor.saving {
        " Saving…"
    } else {
        " Tab: next field  Space: toggle  Ctrl+S: save  Esc: cancel"
    };
    lines.push(Line::from(Span::styled(hint, styles::muted_style())));
    if let Some(ref error) = editor.error {
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }

    let title = if editor.is_editing() { " Edit Knowledge Entry " } else { " New Knowledge Entry " };
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
