use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use boh_core::models::DuesStatus;
use boh_core::reports::{DuesPreview, ReportKind, StatusStyle};

use crate::app::{App, ReportField, ReportsState};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(38), Constraint::Min(30)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(8)])
        .split(chunks[0]);

    render_filters(frame, &app.reports, left[0]);
    render_actions(frame, &app.reports, left[1]);

    if app.reports.showing_preview {
        render_preview(frame, &app.reports, chunks[1]);
    } else {
        render_intro(frame, chunks[1]);
    }
}

fn filter_line(label: &str, value: String, focused: bool) -> Line<'static> {
    let (left, right) = if focused { ("◀ ", " ▶") } else { ("  ", "  ") };
    Line::from(vec![
        Span::styled(format!(" {:<9}", label), styles::muted_style()),
        Span::styled(left, styles::highlight_style()),
        Span::styled(value, styles::field_style(focused)),
        Span::styled(right, styles::highlight_style()),
    ])
}

fn render_filters(frame: &mut Frame, reports: &ReportsState, area: Rect) {
    let filter = &reports.filter;
    let lines = vec![
        Line::from(""),
        filter_line("Year", filter.year.to_string(), reports.field == ReportField::Year),
        filter_line(
            "Quarter",
            filter.quarter.label().to_string(),
            reports.field == ReportField::Quarter,
        ),
        filter_line(
            "Chapter",
            filter.chapter.label().to_string(),
            reports.field == ReportField::Chapter,
        ),
    ];

    let block = Block::default()
        .title(" Filters [↑↓ ←→] ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn report_key(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Attendance => "a",
        ReportKind::Dues => "d",
        ReportKind::Prospects => "r",
    }
}

fn render_actions(frame: &mut Frame, reports: &ReportsState, area: Rect) {
    let mut lines = vec![Line::from("")];

    for kind in ReportKind::ALL {
        let busy = reports.downloading == Some(kind);
        let mut spans = vec![
            Span::styled(format!(" [{}] ", report_key(kind)), styles::help_key_style()),
            Span::raw(kind.title()),
        ];
        if busy {
            spans.push(Span::styled("  downloading…", styles::highlight_style()));
        } else if !kind.uses_chapter() {
            spans.push(Span::styled("  (all chapters)", styles::muted_style()));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" [v] ", styles::help_key_style()),
        Span::raw(if reports.showing_preview { "Close dues preview" } else { "Preview dues" }),
    ]));
    let print_label = if reports.printing { "Printing…" } else { "Print dues preview" };
    lines.push(Line::from(vec![
        Span::styled(" [p] ", styles::help_key_style()),
        Span::raw(print_label),
    ]));

    let block = Block::default()
        .title(" Downloads ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_intro(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(" Quarterly Reports", styles::title_style())),
        Line::from(""),
        Line::from(" Pick a year, quarter and chapter, then download a CSV."),
        Line::from(" Files are saved to the export directory."),
        Line::from(""),
        Line::from(Span::styled(
            " Press [v] to preview dues on screen before printing.",
            styles::muted_style(),
        )),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn legend_spans(preview: &DuesPreview) -> Vec<Span<'static>> {
    let mut spans = vec![Span::styled(format!(" {} ", preview.footer()), styles::muted_style())];
    for (status, count) in preview.status_totals() {
        let name = match status {
            DuesStatus::Paid => "Paid",
            DuesStatus::Late => "Late",
            DuesStatus::Unpaid => "Unpaid",
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(StatusStyle::of(status).glyph, styles::dues_style(status)));
        spans.push(Span::styled(format!(" {} ({})", name, count), styles::muted_style()));
    }
    spans
}

fn render_preview(frame: &mut Frame, reports: &ReportsState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);

    let preview = match (&reports.preview, reports.loading_members) {
        (Some(preview), false) => preview,
        (_, loading) => {
            let text = if loading { " Loading members…" } else { " No preview loaded" };
            let block = Block::default()
                .title(" Dues Preview ")
                .title_style(styles::title_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true));
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(text, styles::muted_style()))).block(block),
                area,
            );
            return;
        }
    };

    let block = Block::default()
        .title(format!(" {} ", preview.title()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if preview.is_empty() {
        let text = Line::from(Span::styled(" No members found for this filter", styles::muted_style()));
        frame.render_widget(Paragraph::new(text).block(block), chunks[0]);
    } else {
        let mut header_cells = vec![Cell::from("Member"), Cell::from("Ch.")];
        header_cells.extend(preview.month_headers().into_iter().map(Cell::from));
        let header = Row::new(header_cells).style(styles::title_style()).height(1);

        let rows: Vec<Row> = preview
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![
                    Cell::from(row.label.clone()),
                    Cell::from(Span::styled(row.chapter.to_string(), styles::muted_style())),
                ];
                cells.extend(row.cells.iter().map(|status| {
                    Cell::from(Span::styled(StatusStyle::of(*status).glyph, styles::dues_style(*status)))
                }));
                Row::new(cells).style(styles::list_item_style())
            })
            .collect();

        let mut widths = vec![Constraint::Min(16), Constraint::Length(4)];
        widths.extend(preview.months.iter().map(|_| Constraint::Length(4)));

        let table = Table::new(rows, widths).header(header).block(block);
        let mut state = TableState::default().with_offset(reports.scroll);
        frame.render_stateful_widget(table, chunks[0], &mut state);
    }

    frame.render_widget(Paragraph::new(Line::from(legend_spans(preview))), chunks[1]);
}
