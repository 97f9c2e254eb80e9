use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use boh_core::models::AttendanceStatus;
use boh_core::reports::{QuarterSelector, MONTH_NAMES};

use crate::app::{App, AttendanceView, MeetingField, MeetingForm, MeetingsState};
use crate::ui::render::{button_line, centered_rect_fixed, field_line};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let meetings = &app.meetings;
    match meetings.attendance {
        Some(ref view) => render_attendance(frame, view, app.is_admin(), area),
        None => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(area);
            render_meeting_list(frame, meetings, chunks[0]);
            render_summary(frame, meetings, app.is_admin(), chunks[1]);
        }
    }

    if let Some(ref form) = meetings.form {
        render_form(frame, form);
    }
}

fn render_meeting_list(frame: &mut Frame, meetings: &MeetingsState, area: Rect) {
    let header = Row::new([Cell::from("Date"), Cell::from("Meeting")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = meetings
        .meetings
        .iter()
        .map(|meeting| {
            Row::new(vec![
                Cell::from(meeting.formatted_date()),
                Cell::from(meeting.display_name().to_string()),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let title = if meetings.loading {
        format!(" Meetings {} (loading…) ", meetings.year)
    } else {
        format!(" Meetings {} ({}) ", meetings.year, meetings.meetings.len())
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if meetings.meetings.is_empty() && !meetings.loading {
        let text = Line::from(Span::styled(" No meetings recorded for this year", styles::muted_style()));
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let widths = [Constraint::Length(16), Constraint::Fill(1)];
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(meetings.selection));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_summary(frame: &mut Frame, meetings: &MeetingsState, admin: bool, area: Rect) {
    let summary = meetings.summary();
    let years: Vec<String> = meetings.years.iter().map(|y| y.to_string()).collect();

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Year:           ", styles::muted_style()),
            Span::styled(meetings.year.to_string(), styles::highlight_style()),
            Span::styled("  [y/Y]", styles::muted_style()),
        ]),
        Line::from(vec![
            Span::styled("Available:      ", styles::muted_style()),
            Span::raw(years.join(" ")),
        ]),
        Line::from(vec![
            Span::styled("Total Meetings: ", styles::muted_style()),
            Span::styled(summary.total.to_string(), styles::title_style()),
        ]),
        Line::from(""),
    ];

    for (name, count) in MONTH_NAMES.iter().zip(summary.by_month.iter()) {
        let style = if *count > 0 { styles::list_item_style() } else { styles::muted_style() };
        lines.push(Line::styled(format!("  {:<5}{:>3}", name, count), style));
    }
    if summary.undated > 0 {
        lines.push(Line::styled(format!("  {:<5}{:>3}", "?", summary.undated), styles::error_style()));
    }

    let mut quarters = vec![Span::styled("  ", styles::muted_style())];
    for (i, quarter) in QuarterSelector::CHOICES[1..].iter().enumerate() {
        quarters.push(Span::styled(format!("Q{} ", i + 1), styles::muted_style()));
        quarters.push(Span::raw(format!("{:<4}", summary.in_window(*quarter))));
    }
    lines.push(Line::from(quarters));

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" [Enter] ", styles::help_key_style()),
        Span::raw("Attendance"),
    ]));
    if admin {
        lines.push(Line::from(vec![
            Span::styled(" [n] ", styles::help_key_style()),
            Span::raw("Add meeting  "),
            Span::styled("[x] ", styles::help_key_style()),
            Span::raw("Delete"),
        ]));
    }

    let block = Block::default()
        .title(" Summary ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_attendance(frame: &mut Frame, view: &AttendanceView, admin: bool, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);

    let header = Row::new([
        Cell::from("Handle"),
        Cell::from("Ch."),
        Cell::from("Name"),
        Cell::from("Status"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = view
        .rows
        .iter()
        .map(|row| {
            let status = row.status.value;
            let (marker, marker_style) = styles::sync_marker(&row.status.sync);
            Row::new(vec![
                Cell::from(row.record.handle.clone()),
                Cell::from(Span::styled(row.record.chapter.to_string(), styles::muted_style())),
                Cell::from(row.record.name.clone()),
                Cell::from(Line::from(vec![
                    Span::styled(format!("{} {}", status.glyph(), status), styles::attendance_style(status)),
                    Span::styled(marker, marker_style),
                ])),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let title = format!(
        " {} - {} ",
        view.meeting.display_name(),
        view.meeting.formatted_date()
    );
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if view.loading {
        let text = Line::from(Span::styled(" Loading attendance…", styles::muted_style()));
        frame.render_widget(Paragraph::new(text).block(block), chunks[0]);
    } else {
        let widths = [
            Constraint::Length(16),
            Constraint::Length(5),
            Constraint::Fill(1),
            Constraint::Length(26),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(styles::selected_style());
        let mut state = TableState::default();
        state.select(Some(view.selection));
        frame.render_stateful_widget(table, chunks[0], &mut state);
    }

    let tally = view.tally();
    let mut spans = vec![Span::styled(format!(" {} members ", tally.total()), styles::muted_style())];
    for status in AttendanceStatus::ALL {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} {}", status.glyph(), tally.count(status)),
            styles::attendance_style(status),
        ));
    }
    let unsaved = view.unsaved();
    if unsaved > 0 {
        spans.push(Span::styled(format!("  {} not saved", unsaved), styles::error_style()));
    }
    let hint = if admin { "   [p/e/a] set  [Space] cycle  [Esc] back" } else { "   [Esc] back" };
    spans.push(Span::styled(hint, styles::muted_style()));
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[1]);
}

fn render_form(frame: &mut Frame, form: &MeetingForm) {
    let height = if form.error.is_some() { 12 } else { 10 };
    let area = centered_rect_fixed(56, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(""),
        field_line("Date (YYYY-MM-DD)", form.date.value(), 26, form.focus == MeetingField::Date),
        field_line("Name             ", form.name.value(), 26, form.focus == MeetingField::Name),
        Line::from(Span::styled("  Name is optional", styles::muted_style())),
        Line::from(""),
    ];
    let label = if form.submitting { "Adding…" } else { "Add Meeting" };
    lines.push(button_line(label, 18, false));
    lines.push(Line::from(Span::styled("  Enter to save, Esc to cancel", styles::muted_style())));

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    }

    let block = Block::default()
        .title(" Add Meeting ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
