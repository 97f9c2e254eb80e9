use ratatui::style::{Color, Modifier, Style};

use boh_core::models::{AttendanceStatus, DuesStatus};
use boh_core::sync::SyncState;

use crate::app::Level;

// Color palette
pub const PRIMARY: Color = Color::Rgb(64, 128, 192);
pub const SECONDARY: Color = Color::Rgb(96, 160, 96);
pub const ACCENT: Color = Color::Rgb(192, 160, 64);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn search_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

/// Input field, highlighted when it has the cursor.
pub fn field_style(focused: bool) -> Style {
    if focused {
        selected_style()
    } else {
        list_item_style()
    }
}

pub fn notification_style(level: Level) -> Style {
    match level {
        Level::Info => muted_style(),
        Level::Success => success_style(),
        Level::Error => error_style(),
    }
}

pub fn dues_style(status: DuesStatus) -> Style {
    match status {
        DuesStatus::Paid => success_style(),
        DuesStatus::Late => highlight_style(),
        DuesStatus::Unpaid => error_style(),
    }
}

pub fn attendance_style(status: AttendanceStatus) -> Style {
    match status {
        AttendanceStatus::Present => success_style(),
        AttendanceStatus::Excused => highlight_style(),
        AttendanceStatus::Absent => error_style(),
    }
}

/// Marker drawn after a row whose last edit has not been confirmed.
pub fn sync_marker(sync: &SyncState) -> (&'static str, Style) {
    match sync {
        SyncState::Committed => ("", muted_style()),
        SyncState::Pending => (" …", muted_style()),
        SyncState::Failed(_) => (" ! not saved", error_style()),
    }
}
