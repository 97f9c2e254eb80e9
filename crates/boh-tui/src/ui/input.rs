//! Keyboard input handling for the TUI.
//!
//! Overlays and text-entry states take every key first; otherwise global
//! keys are checked, then the current tab's bindings.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use boh_core::models::AttendanceStatus;
use boh_core::reports::ReportKind;

use crate::app::form::{can_add_password_char, can_add_username_char};
use crate::app::{App, AppState, EditorField, InviteFocus, LoginFocus, Tab, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle login overlay
    if matches!(app.state, AppState::LoggingIn) {
        return handle_login_input(app, key).await;
    }

    if matches!(app.state, AppState::AcceptingInvite) {
        handle_invite_input(app, key);
        return Ok(false);
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Destructive action confirmation
    if matches!(app.state, AppState::Confirming) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_pending(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_confirm(),
            _ => {}
        }
        return Ok(false);
    }

    if matches!(app.state, AppState::Searching) {
        handle_search_input(app, key);
        return Ok(false);
    }

    if matches!(app.state, AppState::Editing) {
        handle_editing_input(app, key);
        return Ok(false);
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('L') => {
            app.logout();
            return Ok(false);
        }
        KeyCode::Char('u') => {
            app.refresh_current_tab();
            return Ok(false);
        }
        KeyCode::Char(c @ '1'..='5') => {
            let idx = c as usize - '1' as usize;
            app.switch_tab(Tab::ALL[idx]);
            return Ok(false);
        }
        KeyCode::Tab => {
            app.switch_tab(app.current_tab.next());
            return Ok(false);
        }
        KeyCode::BackTab => {
            app.switch_tab(app.current_tab.prev());
            return Ok(false);
        }
        // Left/Right edit the filters on the Reports tab
        KeyCode::Left if app.current_tab != Tab::Reports => {
            app.switch_tab(app.current_tab.prev());
            return Ok(false);
        }
        KeyCode::Right if app.current_tab != Tab::Reports => {
            app.switch_tab(app.current_tab.next());
            return Ok(false);
        }
        _ => {}
    }

    match app.current_tab {
        Tab::Reports => handle_reports_input(app, key),
        Tab::Meetings => handle_meetings_input(app, key),
        Tab::Archived => handle_archived_input(app, key),
        Tab::Knowledge => handle_knowledge_input(app, key),
        Tab::Chat => handle_chat_input(app, key),
    }

    Ok(false)
}

/// Selection step for the common navigation keys, if `key` is one.
fn selection_delta(code: KeyCode) -> Option<isize> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(-1),
        KeyCode::Down | KeyCode::Char('j') => Some(1),
        KeyCode::PageUp => Some(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => Some(PAGE_SCROLL_SIZE as isize),
        KeyCode::Home => Some(isize::MIN / 2),
        KeyCode::End => Some(isize::MAX / 2),
        _ => None,
    }
}

fn handle_reports_input(app: &mut App, key: KeyEvent) {
    let reports = &mut app.reports;
    match key.code {
        KeyCode::Up => reports.field = reports.field.prev(),
        KeyCode::Down => reports.field = reports.field.next(),
        KeyCode::Left => reports.adjust(false),
        KeyCode::Right => reports.adjust(true),
        KeyCode::PageDown | KeyCode::Char('j') => {
            let rows = reports.preview.as_ref().map_or(0, |p| p.rows.len());
            let step = if key.code == KeyCode::PageDown { PAGE_SCROLL_SIZE } else { 1 };
            reports.scroll = (reports.scroll + step).min(rows.saturating_sub(1));
        }
        KeyCode::PageUp | KeyCode::Char('k') => {
            let step = if key.code == KeyCode::PageUp { PAGE_SCROLL_SIZE } else { 1 };
            reports.scroll = reports.scroll.saturating_sub(step);
        }
        KeyCode::Char('a') => app.download_report(ReportKind::Attendance),
        KeyCode::Char('d') => app.download_report(ReportKind::Dues),
        KeyCode::Char('r') => app.download_report(ReportKind::Prospects),
        KeyCode::Char('v') => {
            if app.reports.showing_preview {
                app.close_preview();
            } else {
                app.load_preview();
            }
        }
        KeyCode::Esc => app.close_preview(),
        KeyCode::Char('p') => app.print_preview(),
        _ => {}
    }
}

fn handle_meetings_input(app: &mut App, key: KeyEvent) {
    if let Some(view) = app.meetings.attendance.as_mut() {
        if let Some(delta) = selection_delta(key.code) {
            view.move_selection(delta);
            return;
        }
        match key.code {
            KeyCode::Char('p') => app.set_attendance_status(AttendanceStatus::Present),
            KeyCode::Char('e') => app.set_attendance_status(AttendanceStatus::Excused),
            KeyCode::Char('a') => app.set_attendance_status(AttendanceStatus::Absent),
            KeyCode::Char(' ') | KeyCode::Enter => app.cycle_attendance(),
            KeyCode::Esc | KeyCode::Backspace => app.close_attendance(),
            _ => {}
        }
        return;
    }

    if let Some(delta) = selection_delta(key.code) {
        app.meetings.move_selection(delta);
        return;
    }
    match key.code {
        KeyCode::Enter => app.open_attendance(),
        KeyCode::Char('y') => app.change_year(true),
        KeyCode::Char('Y') => app.change_year(false),
        KeyCode::Char('n') => app.open_meeting_form(),
        KeyCode::Char('x') | KeyCode::Delete => app.request_delete_meeting(),
        _ => {}
    }
}

fn handle_archived_input(app: &mut App, key: KeyEvent) {
    if let Some(delta) = selection_delta(key.code) {
        app.archived.move_selection(delta);
        return;
    }
    match key.code {
        KeyCode::Char('/') => app.start_archived_search(),
        KeyCode::Esc => app.end_archived_search(true),
        KeyCode::Char('r') => app.request_restore_archived(),
        KeyCode::Char('D') => app.request_delete_archived(),
        KeyCode::Char('e') => app.export_archived(),
        _ => {}
    }
}

fn handle_knowledge_input(app: &mut App, key: KeyEvent) {
    if let Some(delta) = selection_delta(key.code) {
        app.knowledge.move_selection(delta);
        return;
    }
    match key.code {
        KeyCode::Char('f') => app.knowledge.cycle_filter(),
        KeyCode::Char('n') => app.open_new_knowledge(),
        KeyCode::Char('e') | KeyCode::Enter => app.open_edit_knowledge(),
        KeyCode::Char('t') => app.toggle_knowledge(),
        KeyCode::Char('x') | KeyCode::Delete => app.request_delete_knowledge(),
        KeyCode::Char('i') => app.initialize_knowledge(),
        _ => {}
    }
}

fn handle_chat_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('i') => app.start_chat_input(),
        KeyCode::Up | KeyCode::Char('k') => app.chat.scroll += 1,
        KeyCode::Down | KeyCode::Char('j') => app.chat.scroll = app.chat.scroll.saturating_sub(1),
        KeyCode::PageUp => app.chat.scroll += PAGE_SCROLL_SIZE,
        KeyCode::PageDown => app.chat.scroll = app.chat.scroll.saturating_sub(PAGE_SCROLL_SIZE),
        KeyCode::End => app.chat.scroll = 0,
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.end_archived_search(true),
        KeyCode::Enter => {
            // Keep search query active
            app.end_archived_search(false);
        }
        KeyCode::Backspace => app.archived.pop_search(),
        KeyCode::Up => app.archived.move_selection(-1),
        KeyCode::Down => app.archived.move_selection(1),
        KeyCode::Char(c) => app.archived.push_search(c),
        _ => {}
    }
}

/// Route keys to whichever form owns the keyboard on the current tab.
fn handle_editing_input(app: &mut App, key: KeyEvent) {
    match app.current_tab {
        Tab::Meetings if app.meetings.form.is_some() => handle_meeting_form_input(app, key),
        Tab::Knowledge if app.knowledge.editor.is_some() => handle_editor_input(app, key),
        Tab::Chat => handle_chat_editing(app, key),
        _ => app.state = AppState::Normal,
    }
}

fn handle_meeting_form_input(app: &mut App, key: KeyEvent) {
    let Some(form) = app.meetings.form.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => app.close_meeting_form(),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.focus = form.focus.next(),
        KeyCode::Enter => app.submit_meeting_form(),
        KeyCode::Backspace => form.focused_mut().pop(),
        KeyCode::Char(c) => {
            form.focused_mut().push(c);
        }
        _ => {}
    }
}

fn handle_editor_input(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.save_knowledge();
        return;
    }
    let Some(editor) = app.knowledge.editor.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => app.close_knowledge_editor(),
        KeyCode::Tab => editor.focus = editor.focus.next(),
        KeyCode::BackTab => editor.focus = editor.focus.prev(),
        KeyCode::Enter => match editor.focus {
            EditorField::Content => {
                editor.content.push_newline();
            }
            EditorField::Title => editor.focus = editor.focus.next(),
            _ => editor.toggle_focused(),
        },
        KeyCode::Backspace => {
            if let Some(input) = editor.focused_input() {
                input.pop();
            }
        }
        KeyCode::Char(' ') if !editor.focus.is_text() => editor.toggle_focused(),
        KeyCode::Left | KeyCode::Right if !editor.focus.is_text() => editor.toggle_focused(),
        KeyCode::Char(c) => {
            if let Some(input) = editor.focused_input() {
                input.push(c);
            }
        }
        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.state = AppState::Normal,
        KeyCode::Enter => app.send_chat(),
        KeyCode::Backspace => {
            app.chat.input.pop();
        }
        KeyCode::Char(c) => app.chat.push_input(c),
        _ => {}
    }
}

fn handle_invite_input(app: &mut App, key: KeyEvent) {
    let Some(invite) = app.invite.as_mut() else {
        app.close_invite();
        return;
    };
    match key.code {
        KeyCode::Esc => app.close_invite(),
        KeyCode::Down | KeyCode::Tab => invite.focus = invite.focus.next(),
        KeyCode::Up | KeyCode::BackTab => invite.focus = invite.focus.prev(),
        KeyCode::Enter => {
            if invite.focus == InviteFocus::Button {
                app.submit_invite();
            } else {
                invite.focus = invite.focus.next();
            }
        }
        KeyCode::Backspace => {
            if let Some(input) = invite.focused_input() {
                input.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(input) = invite.focused_input() {
                input.push(c);
            }
        }
        _ => {}
    }
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            // Move to next field
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            // Move to previous field
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => {
                // On failure login_error is set and the overlay stays up
                let _ = app.attempt_login().await;
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.chars().count(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}
