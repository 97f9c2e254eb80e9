//! AI knowledge base manager.

use anyhow::Result;
use tracing::{info, warn};

use boh_core::api::is_access_denied;
use boh_core::models::{CategoryFilter, InitializeResponse, KnowledgeCategory, KnowledgeDraft, KnowledgeEntry};
use boh_core::sync::Ticket;
use boh_core::validation::validate_knowledge_draft;

use super::form::{TextInput, MAX_LINE_LENGTH, MAX_TEXT_LENGTH};
use super::{step_selection, App, AppState, ConfirmAction, Slot, TaskResult};

const ACCESS_DENIED: &str = "Access denied. Only NPrez, NVP, or NSEC can manage AI knowledge.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
    Title,
    Content,
    Category,
    Active,
    AdminOnly,
}

impl EditorField {
    const ORDER: [EditorField; 5] = [
        EditorField::Title,
        EditorField::Content,
        EditorField::Category,
        EditorField::Active,
        EditorField::AdminOnly,
    ];

    pub fn next(&self) -> Self {
        let idx = Self::ORDER.iter().position(|f| f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    pub fn prev(&self) -> Self {
        let idx = Self::ORDER.iter().position(|f| f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn is_text(&self) -> bool {
        matches!(self, EditorField::Title | EditorField::Content)
    }
}

/// Create/edit form. `draft` holds the category and flags; the text
/// fields live in their own inputs until the form is submitted.
#[derive(Debug, Clone)]
pub struct KnowledgeEditor {
    /// `None` when creating.
    pub editing_id: Option<String>,
    pub title: TextInput,
    pub content: TextInput,
    pub draft: KnowledgeDraft,
    pub focus: EditorField,
    pub error: Option<String>,
    pub saving: bool,
}

impl KnowledgeEditor {
    fn create() -> Self {
        Self::from_draft(None, KnowledgeDraft::default())
    }

    fn edit(entry: &KnowledgeEntry) -> Self {
        Self::from_draft(Some(entry.id.clone()), entry.to_draft())
    }

    fn from_draft(editing_id: Option<String>, draft: KnowledgeDraft) -> Self {
        Self {
            editing_id,
            title: TextInput::new(MAX_LINE_LENGTH).with_value(&draft.title),
            content: TextInput::new(MAX_TEXT_LENGTH).with_value(&draft.content),
            draft,
            focus: EditorField::Title,
            error: None,
            saving: false,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    /// Text input under the cursor, if the focused field is text.
    pub fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            EditorField::Title => Some(&mut self.title),
            EditorField::Content => Some(&mut self.content),
            _ => None,
        }
    }

    /// Flip or cycle the focused non-text field.
    pub fn toggle_focused(&mut self) {
        match self.focus {
            EditorField::Category => self.draft.set_category(self.draft.category.next()),
            EditorField::Active => self.draft.is_active = !self.draft.is_active,
            EditorField::AdminOnly => self.draft.admin_only = !self.draft.admin_only,
            EditorField::Title | EditorField::Content => {}
        }
    }

    pub fn to_draft(&self) -> KnowledgeDraft {
        KnowledgeDraft {
            title: self.title.value().to_string(),
            content: self.content.value().to_string(),
            ..self.draft.clone()
        }
    }
}

#[derive(Debug, Default)]
pub struct KnowledgeState {
    pub entries: Vec<KnowledgeEntry>,
    pub loading: bool,
    pub loaded: bool,
    pub filter: CategoryFilter,
    /// Index into `filtered()`.
    pub selection: usize,
    pub editor: Option<KnowledgeEditor>,
    /// The last list call was refused with 403.
    pub access_denied: bool,
    pub initializing: bool,
}

impl KnowledgeState {
    pub fn filtered(&self) -> Vec<&KnowledgeEntry> {
        self.entries.iter().filter(|e| self.filter.matches(e.category)).collect()
    }

    pub fn selected(&self) -> Option<&KnowledgeEntry> {
        self.filtered().get(self.selection).copied()
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.filtered().len();
        self.selection = step_selection(self.selection, len, delta);
    }

    pub fn category_count(&self, category: KnowledgeCategory) -> usize {
        self.entries.iter().filter(|e| e.category == category).count()
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.selection = 0;
    }
}

impl App {
    pub fn load_knowledge(&mut self) {
        self.knowledge.loading = true;
        let ticket = self.tracker.issue(Slot::Knowledge);
        let backend = self.backend.clone();
        self.spawn(async move { TaskResult::Knowledge(ticket, backend.list_knowledge().await) });
    }

    pub(super) fn on_knowledge(&mut self, ticket: Ticket<Slot>, result: Result<Vec<KnowledgeEntry>>) {
        if !self.is_current(&ticket) {
            return;
        }
        self.knowledge.loading = false;
        self.knowledge.loaded = true;
        match result {
            Ok(entries) => {
                info!(count = entries.len(), "Knowledge entries loaded");
                self.knowledge.access_denied = false;
                self.knowledge.entries = entries;
            }
            Err(e) if is_access_denied(&e) => {
                warn!("Knowledge base access denied");
                self.knowledge.entries.clear();
                self.knowledge.access_denied = true;
                self.notifications.error(ACCESS_DENIED);
            }
            Err(e) => {
                self.knowledge.entries.clear();
                self.report_failure(&e, "Failed to load knowledge entries");
            }
        }
        self.knowledge.move_selection(0);
    }

    pub fn open_new_knowledge(&mut self) {
        self.knowledge.editor = Some(KnowledgeEditor::create());
        self.state = AppState::Editing;
    }

    pub fn open_edit_knowledge(&mut self) {
        if let Some(entry) = self.knowledge.selected() {
            self.knowledge.editor = Some(KnowledgeEditor::edit(entry));
            self.state = AppState::Editing;
        }
    }

    pub fn close_knowledge_editor(&mut self) {
        self.knowledge.editor = None;
        self.state = AppState::Normal;
    }

    pub fn save_knowledge(&mut self) {
        let Some(editor) = self.knowledge.editor.as_mut() else {
            return;
        };
        if editor.saving {
            return;
        }
        let draft = editor.to_draft();
        if let Err(e) = validate_knowledge_draft(&draft) {
            editor.error = Some(e.to_string());
            return;
        }
        editor.error = None;
        editor.saving = true;

        let editing_id = editor.editing_id.clone();
        let backend = self.backend.clone();
        info!(editing = ?editing_id, category = draft.category.as_str(), "Saving knowledge entry");
        self.spawn(async move {
            let result = match &editing_id {
                Some(id) => backend.update_knowledge(id, &draft).await,
                None => backend.create_knowledge(&draft).await,
            };
            TaskResult::KnowledgeSaved { editing: editing_id.is_some(), result }
        });
    }

    pub(super) fn on_knowledge_saved(&mut self, editing: bool, result: Result<()>) {
        match result {
            Ok(()) => {
                if self.knowledge.editor.take().is_some() && self.state == AppState::Editing {
                    self.state = AppState::Normal;
                }
                self.notifications.success(if editing {
                    "Knowledge entry updated"
                } else {
                    "Knowledge entry created"
                });
                self.load_knowledge();
            }
            Err(e) => {
                if let Some(editor) = self.knowledge.editor.as_mut() {
                    editor.saving = false;
                }
                self.report_failure_with_detail(&e, "Failed to save entry");
            }
        }
    }

    /// Flip `is_active` on the highlighted entry.
    pub fn toggle_knowledge(&mut self) {
        let Some(entry) = self.knowledge.selected() else {
            return;
        };
        let id = entry.id.clone();
        let was_active = entry.is_active;
        let backend = self.backend.clone();
        self.spawn(async move {
            let result = backend.set_knowledge_active(&id, !was_active).await;
            TaskResult::KnowledgeToggled { was_active, result }
        });
    }

    pub(super) fn on_knowledge_toggled(&mut self, was_active: bool, result: Result<()>) {
        match result {
            Ok(()) => {
                self.notifications
                    .success(if was_active { "Entry disabled" } else { "Entry enabled" });
                self.load_knowledge();
            }
            Err(e) => self.report_failure(&e, "Failed to update entry"),
        }
    }

    pub fn request_delete_knowledge(&mut self) {
        if let Some(entry) = self.knowledge.selected() {
            let id = entry.id.clone();
            self.request_confirm(ConfirmAction::DeleteKnowledge { id });
        }
    }

    pub(super) fn delete_knowledge(&mut self, id: String) {
        let backend = self.backend.clone();
        info!(entry_id = %id, "Deleting knowledge entry");
        self.spawn(async move { TaskResult::KnowledgeDeleted(backend.delete_knowledge(&id).await) });
    }

    pub(super) fn on_knowledge_deleted(&mut self, result: Result<()>) {
        match result {
            Ok(()) => {
                self.notifications.success("Knowledge entry deleted");
                self.load_knowledge();
            }
            Err(e) => self.report_failure(&e, "Failed to delete entry"),
        }
    }

    /// Seed an empty knowledge base with the backend's defaults.
    pub fn initialize_knowledge(&mut self) {
        if self.knowledge.initializing || self.knowledge.access_denied {
            return;
        }
        if !self.knowledge.entries.is_empty() {
            self.notifications.info("Knowledge base already has entries");
            return;
        }
        self.knowledge.initializing = true;
        let backend = self.backend.clone();
        self.spawn(async move {
            TaskResult::KnowledgeInitialized(backend.initialize_knowledge().await)
        });
    }

    pub(super) fn on_knowledge_initialized(&mut self, result: Result<InitializeResponse>) {
        self.knowledge.initializing = false;
        match result {
            Ok(response) => {
                let message = if response.message.is_empty() {
                    "Knowledge base initialized".to_string()
                } else {
                    response.message
                };
                self.notifications.success(message);
                self.load_knowledge();
            }
            Err(e) => self.report_failure_with_detail(&e, "Failed to initialize knowledge base"),
        }
    }
}
