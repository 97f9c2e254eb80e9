use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::nullable;

/// Knowledge base category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeCategory {
    #[default]
    General,
    ChainOfCommand,
    Bylaws,
    Meetings,
    AdminOnly,
}

impl KnowledgeCategory {
    pub const ALL: [KnowledgeCategory; 5] = [
        KnowledgeCategory::General,
        KnowledgeCategory::ChainOfCommand,
        KnowledgeCategory::Bylaws,
        KnowledgeCategory::Meetings,
        KnowledgeCategory::AdminOnly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KnowledgeCategory::General => "general",
            KnowledgeCategory::ChainOfCommand => "chain_of_command",
            KnowledgeCategory::Bylaws => "bylaws",
            KnowledgeCategory::Meetings => "meetings",
            KnowledgeCategory::AdminOnly => "admin_only",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            KnowledgeCategory::General => "General Info",
            KnowledgeCategory::ChainOfCommand => "Chain of Command",
            KnowledgeCategory::Bylaws => "Bylaws & Rules",
            KnowledgeCategory::Meetings => "Meetings & Events",
            KnowledgeCategory::AdminOnly => "Admin Only",
        }
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl FromStr for KnowledgeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown knowledge category: {}", s))
    }
}

impl fmt::Display for KnowledgeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Category selector for the knowledge list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(KnowledgeCategory),
}

impl CategoryFilter {
    pub fn matches(&self, category: KnowledgeCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => *wanted == category,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Only(category) => category.label(),
        }
    }

    /// Cycle All → each category → All.
    pub fn next(&self) -> Self {
        match self {
            CategoryFilter::All => CategoryFilter::Only(KnowledgeCategory::ALL[0]),
            CategoryFilter::Only(KnowledgeCategory::AdminOnly) => CategoryFilter::All,
            CategoryFilter::Only(category) => CategoryFilter::Only(category.next()),
        }
    }
}

/// Knowledge base entry used by the chat assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub content: String,
    #[serde(default, deserialize_with = "nullable")]
    pub category: KnowledgeCategory,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub admin_only: bool,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn default_true() -> bool {
    true
}

impl KnowledgeEntry {
    /// Editable copy of this entry.
    pub fn to_draft(&self) -> KnowledgeDraft {
        KnowledgeDraft {
            title: self.title.clone(),
            content: self.content.clone(),
            category: self.category,
            is_active: self.is_active,
            admin_only: self.admin_only,
        }
    }
}

/// Create/edit form body for `POST /ai-knowledge` and `PUT /ai-knowledge/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDraft {
    pub title: String,
    pub content: String,
    pub category: KnowledgeCategory,
    pub is_active: bool,
    pub admin_only: bool,
}

impl Default for KnowledgeDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            category: KnowledgeCategory::General,
            is_active: true,
            admin_only: false,
        }
    }
}

impl KnowledgeDraft {
    /// Changing the category resets the admin-only flag to whether the new
    /// category is `admin_only`.
    pub fn set_category(&mut self, category: KnowledgeCategory) {
        self.category = category;
        self.admin_only = category == KnowledgeCategory::AdminOnly;
    }
}

/// Partial update used by the active toggle.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct KnowledgeToggle {
    pub is_active: bool,
}

/// Response of `POST /ai-knowledge/initialize`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitializeResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub message: String,
}
