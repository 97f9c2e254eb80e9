//! Non-blocking user notifications shown in the status bar.

use std::collections::VecDeque;

/// Notifications kept for the status bar and the message log.
const MAX_NOTIFICATIONS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

/// Newest-last queue of notifications, capped at [`MAX_NOTIFICATIONS`].
#[derive(Debug, Default)]
pub struct Notifications {
    items: VecDeque<Notification>,
}

impl Notifications {
    pub fn push(&mut self, level: Level, message: impl Into<String>) {
        if self.items.len() == MAX_NOTIFICATIONS {
            self.items.pop_front();
        }
        self.items.push_back(Notification { level, message: message.into() });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Level::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Level::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Level::Error, message);
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn count(&self, level: Level) -> usize {
        self.items.iter().filter(|n| n.level == level).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capped_newest_last() {
        let mut notes = Notifications::default();
        for i in 0..MAX_NOTIFICATIONS + 5 {
            notes.info(format!("note {}", i));
        }
        assert_eq!(notes.len(), MAX_NOTIFICATIONS);
        assert_eq!(notes.latest().map(|n| n.message.as_str()), Some("note 54"));
        assert_eq!(notes.iter().next().map(|n| n.message.as_str()), Some("note 5"));
    }

    #[test]
    fn test_count_by_level() {
        let mut notes = Notifications::default();
        notes.error("Failed to load meetings");
        notes.success("Meeting deleted");
        notes.error("Failed to delete meeting");
        assert_eq!(notes.count(Level::Error), 2);
        assert_eq!(notes.count(Level::Success), 1);
    }
}
