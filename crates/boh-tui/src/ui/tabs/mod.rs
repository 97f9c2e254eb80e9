//! Content area for each main tab.

pub mod archived;
pub mod chat;
pub mod knowledge;
pub mod meetings;
pub mod reports;
