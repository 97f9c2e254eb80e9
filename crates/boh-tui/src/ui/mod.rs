//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, status bar and overlays
//! - `input`: keyboard event handling
//! - `styles`: color palette and text styling
//! - `tabs`: per-tab content (reports, meetings, archived, knowledge, chat)

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
