//! spellbook - a launcher for your best shell commands
//!
//! Commands are stored as templates with `%(name)` placeholders. Pick one from
//! a fuzzy-filtered list, Tab through its placeholders while the literal parts
//! are typed for you, and press Enter to run it.

pub mod completion;
pub mod components;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod search;
pub mod template;
pub mod ui;
