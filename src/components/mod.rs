//! Reusable input components
//!
//! - [`TextInputState`] - Single-line text buffer with an explicit cursor
//! - [`Key`] - Backend-independent editing keys

pub mod text_input;

pub use text_input::{Key, TextInputState};
