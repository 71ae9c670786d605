//! TextInput - Single-line text buffer with an owned cursor
//!
//! The cursor is a char offset into the text, always in `0..=len`.
//!
//! # Usage
//! ```
//! use spellbook::components::text_input::{Key, TextInputState};
//!
//! let mut input = TextInputState::new();
//! input.set_text("Hello");
//! input.handle_key(Key::Char('!'));
//! assert_eq!(input.text(), "Hello!");
//! ```

/// Editing keys understood by the input line, independent of the terminal backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    /// Home and Ctrl-A
    Home,
    /// End and Ctrl-E
    End,
    /// Ctrl-W
    DeleteWordLeft,
    /// Ctrl-U
    DeleteToStart,
    Tab,
    Escape,
}

/// State for a single-line text input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInputState {
    text: String,
    cursor: usize,
}

impl TextInputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    // === Getters ===

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length in chars
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn cursor_at_end(&self) -> bool {
        self.cursor == self.len()
    }

    // === Setters ===

    /// Replace the text and move the cursor to the end
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    // === Text Manipulation ===

    pub fn insert_char(&mut self, ch: char) {
        let byte_pos = self.char_to_byte(self.cursor);
        self.text.insert(byte_pos, ch);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        let byte_pos = self.char_to_byte(self.cursor);
        self.text.insert_str(byte_pos, s);
        self.cursor += s.chars().count();
    }

    /// Append text at the end and move the cursor there
    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
        self.cursor = self.len();
    }

    /// Cut the text down to `len` chars; the cursor is clamped
    pub fn truncate(&mut self, len: usize) {
        let byte_len = self.char_to_byte(len);
        self.text.truncate(byte_len);
        self.cursor = self.cursor.min(self.len());
    }

    /// Delete the character before the cursor
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.delete_range(self.cursor - 1, self.cursor);
        }
    }

    /// Delete the character after the cursor
    pub fn delete(&mut self) {
        if self.cursor < self.len() {
            self.delete_range(self.cursor, self.cursor + 1);
        }
    }

    pub fn delete_word_left(&mut self) {
        let start = self.find_word_boundary_left();
        self.delete_range(start, self.cursor);
    }

    pub fn delete_to_start(&mut self) {
        self.delete_range(0, self.cursor);
    }

    /// Delete chars in `start..end` and leave the cursor at `start`
    fn delete_range(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let byte_start = self.char_to_byte(start);
        let byte_end = self.char_to_byte(end);
        self.text.replace_range(byte_start..byte_end, "");
        self.cursor = start;
    }

    // === Cursor Movement ===

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.len();
    }

    // === Key Handling ===

    /// Apply an editing key. Returns true if the key was handled.
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::Char(ch) if !ch.is_control() => self.insert_char(ch),
            Key::Backspace => self.backspace(),
            Key::Delete => self.delete(),
            Key::Left => self.move_left(),
            Key::Right => self.move_right(),
            Key::Home => self.move_to_start(),
            Key::End => self.move_to_end(),
            Key::DeleteWordLeft => self.delete_word_left(),
            Key::DeleteToStart => self.delete_to_start(),
            Key::Char(_) | Key::Tab | Key::Escape => return false,
        }
        true
    }

    // === Helper Methods ===

    /// Convert character index to byte index
    fn char_to_byte(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    /// Find the previous word boundary from cursor
    fn find_word_boundary_left(&self) -> usize {
        if self.cursor == 0 {
            return 0;
        }

        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor - 1;

        // Skip whitespace
        while pos > 0 && chars[pos].is_whitespace() {
            pos -= 1;
        }

        // Skip word characters
        while pos > 0 && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }

        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_input() {
        let input = TextInputState::new();
        assert!(input.is_empty());
        assert_eq!(input.cursor(), 0);
        assert!(input.cursor_at_end());
    }

    #[test]
    fn test_with_text() {
        let input = TextInputState::with_text("hello");
        assert_eq!(input.text(), "hello");
        assert_eq!(input.cursor(), 5); // At end
    }

    #[test]
    fn test_insert_char() {
        let mut input = TextInputState::new();
        input.insert_char('a');
        input.insert_char('b');
        assert_eq!(input.text(), "ab");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn test_insert_mid_text() {
        let mut input = TextInputState::with_text("ac");
        input.move_left();
        input.insert_str("b");
        assert_eq!(input.text(), "abc");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn test_backspace() {
        let mut input = TextInputState::with_text("abc");
        input.backspace();
        assert_eq!(input.text(), "ab");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut input = TextInputState::with_text("abc");
        input.move_to_start();
        input.backspace();
        assert_eq!(input.text(), "abc");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_delete_forward() {
        let mut input = TextInputState::with_text("abc");
        input.move_to_start();
        input.delete();
        assert_eq!(input.text(), "bc");
        input.move_to_end();
        input.delete();
        assert_eq!(input.text(), "bc");
    }

    #[test]
    fn test_truncate_clamps_cursor() {
        let mut input = TextInputState::with_text("git log main");
        input.truncate(8);
        assert_eq!(input.text(), "git log ");
        assert_eq!(input.cursor(), 8);
    }

    #[test]
    fn test_delete_word_left() {
        let mut input = TextInputState::with_text("git push origin");
        input.handle_key(Key::DeleteWordLeft);
        assert_eq!(input.text(), "git push ");
        assert_eq!(input.cursor(), 9);
    }

    #[test]
    fn test_delete_to_start() {
        let mut input = TextInputState::with_text("hello world");
        input.move_left();
        input.handle_key(Key::DeleteToStart);
        assert_eq!(input.text(), "d");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_handle_key_rejects_tab_and_control_chars() {
        let mut input = TextInputState::new();
        assert!(!input.handle_key(Key::Tab));
        assert!(!input.handle_key(Key::Escape));
        assert!(!input.handle_key(Key::Char('\u{7}')));
        assert!(input.is_empty());
    }

    #[test]
    fn test_unicode() {
        let mut input = TextInputState::with_text("héllo");
        assert_eq!(input.len(), 5);
        input.move_to_start();
        input.move_right();
        input.move_right();
        assert_eq!(input.cursor(), 2); // After 'hé'
        input.backspace();
        assert_eq!(input.text(), "hllo");
    }
}
