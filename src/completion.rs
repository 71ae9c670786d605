//! Interactive template completion
//!
//! [`CompletionInput`] owns the input line and, while a template is being
//! filled in, a [`CompletionSession`]. The session keeps a list of boundaries:
//! char offsets into the buffer where each consumed token's text ends, starting
//! with `0`. Literal runs are inserted automatically; variable slots wait for
//! the user to type a value and press Tab.
//!
//! Advance and retreat only act while the cursor sits at the end of the buffer.

use std::ops::Range;

use tracing::debug;

use crate::components::{Key, TextInputState};
use crate::template::{parse_template, TemplateError, Token, TokenKind};

/// State of one template being filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSession {
    tokens: Vec<Token>,
    /// One entry per consumed token plus the leading `0`
    boundaries: Vec<usize>,
    /// Buffer content before the session started, restored on cancel
    saved_text: String,
}

impl CompletionSession {
    fn new(tokens: Vec<Token>, saved_text: String) -> Self {
        Self {
            tokens,
            boundaries: vec![0],
            saved_text,
        }
    }

    fn last_boundary(&self) -> usize {
        self.boundaries.last().copied().unwrap_or(0)
    }

    /// Number of tokens whose text has been committed to the buffer
    fn consumed(&self) -> usize {
        self.boundaries.len() - 1
    }

    fn check_invariants(&self, text_len: usize) {
        assert_eq!(self.boundaries.first(), Some(&0), "boundaries must start at 0");
        assert!(
            self.boundaries.windows(2).all(|w| w[0] <= w[1]),
            "boundaries must be non-decreasing: {:?}",
            self.boundaries
        );
        assert!(
            self.boundaries.len() <= self.tokens.len() + 1,
            "more boundaries than tokens"
        );
        assert!(
            self.last_boundary() <= text_len,
            "boundary past end of buffer"
        );
    }
}

/// Result of [`CompletionInput::retreat`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retreat {
    /// A literal run was removed (and the session may have ended)
    Handled,
    /// Ordinary single-char backspace should run
    PassThrough,
}

/// Result of [`CompletionInput::handle_key`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The completion engine acted on the key or suppressed it
    Consumed,
    /// Ordinary text editing was applied
    Edited,
    /// Nothing happened; the caller may bind the key itself
    Unhandled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Text inserted from a literal token
    Literal,
    /// A value typed into a variable slot
    Variable,
    /// Typed text not tied to a variable slot
    Pending,
}

/// A span of the buffer, in chars, for highlighting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub range: Range<usize>,
}

/// Input line with template completion
#[derive(Debug, Clone, Default)]
pub struct CompletionInput {
    input: TextInputState,
    session: Option<CompletionSession>,
}

impl CompletionInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        self.input.text()
    }

    pub fn cursor(&self) -> usize {
        self.input.cursor()
    }

    /// Replace the buffer; only valid outside completion mode
    pub fn set_text(&mut self, text: impl Into<String>) {
        debug_assert!(self.session.is_none(), "set_text during completion");
        self.input.set_text(text);
    }

    pub fn is_completing(&self) -> bool {
        self.session.is_some()
    }

    pub fn boundaries(&self) -> Option<&[usize]> {
        self.session.as_ref().map(|s| s.boundaries.as_slice())
    }

    pub fn tokens(&self) -> Option<&[Token]> {
        self.session.as_ref().map(|s| s.tokens.as_slice())
    }

    /// Parse `template` and start filling it in.
    ///
    /// On a parse error nothing changes: the buffer and any running session
    /// are left as they were.
    pub fn enter_completion_mode(&mut self, template: &str) -> Result<(), TemplateError> {
        let tokens = parse_template(template)?;
        self.enter_completion_mode_with_tokens(tokens);
        Ok(())
    }

    pub fn enter_completion_mode_with_tokens(&mut self, tokens: Vec<Token>) {
        if self.is_completing() {
            self.exit_completion_mode();
        }

        debug!(
            event_type = "completion",
            action = "enter",
            tokens = tokens.len(),
            "Entering completion mode"
        );

        let saved_text = self.input.text().to_string();
        self.input.clear();
        self.session = Some(CompletionSession::new(tokens, saved_text));
        self.advance();
    }

    /// Cancel the session and restore the text from before it started
    pub fn exit_completion_mode(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(event_type = "completion", action = "exit", "Leaving completion mode");
            self.input.set_text(session.saved_text);
        }
    }

    /// Insert literal runs and close filled variable slots, stopping at the
    /// first slot that still needs input.
    ///
    /// Returns false when idle or when the cursor is not at the end.
    pub fn advance(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !self.input.cursor_at_end() {
            return false;
        }

        let mut index = session.consumed();
        while index < session.tokens.len() {
            let token = &session.tokens[index];
            match token.kind {
                TokenKind::Literal => {
                    self.input.push_str(&token.text);
                    session.boundaries.push(self.input.cursor());
                }
                TokenKind::Variable => {
                    let has_input = self.input.cursor() > session.last_boundary();
                    // a trailing variable owns all remaining input and is never closed
                    let is_last = index + 1 == session.tokens.len();
                    if has_input && !is_last {
                        session.boundaries.push(self.input.cursor());
                    } else {
                        break;
                    }
                }
            }
            index += 1;
        }

        session.check_invariants(self.input.len());
        true
    }

    /// Backspace-undo at the most recent boundary.
    ///
    /// A literal run is removed whole; when nothing but the leading `0`
    /// boundary remains the session is cancelled. Before a variable the
    /// boundary is popped so the slot re-opens, and the caller performs the
    /// ordinary char deletion ([`Retreat::PassThrough`]).
    pub fn retreat(&mut self) -> Retreat {
        let Some(session) = self.session.as_mut() else {
            return Retreat::PassThrough;
        };
        let cursor = self.input.cursor();
        if session.consumed() == 0
            || cursor != session.last_boundary()
            || !self.input.cursor_at_end()
        {
            return Retreat::PassThrough;
        }

        let previous = session.tokens[session.consumed() - 1].kind;
        session.boundaries.pop();
        match previous {
            TokenKind::Variable => Retreat::PassThrough,
            TokenKind::Literal => {
                let prior = session.last_boundary();
                self.input.truncate(prior);
                session.check_invariants(self.input.len());
                if session.consumed() == 0 {
                    self.exit_completion_mode();
                }
                Retreat::Handled
            }
        }
    }

    /// True once every token is filled in.
    ///
    /// A trailing variable never gets a closing boundary; it counts as filled
    /// once at least one char follows the last boundary. An empty template is
    /// never done.
    pub fn is_done(&self) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        let Some(last) = session.tokens.last() else {
            return false;
        };

        let consumed = session.consumed();
        if consumed == session.tokens.len() {
            return true;
        }
        last.is_variable()
            && consumed + 1 == session.tokens.len()
            && self.input.len() > session.last_boundary()
    }

    /// End a finished session and hand back the expanded text.
    ///
    /// Unlike [`exit_completion_mode`](Self::exit_completion_mode) the buffer
    /// keeps the expanded command.
    pub fn take_completed(&mut self) -> Option<String> {
        if !self.is_done() {
            return None;
        }
        self.session = None;
        debug!(event_type = "completion", action = "done", "Completion finished");
        Some(self.input.text().to_string())
    }

    /// Default input capture: completion keys first, then plain editing
    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        let Some(session) = &self.session else {
            return if self.input.handle_key(key) {
                KeyOutcome::Edited
            } else {
                KeyOutcome::Unhandled
            };
        };
        let last_boundary = session.last_boundary();
        let cursor = self.input.cursor();

        match key {
            Key::Tab => {
                self.advance();
                KeyOutcome::Consumed
            }
            Key::Escape => {
                self.exit_completion_mode();
                KeyOutcome::Consumed
            }
            Key::Backspace => {
                if cursor == 0 {
                    return KeyOutcome::Consumed;
                }
                if cursor == last_boundary && !self.input.cursor_at_end() {
                    // would eat into resolved text
                    return KeyOutcome::Consumed;
                }
                match self.retreat() {
                    Retreat::Handled => KeyOutcome::Consumed,
                    Retreat::PassThrough => {
                        self.input.backspace();
                        KeyOutcome::Edited
                    }
                }
            }
            Key::Left if cursor <= last_boundary => KeyOutcome::Consumed,
            Key::Home | Key::DeleteWordLeft | Key::DeleteToStart => KeyOutcome::Consumed,
            _ => {
                if self.input.handle_key(key) {
                    KeyOutcome::Edited
                } else {
                    KeyOutcome::Unhandled
                }
            }
        }
    }

    /// Split the buffer into highlighted spans; empty when idle
    pub fn segments(&self) -> Vec<Segment> {
        let Some(session) = &self.session else {
            return Vec::new();
        };

        let mut segments = Vec::new();
        for (index, bounds) in session.boundaries.windows(2).enumerate() {
            if bounds[0] == bounds[1] {
                continue;
            }
            let kind = match session.tokens[index].kind {
                TokenKind::Literal => SegmentKind::Literal,
                TokenKind::Variable => SegmentKind::Variable,
            };
            segments.push(Segment {
                kind,
                range: bounds[0]..bounds[1],
            });
        }

        let tail = session.last_boundary()..self.input.len();
        if !tail.is_empty() {
            let kind = match session.tokens.get(session.consumed()) {
                Some(token) if token.is_variable() => SegmentKind::Variable,
                _ => SegmentKind::Pending,
            };
            segments.push(Segment { kind, range: tail });
        }
        segments
    }

    /// The literal text Tab would insert next, if any
    pub fn next_literal_preview(&self) -> Option<&str> {
        let session = self.session.as_ref()?;
        session.tokens[session.consumed()..]
            .iter()
            .find(|t| t.kind == TokenKind::Literal)
            .map(|t| t.text.as_str())
    }

    /// Name of the variable slot the cursor is in, if any
    pub fn current_variable(&self) -> Option<&str> {
        let session = self.session.as_ref()?;
        session
            .tokens
            .get(session.consumed())
            .filter(|t| t.is_variable())
            .map(|t| t.text.as_str())
    }
}

#[cfg(test)]
#[path = "completion_tests.rs"]
mod tests;
