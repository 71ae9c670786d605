//! Launcher state and key handling
//!
//! The input line gets first refusal on every key. Whatever it leaves alone is
//! bound here: list navigation, entering completion, running, quitting.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::completion::{CompletionInput, KeyOutcome};
use crate::components::Key;
use crate::config::{Command, Config, SearchField};
use crate::logging;
use crate::search::{self, RankedCandidate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    None,
    Quit,
    /// Run the finished command after leaving the terminal UI
    Run(String),
}

pub struct AppState {
    pub(crate) commands: Vec<Arc<Command>>,
    pub(crate) search_field: SearchField,
    pub(crate) prompt: String,
    pub(crate) placeholder: String,
    pub(crate) input: CompletionInput,
    pub(crate) filtered: Vec<RankedCandidate>,
    pub(crate) selected: usize,
    /// Last error shown in the status line
    pub(crate) status: Option<String>,
    /// Template of the running completion session
    active_template: Option<String>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let commands: Vec<Arc<Command>> = config.commands.iter().cloned().map(Arc::new).collect();
        let mut app = Self {
            commands,
            search_field: config.get_search_field(),
            prompt: config.get_prompt().to_string(),
            placeholder: config.get_placeholder().to_string(),
            input: CompletionInput::new(),
            filtered: Vec::new(),
            selected: 0,
            status: None,
            active_template: None,
        };
        app.refresh_filtered();
        app
    }

    pub fn input(&self) -> &CompletionInput {
        &self.input
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Commands that match the current query, best first
    pub fn filtered_commands(&self) -> impl Iterator<Item = &Arc<Command>> + '_ {
        self.filtered.iter().map(|r| &self.commands[r.index])
    }

    pub fn selected_command(&self) -> Option<&Arc<Command>> {
        self.filtered
            .get(self.selected)
            .map(|r| &self.commands[r.index])
    }

    pub fn on_key(&mut self, key: KeyEvent) -> UiAction {
        let was_completing = self.input.is_completing();

        if let Some(input_key) = to_input_key(&key) {
            match self.input.handle_key(input_key) {
                KeyOutcome::Consumed => {
                    if was_completing && !self.input.is_completing() {
                        self.on_completion_cancelled();
                    }
                    return UiAction::None;
                }
                KeyOutcome::Edited => {
                    if !self.input.is_completing() {
                        self.status = None;
                        self.refresh_filtered();
                    }
                    return UiAction::None;
                }
                KeyOutcome::Unhandled => {}
            }
        }

        let completing = self.input.is_completing();
        match key.code {
            KeyCode::Up if !completing => {
                self.move_selection(-1);
                UiAction::None
            }
            KeyCode::Down if !completing => {
                self.move_selection(1);
                UiAction::None
            }
            KeyCode::Tab if !completing => {
                self.enter_completion();
                UiAction::None
            }
            KeyCode::Esc if !completing => UiAction::Quit,
            KeyCode::Enter if !completing => {
                self.enter_completion();
                UiAction::None
            }
            KeyCode::Enter => match self.input.take_completed() {
                Some(command) => {
                    let template = self.active_template.take().unwrap_or_default();
                    logging::log_completion_event("done", &template, None);
                    debug!(command = %command, "Completed command");
                    UiAction::Run(command)
                }
                None => UiAction::None,
            },
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if completing {
                    self.input.exit_completion_mode();
                    self.on_completion_cancelled();
                }
                UiAction::Quit
            }
            _ => UiAction::None,
        }
    }

    fn enter_completion(&mut self) {
        let Some(command) = self.selected_command().cloned() else {
            debug!("No command selected, ignoring");
            return;
        };
        match self.input.enter_completion_mode(&command.command) {
            Ok(()) => {
                self.status = None;
                self.active_template = Some(command.command.clone());
                logging::log_completion_event("enter", &command.command, None);
            }
            Err(e) => {
                let message = e.to_string();
                logging::log_completion_event("error", &command.command, Some(&message));
                self.status = Some(message);
            }
        }
    }

    fn on_completion_cancelled(&mut self) {
        if let Some(template) = self.active_template.take() {
            logging::log_completion_event("cancel", &template, None);
        }
    }

    fn refresh_filtered(&mut self) {
        self.filtered = search::rank(self.input.text(), &self.commands, self.search_field);
        self.selected = 0;
    }

    /// Move within the list, stopping at either end
    fn move_selection(&mut self, direction: isize) {
        if self.filtered.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.filtered.len() - 1;
        self.selected = self.selected.saturating_add_signed(direction).min(last);
    }
}

/// Translate a terminal key into an editing key for the input line
pub fn to_input_key(key: &KeyEvent) -> Option<Key> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Char('a') if ctrl => Some(Key::Home),
        KeyCode::Char('e') if ctrl => Some(Key::End),
        KeyCode::Char('w') if ctrl => Some(Key::DeleteWordLeft),
        KeyCode::Char('u') if ctrl => Some(Key::DeleteToStart),
        KeyCode::Char(_) if ctrl || alt => None,
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Delete => Some(Key::Delete),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Home => Some(Key::Home),
        KeyCode::End => Some(Key::End),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::Esc => Some(Key::Escape),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            commands: vec![
                Command::new("git push origin %(branch)", "push a branch"),
                Command::new("git pull", "update"),
                Command::new("git log %(branch)", "history"),
                Command::new("ls -la", "list files"),
                Command::new("echo %(bad name)", "broken entry"),
            ],
            ..Default::default()
        }
    }

    fn press(app: &mut AppState, code: KeyCode) -> UiAction {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(app: &mut AppState, c: char) -> UiAction {
        app.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn type_str(app: &mut AppState, text: &str) {
        for c in text.chars() {
            assert_eq!(press(app, KeyCode::Char(c)), UiAction::None);
        }
    }

    fn visible(app: &AppState) -> Vec<&str> {
        app.filtered_commands().map(|c| c.command.as_str()).collect()
    }

    #[test]
    fn test_starts_with_full_list() {
        let app = AppState::new(&test_config());
        assert_eq!(visible(&app).len(), 5);
        assert_eq!(
            app.selected_command().map(|c| c.command.as_str()),
            Some("git push origin %(branch)")
        );
        assert_eq!(app.prompt, "> ");
        assert_eq!(app.placeholder, "type command");
    }

    #[test]
    fn test_typing_filters_list() {
        let mut app = AppState::new(&test_config());
        type_str(&mut app, "gp");
        let shown = visible(&app);
        assert!(shown.contains(&"git push origin %(branch)"));
        assert!(shown.contains(&"git pull"));
        assert!(!shown.contains(&"ls -la"));

        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(visible(&app).len(), 5);
    }

    #[test]
    fn test_selection_stops_at_ends() {
        let mut app = AppState::new(&test_config());
        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected, 0);
        for _ in 0..10 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.selected, 4);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected, 3);
    }

    #[test]
    fn test_tab_fill_enter_runs() {
        let mut app = AppState::new(&test_config());
        type_str(&mut app, "git log");
        assert_eq!(visible(&app), vec!["git log %(branch)"]);

        press(&mut app, KeyCode::Tab);
        assert!(app.input().is_completing());
        assert_eq!(app.input().text(), "git log ");

        // not done yet
        assert_eq!(press(&mut app, KeyCode::Enter), UiAction::None);

        type_str(&mut app, "main");
        assert_eq!(
            press(&mut app, KeyCode::Enter),
            UiAction::Run("git log main".to_string())
        );
    }

    #[test]
    fn test_typed_values_only_logged_at_debug() {
        let fill = || {
            let mut app = AppState::new(&test_config());
            type_str(&mut app, "git log");
            press(&mut app, KeyCode::Tab);
            type_str(&mut app, "private-branch");
            press(&mut app, KeyCode::Enter)
        };

        let (action, info_logs) = logging::capture::with_logs(tracing::Level::INFO, fill);
        assert_eq!(action, UiAction::Run("git log private-branch".to_string()));
        assert!(info_logs.contains("git log %(branch)"));
        assert!(!info_logs.contains("private-branch"));

        let (_, debug_logs) = logging::capture::with_logs(tracing::Level::DEBUG, fill);
        assert!(debug_logs.contains("git log private-branch"));
    }

    #[test]
    fn test_enter_also_starts_completion() {
        let mut app = AppState::new(&test_config());
        type_str(&mut app, "ls");
        press(&mut app, KeyCode::Enter);
        assert!(app.input().is_completing());
        assert_eq!(app.input().text(), "ls -la");
        assert_eq!(
            press(&mut app, KeyCode::Enter),
            UiAction::Run("ls -la".to_string())
        );
    }

    #[test]
    fn test_escape_cancels_then_quits() {
        let mut app = AppState::new(&test_config());
        type_str(&mut app, "git log");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "dev");

        assert_eq!(press(&mut app, KeyCode::Esc), UiAction::None);
        assert!(!app.input().is_completing());
        assert_eq!(app.input().text(), "git log");
        assert_eq!(visible(&app), vec!["git log %(branch)"]);

        assert_eq!(press(&mut app, KeyCode::Esc), UiAction::Quit);
    }

    #[test]
    fn test_completion_edits_do_not_refilter() {
        let mut app = AppState::new(&test_config());
        type_str(&mut app, "git log");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "zzz");
        assert_eq!(visible(&app), vec!["git log %(branch)"]);
    }

    #[test]
    fn test_arrows_ignored_while_completing() {
        let mut app = AppState::new(&test_config());
        press(&mut app, KeyCode::Tab);
        assert!(app.input().is_completing());
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_invalid_template_sets_status() {
        let mut app = AppState::new(&test_config());
        type_str(&mut app, "echo");
        assert_eq!(visible(&app), vec!["echo %(bad name)"]);

        press(&mut app, KeyCode::Tab);
        assert!(!app.input().is_completing());
        assert_eq!(app.input().text(), "echo");
        assert!(app.status().is_some_and(|s| s.contains("bad name")));

        // editing the query clears the message
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.status(), None);
    }

    #[test]
    fn test_enter_without_matches_does_nothing() {
        let mut app = AppState::new(&test_config());
        type_str(&mut app, "qqqq");
        assert!(visible(&app).is_empty());
        assert_eq!(press(&mut app, KeyCode::Enter), UiAction::None);
        assert!(!app.input().is_completing());
    }

    #[test]
    fn test_backspace_unwinds_to_query() {
        let mut app = AppState::new(&test_config());
        type_str(&mut app, "ls");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.input().text(), "ls -la");

        press(&mut app, KeyCode::Backspace);
        assert!(!app.input().is_completing());
        assert_eq!(app.input().text(), "ls");
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = AppState::new(&test_config());
        assert_eq!(ctrl(&mut app, 'c'), UiAction::Quit);

        let mut app = AppState::new(&test_config());
        press(&mut app, KeyCode::Tab);
        assert_eq!(ctrl(&mut app, 'c'), UiAction::Quit);
    }

    #[test]
    fn test_ctrl_w_deletes_word_in_query() {
        let mut app = AppState::new(&test_config());
        type_str(&mut app, "git pu");
        ctrl(&mut app, 'w');
        assert_eq!(app.input().text(), "git ");
    }

    #[test]
    fn test_to_input_key() {
        let key = |code, modifiers| to_input_key(&KeyEvent::new(code, modifiers));
        assert_eq!(key(KeyCode::Char('x'), KeyModifiers::NONE), Some(Key::Char('x')));
        assert_eq!(key(KeyCode::Char('X'), KeyModifiers::SHIFT), Some(Key::Char('X')));
        assert_eq!(key(KeyCode::Char('a'), KeyModifiers::CONTROL), Some(Key::Home));
        assert_eq!(key(KeyCode::Char('u'), KeyModifiers::CONTROL), Some(Key::DeleteToStart));
        assert_eq!(key(KeyCode::Char('c'), KeyModifiers::CONTROL), None);
        assert_eq!(key(KeyCode::Char('f'), KeyModifiers::ALT), None);
        assert_eq!(key(KeyCode::Up, KeyModifiers::NONE), None);
        assert_eq!(key(KeyCode::Enter, KeyModifiers::NONE), None);
        assert_eq!(key(KeyCode::Esc, KeyModifiers::NONE), Some(Key::Escape));
    }
}
