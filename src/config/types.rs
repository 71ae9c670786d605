//! Configuration type definitions
//!
//! This module contains all the struct and enum definitions for configuration.

use serde::{Deserialize, Serialize};

use super::defaults::*;

// ============================================
// COMMAND
// ============================================

/// One entry of the command library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Command template, may contain `%(name)` placeholders
    #[serde(alias = "cmd")]
    pub command: String,
    #[serde(default, alias = "desc")]
    pub description: String,
}

impl Command {
    pub fn new(command: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            description: description.into(),
        }
    }
}

// ============================================
// SEARCH FIELD
// ============================================

/// Which text of a command the fuzzy filter scores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    #[default]
    Command,
    Description,
    /// Best score of command and description
    Any,
}

impl SearchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Command => "command",
            SearchField::Description => "description",
            SearchField::Any => "any",
        }
    }
}

// ============================================
// MAIN CONFIG
// ============================================

/// Configuration as read from one file, or the merge of several
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub commands: Vec<Command>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_field: Option<SearchField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl Config {
    /// Fold `other` into `self`: commands are appended, scalars set in
    /// `other` override ours
    pub fn merge(&mut self, other: Config) {
        self.commands.extend(other.commands);
        if other.search_field.is_some() {
            self.search_field = other.search_field;
        }
        if other.prompt.is_some() {
            self.prompt = other.prompt;
        }
        if other.placeholder.is_some() {
            self.placeholder = other.placeholder;
        }
    }

    pub fn get_search_field(&self) -> SearchField {
        self.search_field.unwrap_or_default()
    }

    pub fn get_prompt(&self) -> &str {
        self.prompt.as_deref().unwrap_or(DEFAULT_PROMPT)
    }

    pub fn get_placeholder(&self) -> &str {
        self.placeholder.as_deref().unwrap_or(DEFAULT_PLACEHOLDER)
    }

    /// Pretty-print as YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
