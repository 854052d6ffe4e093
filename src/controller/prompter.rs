//! Blocking prompt / alert surface used by the edit flow

use async_trait::async_trait;

/// The user-facing half of an edit: ask for a value, or show a notice
#[async_trait]
pub trait Prompter: Send {
    /// Ask for a replacement value; `None` means the user cancelled
    async fn prompt(&mut self, label: &str, default: &str) -> Option<String>;

    /// Show a notice the user has to acknowledge
    async fn alert(&mut self, message: &str);
}

/// Prompter that replays canned answers and records what it was asked
#[cfg(feature = "test-sim")]
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<Option<String>>,
    /// `(label, default)` of every prompt shown
    pub prompts: Vec<(String, String)>,
    pub alerts: Vec<String>,
}

#[cfg(feature = "test-sim")]
impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next prompt with `text`
    pub fn answer(mut self, text: &str) -> Self {
        self.answers.push_back(Some(text.to_string()));
        self
    }

    /// Cancel the next prompt
    pub fn cancel(mut self) -> Self {
        self.answers.push_back(None);
        self
    }
}

#[cfg(feature = "test-sim")]
#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn prompt(&mut self, label: &str, default: &str) -> Option<String> {
        self.prompts.push((label.to_string(), default.to_string()));
        self.answers.pop_front().flatten()
    }

    async fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}
