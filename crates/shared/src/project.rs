//! The website project model: one conversation plus its latest artifact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat_api::ChatMessage;

/// Longest auto-derived project name, counted in characters.
const NAME_LIMIT: usize = 40;

/// A website-in-progress. The chat history is append-only; `generated_code`
/// always holds the most recent assistant-produced document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteProject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
    #[serde(default)]
    pub generated_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WebsiteProject {
    pub fn new(name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            chat_history: Vec::new(),
            generated_code: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append the user's prompt. The first prompt ever also names the project.
    pub fn push_user_prompt(&mut self, prompt: &str) {
        if self.chat_history.is_empty() {
            self.name = derive_name(prompt);
        }
        self.chat_history.push(ChatMessage::user(prompt));
        self.updated_at = Utc::now();
    }

    /// Record a successful generation: the assistant turn plus the refreshed
    /// artifact.
    pub fn push_generated(&mut self, code: String) {
        self.chat_history.push(ChatMessage::assistant(code.clone()));
        self.generated_code = Some(code);
        self.updated_at = Utc::now();
    }
}

fn derive_name(prompt: &str) -> String {
    let mut name: String = prompt.chars().take(NAME_LIMIT).collect();
    if prompt.chars().count() > NAME_LIMIT {
        name.push_str("...");
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_name_keeps_short_prompts() {
        assert_eq!(derive_name("a tiny shop"), "a tiny shop");
    }

    #[test]
    fn derive_name_truncates_at_forty_chars() {
        let prompt = "x".repeat(41);
        assert_eq!(derive_name(&prompt), format!("{}...", "x".repeat(40)));
        // Exactly at the limit there is nothing to mark.
        let prompt = "y".repeat(40);
        assert_eq!(derive_name(&prompt), prompt);
    }

    #[test]
    fn first_prompt_names_the_project() {
        let mut project = WebsiteProject::new("New Website");
        project.push_user_prompt("a bakery landing page");
        assert_eq!(project.name, "a bakery landing page");

        // Later prompts leave the name alone.
        project.push_user_prompt("make the header sticky");
        assert_eq!(project.name, "a bakery landing page");
        assert_eq!(project.chat_history.len(), 2);
    }
}
