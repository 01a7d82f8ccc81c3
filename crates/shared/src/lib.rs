pub mod project;

pub mod chat_api {
    use serde::{Deserialize, Serialize};

    /// Who authored a conversation turn.
    ///
    /// `System` never appears in stored history; the completion client injects
    /// the system instruction when it builds a request.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Role {
        System,
        User,
        Assistant,
    }

    impl Role {
        pub fn as_str(&self) -> &'static str {
            match self {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            }
        }
    }

    /// One turn in a conversation. For `Assistant` turns the content is the
    /// full generated HTML document as of that turn, not a prose reply.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ChatMessage {
        pub role: Role,
        pub content: String,
    }

    impl ChatMessage {
        pub fn user(content: impl Into<String>) -> Self {
            Self {
                role: Role::User,
                content: content.into(),
            }
        }

        pub fn assistant(content: impl Into<String>) -> Self {
            Self {
                role: Role::Assistant,
                content: content.into(),
            }
        }
    }
}

pub mod settings {
    use serde::{Deserialize, Serialize};

    pub const DEFAULT_MODEL: &str = "qwen/qwen3-coder:free";

    fn default_true() -> bool {
        true
    }

    /// Completion-endpoint configuration. The key is never embedded in
    /// source; it comes from the settings file or `OPENROUTER_API_KEY`.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct GeneratorSettings {
        pub api_key: Option<String>,
        pub model: String,
    }

    impl Default for GeneratorSettings {
        fn default() -> Self {
            Self {
                api_key: None,
                model: DEFAULT_MODEL.to_string(),
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AppSettings {
        #[serde(default)]
        pub generator: GeneratorSettings,
        #[serde(default = "default_true")]
        pub dark_mode: bool,
    }

    impl Default for AppSettings {
        fn default() -> Self {
            Self {
                generator: GeneratorSettings::default(),
                dark_mode: true,
            }
        }
    }
}
