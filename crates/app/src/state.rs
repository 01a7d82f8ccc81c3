//! Application state and async plumbing for the Siteweaver UI.
//!
//! Generation runs on a background thread with its own tokio runtime; the UI
//! polls an mpsc receiver each frame and applies the outcome through the
//! project store. Only one generation and one enhancement can be in flight
//! at a time.

use crate::projects::{PendingGeneration, ProjectStore};
use providers::{GenerateError, OpenRouterClient, WebsiteGenerator};
use services::storage::FileStorage;
use shared::settings::{AppSettings, GeneratorSettings};
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};

pub struct AppState {
    pub settings: AppSettings,
    pub store: ProjectStore,
    pub input_text: String,
    /// Pending background generation, if any.
    pub generation_rx: Option<Receiver<Result<String, GenerateError>>>,
    /// Pending prompt enhancement, if any.
    pub enhance_rx: Option<Receiver<Result<String, GenerateError>>>,
    /// Non-generation notice shown above the input (e.g. enhance failures).
    pub notice: Option<String>,
    pub preview: crate::preview::HtmlPreview,
    pub show_preview: bool,
    pub show_settings_dialog: bool,
    pub api_key_input: String,
    pub settings_status: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        let settings = load_settings_or_default();
        let store = ProjectStore::load(Box::new(FileStorage::new(FileStorage::default_dir())));
        Self {
            settings,
            store,
            input_text: String::new(),
            generation_rx: None,
            enhance_rx: None,
            notice: None,
            preview: crate::preview::HtmlPreview::new(),
            show_preview: true,
            show_settings_dialog: false,
            api_key_input: String::new(),
            settings_status: None,
        }
    }
}

impl AppState {
    pub fn is_generating(&self) -> bool {
        self.store.is_loading()
    }

    pub fn is_enhancing(&self) -> bool {
        self.enhance_rx.is_some()
    }

    pub fn has_api_key(&self) -> bool {
        self.settings
            .generator
            .api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
            || std::env::var("OPENROUTER_API_KEY").is_ok()
    }

    /// Hand the current input to the store and, if accepted, kick off a
    /// background generation. Rejected sends (blank input, already loading)
    /// leave the input untouched.
    pub fn send_message(&mut self) {
        let prompt = self.input_text.clone();
        let Some(pending) = self.store.begin_message(&prompt) else {
            return;
        };
        self.input_text.clear();
        self.notice = None;
        self.spawn_generation(pending);
    }

    fn spawn_generation(&mut self, pending: PendingGeneration) {
        let (tx, rx) = channel();
        self.generation_rx = Some(rx);
        let generator = self.settings.generator.clone();

        std::thread::spawn(move || {
            let result = run_generation(&generator, &pending);
            let _ = tx.send(result);
        });
    }

    /// Called each frame. Applies a finished generation through the store.
    pub fn poll_generation(&mut self) {
        let Some(rx) = &self.generation_rx else {
            return;
        };
        match rx.try_recv() {
            Ok(result) => {
                self.generation_rx = None;
                self.store.finish_message(result);
            }
            Err(TryRecvError::Disconnected) => {
                // Worker died without reporting; unblock the store.
                self.generation_rx = None;
                self.store.finish_message(Err(GenerateError::Transport(
                    "background worker terminated unexpectedly".to_string(),
                )));
            }
            Err(TryRecvError::Empty) => {}
        }
    }

    /// Expand the current input into a detailed brief in the background.
    /// Independent of project state.
    pub fn enhance_prompt(&mut self) {
        let prompt = self.input_text.trim().to_string();
        if prompt.is_empty() || self.enhance_rx.is_some() {
            return;
        }

        let (tx, rx) = channel();
        self.enhance_rx = Some(rx);
        let generator = self.settings.generator.clone();

        std::thread::spawn(move || {
            let result = run_enhancement(&generator, &prompt);
            let _ = tx.send(result);
        });
    }

    pub fn poll_enhance(&mut self) {
        let Some(rx) = &self.enhance_rx else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(expanded)) => {
                self.enhance_rx = None;
                self.input_text = expanded;
            }
            Ok(Err(err)) => {
                self.enhance_rx = None;
                self.notice = Some(format!("Couldn't enhance the prompt: {}", err));
            }
            Err(TryRecvError::Disconnected) => {
                self.enhance_rx = None;
                self.notice = Some("Couldn't enhance the prompt: worker stopped".to_string());
            }
            Err(TryRecvError::Empty) => {}
        }
    }

    pub fn save_api_key(&mut self) {
        let key = self.api_key_input.trim().to_string();
        if key.is_empty() {
            return;
        }
        self.settings.generator.api_key = Some(key);
        self.api_key_input.clear();
        save_settings(&self.settings);
        self.settings_status = Some("OpenRouter API key saved".to_string());
    }
}

fn run_generation(
    settings: &GeneratorSettings,
    pending: &PendingGeneration,
) -> Result<String, GenerateError> {
    let client = OpenRouterClient::from_settings(settings)?;
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| GenerateError::Transport(format!("failed to start async runtime: {}", e)))?;
    rt.block_on(client.generate(&pending.messages))
}

fn run_enhancement(settings: &GeneratorSettings, prompt: &str) -> Result<String, GenerateError> {
    let client = OpenRouterClient::from_settings(settings)?;
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| GenerateError::Transport(format!("failed to start async runtime: {}", e)))?;
    rt.block_on(client.enhance(prompt))
}

// ── Settings persistence ─────────────────────────────────────────────

fn config_path() -> Option<PathBuf> {
    let proj = directories::ProjectDirs::from("com.local", "Siteweaver", "Siteweaver")?;
    let _ = fs::create_dir_all(proj.config_dir());
    Some(proj.config_dir().join("settings.json"))
}

pub fn load_settings_or_default() -> AppSettings {
    if let Some(path) = config_path() {
        if let Ok(bytes) = fs::read(&path) {
            match serde_json::from_slice::<AppSettings>(&bytes) {
                Ok(settings) => return settings,
                Err(err) => tracing::warn!("ignoring corrupt settings file: {}", err),
            }
        }
    }
    AppSettings::default()
}

pub fn save_settings(settings: &AppSettings) {
    let Some(path) = config_path() else {
        return;
    };
    match serde_json::to_vec_pretty(settings) {
        Ok(json) => {
            if let Err(err) = fs::write(&path, json) {
                tracing::warn!("failed to save settings: {}", err);
            }
        }
        Err(err) => tracing::warn!("failed to serialize settings: {}", err),
    }
}
