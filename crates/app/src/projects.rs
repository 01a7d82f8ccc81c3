//! Project store: owns the website-project collection, the active selection,
//! and the generation workflow.
//!
//! Every successful mutation is written through the storage adapter. A failed
//! write is logged and swallowed; in-memory state stays authoritative for the
//! running session.

use providers::{GenerateError, WebsiteGenerator};
use services::sanitize::clean_generated_html;
use services::storage::{ProjectStorage, StoredState};
use shared::chat_api::ChatMessage;
use shared::project::WebsiteProject;

/// Name given to a project synthesized when the collection would otherwise
/// be empty.
const DEFAULT_PROJECT_NAME: &str = "New Website";

/// An accepted generation request.
///
/// The target is pinned by project id at call time, so list mutations while
/// the request is in flight cannot retarget the result.
#[derive(Debug, Clone)]
pub struct PendingGeneration {
    pub project_id: String,
    pub messages: Vec<ChatMessage>,
}

struct InFlight {
    project_id: String,
    rollback: Vec<WebsiteProject>,
}

pub struct ProjectStore {
    projects: Vec<WebsiteProject>,
    active_project_id: Option<String>,
    in_flight: Option<InFlight>,
    last_error: Option<String>,
    storage: Box<dyn ProjectStorage>,
}

impl ProjectStore {
    /// Load persisted state and repair it into a valid shape: at least one
    /// project exists, and the active id references a member. Runs once per
    /// process.
    pub fn load(storage: Box<dyn ProjectStorage>) -> Self {
        let StoredState {
            projects,
            active_project_id,
        } = storage.load();

        let mut store = Self {
            projects,
            active_project_id,
            in_flight: None,
            last_error: None,
            storage,
        };

        if store.projects.is_empty() {
            let project = WebsiteProject::new(DEFAULT_PROJECT_NAME);
            store.active_project_id = Some(project.id.clone());
            store.projects.push(project);
            store.persist();
        } else if !store.is_known(store.active_project_id.as_deref()) {
            store.active_project_id = store.projects.first().map(|p| p.id.clone());
            store.persist();
        }

        tracing::info!("loaded {} project(s)", store.projects.len());
        store
    }

    pub fn projects(&self) -> &[WebsiteProject] {
        &self.projects
    }

    pub fn active_project_id(&self) -> Option<&str> {
        self.active_project_id.as_deref()
    }

    pub fn active_project(&self) -> Option<&WebsiteProject> {
        let id = self.active_project_id.as_deref()?;
        self.projects.iter().find(|p| p.id == id)
    }

    /// True while a generation is in flight. Gates `begin_message` only;
    /// create/select/delete stay available.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn create_project(&mut self) {
        let project = WebsiteProject::new(&format!("Website {}", self.projects.len() + 1));
        self.active_project_id = Some(project.id.clone());
        self.projects.push(project);
        self.last_error = None;
        self.persist();
    }

    /// Activate `id` if it exists. A stale id is silently ignored: callers
    /// only hold ids from the currently rendered list.
    pub fn select_project(&mut self, id: &str) {
        if self.is_known(Some(id)) {
            self.active_project_id = Some(id.to_string());
            self.last_error = None;
            self.persist();
        }
    }

    pub fn delete_project(&mut self, id: &str) {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        if self.projects.len() == before {
            return;
        }

        if self.active_project_id.as_deref() == Some(id) {
            match self.projects.first() {
                Some(first) => self.active_project_id = Some(first.id.clone()),
                None => {
                    let project = WebsiteProject::new(DEFAULT_PROJECT_NAME);
                    self.active_project_id = Some(project.id.clone());
                    self.projects.push(project);
                }
            }
        }
        self.persist();
    }

    /// First half of the send workflow: validate, snapshot, append the user
    /// turn (naming the project if it is the first), and commit the
    /// intermediate state so the prompt is visible while generation runs.
    ///
    /// Returns `None` when the preconditions fail (blank prompt, a request
    /// already in flight, no active project). That is a no-op, not an
    /// error.
    pub fn begin_message(&mut self, prompt: &str) -> Option<PendingGeneration> {
        if prompt.trim().is_empty() || self.in_flight.is_some() {
            return None;
        }
        let active_id = self.active_project_id.clone()?;

        let rollback = self.projects.clone();
        let project = self.projects.iter_mut().find(|p| p.id == active_id)?;
        project.push_user_prompt(prompt);
        let messages = project.chat_history.clone();

        self.in_flight = Some(InFlight {
            project_id: active_id.clone(),
            rollback,
        });
        self.last_error = None;
        self.persist();

        Some(PendingGeneration {
            project_id: active_id,
            messages,
        })
    }

    /// Second half of the send workflow: commit or roll back.
    ///
    /// Success applies to the project captured at `begin_message` time, found
    /// by id rather than position. Failure restores the snapshot wholesale,
    /// as if the call never happened.
    pub fn finish_message(&mut self, result: Result<String, GenerateError>) {
        let Some(in_flight) = self.in_flight.take() else {
            return;
        };

        match result {
            Ok(raw) => {
                let code = clean_generated_html(&raw);
                match self
                    .projects
                    .iter_mut()
                    .find(|p| p.id == in_flight.project_id)
                {
                    Some(project) => project.push_generated(code),
                    None => {
                        // The target was deleted while the request was in flight.
                        tracing::warn!(
                            "dropping generation result for deleted project {}",
                            in_flight.project_id
                        );
                    }
                }
            }
            Err(err) => {
                self.projects = in_flight.rollback;
                if !self.is_known(self.active_project_id.as_deref()) {
                    self.active_project_id = self.projects.first().map(|p| p.id.clone());
                }
                self.last_error = Some(err.to_string());
            }
        }
        self.persist();
    }

    /// Full send workflow with a single suspension point. Used by headless
    /// embedders and tests; the GUI drives `begin_message`/`finish_message`
    /// around its own background worker.
    pub async fn send_message(&mut self, generator: &dyn WebsiteGenerator, prompt: &str) {
        let Some(pending) = self.begin_message(prompt) else {
            return;
        };
        let result = generator.generate(&pending.messages).await;
        self.finish_message(result);
    }

    fn is_known(&self, id: Option<&str>) -> bool {
        match id {
            Some(id) => self.projects.iter().any(|p| p.id == id),
            None => false,
        }
    }

    fn persist(&self) {
        let state = StoredState {
            projects: self.projects.clone(),
            active_project_id: self.active_project_id.clone(),
        };
        if let Err(err) = self.storage.save(&state) {
            tracing::warn!("failed to persist project store: {:#}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use services::storage::MemoryStorage;
    use shared::chat_api::Role;
    use std::sync::Arc;

    struct StubGenerator(&'static str);

    #[async_trait]
    impl WebsiteGenerator for StubGenerator {
        async fn generate(&self, _history: &[ChatMessage]) -> Result<String, GenerateError> {
            Ok(self.0.to_string())
        }

        async fn enhance(&self, prompt: &str) -> Result<String, GenerateError> {
            Ok(prompt.to_string())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl WebsiteGenerator for FailingGenerator {
        async fn generate(&self, _history: &[ChatMessage]) -> Result<String, GenerateError> {
            Err(GenerateError::Request("boom".to_string()))
        }

        async fn enhance(&self, _prompt: &str) -> Result<String, GenerateError> {
            Err(GenerateError::Request("boom".to_string()))
        }
    }

    const DOC: &str = "<!DOCTYPE html><html></html>";

    fn store_with_memory() -> (ProjectStore, Arc<MemoryStorage>) {
        let mem = Arc::new(MemoryStorage::default());
        let store = ProjectStore::load(Box::new(Arc::clone(&mem)));
        (store, mem)
    }

    #[test]
    fn empty_persisted_state_yields_one_active_default() {
        let (store, mem) = store_with_memory();

        assert_eq!(store.projects().len(), 1);
        assert_eq!(store.projects()[0].name, "New Website");
        assert_eq!(
            store.active_project_id(),
            Some(store.projects()[0].id.as_str())
        );
        // The repaired state was persisted immediately.
        assert_eq!(mem.snapshot().projects, store.projects());
    }

    #[test]
    fn dangling_active_id_is_reset_to_first_project() {
        let mem = Arc::new(MemoryStorage::default());
        let seeded = WebsiteProject::new("Landing");
        mem.save(&StoredState {
            projects: vec![seeded.clone()],
            active_project_id: Some("gone".to_string()),
        })
        .unwrap();

        let store = ProjectStore::load(Box::new(Arc::clone(&mem)));
        assert_eq!(store.active_project_id(), Some(seeded.id.as_str()));
        assert_eq!(mem.snapshot().active_project_id, Some(seeded.id));
    }

    #[test]
    fn create_project_numbers_and_activates() {
        let (mut store, _mem) = store_with_memory();
        store.create_project();

        assert_eq!(store.projects().len(), 2);
        assert_eq!(store.projects()[1].name, "Website 2");
        assert_eq!(
            store.active_project_id(),
            Some(store.projects()[1].id.as_str())
        );
    }

    #[test]
    fn select_with_stale_id_is_ignored() {
        let (mut store, _mem) = store_with_memory();
        let active = store.active_project_id().unwrap().to_string();

        store.select_project("not-a-project");
        assert_eq!(store.active_project_id(), Some(active.as_str()));
    }

    #[test]
    fn deleting_last_project_resynthesizes_a_default() {
        let (mut store, mem) = store_with_memory();
        let old_id = store.active_project_id().unwrap().to_string();

        store.delete_project(&old_id);

        assert_eq!(store.projects().len(), 1);
        assert_ne!(store.projects()[0].id, old_id);
        assert_eq!(store.projects()[0].name, "New Website");
        assert_eq!(
            store.active_project_id(),
            Some(store.projects()[0].id.as_str())
        );
        assert_eq!(mem.snapshot().projects, store.projects());
    }

    #[test]
    fn deleting_inactive_project_keeps_the_active_one() {
        let (mut store, _mem) = store_with_memory();
        let first = store.projects()[0].id.clone();
        store.create_project();
        let second = store.active_project_id().unwrap().to_string();

        store.delete_project(&first);

        assert_eq!(store.projects().len(), 1);
        assert_eq!(store.active_project_id(), Some(second.as_str()));
    }

    #[tokio::test]
    async fn successful_send_appends_a_user_assistant_pair() {
        let (mut store, mem) = store_with_memory();

        store
            .send_message(&StubGenerator("```html\n<!DOCTYPE html><html></html>\n```"), "a bakery site")
            .await;

        let project = store.active_project().unwrap();
        assert_eq!(project.chat_history.len(), 2);
        assert_eq!(project.chat_history[0].role, Role::User);
        assert_eq!(project.chat_history[0].content, "a bakery site");
        assert_eq!(project.chat_history[1].role, Role::Assistant);
        assert_eq!(project.chat_history[1].content, DOC);
        assert_eq!(project.generated_code.as_deref(), Some(DOC));
        assert!(!store.is_loading());
        assert!(store.last_error().is_none());
        assert_eq!(mem.snapshot().projects, store.projects());
    }

    #[tokio::test]
    async fn failed_send_rolls_back_completely() {
        let (mut store, mem) = store_with_memory();
        store.send_message(&StubGenerator(DOC), "a bakery site").await;
        let before = store.projects().to_vec();

        store.send_message(&FailingGenerator, "add a footer").await;

        assert_eq!(store.projects(), before.as_slice());
        assert_eq!(store.last_error(), Some("boom"));
        assert!(!store.is_loading());
        // The persisted snapshot was rolled back too.
        assert_eq!(mem.snapshot().projects, before);
    }

    #[tokio::test]
    async fn first_message_renames_with_truncation() {
        let (mut store, _mem) = store_with_memory();
        let prompt = "a".repeat(50);

        store.send_message(&StubGenerator(DOC), &prompt).await;
        assert_eq!(
            store.active_project().unwrap().name,
            format!("{}...", "a".repeat(40))
        );
    }

    #[tokio::test]
    async fn short_first_message_renames_without_marker() {
        let (mut store, _mem) = store_with_memory();

        store.send_message(&StubGenerator(DOC), "ten chars!").await;
        assert_eq!(store.active_project().unwrap().name, "ten chars!");
    }

    #[tokio::test]
    async fn blank_prompt_is_a_no_op() {
        let (mut store, _mem) = store_with_memory();

        store.send_message(&StubGenerator(DOC), "   ").await;
        assert!(store.active_project().unwrap().chat_history.is_empty());
        assert!(store.last_error().is_none());
    }

    #[test]
    fn second_send_while_loading_is_a_no_op() {
        let (mut store, _mem) = store_with_memory();

        let pending = store.begin_message("first prompt");
        assert!(pending.is_some());
        assert!(store.is_loading());

        assert!(store.begin_message("second prompt").is_none());
        assert_eq!(store.active_project().unwrap().chat_history.len(), 1);
    }

    #[test]
    fn result_lands_on_the_originating_project_by_id() {
        let (mut store, _mem) = store_with_memory();
        let origin = store.active_project_id().unwrap().to_string();

        let pending = store.begin_message("a bakery site").unwrap();
        assert_eq!(pending.project_id, origin);

        // Switch away while the request is in flight.
        store.create_project();
        store.finish_message(Ok(DOC.to_string()));

        let origin_project = store.projects().iter().find(|p| p.id == origin).unwrap();
        assert_eq!(origin_project.chat_history.len(), 2);
        assert_eq!(origin_project.generated_code.as_deref(), Some(DOC));
        let other = store.active_project().unwrap();
        assert!(other.chat_history.is_empty());
    }

    #[test]
    fn result_for_a_deleted_project_is_dropped() {
        let (mut store, _mem) = store_with_memory();
        let origin = store.active_project_id().unwrap().to_string();

        store.begin_message("a bakery site").unwrap();
        store.delete_project(&origin);
        store.finish_message(Ok(DOC.to_string()));

        assert!(!store.is_loading());
        assert!(store
            .projects()
            .iter()
            .all(|p| p.generated_code.is_none() && p.chat_history.is_empty()));
    }
}
