//! State container behind the task list view.
//!
//! # Design
//! `ListController` owns the task list, the input text, the blocking notice
//! and the delete confirmation gate. Every mutation goes through one of its
//! operations, and every successful remote mutation ends with a full
//! refetch: the list is never patched in place.
//!
//! Operations take `&mut self`, so a caller can only have one round trip in
//! flight at a time. Refetches therefore cannot resolve out of order.

use crate::store::TaskStore;
use crate::types::{NewTask, Tally, Task, TaskId};

/// A notification the user has to acknowledge before continuing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The store rejected or never received a new task.
    SaveFailed,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::SaveFailed => "Failed to save the task.",
        }
    }
}

/// Key input the controller understands. `Enter` is the commit key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Enter,
}

pub struct ListController<S> {
    store: S,
    tasks: Vec<Task>,
    input: String,
    notice: Option<Notice>,
    pending_removal: Option<TaskId>,
}

impl<S: TaskStore> ListController<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            tasks: Vec::new(),
            input: String::new(),
            notice: None,
            pending_removal: None,
        }
    }

    /// Initial load. On failure the list stays empty.
    pub async fn init(&mut self) {
        self.refresh().await;
    }

    /// Replace the list with a fresh read. A failed read leaves the current
    /// list as it was and is not reported to the user.
    pub async fn refresh(&mut self) {
        match self.store.fetch_all().await {
            Ok(tasks) => self.tasks = tasks,
            Err(e) => tracing::debug!("keeping previous list after failed fetch: {e}"),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn tally(&self) -> Tally {
        Tally::of(&self.tasks)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Submit the input as a new task. Blank input is ignored without a
    /// round trip.
    pub async fn add_task(&mut self) {
        let Some(new_task) = NewTask::from_input(&self.input) else {
            return;
        };
        match self.store.create(new_task).await {
            Ok(()) => {
                self.input.clear();
                self.refresh().await;
            }
            Err(e) => {
                tracing::info!("task was not saved: {e}");
                self.notice = Some(Notice::SaveFailed);
            }
        }
    }

    /// Flip `completed` based on the last value this controller saw.
    pub async fn toggle_task(&mut self, id: &TaskId) {
        let Some(current) = self.task(id).map(|t| t.completed) else {
            return;
        };
        match self.store.set_completed(id, !current).await {
            Ok(()) => self.refresh().await,
            Err(e) => tracing::debug!(%id, "toggle not applied: {e}"),
        }
    }

    /// Open the delete confirmation for `id`. Returns the task awaiting
    /// confirmation, or `None` if `id` is not in the list.
    pub fn request_removal(&mut self, id: &TaskId) -> Option<&Task> {
        let index = self.tasks.iter().position(|t| &t.id == id)?;
        self.pending_removal = Some(id.clone());
        self.tasks.get(index)
    }

    pub fn pending_removal(&self) -> Option<&Task> {
        self.pending_removal.as_ref().and_then(|id| self.task(id))
    }

    /// Close the confirmation gate. Only a confirmed removal reaches the
    /// store.
    pub async fn resolve_removal(&mut self, confirmed: bool) {
        let Some(id) = self.pending_removal.take() else {
            return;
        };
        if !confirmed {
            return;
        }
        match self.store.delete(&id).await {
            Ok(()) => self.refresh().await,
            Err(e) => tracing::debug!(%id, "delete not applied: {e}"),
        }
    }

    pub async fn on_key(&mut self, key: Key) {
        match key {
            Key::Char(c) => self.push_char(c),
            Key::Backspace => self.pop_char(),
            Key::Enter => self.add_task().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::error::ApiError;

    /// In-memory store with switchable failures and call counters.
    #[derive(Default)]
    struct FakeStore {
        rows: Mutex<Vec<Task>>,
        clock: AtomicUsize,
        fail_fetch: AtomicBool,
        fail_mutations: AtomicBool,
        creates: AtomicUsize,
        updates: AtomicUsize,
        deletes: AtomicUsize,
    }

    impl FakeStore {
        fn failure() -> ApiError {
            ApiError::Http {
                status: 500,
                body: "down".to_string(),
            }
        }

        fn seed(&self, text: &str, completed: bool) -> TaskId {
            let tick = self.clock.fetch_add(1, Ordering::SeqCst) as i64;
            let id = TaskId::new(format!("row-{tick}"));
            self.rows.lock().unwrap().push(Task {
                id: id.clone(),
                text: text.to_string(),
                completed,
                created_at: Some(Utc.timestamp_opt(0, 0).unwrap() + Duration::seconds(tick)),
            });
            id
        }
    }

    #[async_trait]
    impl<'a> TaskStore for &'a FakeStore {
        async fn fetch_all(&self) -> Result<Vec<Task>, ApiError> {
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(FakeStore::failure());
            }
            let mut rows = self.rows.lock().unwrap().clone();
            crate::types::sort_newest_first(&mut rows);
            Ok(rows)
        }

        async fn create(&self, task: NewTask) -> Result<(), ApiError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            if self.fail_mutations.load(Ordering::SeqCst) {
                return Err(FakeStore::failure());
            }
            self.seed(task.text(), false);
            Ok(())
        }

        async fn set_completed(&self, id: &TaskId, completed: bool) -> Result<(), ApiError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            if self.fail_mutations.load(Ordering::SeqCst) {
                return Err(FakeStore::failure());
            }
            for row in self.rows.lock().unwrap().iter_mut().filter(|r| &r.id == id) {
                row.completed = completed;
            }
            Ok(())
        }

        async fn delete(&self, id: &TaskId) -> Result<(), ApiError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            if self.fail_mutations.load(Ordering::SeqCst) {
                return Err(FakeStore::failure());
            }
            self.rows.lock().unwrap().retain(|r| &r.id != id);
            Ok(())
        }
    }

    async fn loaded(store: &FakeStore) -> ListController<&FakeStore> {
        let mut controller = ListController::new(store);
        controller.init().await;
        controller
    }

    #[tokio::test]
    async fn init_loads_newest_first() {
        let store = FakeStore::default();
        store.seed("first", false);
        store.seed("second", true);
        store.seed("third", false);

        let controller = loaded(&store).await;
        let texts: Vec<&str> = controller.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["third", "second", "first"]);
        assert!(controller
            .tasks()
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn init_failure_leaves_list_empty() {
        let store = FakeStore::default();
        store.seed("hidden", false);
        store.fail_fetch.store(true, Ordering::SeqCst);

        let controller = loaded(&store).await;
        assert!(controller.tasks().is_empty());
        assert!(controller.notice().is_none());
    }

    #[tokio::test]
    async fn tally_always_adds_up() {
        let store = FakeStore::default();
        store.seed("a", false);
        store.seed("b", true);
        store.seed("c", true);

        let controller = loaded(&store).await;
        let tally = controller.tally();
        assert_eq!(tally.pending, 1);
        assert_eq!(tally.done, 2);
        assert_eq!(tally.pending + tally.done, controller.tasks().len());
    }

    #[tokio::test]
    async fn blank_input_never_calls_create() {
        let store = FakeStore::default();
        store.seed("existing", false);
        let mut controller = loaded(&store).await;
        let before = controller.tasks().to_vec();

        for blank in ["", "   ", "\t\n"] {
            controller.set_input(blank);
            controller.add_task().await;
        }

        assert_eq!(store.creates.load(Ordering::SeqCst), 0);
        assert_eq!(controller.tasks(), before.as_slice());
    }

    #[tokio::test]
    async fn add_task_inserts_newest_first_and_clears_input() {
        let store = FakeStore::default();
        store.seed("older", true);
        let mut controller = loaded(&store).await;

        controller.set_input("buy milk");
        controller.add_task().await;

        assert_eq!(controller.input(), "");
        assert_eq!(controller.tasks().len(), 2);
        let first = &controller.tasks()[0];
        assert_eq!(first.text, "buy milk");
        assert!(!first.completed);
        let matching = controller
            .tasks()
            .iter()
            .filter(|t| t.text == "buy milk")
            .count();
        assert_eq!(matching, 1);
    }

    #[tokio::test]
    async fn add_task_stores_trimmed_text() {
        let store = FakeStore::default();
        let mut controller = loaded(&store).await;

        controller.set_input("   walk the dog  ");
        controller.add_task().await;

        assert_eq!(controller.tasks()[0].text, "walk the dog");
    }

    #[tokio::test]
    async fn enter_key_commits_typed_text() {
        let store = FakeStore::default();
        let mut controller = loaded(&store).await;

        for c in "tea".chars() {
            controller.on_key(Key::Char(c)).await;
        }
        controller.on_key(Key::Char('x')).await;
        controller.on_key(Key::Backspace).await;
        assert_eq!(controller.input(), "tea");

        controller.on_key(Key::Enter).await;
        assert_eq!(store.creates.load(Ordering::SeqCst), 1);
        assert_eq!(controller.tasks()[0].text, "tea");
    }

    #[tokio::test]
    async fn failed_create_keeps_input_and_raises_notice() {
        let store = FakeStore::default();
        store.seed("existing", false);
        let mut controller = loaded(&store).await;
        let before = controller.tasks().to_vec();
        store.fail_mutations.store(true, Ordering::SeqCst);

        controller.set_input("buy milk");
        controller.add_task().await;

        assert_eq!(controller.input(), "buy milk");
        assert_eq!(controller.tasks(), before.as_slice());
        assert_eq!(controller.notice(), Some(&Notice::SaveFailed));

        controller.dismiss_notice();
        assert!(controller.notice().is_none());
    }

    #[tokio::test]
    async fn toggle_flips_and_flips_back() {
        let store = FakeStore::default();
        let id = store.seed("laundry", false);
        let mut controller = loaded(&store).await;

        controller.toggle_task(&id).await;
        assert!(controller.task(&id).unwrap().completed);

        controller.toggle_task(&id).await;
        assert!(!controller.task(&id).unwrap().completed);
        assert_eq!(store.updates.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn toggle_unknown_id_is_a_no_op() {
        let store = FakeStore::default();
        store.seed("laundry", false);
        let mut controller = loaded(&store).await;

        controller.toggle_task(&TaskId::new("missing")).await;
        assert_eq!(store.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_toggle_is_silent() {
        let store = FakeStore::default();
        let id = store.seed("laundry", false);
        let mut controller = loaded(&store).await;
        store.fail_mutations.store(true, Ordering::SeqCst);

        controller.toggle_task(&id).await;

        assert!(!controller.task(&id).unwrap().completed);
        assert!(controller.notice().is_none());
    }

    #[tokio::test]
    async fn declined_removal_never_reaches_store() {
        let store = FakeStore::default();
        let id = store.seed("keep me", false);
        let mut controller = loaded(&store).await;

        assert_eq!(controller.request_removal(&id).map(|t| &t.id), Some(&id));
        assert_eq!(controller.pending_removal().map(|t| &t.id), Some(&id));
        controller.resolve_removal(false).await;

        assert!(controller.pending_removal().is_none());
        assert_eq!(store.deletes.load(Ordering::SeqCst), 0);
        assert!(controller.task(&id).is_some());
    }

    #[tokio::test]
    async fn confirmed_removal_deletes_and_refetches() {
        let store = FakeStore::default();
        let keep = store.seed("keep", false);
        let gone = store.seed("gone", true);
        let mut controller = loaded(&store).await;

        controller.request_removal(&gone);
        controller.resolve_removal(true).await;

        assert!(controller.task(&gone).is_none());
        assert!(controller.task(&keep).is_some());
        assert_eq!(store.deletes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn resolve_without_request_does_nothing() {
        let store = FakeStore::default();
        store.seed("a", false);
        let mut controller = loaded(&store).await;

        controller.resolve_removal(true).await;
        assert_eq!(store.deletes.load(Ordering::SeqCst), 0);
        assert!(controller.request_removal(&TaskId::new("missing")).is_none());
    }

    #[tokio::test]
    async fn failed_delete_is_silent() {
        let store = FakeStore::default();
        let id = store.seed("sticky", false);
        let mut controller = loaded(&store).await;
        store.fail_mutations.store(true, Ordering::SeqCst);

        controller.request_removal(&id);
        controller.resolve_removal(true).await;

        assert!(controller.task(&id).is_some());
        assert!(controller.notice().is_none());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_list() {
        let store = FakeStore::default();
        store.seed("a", false);
        let mut controller = loaded(&store).await;
        store.seed("b", false);
        store.fail_fetch.store(true, Ordering::SeqCst);

        controller.refresh().await;
        assert_eq!(controller.tasks().len(), 1);
    }
}
