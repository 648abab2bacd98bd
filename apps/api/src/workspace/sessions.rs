//! Logged-in workspaces and the debounced profile writer.
//!
//! Mutations call `mark_dirty`; a single background task waits until a key
//! has been quiet for the debounce window and then writes one snapshot.
//! Rapid edits therefore coalesce into one store write. `flush` writes all
//! pending keys immediately and runs on shutdown.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::{mpsc, oneshot, Mutex, RwLock};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::catalog::daily::fixed_daily_tasks;
use crate::catalog::roadmap::roadmap_catalog;
use crate::persistence::profile::{login, save_profile, LoginOutcome};
use crate::persistence::{normalize_username, ProfileStore, StoreError};
use crate::workspace::Workspace;

pub type SharedWorkspace = Arc<Mutex<Workspace>>;
type WorkspaceMap = Arc<RwLock<HashMap<String, SharedWorkspace>>>;
/// One lock per username key; held while that user's profile is loaded.
type LoginGates = Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>;

enum SaveSignal {
    Dirty(String),
    Flush(oneshot::Sender<()>),
}

#[derive(Clone)]
pub struct SessionRegistry {
    workspaces: WorkspaceMap,
    gates: LoginGates,
    store: Arc<dyn ProfileStore>,
    saver: mpsc::UnboundedSender<SaveSignal>,
}

impl SessionRegistry {
    /// Creates the registry and spawns its writer task on the current runtime.
    pub fn start(store: Arc<dyn ProfileStore>, debounce: Duration) -> Self {
        let workspaces: WorkspaceMap = Arc::new(RwLock::new(HashMap::new()));
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_saver(rx, workspaces.clone(), store.clone(), debounce));
        Self {
            workspaces,
            gates: Arc::new(Mutex::new(HashMap::new())),
            store,
            saver: tx,
        }
    }

    async fn gate(&self, key: &str) -> Arc<Mutex<()>> {
        self.gates
            .lock()
            .await
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    async fn loaded(&self, key: &str) -> Option<SharedWorkspace> {
        self.workspaces.read().await.get(key).cloned()
    }

    async fn load(&self, key: &str, today: NaiveDate) -> Result<LoginOutcome, StoreError> {
        login(
            self.store.as_ref(),
            &roadmap_catalog(),
            &fixed_daily_tasks(),
            key,
            today,
        )
        .await
    }

    /// Loads the user's profile and installs a workspace for it.
    ///
    /// A user who is already loaded keeps the same shared workspace: its
    /// current state is written out first and the freshly loaded document
    /// replaces the contents in place, so handles held by in-flight requests
    /// stay live.
    pub async fn login(
        &self,
        username: &str,
        today: NaiveDate,
    ) -> Result<(SharedWorkspace, LoginOutcome), StoreError> {
        let key = normalize_username(username)?;
        let gate = self.gate(&key).await;
        let _loading = gate.lock().await;

        if let Some(shared) = self.loaded(&key).await {
            let mut ws = shared.lock().await;
            save_profile(self.store.as_ref(), &key, ws.snapshot()).await;
            let outcome = self.load(&key, today).await?;
            ws.reload(outcome.document.clone());
            drop(ws);
            info!("Session reloaded for {key}");
            return Ok((shared, outcome));
        }

        let outcome = self.load(&key, today).await?;
        let shared = self.install(&outcome).await;
        Ok((shared, outcome))
    }

    async fn install(&self, outcome: &LoginOutcome) -> SharedWorkspace {
        let shared = Arc::new(Mutex::new(Workspace::from_document(
            outcome.username_key.clone(),
            outcome.document.clone(),
        )));
        self.workspaces
            .write()
            .await
            .insert(outcome.username_key.clone(), shared.clone());
        info!("Session opened for {}", outcome.username_key);
        shared
    }

    /// The user's workspace, logging in implicitly when none is loaded.
    /// Daily tasks roll over here on the first touch of a new day.
    pub async fn workspace(
        &self,
        username: &str,
        today: NaiveDate,
    ) -> Result<SharedWorkspace, StoreError> {
        let key = normalize_username(username)?;
        let shared = match self.loaded(&key).await {
            Some(existing) => existing,
            None => {
                let gate = self.gate(&key).await;
                let _loading = gate.lock().await;
                match self.loaded(&key).await {
                    Some(existing) => existing,
                    None => {
                        let outcome = self.load(&key, today).await?;
                        self.install(&outcome).await
                    }
                }
            }
        };

        if shared.lock().await.roll_over(today) {
            debug!("Daily tasks reset for {key}");
            self.mark_dirty(&key);
        }
        Ok(shared)
    }

    /// Schedules a debounced save of the user's workspace.
    pub fn mark_dirty(&self, username_key: &str) {
        if self
            .saver
            .send(SaveSignal::Dirty(username_key.to_string()))
            .is_err()
        {
            warn!("Profile writer stopped; change for {username_key} will not be saved");
        }
    }

    /// Writes every pending workspace now and waits for completion.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.saver.send(SaveSignal::Flush(ack)).is_err() {
            warn!("Profile writer stopped; nothing flushed");
            return;
        }
        let _ = done.await;
    }
}

async fn run_saver(
    mut rx: mpsc::UnboundedReceiver<SaveSignal>,
    workspaces: WorkspaceMap,
    store: Arc<dyn ProfileStore>,
    debounce: Duration,
) {
    let mut pending: HashMap<String, Instant> = HashMap::new();

    loop {
        let next_due = pending.values().min().copied();
        let wait = async move {
            match next_due {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            signal = rx.recv() => match signal {
                Some(SaveSignal::Dirty(key)) => {
                    pending.insert(key, Instant::now() + debounce);
                }
                Some(SaveSignal::Flush(ack)) => {
                    let keys: Vec<String> = pending.drain().map(|(key, _)| key).collect();
                    for key in keys {
                        write_snapshot(&workspaces, store.as_ref(), &key).await;
                    }
                    let _ = ack.send(());
                }
                None => {
                    for (key, _) in pending.drain() {
                        write_snapshot(&workspaces, store.as_ref(), &key).await;
                    }
                    debug!("Profile writer shutting down");
                    break;
                }
            },
            _ = wait => {
                let now = Instant::now();
                let due: Vec<String> = pending
                    .iter()
                    .filter(|(_, deadline)| **deadline <= now)
                    .map(|(key, _)| key.clone())
                    .collect();
                for key in due {
                    pending.remove(&key);
                    write_snapshot(&workspaces, store.as_ref(), &key).await;
                }
            }
        }
    }
}

async fn write_snapshot(workspaces: &WorkspaceMap, store: &dyn ProfileStore, key: &str) {
    let Some(workspace) = workspaces.read().await.get(key).cloned() else {
        return;
    };
    let patch = workspace.lock().await.snapshot();
    save_profile(store, key, patch).await;
    debug!("Saved profile for {key}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::roadmap::Status;
    use crate::persistence::memory::InMemoryProfileStore;

    const WINDOW: Duration = Duration::from_millis(1500);

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn registry() -> (Arc<InMemoryProfileStore>, SessionRegistry) {
        let store = Arc::new(InMemoryProfileStore::default());
        let registry = SessionRegistry::start(store.clone(), WINDOW);
        (store, registry)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_coalesce_into_one_write() {
        let (store, registry) = registry();
        let (ws, outcome) = registry.login("Bob", today()).await.unwrap();
        let key = outcome.username_key;

        for text in ["one", "two", "three"] {
            ws.lock().await.add_homework(text).unwrap();
            registry.mark_dirty(&key);
            tokio::time::sleep(WINDOW / 3).await;
        }
        assert_eq!(store.merge_count(), 0);

        tokio::time::sleep(WINDOW * 2).await;
        assert_eq!(store.merge_count(), 1);
        assert_eq!(store.get("bob").unwrap().homework_tasks.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_writes_pending_immediately() {
        let (store, registry) = registry();
        let (ws, _) = registry.login("carol", today()).await.unwrap();
        let id = ws.lock().await.roadmap()[1].id.clone();
        ws.lock().await.set_status(&id, Status::InProgress).unwrap();
        registry.mark_dirty("carol");

        registry.flush().await;
        assert_eq!(store.merge_count(), 1);
        let saved = store.get("carol").unwrap();
        assert_eq!(saved.roadmap[1].status, Status::InProgress);

        // Nothing left pending after a flush.
        tokio::time::sleep(WINDOW * 2).await;
        assert_eq!(store.merge_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_workspace_logs_in_implicitly_and_is_shared() {
        let (_store, registry) = registry();
        let a = registry.workspace("Dana", today()).await.unwrap();
        let b = registry.workspace(" dana ", today()).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test(start_paused = true)]
    async fn test_relogin_flushes_pending_edits_first() {
        let (store, registry) = registry();
        let (ws, _) = registry.login("erin", today()).await.unwrap();
        ws.lock().await.add_homework("Networks quiz").unwrap();
        registry.mark_dirty("erin");

        let (reloaded, _) = registry.login("Erin", today()).await.unwrap();
        assert_eq!(reloaded.lock().await.homework_tasks().len(), 1);
        assert_eq!(store.get("erin").unwrap().homework_tasks.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_first_requests_share_one_workspace() {
        let store = Arc::new(InMemoryProfileStore::slow());
        let registry = SessionRegistry::start(store.clone(), WINDOW);

        let (a, b) = tokio::join!(
            registry.workspace("zoe", today()),
            registry.workspace("Zoe", today())
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(Arc::ptr_eq(&a, &b));

        a.lock().await.add_homework("Graph theory sheet").unwrap();
        registry.mark_dirty("zoe");
        registry.flush().await;
        assert_eq!(store.get("zoe").unwrap().homework_tasks.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_relogin_keeps_handles_live() {
        let store = Arc::new(InMemoryProfileStore::slow());
        let registry = SessionRegistry::start(store.clone(), WINDOW);
        let held = registry.workspace("yuri", today()).await.unwrap();

        let (reloaded, outcome) = registry.login("yuri", today()).await.unwrap();
        assert!(!outcome.created);
        assert!(Arc::ptr_eq(&held, &reloaded));

        held.lock().await.add_daily("Mock interview").unwrap();
        registry.mark_dirty("yuri");
        registry.flush().await;
        let saved = store.get("yuri").unwrap();
        assert!(saved.daily_tasks.iter().any(|t| t.text == "Mock interview"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loaded_workspace_resets_daily_tasks_on_new_day() {
        let (store, registry) = registry();
        let ws = registry.workspace("kim", today()).await.unwrap();
        {
            let mut ws = ws.lock().await;
            let ids: Vec<String> = ws.daily_tasks().iter().map(|t| t.id.clone()).collect();
            for id in &ids {
                ws.toggle_daily(id).unwrap();
            }
            assert!(ws.all_daily_complete());
        }

        let tomorrow = today().succ_opt().unwrap();
        let same = registry.workspace("kim", tomorrow).await.unwrap();
        assert!(Arc::ptr_eq(&ws, &same));
        assert!(same.lock().await.daily_tasks().iter().all(|t| !t.completed));

        registry.flush().await;
        let saved = store.get("kim").unwrap();
        assert_eq!(saved.last_reset_date, Some(tomorrow));
        assert!(saved.daily_tasks.iter().all(|t| !t.completed));
    }
}
