//! Generic resource controller
//!
//! One [`ResourceController`] drives one view: it owns the item list, the
//! loading flag and the error banner, and reconciles them with the remote
//! API through a [`Transport`].
//!
//! Reconciliation rules:
//! - Items whose id is [`ItemId::Local`] never reach the remote mutation
//!   endpoints. Edits on them are rejected; deletes and toggles apply locally.
//! - Adds are optimistic. The seeded item is visible at the head of the list
//!   before the create call resolves, then re-keyed in place to the id the
//!   server returns.
//! - No compensating action. A failed create leaves the optimistic item under
//!   its local id, and a failed toggle keeps the flipped flag. Only the error
//!   banner reports the failure, and mutation errors clear themselves after
//!   the configured delay.
//!
//! Actions are not serialized. Two actions on the same item race and settle
//! in network completion order unless `guard_in_flight` is enabled, in which
//! case the second action on a busy id answers [`ActionOutcome::Busy`].

mod prompter;
mod state;
mod view;

#[cfg(feature = "test-sim")]
pub use prompter::ScriptedPrompter;
pub use prompter::Prompter;
pub use state::ControllerState;
pub use view::{mount, Row, View, ViewSnapshot};

use crate::api::{self, ApiError, Transport};
use crate::config::ControllerConfig;
use crate::resource::{ItemId, LocalIdClock, Resource, LOCAL_ONLY_NOTICE, REMOTE_ID_MAX};
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use tokio::sync::watch;

/// What an action did, for callers that want to react beyond the state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action ran to completion
    Applied,
    /// Refused before doing anything; carries the notice shown to the user
    Rejected(String),
    /// The user dismissed the prompt
    Cancelled,
    /// No item with that id
    NotFound,
    /// The resource has no such operation (toggle on non-todos)
    Unsupported,
    /// Another action on the same id is still pending
    Busy,
    /// The remote call failed; carries the banner text
    Failed(String),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied)
    }
}

/// Shape of a create response; only the id is used
#[derive(Debug, Deserialize)]
struct Created {
    id: u64,
}

type SeedPicker = Box<dyn Fn() -> u64 + Send + Sync>;

struct Inner<R> {
    transport: Arc<dyn Transport>,
    config: ControllerConfig,
    state: RwLock<ControllerState<R>>,
    revision: watch::Sender<u64>,
    clock: LocalIdClock,
    seed_picker: SeedPicker,
    in_flight: Mutex<HashSet<ItemId>>,
}

/// Controller for one resource view
///
/// Cloning is cheap and every clone drives the same state, so each user
/// action can run on its own task.
pub struct ResourceController<R> {
    inner: Arc<Inner<R>>,
}

impl<R> Clone for ResourceController<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Uniform pick from the ids known to exist upstream
pub fn random_seed_id() -> u64 {
    rand::thread_rng().gen_range(1..=REMOTE_ID_MAX)
}

/// Marks an id busy for the lifetime of the guard
struct InFlight<'a> {
    set: &'a Mutex<HashSet<ItemId>>,
    id: Option<ItemId>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id {
            lock_set(self.set).remove(&id);
        }
    }
}

fn lock_set(set: &Mutex<HashSet<ItemId>>) -> std::sync::MutexGuard<'_, HashSet<ItemId>> {
    set.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("in-flight set lock was poisoned, recovering");
        poisoned.into_inner()
    })
}

impl<R: Resource> ResourceController<R> {
    pub fn new(transport: Arc<dyn Transport>, config: ControllerConfig) -> Self {
        Self::with_seed_picker(transport, config, random_seed_id)
    }

    /// Create a controller with a custom seed id source (deterministic tests)
    pub fn with_seed_picker(
        transport: Arc<dyn Transport>,
        config: ControllerConfig,
        seed_picker: impl Fn() -> u64 + Send + Sync + 'static,
    ) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                transport,
                config,
                state: RwLock::new(ControllerState::default()),
                revision,
                clock: LocalIdClock::new(),
                seed_picker: Box::new(seed_picker),
                in_flight: Mutex::new(HashSet::new()),
            }),
        }
    }

    // ========== Private Helpers ==========

    fn read_state(&self) -> RwLockReadGuard<'_, ControllerState<R>> {
        self.inner.state.read().unwrap_or_else(|poisoned| {
            tracing::warn!("controller state read lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ControllerState<R>> {
        self.inner.state.write().unwrap_or_else(|poisoned| {
            tracing::warn!("controller state write lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Apply `f` to the state and publish a new revision
    fn mutate<T>(&self, f: impl FnOnce(&mut ControllerState<R>) -> T) -> T {
        let out = {
            let mut state = self.write_state();
            f(&mut state)
        };
        self.inner.revision.send_modify(|rev| *rev += 1);
        out
    }

    fn transport(&self) -> &dyn Transport {
        self.inner.transport.as_ref()
    }

    /// Claim `id` for one action; `None` if the guard is on and it is taken
    fn claim(&self, id: ItemId) -> Option<InFlight<'_>> {
        if !self.inner.config.guard_in_flight {
            return Some(InFlight {
                set: &self.inner.in_flight,
                id: None,
            });
        }
        if !lock_set(&self.inner.in_flight).insert(id) {
            tracing::warn!("{}/{} already has an action in flight", R::CONFIG.endpoint, id);
            return None;
        }
        Some(InFlight {
            set: &self.inner.in_flight,
            id: Some(id),
        })
    }

    /// Surface `message`, end loading, and schedule the banner to clear
    fn fail(&self, message: &'static str, err: &ApiError) -> ActionOutcome {
        tracing::error!("{}: {}", message, err);
        self.mutate(|s| {
            s.error = Some(message.to_string());
            s.loading = false;
        });
        self.schedule_error_clear();
        ActionOutcome::Failed(message.to_string())
    }

    /// Fire-and-forget: clear the error slot after the configured delay
    ///
    /// Not cancelled if the slot is overwritten in the meantime, and a
    /// dropped (unmounted) controller is left alone.
    fn schedule_error_clear(&self) {
        let weak: Weak<Inner<R>> = Arc::downgrade(&self.inner);
        let delay = self.inner.config.error_clear_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                ResourceController { inner }.mutate(|s| s.error = None);
            }
        });
    }

    // ========== Getters ==========

    /// Copy of the current state
    pub fn snapshot(&self) -> ControllerState<R> {
        self.read_state().clone()
    }

    pub fn items(&self) -> Vec<R> {
        self.read_state().items.clone()
    }

    pub fn loading(&self) -> bool {
        self.read_state().loading
    }

    pub fn error(&self) -> Option<String> {
        self.read_state().error.clone()
    }

    /// Receiver that changes whenever the state does
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }

    // ========== Actions ==========

    /// Replace the list with the server's collection
    pub async fn load(&self) -> ActionOutcome {
        let config = R::CONFIG;
        self.mutate(|s| s.loading = true);

        match self.fetch_collection().await {
            Ok(items) => {
                tracing::info!("Loaded {} {}", items.len(), config.endpoint);
                self.mutate(|s| {
                    s.items = items;
                    s.error = None;
                    s.loading = false;
                });
                ActionOutcome::Applied
            }
            Err(e) => {
                // Load errors stay until the next successful load
                tracing::error!("{}: {}", config.messages.load, e);
                self.mutate(|s| {
                    s.error = Some(config.messages.load.to_string());
                    s.loading = false;
                });
                ActionOutcome::Failed(config.messages.load.to_string())
            }
        }
    }

    async fn fetch_collection(&self) -> Result<Vec<R>, ApiError> {
        let config = R::CONFIG;
        let path = config.list_path();
        let mut body: Value = api::fetch_data(self.transport(), &path).await?;
        let list = body
            .get_mut(config.list_key)
            .map(Value::take)
            .ok_or_else(|| {
                ApiError::new(
                    api::Operation::Fetch,
                    &path,
                    format!("response has no '{}' field", config.list_key),
                )
            })?;
        serde_json::from_value(list).map_err(|e| {
            ApiError::new(
                api::Operation::Fetch,
                &path,
                format!("Invalid response body: {}", e),
            )
        })
    }

    /// Seed, insert optimistically at the head, create, then re-key
    pub async fn add(&self) -> ActionOutcome {
        let config = R::CONFIG;
        self.mutate(|s| {
            s.loading = true;
            s.error = None;
        });

        let seed_id = (self.inner.seed_picker)();
        let seed: R = match api::fetch_data(self.transport(), &config.item_path(seed_id)).await {
            Ok(seed) => seed,
            Err(e) => return self.fail(config.messages.add, &e),
        };

        let local_id = self.inner.clock.mint();
        let item = R::from_seed(&seed, local_id);
        let payload = item.create_payload();
        let _in_flight = self.claim(local_id);
        self.mutate(|s| s.items.insert(0, item));
        tracing::debug!("Inserted {}/{} from seed {}", config.endpoint, local_id, seed_id);

        let created: Created =
            match api::create_data(self.transport(), &config.add_path(), payload).await {
                Ok(created) => created,
                Err(e) => return self.fail(config.messages.add, &e),
            };

        let server_id = ItemId::from_raw(created.id);
        let rekeyed = self.mutate(|s| {
            s.loading = false;
            s.rekey(local_id, server_id)
        });
        if rekeyed == 0 {
            tracing::debug!("{}/{} was removed before its create settled", config.endpoint, local_id);
        }
        ActionOutcome::Applied
    }

    /// Prompt for new field values and replace the item with the server's copy
    pub async fn edit(&self, id: ItemId, prompter: &mut dyn Prompter) -> ActionOutcome {
        let config = R::CONFIG;
        if id.is_local() {
            prompter.alert(LOCAL_ONLY_NOTICE).await;
            return ActionOutcome::Rejected(LOCAL_ONLY_NOTICE.to_string());
        }

        let Some(current) = self.read_state().find(id).cloned() else {
            return ActionOutcome::NotFound;
        };
        let Some(_in_flight) = self.claim(id) else {
            return ActionOutcome::Busy;
        };

        let mut answers = Vec::new();
        for field in current.edit_fields() {
            match prompter.prompt(field.label, &field.current).await {
                Some(answer) if !answer.trim().is_empty() => answers.push(answer),
                _ => return ActionOutcome::Cancelled,
            }
        }

        self.mutate(|s| s.loading = true);
        let payload = R::edit_payload(&answers);
        match api::update_data::<R>(self.transport(), config.endpoint, id.raw(), payload).await {
            Ok(updated) => {
                self.mutate(|s| {
                    s.replace(id, &updated);
                    s.loading = false;
                });
                ActionOutcome::Applied
            }
            Err(e) => self.fail(config.messages.update, &e),
        }
    }

    /// Remove an item; remote ids only go once the server agrees
    pub async fn delete(&self, id: ItemId) -> ActionOutcome {
        let config = R::CONFIG;
        let Some(_in_flight) = self.claim(id) else {
            return ActionOutcome::Busy;
        };

        let Some(raw) = id.remote() else {
            self.mutate(|s| s.remove(id));
            return ActionOutcome::Applied;
        };

        self.mutate(|s| s.loading = true);
        match self.transport().delete(config.endpoint, raw).await {
            Ok(()) => {
                self.mutate(|s| {
                    s.remove(id);
                    s.loading = false;
                });
                ActionOutcome::Applied
            }
            Err(e) => self.fail(config.messages.delete, &e),
        }
    }

    /// Flip the completion flag now, then tell the server (never reverted)
    pub async fn toggle(&self, id: ItemId) -> ActionOutcome {
        let config = R::CONFIG;
        let Some(message) = config.messages.toggle else {
            return ActionOutcome::Unsupported;
        };
        if self.read_state().find(id).is_none() {
            return ActionOutcome::NotFound;
        }
        let Some(_in_flight) = self.claim(id) else {
            return ActionOutcome::Busy;
        };

        let completed = self.mutate(|s| {
            let mut flipped = None;
            for item in s.items.iter_mut().filter(|item| item.id() == id) {
                if let Some(flag) = item.completed_mut() {
                    *flag = !*flag;
                    flipped = Some(*flag);
                }
            }
            flipped
        });
        let Some(completed) = completed else {
            return ActionOutcome::Unsupported;
        };

        let Some(raw) = id.remote() else {
            return ActionOutcome::Applied;
        };

        // Toggle never touches `loading`
        let payload = json!({ "completed": completed });
        match self.transport().update(config.endpoint, raw, payload).await {
            Ok(_) => ActionOutcome::Applied,
            Err(e) => {
                tracing::error!("{}: {}", message, e);
                self.mutate(|s| s.error = Some(message.to_string()));
                self.schedule_error_clear();
                ActionOutcome::Failed(message.to_string())
            }
        }
    }
}

#[cfg(all(test, feature = "test-sim"))]
mod tests {
    use super::*;
    use crate::api::{SimMethod, SimTransport};
    use crate::resource::{Comment, Todo};
    use std::time::Duration;

    fn todo(id: u64, text: &str, completed: bool) -> Todo {
        Todo {
            id: ItemId::from_raw(id),
            todo: text.to_string(),
            completed,
            user_id: None,
        }
    }

    fn controller(sim: &SimTransport) -> ResourceController<Todo> {
        ResourceController::with_seed_picker(
            Arc::new(sim.clone()),
            ControllerConfig::default(),
            || 7,
        )
    }

    async fn loaded(sim: &SimTransport, items: serde_json::Value) -> ResourceController<Todo> {
        sim.respond(SimMethod::Get, "todos", json!({ "todos": items, "total": 2 }));
        let c = controller(sim);
        assert!(c.load().await.is_applied());
        c
    }

    #[tokio::test]
    async fn test_load_keeps_server_order() {
        let sim = SimTransport::new();
        let c = loaded(
            &sim,
            json!([
                {"id": 3, "todo": "c", "completed": false},
                {"id": 1, "todo": "a", "completed": true}
            ]),
        )
        .await;
        let state = c.snapshot();
        assert_eq!(state.items, vec![todo(3, "c", false), todo(1, "a", true)]);
        assert!(!state.loading);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_load_failure_sets_persistent_error() {
        let sim = SimTransport::new();
        sim.fail(SimMethod::Get, "todos", 500);
        let c = controller(&sim);
        assert_eq!(
            c.load().await,
            ActionOutcome::Failed("Failed to fetch todos".to_string())
        );
        assert_eq!(c.error().as_deref(), Some("Failed to fetch todos"));
        assert!(!c.loading());
    }

    #[tokio::test]
    async fn test_load_without_list_key_fails() {
        let sim = SimTransport::new();
        sim.respond(SimMethod::Get, "todos", json!({"items": []}));
        let c = controller(&sim);
        assert!(!c.load().await.is_applied());
    }

    #[tokio::test]
    async fn test_toggle_unsupported_for_comments() {
        let sim = SimTransport::new();
        sim.respond(
            SimMethod::Get,
            "comments",
            json!({"comments": [{"id": 1, "body": "hi", "postId": 2}]}),
        );
        let c: ResourceController<Comment> =
            ResourceController::new(Arc::new(sim.clone()), ControllerConfig::default());
        c.load().await;
        let before = c.revision();
        assert_eq!(c.toggle(ItemId::Remote(1)).await, ActionOutcome::Unsupported);
        assert_eq!(c.revision(), before);
        assert_eq!(sim.calls_with(SimMethod::Put).len(), 0);
    }

    #[tokio::test]
    async fn test_every_mutation_bumps_revision() {
        let sim = SimTransport::new();
        let c = loaded(&sim, json!([{"id": 40, "todo": "local", "completed": false}])).await;
        let mut rx = c.subscribe();
        let _ = rx.borrow_and_update();
        c.delete(ItemId::Local(40)).await;
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_clear_skips_dropped_controller() {
        let sim = SimTransport::new();
        sim.fail(SimMethod::Delete, "todos/1", 500);
        let c = loaded(&sim, json!([{"id": 1, "todo": "a", "completed": false}])).await;
        c.delete(ItemId::Remote(1)).await;
        drop(c);
        // The clear task must not panic when the controller is gone
        tokio::time::sleep(Duration::from_secs(4)).await;
    }

    #[test]
    fn test_random_seed_id_in_range() {
        for _ in 0..200 {
            let id = random_seed_id();
            assert!((1..=REMOTE_ID_MAX).contains(&id));
        }
    }
}
