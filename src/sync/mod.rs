//! Reconciliation between the in-memory [`TaskStore`] and the backend.
//!
//! Every mutation round-trips through the gateway and feeds the
//! server's returned representation back into the store — the server
//! owns assigned identities and normalized fields, so the locally
//! submitted values are never trusted. State-only updates are not a
//! thing here.

use std::collections::HashSet;

use crate::api::gateway::{TaskDraft, TaskGateway, TaskPatch};
use crate::api::ApiError;
use crate::core::store::TaskStore;
use crate::core::task::Task;

/// Resolved identities with a mutation round trip outstanding.
///
/// The UI dispatches gateway calls from event handlers, so a double
/// click can submit the same delete or complete twice before the first
/// response lands. `begin` is a check-and-insert: the second submission
/// sees `false` and backs off. Callers must `finish` on every path,
/// including errors.
#[derive(Debug, Default)]
pub struct InFlight {
    identities: HashSet<String>,
}

impl InFlight {
    pub fn begin(&mut self, identity: &str) -> bool {
        self.identities.insert(identity.to_string())
    }

    pub fn finish(&mut self, identity: &str) {
        self.identities.remove(identity);
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.identities.contains(identity)
    }
}

/// Owns the store and the gateway; the single mutation path for the
/// signed-in user's tasks. Single event thread, no locking — mutation
/// only ever happens through `&mut self`.
pub struct TaskManager {
    gateway: TaskGateway,
    store: TaskStore,
    in_flight: InFlight,
}

impl TaskManager {
    pub fn new(gateway: TaskGateway) -> Self {
        Self {
            gateway,
            store: TaskStore::new(),
            in_flight: InFlight::default(),
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Fetch the full list and replace the store wholesale. Returns
    /// the number of tasks fetched.
    pub async fn refresh(&mut self, token: &str) -> Result<usize, ApiError> {
        let tasks = self.gateway.list_tasks(token).await?;
        let count = tasks.len();
        self.store.replace_all(tasks);
        log::info!("Refreshed task list: {} tasks", count);
        Ok(count)
    }

    /// Create a task on the backend and add the server's representation
    /// (with its assigned identity and defaulted status) to the store.
    pub async fn create(&mut self, token: &str, draft: &TaskDraft) -> Result<Task, ApiError> {
        let created = self.gateway.create_task(token, draft).await?;
        log::info!("Created task {} ({:?})", created.identity, created.title);
        self.store.add(created.clone());
        Ok(created)
    }

    /// Partial update. On `NotFound` the task vanished on the backend
    /// (deleted by another session); it is dropped from the store
    /// before the error propagates, so the caller's view converges.
    pub async fn update(
        &mut self,
        token: &str,
        identity: &str,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, ApiError> {
        if !self.in_flight.begin(identity) {
            log::debug!("Update already in flight for {}, skipping", identity);
            return Ok(None);
        }
        let result = self.gateway.update_task(token, identity, patch).await;
        self.in_flight.finish(identity);

        match result {
            Ok(updated) => {
                self.store.replace_by_identity(updated.clone());
                Ok(Some(updated))
            }
            Err(err) => {
                if err.is_not_found() {
                    log::warn!("Task {} vanished during edit, dropping locally", identity);
                    self.store.remove_by_identity(identity);
                }
                Err(err)
            }
        }
    }

    /// Quick-complete: always a gateway round trip, never a state-only
    /// mutation. Returns `Ok(None)` when suppressed by the in-flight
    /// guard.
    pub async fn quick_complete(
        &mut self,
        token: &str,
        identity: &str,
    ) -> Result<Option<Task>, ApiError> {
        if !self.in_flight.begin(identity) {
            log::debug!("Complete already in flight for {}, skipping", identity);
            return Ok(None);
        }
        let result = self.gateway.complete_task(token, identity).await;
        self.in_flight.finish(identity);

        match result {
            Ok(completed) => {
                self.store.replace_by_identity(completed.clone());
                Ok(Some(completed))
            }
            Err(err) => {
                if err.is_not_found() {
                    self.store.remove_by_identity(identity);
                }
                Err(err)
            }
        }
    }

    /// Delete. Idempotent from the caller's perspective: a backend 404
    /// means the task is already gone, so the local removal still
    /// happens and the call reports success. Returns false when
    /// suppressed by the in-flight guard.
    pub async fn delete(&mut self, token: &str, identity: &str) -> Result<bool, ApiError> {
        if !self.in_flight.begin(identity) {
            log::debug!("Delete already in flight for {}, skipping", identity);
            return Ok(false);
        }
        let result = self.gateway.delete_task(token, identity).await;
        self.in_flight.finish(identity);

        match result {
            Ok(()) => {
                self.store.remove_by_identity(identity);
                Ok(true)
            }
            Err(err) if err.is_not_found() => {
                log::info!("Task {} already deleted on backend", identity);
                self.store.remove_by_identity(identity);
                Ok(true)
            }
            Err(err) => Err(err),
        }
    }
}
