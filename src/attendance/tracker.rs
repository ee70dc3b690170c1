// Attendance tracker - optimistic actions reconciled against the server
//
// One tracker serves one user on one "screen". Local state lives behind a std Mutex that is
// never held across an await, so overlapping calls see the pending guard immediately.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn, Instrument};

use super::lifecycle::LifecycleMachine;
use super::types::{
    ActionOutcome, AttendanceAction, AttendanceState, AttendanceStatus, UserId, Workplace,
    WorkplaceId, WorkplaceSelection,
};
use crate::api::{ActionRequest, ApiError, AttendanceApi};
use crate::geo::{acquire_position, GeolocationError, GeolocationProvider};
use crate::telemetry::{create_action_span, generate_correlation_id};

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("{0}")]
    Validation(String),
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location unavailable: {0}")]
    Location(String),
    #[error("network error: {}", .0.user_message())]
    Transport(#[source] ApiError),
    #[error("{message}")]
    Business { message: String },
    #[error("attendance tracker already closed")]
    Closed,
}

impl AttendanceError {
    /// Whether local state was (or may have been) touched and needed a resync
    pub fn triggers_resync(&self) -> bool {
        !matches!(self, AttendanceError::Validation(_) | AttendanceError::Closed)
    }
}

impl From<ApiError> for AttendanceError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Rejected { message, .. } => AttendanceError::Business { message },
            other => AttendanceError::Transport(other),
        }
    }
}

impl From<GeolocationError> for AttendanceError {
    fn from(err: GeolocationError) -> Self {
        match err {
            GeolocationError::PermissionDenied => AttendanceError::PermissionDenied,
            GeolocationError::ProviderUnavailable(reason) => AttendanceError::Location(reason),
            other => AttendanceError::Location(other.to_string()),
        }
    }
}

#[derive(Debug)]
struct TrackerInner {
    machine: LifecycleMachine,
    pending: Option<AttendanceAction>,
    workplaces: WorkplaceSelection,
    closed: bool,
}

/// Clears the pending action when the call settles, including when its future is dropped
struct PendingGuard<'a> {
    inner: &'a Mutex<TrackerInner>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.pending = None;
    }
}

pub struct AttendanceTracker {
    api: Arc<dyn AttendanceApi>,
    geo: Arc<dyn GeolocationProvider>,
    user_id: UserId,
    inner: Mutex<TrackerInner>,
}

impl std::fmt::Debug for AttendanceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttendanceTracker")
            .field("user_id", &self.user_id)
            .field("state", &self.state())
            .finish()
    }
}

impl AttendanceTracker {
    pub fn new(
        api: Arc<dyn AttendanceApi>,
        geo: Arc<dyn GeolocationProvider>,
        user_id: UserId,
    ) -> Self {
        let machine = LifecycleMachine::new(user_id.as_str());
        Self {
            api,
            geo,
            user_id,
            inner: Mutex::new(TrackerInner {
                machine,
                pending: None,
                workplaces: WorkplaceSelection::default(),
                closed: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrackerInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn state(&self) -> AttendanceState {
        let inner = self.lock();
        AttendanceState {
            status: inner.machine.status(),
            pending: inner.pending,
        }
    }

    pub fn selected_workplace(&self) -> Option<WorkplaceId> {
        self.lock().workplaces.selected().cloned()
    }

    /// The selected workplace with its name
    pub fn current_workplace(&self) -> Option<Workplace> {
        self.lock().workplaces.selected_workplace().cloned()
    }

    pub fn select_workplace(&self, id: &WorkplaceId) -> Result<(), AttendanceError> {
        if self.lock().workplaces.select(id) {
            Ok(())
        } else {
            Err(AttendanceError::Validation(format!("unknown workplace {id}")))
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Stop applying results. Calls still in flight settle without touching state.
    pub fn teardown(&self) {
        self.lock().closed = true;
        debug!(user_id = %self.user_id, "Attendance tracker closed");
    }

    /// Load the workplace directory, then run the first status query.
    ///
    /// A failed status query is only logged; a failed directory load is returned after the
    /// status query has run.
    pub async fn mount(&self) -> Result<AttendanceState, AttendanceError> {
        let directory = self.load_workplaces().await;
        if let Err(e) = self.refresh_status().await {
            warn!(user_id = %self.user_id, error = %e, "Initial status query failed");
        }
        directory.map(|_| self.state())
    }

    /// Fetch the workplace directory and select its first entry
    pub async fn load_workplaces(&self) -> Result<Vec<Workplace>, AttendanceError> {
        let workplaces = self.api.user_workplaces(&self.user_id).await.map_err(|e| {
            warn!(user_id = %self.user_id, error = %e, "Workplace directory unavailable");
            AttendanceError::from(e)
        })?;

        let mut inner = self.lock();
        if !inner.closed {
            inner.workplaces = WorkplaceSelection::from_directory(workplaces.clone());
        }
        if workplaces.is_empty() {
            warn!(user_id = %self.user_id, "User has no workplaces; actions are disabled");
        }
        Ok(workplaces)
    }

    /// Overwrite local state with the server's view. On failure local state is kept.
    pub async fn refresh_status(&self) -> Result<AttendanceStatus, AttendanceError> {
        let server = match self.api.fetch_status(&self.user_id).await {
            Ok(server) => server,
            Err(e) => {
                warn!(user_id = %self.user_id, error = %e, "Status query failed; keeping local state");
                return Err(e.into());
            }
        };

        if server.on_break && !server.checked_in {
            warn!(user_id = %self.user_id, "Server reported a break without check-in; treating as checked out");
        }
        let status = server.status();

        let mut inner = self.lock();
        if inner.closed {
            debug!(user_id = %self.user_id, "Discarding status that arrived after teardown");
        } else {
            inner.machine.resync(status);
        }
        Ok(status)
    }

    /// Run an action at the currently selected workplace
    pub async fn perform_selected(
        &self,
        action: AttendanceAction,
    ) -> Result<ActionOutcome, AttendanceError> {
        let workplace = self.selected_workplace();
        self.perform_action(action, workplace.as_ref()).await
    }

    /// Apply `action` optimistically, submit it, and reconcile on any uncertain outcome.
    ///
    /// Returns `Ignored` while another action is in flight and `Unavailable` when the action is
    /// not offered in the current status; neither touches state or the network.
    pub async fn perform_action(
        &self,
        action: AttendanceAction,
        workplace_id: Option<&WorkplaceId>,
    ) -> Result<ActionOutcome, AttendanceError> {
        let correlation_id = generate_correlation_id();
        let span = create_action_span(action.as_str(), self.user_id.as_str(), &correlation_id);
        self.run_action(action, workplace_id).instrument(span).await
    }

    async fn run_action(
        &self,
        action: AttendanceAction,
        workplace_id: Option<&WorkplaceId>,
    ) -> Result<ActionOutcome, AttendanceError> {
        let (workplace_id, optimistic, _pending) = {
            let mut inner = self.lock();
            if inner.closed {
                return Err(AttendanceError::Closed);
            }
            if let Some(pending) = inner.pending {
                debug!(pending = %pending, "Action already in flight; ignoring");
                return Ok(ActionOutcome::Ignored { pending });
            }
            let workplace_id = match workplace_id {
                Some(id) if !id.is_empty() => id.clone(),
                _ => {
                    return Err(AttendanceError::Validation(
                        "select a workplace before punching".to_string(),
                    ))
                }
            };
            let current = inner.machine.status();
            let Some(optimistic) = inner.machine.punch(action) else {
                return Ok(ActionOutcome::Unavailable {
                    status: current,
                    action,
                });
            };
            inner.pending = Some(action);
            (workplace_id, optimistic, PendingGuard { inner: &self.inner })
        };

        let position = match acquire_position(self.geo.as_ref()).await {
            Ok(position) => position,
            Err(e) => {
                warn!(error = %e, "Could not acquire position; resynchronizing");
                self.resync_after_failure().await;
                return Err(e.into());
            }
        };

        let request = ActionRequest {
            user_id: self.user_id.clone(),
            action,
            workplace_id,
            position,
        };

        match self.api.submit_action(&request).await {
            Ok(reply) if reply.success => {
                info!(status = %optimistic, "Action confirmed by server");
                let status = self.lock().machine.status().unwrap_or(optimistic);
                Ok(ActionOutcome::Confirmed {
                    status,
                    message: reply.message,
                })
            }
            Ok(reply) => {
                let message = reply
                    .message
                    .unwrap_or_else(|| format!("{} was rejected by the server", action.label()));
                warn!(%message, "Action rejected by server; resynchronizing");
                self.resync_after_failure().await;
                Err(AttendanceError::Business { message })
            }
            Err(e) => {
                warn!(error = %e, "Action submission failed; resynchronizing");
                self.resync_after_failure().await;
                Err(e.into())
            }
        }
    }

    async fn resync_after_failure(&self) {
        // refresh_status already logs its own failure
        let _ = self.refresh_status().await;
    }

    /// Poll the status endpoint until `shutdown` resolves or the tracker is closed.
    ///
    /// Ticks that land while an action is in flight are skipped; that action resyncs itself.
    pub async fn watch<F, C>(&self, every: Duration, shutdown: F, mut on_status: C)
    where
        F: Future<Output = ()>,
        C: FnMut(&AttendanceState),
    {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    if self.is_closed() {
                        break;
                    }
                    if self.state().pending.is_some() {
                        continue;
                    }
                    if self.refresh_status().await.is_ok() {
                        on_status(&self.state());
                    }
                }
            }
        }
        debug!(user_id = %self.user_id, "Status polling stopped");
    }
}
