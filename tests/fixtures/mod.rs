//! Hand-written fakes for driving the attendance tracker without a server
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use attendance_client::api::{ActionReply, ActionRequest, ApiError, AttendanceApi, ServerStatus};
use attendance_client::{AttendanceStatus, Coordinates, StaticLocationProvider, UserId, Workplace, WorkplaceId};

/// A gate a fake call waits on, plus a signal that the call has arrived
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

impl Gate {
    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

/// In-memory server: authoritative status, scripted action replies, call counters
#[derive(Default)]
pub struct FakeAttendanceServer {
    status: Mutex<Option<AttendanceStatus>>,
    replies: Mutex<VecDeque<Result<ActionReply, ApiError>>>,
    workplaces: Mutex<Vec<Workplace>>,
    submitted: Mutex<Vec<ActionRequest>>,
    status_calls: AtomicUsize,
    status_gate: Mutex<Option<Arc<Gate>>>,
    action_gate: Mutex<Option<Arc<Gate>>>,
}

impl FakeAttendanceServer {
    pub fn new(status: AttendanceStatus) -> Arc<Self> {
        let server = Self::default();
        server.set_status(status);
        Arc::new(server)
    }

    pub fn set_status(&self, status: AttendanceStatus) {
        *self.status.lock().unwrap() = Some(status);
    }

    /// Make the status endpoint fail with a connection-class error
    pub fn go_offline(&self) {
        *self.status.lock().unwrap() = None;
    }

    pub fn with_workplaces(self: Arc<Self>, workplaces: &[(&str, &str)]) -> Arc<Self> {
        *self.workplaces.lock().unwrap() = workplaces
            .iter()
            .map(|(id, name)| Workplace { id: WorkplaceId::new(*id), name: name.to_string() })
            .collect();
        self
    }

    /// Queue the reply for the next action; unscripted actions succeed
    pub fn reply_next(&self, reply: Result<ActionReply, ApiError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn gate_actions(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.action_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn gate_status(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.status_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn submitted(&self) -> Vec<ActionRequest> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AttendanceApi for FakeAttendanceServer {
    async fn fetch_status(&self, _user_id: &UserId) -> Result<ServerStatus, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.status_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        match *self.status.lock().unwrap() {
            Some(status) => Ok(ServerStatus::from(status)),
            None => Err(ApiError::Status {
                endpoint: "getUserStatusApi.php".into(),
                status: 503,
                body: "offline".into(),
            }),
        }
    }

    async fn submit_action(&self, request: &ActionRequest) -> Result<ActionReply, ApiError> {
        self.submitted.lock().unwrap().push(request.clone());
        let gate = self.action_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(reply) => reply,
            None => {
                let mut status = self.status.lock().unwrap();
                if let Some(next) = (*status).and_then(|s| s.after(request.action)) {
                    *status = Some(next);
                }
                Ok(ActionReply { success: true, message: None })
            }
        }
    }

    async fn user_workplaces(&self, _user_id: &UserId) -> Result<Vec<Workplace>, ApiError> {
        Ok(self.workplaces.lock().unwrap().clone())
    }
}

pub fn milan() -> Arc<StaticLocationProvider> {
    Arc::new(StaticLocationProvider::new(
        true,
        Some(Coordinates { latitude: 45.4642, longitude: 9.19 }),
    ))
}

pub fn user() -> UserId {
    UserId::new("12")
}
