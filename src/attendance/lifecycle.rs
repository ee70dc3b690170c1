// Attendance lifecycle state machine
//
// States mirror the server's view of one user. `unknown` is only left through a
// resync with an authoritative status.

use statig::blocking::StateMachine;
use statig::prelude::*;

use super::types::{AttendanceAction, AttendanceStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Optimistic user action
    Punch(AttendanceAction),
    /// Authoritative status from the server
    Resync(AttendanceStatus),
}

#[derive(Debug, Default)]
pub struct AttendanceLifecycle {
    pub user_id: String,
}

impl AttendanceLifecycle {
    pub fn new(user_id: String) -> Self {
        Self { user_id }
    }

    fn adopt(&self, status: AttendanceStatus) -> Outcome<State> {
        tracing::debug!(user_id = %self.user_id, status = %status, "Adopting server status");
        match status {
            AttendanceStatus::CheckedOut => Transition(State::checked_out()),
            AttendanceStatus::CheckedIn => Transition(State::checked_in()),
            AttendanceStatus::OnBreak => Transition(State::on_break()),
        }
    }

    fn reject(&self, from: &str, action: &AttendanceAction) -> Outcome<State> {
        tracing::debug!(
            user_id = %self.user_id,
            state = from,
            action = %action,
            "Action not available in current state"
        );
        Handled
    }
}

#[state_machine(initial = "State::unknown()", state(derive(Debug, Clone, PartialEq, Eq)))]
impl AttendanceLifecycle {
    #[state]
    fn unknown(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        match event {
            LifecycleEvent::Resync(status) => self.adopt(*status),
            LifecycleEvent::Punch(action) => self.reject("unknown", action),
        }
    }

    #[state]
    fn checked_out(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        match event {
            LifecycleEvent::Punch(AttendanceAction::Checkin) => {
                tracing::info!(user_id = %self.user_id, "Checked in (optimistic)");
                Transition(State::checked_in())
            }
            LifecycleEvent::Punch(action) => self.reject("checked_out", action),
            LifecycleEvent::Resync(status) => self.adopt(*status),
        }
    }

    #[state]
    fn checked_in(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        match event {
            LifecycleEvent::Punch(AttendanceAction::StartBreak) => {
                tracing::info!(user_id = %self.user_id, "Break started (optimistic)");
                Transition(State::on_break())
            }
            LifecycleEvent::Punch(AttendanceAction::Checkout) => {
                tracing::info!(user_id = %self.user_id, "Checked out (optimistic)");
                Transition(State::checked_out())
            }
            LifecycleEvent::Punch(action) => self.reject("checked_in", action),
            LifecycleEvent::Resync(status) => self.adopt(*status),
        }
    }

    #[state]
    fn on_break(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        match event {
            LifecycleEvent::Punch(AttendanceAction::EndBreak) => {
                tracing::info!(user_id = %self.user_id, "Break ended (optimistic)");
                Transition(State::checked_in())
            }
            LifecycleEvent::Punch(AttendanceAction::Checkout) => {
                tracing::info!(user_id = %self.user_id, "Checked out from break (optimistic)");
                Transition(State::checked_out())
            }
            LifecycleEvent::Punch(action) => self.reject("on_break", action),
            LifecycleEvent::Resync(status) => self.adopt(*status),
        }
    }
}

/// Thin wrapper exposing the machine in terms of `AttendanceStatus`
pub struct LifecycleMachine {
    machine: StateMachine<AttendanceLifecycle>,
}

impl std::fmt::Debug for LifecycleMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleMachine")
            .field("status", &self.status())
            .finish()
    }
}

impl LifecycleMachine {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            machine: AttendanceLifecycle::new(user_id.into()).state_machine(),
        }
    }

    /// `None` while still in the unknown pseudo-state
    pub fn status(&self) -> Option<AttendanceStatus> {
        match self.machine.state() {
            State::Unknown { .. } => None,
            State::CheckedOut { .. } => Some(AttendanceStatus::CheckedOut),
            State::CheckedIn { .. } => Some(AttendanceStatus::CheckedIn),
            State::OnBreak { .. } => Some(AttendanceStatus::OnBreak),
        }
    }

    /// Apply an optimistic transition. Returns the new status, or `None` if the
    /// action was rejected and nothing changed.
    pub fn punch(&mut self, action: AttendanceAction) -> Option<AttendanceStatus> {
        let before = self.status();
        let expected = before.and_then(|status| status.after(action))?;
        self.machine.handle(&LifecycleEvent::Punch(action));
        debug_assert_eq!(self.status(), Some(expected));
        Some(expected)
    }

    /// Overwrite local state with the server's status
    pub fn resync(&mut self, status: AttendanceStatus) {
        self.machine.handle(&LifecycleEvent::Resync(status));
    }
}
