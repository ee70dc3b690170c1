// Core types for the attendance lifecycle

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ids arrive from the PHP API as JSON numbers or strings depending on the endpoint.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s.trim().to_string(),
        }
    }
}

/// Server-side user identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct WorkplaceId(String);

impl WorkplaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl<'de> Deserialize<'de> for WorkplaceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
    }
}

impl fmt::Display for WorkplaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named location attendance records are tied to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workplace {
    pub id: WorkplaceId,
    pub name: String,
}

/// User-triggered attendance actions, spelled the way the action endpoint expects them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceAction {
    Checkin,
    Checkout,
    StartBreak,
    EndBreak,
}

impl AttendanceAction {
    pub const ALL: [AttendanceAction; 4] = [
        AttendanceAction::Checkin,
        AttendanceAction::Checkout,
        AttendanceAction::StartBreak,
        AttendanceAction::EndBreak,
    ];

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceAction::Checkin => "checkin",
            AttendanceAction::Checkout => "checkout",
            AttendanceAction::StartBreak => "start_break",
            AttendanceAction::EndBreak => "end_break",
        }
    }

    /// Button label
    pub fn label(&self) -> &'static str {
        match self {
            AttendanceAction::Checkin => "Check-in",
            AttendanceAction::Checkout => "Check-out",
            AttendanceAction::StartBreak => "Start break",
            AttendanceAction::EndBreak => "End break",
        }
    }
}

impl fmt::Display for AttendanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "checkin" | "check_in" => Ok(AttendanceAction::Checkin),
            "checkout" | "check_out" => Ok(AttendanceAction::Checkout),
            "start_break" => Ok(AttendanceAction::StartBreak),
            "end_break" => Ok(AttendanceAction::EndBreak),
            other => Err(format!("unknown attendance action: {other}")),
        }
    }
}

/// Confirmed or optimistic lifecycle position of a user.
///
/// Being on break without being checked in is not representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    CheckedOut,
    CheckedIn,
    OnBreak,
}

impl AttendanceStatus {
    /// Build from the status endpoint's flags. `on_break` without `checked_in` counts as checked out.
    pub fn from_flags(checked_in: bool, on_break: bool) -> Self {
        match (checked_in, on_break) {
            (false, _) => AttendanceStatus::CheckedOut,
            (true, false) => AttendanceStatus::CheckedIn,
            (true, true) => AttendanceStatus::OnBreak,
        }
    }

    pub fn checked_in(&self) -> bool {
        !matches!(self, AttendanceStatus::CheckedOut)
    }

    pub fn on_break(&self) -> bool {
        matches!(self, AttendanceStatus::OnBreak)
    }

    /// Optimistic next status, or `None` when the action is not available here
    pub fn after(&self, action: AttendanceAction) -> Option<AttendanceStatus> {
        use AttendanceAction::*;
        use AttendanceStatus::*;

        match (self, action) {
            (CheckedOut, Checkin) => Some(CheckedIn),
            (CheckedIn, StartBreak) => Some(OnBreak),
            (CheckedIn, Checkout) => Some(CheckedOut),
            (OnBreak, EndBreak) => Some(CheckedIn),
            (OnBreak, Checkout) => Some(CheckedOut),
            _ => None,
        }
    }

    /// Actions the UI may offer in this status
    pub fn available_actions(&self) -> Vec<AttendanceAction> {
        AttendanceAction::ALL
            .into_iter()
            .filter(|action| self.after(*action).is_some())
            .collect()
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AttendanceStatus::CheckedOut => "checked out",
            AttendanceStatus::CheckedIn => "checked in",
            AttendanceStatus::OnBreak => "on break",
        };
        f.write_str(text)
    }
}

/// Snapshot of a tracker's local state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceState {
    /// `None` until the first status query succeeds
    pub status: Option<AttendanceStatus>,
    pub pending: Option<AttendanceAction>,
}

impl AttendanceState {
    pub fn checked_in(&self) -> bool {
        self.status.is_some_and(|s| s.checked_in())
    }

    pub fn on_break(&self) -> bool {
        self.status.is_some_and(|s| s.on_break())
    }

    pub fn available_actions(&self) -> Vec<AttendanceAction> {
        self.status
            .map(|s| s.available_actions())
            .unwrap_or_default()
    }
}

/// How a `perform_action` call settled when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The server accepted the action; the optimistic status stands
    Confirmed {
        status: AttendanceStatus,
        message: Option<String>,
    },
    /// Another action was already in flight
    Ignored { pending: AttendanceAction },
    /// The action is not offered in the current status
    Unavailable {
        status: Option<AttendanceStatus>,
        action: AttendanceAction,
    },
}

/// Workplace directory plus the current selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkplaceSelection {
    workplaces: Vec<Workplace>,
    selected: Option<WorkplaceId>,
}

impl WorkplaceSelection {
    /// Select the first workplace, if any
    pub fn from_directory(workplaces: Vec<Workplace>) -> Self {
        let selected = workplaces.first().map(|wp| wp.id.clone());
        Self { workplaces, selected }
    }

    pub fn workplaces(&self) -> &[Workplace] {
        &self.workplaces
    }

    pub fn selected(&self) -> Option<&WorkplaceId> {
        self.selected.as_ref()
    }

    pub fn selected_workplace(&self) -> Option<&Workplace> {
        let id = self.selected.as_ref()?;
        self.workplaces.iter().find(|wp| &wp.id == id)
    }

    /// Change the selection; returns false when the id is not in the directory
    pub fn select(&mut self, id: &WorkplaceId) -> bool {
        if self.workplaces.iter().any(|wp| &wp.id == id) {
            self.selected = Some(id.clone());
            true
        } else {
            false
        }
    }
}
