// Attendance module - check-in / break / check-out lifecycle
//
// `lifecycle` holds the pure state machine, `tracker` drives it against the remote API.

pub mod lifecycle;
pub mod tracker;
pub mod types;

pub use lifecycle::{LifecycleEvent, LifecycleMachine};
pub use tracker::{AttendanceError, AttendanceTracker};
pub use types::{
    ActionOutcome, AttendanceAction, AttendanceState, AttendanceStatus, UserId, Workplace,
    WorkplaceId, WorkplaceSelection,
};
