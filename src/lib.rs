// Attendance Client Library - check-in / break / check-out against the 360digital API
// This exposes the core components for the CLI, testing and integration

pub mod api;
pub mod attendance;
pub mod auth;
pub mod cli;
pub mod config;
pub mod geo;
pub mod reports;
pub mod session;
pub mod telemetry;

// Re-export key types for easy access
pub use api::{ApiError, AttendanceApi, AuthApi, HttpAttendanceApi, ReportApi};
pub use attendance::{
    ActionOutcome, AttendanceAction, AttendanceError, AttendanceState, AttendanceStatus,
    AttendanceTracker, UserId, Workplace, WorkplaceId,
};
pub use auth::{login, logout, AuthError, LandingView, LoginOptions};
pub use config::{config, AttendanceConfig};
pub use geo::{Coordinates, GeolocationError, GeolocationProvider, StaticLocationProvider};
pub use reports::{fetch_report, AttendanceRecord, ReportError, ReportFilter};
pub use session::{FileSessionStore, MemorySessionStore, Role, Session, SessionError, SessionStore};
pub use telemetry::{create_action_span, generate_correlation_id, init_telemetry};
