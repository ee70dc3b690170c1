//! Remote API abstractions
//!
//! The server owns every business rule; these traits are the only way the rest of the crate
//! talks to it. `HttpAttendanceApi` implements all of them over HTTP, tests substitute mocks.

pub mod client;
pub mod errors;
pub mod types;

use async_trait::async_trait;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use crate::attendance::types::{UserId, Workplace};
use crate::geo::Coordinates;
use crate::reports::{AttendanceRecord, ReportFilter};

pub use client::HttpAttendanceApi;
pub use errors::ApiError;
pub use types::{
    ActionReply, ActionRequest, Credentials, DataEnvelope, LoginReply, ServerStatus, StatusReply,
    UserProfile,
};

/// Endpoints used by the attendance tracker
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    /// Status Query: authoritative checked-in / on-break flags
    async fn fetch_status(&self, user_id: &UserId) -> Result<ServerStatus, ApiError>;

    /// Action Command. A reply with `success:false` is returned as `Ok`.
    async fn submit_action(&self, request: &ActionRequest) -> Result<ActionReply, ApiError>;

    /// Workplaces the user may punch at
    async fn user_workplaces(&self, user_id: &UserId) -> Result<Vec<Workplace>, ApiError>;
}

/// Login and profile endpoints
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(
        &self,
        credentials: &Credentials,
        position: Option<Coordinates>,
    ) -> Result<LoginReply, ApiError>;

    async fn user_profile(&self, user_id: &UserId) -> Result<UserProfile, ApiError>;
}

/// Administrator endpoints
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait ReportApi: Send + Sync {
    /// Every workplace, used to build the report filter
    async fn all_workplaces(&self, user_id: &UserId) -> Result<Vec<Workplace>, ApiError>;

    async fn attendance_report(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<AttendanceRecord>, ApiError>;
}
