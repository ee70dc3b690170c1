// Wire types for the PHP attendance API

use serde::{Deserialize, Serialize};

use crate::attendance::types::{AttendanceAction, AttendanceStatus, UserId, WorkplaceId};
use crate::geo::Coordinates;

/// Reply of the status endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct StatusReply {
    pub success: bool,
    /// Absent on failure replies
    #[serde(default)]
    pub checked_in: Option<bool>,
    #[serde(default)]
    pub on_break: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Authoritative status as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerStatus {
    pub checked_in: bool,
    pub on_break: bool,
}

impl ServerStatus {
    pub fn status(&self) -> AttendanceStatus {
        AttendanceStatus::from_flags(self.checked_in, self.on_break)
    }
}

impl From<AttendanceStatus> for ServerStatus {
    fn from(status: AttendanceStatus) -> Self {
        Self {
            checked_in: status.checked_in(),
            on_break: status.on_break(),
        }
    }
}

/// Fields posted to the action endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub user_id: UserId,
    pub action: AttendanceAction,
    pub workplace_id: WorkplaceId,
    pub position: Coordinates,
}

impl ActionRequest {
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("user_id", self.user_id.to_string()),
            ("action", self.action.as_str().to_string()),
            ("workplace_id", self.workplace_id.to_string()),
            ("latitude", self.position.latitude.to_string()),
            ("longitude", self.position.longitude.to_string()),
        ]
    }
}

/// Reply of the action endpoint. `success:false` is a business error, not a transport one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActionReply {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// `{success, data, message}` envelope used by the list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub surname: String,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.surname).trim().to_string()
    }
}

/// Login request body
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Reply of the login endpoint, which uses `status` instead of `success`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginReply {
    pub status: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl LoginReply {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reply_defaults_missing_flags() {
        let reply: StatusReply =
            serde_json::from_str(r#"{"success": false, "message": "utente sconosciuto"}"#).unwrap();
        assert!(!reply.success);
        assert_eq!(reply.checked_in, None);
        assert_eq!(reply.message.as_deref(), Some("utente sconosciuto"));
    }

    #[test]
    fn test_action_form_fields_use_wire_names() {
        let request = ActionRequest {
            user_id: UserId::new("12"),
            action: AttendanceAction::StartBreak,
            workplace_id: WorkplaceId::new("4"),
            position: Coordinates { latitude: 45.5, longitude: 9.25 },
        };
        let fields = request.form_fields();
        assert_eq!(fields[1], ("action", "start_break".to_string()));
        assert_eq!(fields[3], ("latitude", "45.5".to_string()));
        assert_eq!(fields.len(), 5);
    }

    #[test]
    fn test_envelope_without_data() {
        let env: DataEnvelope<Vec<UserProfile>> =
            serde_json::from_str(r#"{"success": false, "message": "nope"}"#).unwrap();
        assert!(env.data.is_none());
        assert_eq!(env.message.as_deref(), Some("nope"));
    }
}
