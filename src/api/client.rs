use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Jitter, Quota, RateLimiter};
use moka::future::Cache;
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::errors::ApiError;
use super::types::{
    ActionReply, ActionRequest, Credentials, DataEnvelope, LoginReply, ServerStatus, StatusReply,
    UserProfile,
};
use super::{AttendanceApi, AuthApi, ReportApi};
use crate::attendance::types::{UserId, Workplace};
use crate::config::ApiConfig;
use crate::geo::Coordinates;
use crate::reports::{AttendanceRecord, ReportFilter};

const LOGIN: &str = "login_api.php";
const USER_PROFILE: &str = "getUserProfileApi.php";
const USER_STATUS: &str = "getUserStatusApi.php";
const USER_ACTION: &str = "userAttendanceApi.php";
const USER_WORKPLACES: &str = "getUserWorkplacesApi.php";
const ALL_WORKPLACES: &str = "getWorkplacesApi.php";
const ATTENDANCE_REPORT: &str = "getAttendanceApi.php";

/// Rate-limited HTTP client for the attendance API
pub struct HttpAttendanceApi {
    client: reqwest::Client,
    base_url: String,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    workplace_cache: Cache<String, Vec<Workplace>>,
}

impl std::fmt::Debug for HttpAttendanceApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAttendanceApi")
            .field("base_url", &self.base_url)
            .field("cached_directories", &self.workplace_cache.entry_count())
            .finish()
    }
}

impl HttpAttendanceApi {
    pub fn new(config: &ApiConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Reuse an existing [`reqwest::Client`]
    pub fn with_client(client: reqwest::Client, config: &ApiConfig) -> Self {
        let per_second = NonZeroU32::new(config.rate_limit.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.rate_limit.burst_capacity).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(per_second).allow_burst(burst);

        // Directories are small reference data; a few hundred users is plenty
        let workplace_cache = Cache::builder()
            .max_capacity(256)
            .time_to_live(Duration::from_secs(config.workplace_cache_ttl_seconds))
            .build();

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            workplace_cache,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn throttle(&self) {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(50)))
            .await;
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.throttle().await;
        debug!(endpoint, "GET");
        let response = self.client.get(self.url(endpoint)).query(query).send().await?;
        Self::read_json(endpoint, response).await
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.throttle().await;
        debug!(endpoint, "POST");
        let response = self.client.post(self.url(endpoint)).form(form).send().await?;
        Self::read_json(endpoint, response).await
    }

    /// The PHP endpoints sometimes answer errors with a JSON body and a non-2xx status,
    /// so the body is tried first.
    async fn read_json<T: DeserializeOwned>(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(_) if !status.is_success() => Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            }),
            Err(source) => Err(ApiError::MalformedResponse {
                endpoint: endpoint.to_string(),
                source,
            }),
        }
    }

    async fn workplaces(&self, endpoint: &str, user_id: &UserId) -> Result<Vec<Workplace>, ApiError> {
        let key = format!("{endpoint}:{user_id}");
        if let Some(cached) = self.workplace_cache.get(&key).await {
            debug!(endpoint, user_id = %user_id, "Workplace cache hit");
            return Ok(cached);
        }

        let envelope: DataEnvelope<Vec<Workplace>> = self
            .get_json(endpoint, &[("user_id", user_id.to_string())])
            .await?;
        if !envelope.success {
            return Err(ApiError::rejected(endpoint, envelope.message));
        }
        let workplaces = envelope.data.unwrap_or_default();
        self.workplace_cache.insert(key, workplaces.clone()).await;
        Ok(workplaces)
    }
}

#[async_trait]
impl AttendanceApi for HttpAttendanceApi {
    async fn fetch_status(&self, user_id: &UserId) -> Result<ServerStatus, ApiError> {
        let reply: StatusReply = self
            .get_json(USER_STATUS, &[("user_id", user_id.to_string())])
            .await?;
        if !reply.success {
            return Err(ApiError::rejected(USER_STATUS, reply.message));
        }
        match (reply.checked_in, reply.on_break) {
            (Some(checked_in), Some(on_break)) => Ok(ServerStatus { checked_in, on_break }),
            _ => Err(ApiError::MalformedResponse {
                endpoint: USER_STATUS.to_string(),
                source: serde::de::Error::custom("status reply is missing checked_in/on_break"),
            }),
        }
    }

    async fn submit_action(&self, request: &ActionRequest) -> Result<ActionReply, ApiError> {
        self.post_form(USER_ACTION, &request.form_fields()).await
    }

    async fn user_workplaces(&self, user_id: &UserId) -> Result<Vec<Workplace>, ApiError> {
        self.workplaces(USER_WORKPLACES, user_id).await
    }
}

#[async_trait]
impl AuthApi for HttpAttendanceApi {
    async fn login(
        &self,
        credentials: &Credentials,
        position: Option<Coordinates>,
    ) -> Result<LoginReply, ApiError> {
        let mut form = vec![
            ("email", credentials.email.clone()),
            ("password", credentials.password.clone()),
        ];
        if let Some(position) = position {
            form.push(("latitude", position.latitude.to_string()));
            form.push(("longitude", position.longitude.to_string()));
        }
        self.post_form(LOGIN, &form).await
    }

    async fn user_profile(&self, user_id: &UserId) -> Result<UserProfile, ApiError> {
        let envelope: DataEnvelope<UserProfile> = self
            .get_json(USER_PROFILE, &[("user_id", user_id.to_string())])
            .await?;
        match envelope {
            DataEnvelope { success: true, data: Some(profile), .. } => Ok(profile),
            DataEnvelope { message, .. } => Err(ApiError::rejected(USER_PROFILE, message)),
        }
    }
}

#[async_trait]
impl ReportApi for HttpAttendanceApi {
    async fn all_workplaces(&self, user_id: &UserId) -> Result<Vec<Workplace>, ApiError> {
        self.workplaces(ALL_WORKPLACES, user_id).await
    }

    async fn attendance_report(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<AttendanceRecord>, ApiError> {
        let envelope: DataEnvelope<Vec<AttendanceRecord>> = self
            .get_json(ATTENDANCE_REPORT, &filter.query_params())
            .await?;
        if !envelope.success {
            return Err(ApiError::rejected(ATTENDANCE_REPORT, envelope.message));
        }
        Ok(envelope.data.unwrap_or_default())
    }
}
