//! Administrator attendance report: filter, records and fetching.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{ApiError, ReportApi};
use crate::attendance::types::{Workplace, WorkplaceId};
use crate::session::Session;

const NO_TIME: &str = "--:--";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("reports are only available to administrators")]
    Forbidden,
    #[error("invalid filter: {0}")]
    Validation(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// One employee day as returned by the report endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub employee_name: String,
    #[serde(default)]
    pub employee_surname: String,
    pub date: String,
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub break_start: Option<String>,
    #[serde(default)]
    pub break_end: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
}

impl AttendanceRecord {
    pub fn employee(&self) -> String {
        format!("{} {}", self.employee_name, self.employee_surname)
            .trim()
            .to_string()
    }

    pub fn check_in_time(&self) -> String {
        extract_time(self.check_in.as_deref())
    }

    pub fn check_out_time(&self) -> String {
        extract_time(self.check_out.as_deref())
    }

    /// `HH:MM – HH:MM`, with `--` for missing ends
    pub fn break_span(&self) -> String {
        let part = |value: Option<&str>| match value {
            Some(v) if !v.trim().is_empty() => extract_time(Some(v)),
            _ => "--".to_string(),
        };
        format!(
            "{} – {}",
            part(self.break_start.as_deref()),
            part(self.break_end.as_deref())
        )
    }
}

/// `HH:MM` from `YYYY-MM-DD HH:MM:SS` or a bare time, `--:--` when absent
pub fn extract_time(datetime: Option<&str>) -> String {
    let value = match datetime.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return NO_TIME.to_string(),
    };
    let time = value.split_once(' ').map(|(_, t)| t).unwrap_or(value);
    time.chars().take(5).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub workplace: Option<WorkplaceId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub name: Option<String>,
}

impl ReportFilter {
    pub fn validate(&self) -> Result<(), ReportError> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ReportError::Validation(format!(
                    "start date {start} is after end date {end}"
                )));
            }
        }
        Ok(())
    }

    /// Only the fields that are set, under the names the endpoint expects
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(wp) = self.workplace.as_ref().filter(|wp| !wp.is_empty()) {
            params.push(("workplace_filter", wp.to_string()));
        }
        if let Some(start) = self.start_date {
            params.push(("start_date_filter", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            params.push(("end_date_filter", end.format("%Y-%m-%d").to_string()));
        }
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            params.push(("name_filter", name.to_string()));
        }
        params
    }
}

/// Fetch the report for an administrator session
pub async fn fetch_report<A>(
    api: &A,
    session: &Session,
    filter: &ReportFilter,
) -> Result<Vec<AttendanceRecord>, ReportError>
where
    A: ReportApi + ?Sized,
{
    if !session.role().is_admin() {
        return Err(ReportError::Forbidden);
    }
    filter.validate()?;

    let records = api.attendance_report(filter).await?;
    tracing::info!(
        user_id = %session.user_id(),
        records = records.len(),
        "Attendance report fetched"
    );
    Ok(records)
}

/// Workplaces offered in the report filter
pub async fn report_workplaces<A>(api: &A, session: &Session) -> Result<Vec<Workplace>, ReportError>
where
    A: ReportApi + ?Sized,
{
    if !session.role().is_admin() {
        return Err(ReportError::Forbidden);
    }
    Ok(api.all_workplaces(session.user_id()).await?)
}
