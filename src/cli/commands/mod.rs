use anyhow::{Context, Result};
use std::sync::Arc;

use crate::api::HttpAttendanceApi;
use crate::attendance::{AttendanceState, AttendanceTracker};
use crate::cli::GlobalArgs;
use crate::config::AttendanceConfig;
use crate::geo::{Coordinates, StaticLocationProvider};
use crate::session::{FileSessionStore, Session};

pub mod login;
pub mod logout;
pub mod punch;
pub mod report;
pub mod status;
pub mod watch;
pub mod workplaces;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// Everything a command needs, built once from configuration and global flags
pub struct CommandContext {
    pub config: AttendanceConfig,
    pub api: Arc<HttpAttendanceApi>,
    pub geo: Arc<StaticLocationProvider>,
    pub store: FileSessionStore,
    global: GlobalArgs,
}

impl CommandContext {
    pub fn new(config: AttendanceConfig, global: GlobalArgs) -> Result<Self> {
        let mut geo = StaticLocationProvider::from_config(&config.geolocation)
            .context("Invalid coordinates in configuration")?;
        if let (Some(lat), Some(lon)) = (global.lat, global.lon) {
            geo = geo.with_position(Coordinates::new(lat, lon)?);
        }

        Ok(Self {
            api: Arc::new(HttpAttendanceApi::new(&config.api)),
            geo: Arc::new(geo),
            store: FileSessionStore::new(config.session.resolved_path()),
            config,
            global,
        })
    }

    /// Session from `--token`, else the stored one
    pub async fn session(&self) -> Result<Session> {
        let secret = self.config.auth.jwt_secret.as_deref();
        if let Some(token) = self.global.token.as_deref().filter(|t| !t.trim().is_empty()) {
            return Session::from_token(token, &self.global.role, secret)
                .context("The --token value is not a usable login token");
        }

        Session::restore(&self.store)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Not logged in. Run 'attendance login --remember' first"))
    }

    pub fn tracker(&self, session: &Session) -> AttendanceTracker {
        AttendanceTracker::new(self.api.clone(), self.geo.clone(), session.user_id().clone())
    }
}

/// Print status plus the actions that can follow it
pub fn print_state(state: &AttendanceState) {
    match state.status {
        Some(status) => {
            let icon = if state.on_break() {
                "☕"
            } else if state.checked_in() {
                "🟢"
            } else {
                "⚪"
            };
            println!("{icon} You are {status}");
        }
        None => println!("❔ Status unknown"),
    }
    if let Some(pending) = state.pending {
        println!("⏳ {} in progress", pending.label());
    }

    let actions = state.available_actions();
    if !actions.is_empty() {
        let names: Vec<String> = actions
            .iter()
            .map(|a| a.as_str().replace('_', "-"))
            .collect();
        println!("👉 Available: {}", names.join(", "));
    }
}

pub async fn show_how_to_get_started() -> Result<()> {
    println!("🕘 Attendance client");
    println!();
    println!("To get started:");
    println!("  🔑 attendance login --email you@company.it --password ... --remember");
    println!("  📊 attendance status             # Where you stand right now");
    println!("  👊 attendance punch checkin      # Start the day");
    println!("  ☕ attendance punch start-break  # Take a break");
    println!();
    println!("Administrators:");
    println!("  📋 attendance report --from 2025-03-01 --to 2025-03-31");
    println!();
    println!("💡 Coordinates come from configuration or --lat/--lon.");
    Ok(())
}
