use anyhow::Result;

use super::{Command, CommandContext};
use crate::api::Credentials;
use crate::auth::{login, profile, LandingView, LoginOptions};

pub struct LoginCommand {
    pub email: String,
    pub password: String,
    pub remember: bool,
}

impl Command for LoginCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let credentials = Credentials {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        };
        let options = LoginOptions {
            remember: self.remember,
            jwt_secret: ctx.config.auth.jwt_secret.clone(),
        };

        print!("🔑 Logging in... ");
        std::io::Write::flush(&mut std::io::stdout())?;

        let (session, landing) = match login(
            ctx.api.as_ref(),
            ctx.geo.as_ref(),
            &credentials,
            &options,
            &ctx.store,
        )
        .await
        {
            Ok(result) => {
                println!("✅");
                result
            }
            Err(e) => {
                println!("❌");
                return Err(e.into());
            }
        };

        match profile(ctx.api.as_ref(), &session).await {
            Ok(profile) => println!("👋 Welcome, {}", profile.display_name()),
            Err(e) => tracing::warn!(error = %e, "Could not load user profile"),
        }

        if self.remember {
            println!("💾 Session saved to {}", ctx.store.path().display());
        }
        match landing {
            LandingView::Report => println!("📋 Administrator account: try 'attendance report'"),
            LandingView::Attendance => println!("👉 Next: 'attendance status' or 'attendance punch checkin'"),
        }
        Ok(())
    }
}
