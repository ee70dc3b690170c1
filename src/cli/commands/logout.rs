use anyhow::Result;

use super::{Command, CommandContext};
use crate::auth::logout;

pub struct LogoutCommand;

impl Command for LogoutCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        logout(&ctx.store).await?;
        println!("👋 Logged out");
        Ok(())
    }
}
