use anyhow::Result;

use super::{print_state, Command, CommandContext};

pub struct StatusCommand;

impl Command for StatusCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let session = ctx.session().await?;
        let tracker = ctx.tracker(&session);

        print!("🔄 Checking status... ");
        std::io::Write::flush(&mut std::io::stdout())?;

        match tracker.refresh_status().await {
            Ok(_) => println!("✅"),
            Err(e) => {
                println!("❌");
                return Err(e.into());
            }
        }
        println!();
        print_state(&tracker.state());
        Ok(())
    }
}
