use anyhow::Result;

use super::{Command, CommandContext};

pub struct WorkplacesCommand;

impl Command for WorkplacesCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let session = ctx.session().await?;
        let tracker = ctx.tracker(&session);
        let workplaces = tracker.load_workplaces().await?;

        if workplaces.is_empty() {
            println!("📭 No workplaces assigned to you");
            return Ok(());
        }

        println!("🏢 YOUR WORKPLACES");
        println!("──────────────────");
        for (index, wp) in workplaces.iter().enumerate() {
            let marker = if index == 0 { "⭐" } else { "  " };
            println!("{marker} {:>6}  {}", wp.id, wp.name);
        }
        println!();
        println!("💡 ⭐ is used when 'punch' gets no --workplace");
        Ok(())
    }
}
