use anyhow::{bail, Result};

use super::{print_state, Command, CommandContext};
use crate::attendance::{ActionOutcome, AttendanceAction, WorkplaceId};

pub struct PunchCommand {
    pub action: AttendanceAction,
    pub workplace: Option<String>,
}

impl Command for PunchCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let session = ctx.session().await?;
        let tracker = ctx.tracker(&session);

        print!("🔄 Loading workplaces and status... ");
        std::io::Write::flush(&mut std::io::stdout())?;
        match tracker.mount().await {
            Ok(_) => println!("✅"),
            Err(e) => {
                println!("❌");
                return Err(e.into());
            }
        }

        if let Some(id) = self.workplace.as_deref() {
            tracker.select_workplace(&WorkplaceId::new(id))?;
        }
        let workplace = tracker.current_workplace();
        if let Some(wp) = workplace.as_ref() {
            println!("🏢 Workplace: {}", wp.name);
        }

        let outcome = tracker
            .perform_action(self.action, workplace.as_ref().map(|wp| &wp.id))
            .await;
        tracker.teardown();

        match outcome {
            Ok(ActionOutcome::Confirmed { status, message }) => {
                println!("✅ {} done, you are now {status}", self.action.label());
                if let Some(message) = message {
                    println!("   {message}");
                }
                Ok(())
            }
            Ok(ActionOutcome::Unavailable { .. }) => {
                print_state(&tracker.state());
                bail!("{} is not available right now", self.action.label())
            }
            Ok(ActionOutcome::Ignored { pending }) => {
                bail!("{} is still in progress", pending.label())
            }
            Err(e) => {
                println!("❌ {e}");
                print_state(&tracker.state());
                Err(e.into())
            }
        }
    }
}
