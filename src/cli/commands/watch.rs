use anyhow::Result;
use std::time::Duration;

use super::{print_state, Command, CommandContext};
use crate::attendance::AttendanceState;

pub struct WatchCommand {
    pub interval_secs: u64,
}

impl Command for WatchCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let session = ctx.session().await?;
        let tracker = ctx.tracker(&session);
        let every = Duration::from_secs(self.interval_secs.max(1));

        if let Err(e) = tracker.mount().await {
            println!("⚠️  {e}");
        }
        println!("👀 Watching status every {}s, Ctrl-C to stop", every.as_secs());

        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Could not listen for Ctrl-C");
            }
        };

        let mut last: Option<AttendanceState> = None;
        tracker
            .watch(every, shutdown, |state| {
                if last.as_ref() != Some(state) {
                    println!();
                    print_state(state);
                    last = Some(state.clone());
                }
            })
            .await;
        tracker.teardown();

        println!("👋 Stopped watching");
        Ok(())
    }
}
