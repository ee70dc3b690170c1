use anyhow::Result;
use clap::Parser;

use attendance_client::cli::commands::{
    login::LoginCommand, logout::LogoutCommand, punch::PunchCommand, report::ReportCommand,
    show_how_to_get_started, status::StatusCommand, watch::WatchCommand,
    workplaces::WorkplacesCommand, Command, CommandContext,
};
use attendance_client::cli::{Cli, Commands};
use attendance_client::{config, init_telemetry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config()?.clone();
    init_telemetry(&config.observability)?;

    let Some(command) = cli.command else {
        return tokio::runtime::Runtime::new()?.block_on(show_how_to_get_started());
    };

    let ctx = CommandContext::new(config, cli.global)?;
    tokio::runtime::Runtime::new()?.block_on(async {
        match command {
            Commands::Login { email, password, remember } => {
                LoginCommand { email, password, remember }.execute(&ctx).await
            }
            Commands::Logout => LogoutCommand.execute(&ctx).await,
            Commands::Status => StatusCommand.execute(&ctx).await,
            Commands::Punch { action, workplace } => {
                PunchCommand { action, workplace }.execute(&ctx).await
            }
            Commands::Workplaces => WorkplacesCommand.execute(&ctx).await,
            Commands::Report { workplace, from, to, name } => {
                ReportCommand { workplace, from, to, name }.execute(&ctx).await
            }
            Commands::Watch { interval } => {
                WatchCommand { interval_secs: interval }.execute(&ctx).await
            }
        }
    })
}
