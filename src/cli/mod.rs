use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::attendance::AttendanceAction;

pub mod commands;

#[derive(Parser)]
#[command(name = "attendance")]
#[command(about = "Check in, take breaks and check out from the command line")]
#[command(long_about = "Attendance client for the 360digital API. Log in once with 'attendance login \
                       --remember', then punch with 'attendance punch checkin'. Every punch carries \
                       the configured coordinates.")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Use this token instead of the stored session
    #[arg(long, global = true, env = "ATTENDANCE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    /// Role to assume together with --token
    #[arg(long, global = true, default_value = "dipendente", help = "Role used with --token (admin unlocks reports)")]
    pub role: String,
    /// Latitude reported with punches, overrides configuration
    #[arg(long, global = true, allow_hyphen_values = true, requires = "lon")]
    pub lat: Option<f64>,
    /// Longitude reported with punches, overrides configuration
    #[arg(long, global = true, allow_hyphen_values = true, requires = "lat")]
    pub lon: Option<f64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and optionally stay logged in
    Login {
        #[arg(long, help = "Account email")]
        email: String,
        #[arg(long, env = "ATTENDANCE_PASSWORD", hide_env_values = true, help = "Account password")]
        password: String,
        /// Keep the session on disk for later commands
        #[arg(long, help = "Stay logged in between commands")]
        remember: bool,
    },
    /// Forget the stored session
    Logout,
    /// Show the current attendance status and available actions
    Status,
    /// Check in, check out, start or end a break
    Punch {
        #[arg(help = "checkin, checkout, start-break or end-break")]
        action: AttendanceAction,
        /// Workplace to punch at; defaults to the first assigned workplace
        #[arg(long, help = "Workplace id (see 'attendance workplaces')")]
        workplace: Option<String>,
    },
    /// List the workplaces you may punch at
    Workplaces,
    /// Attendance report across employees (administrators only)
    Report {
        #[arg(long, help = "Only this workplace id")]
        workplace: Option<String>,
        #[arg(long, help = "First day, YYYY-MM-DD")]
        from: Option<NaiveDate>,
        #[arg(long, help = "Last day, YYYY-MM-DD")]
        to: Option<NaiveDate>,
        #[arg(long, help = "Employee name or surname contains")]
        name: Option<String>,
    },
    /// Keep polling the status until Ctrl-C
    Watch {
        #[arg(long, default_value = "30", help = "Seconds between status queries")]
        interval: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punch_parses_dashed_action() {
        let cli = Cli::try_parse_from(["attendance", "punch", "start-break", "--workplace", "4"]).unwrap();
        match cli.command {
            Some(Commands::Punch { action, workplace }) => {
                assert_eq!(action, AttendanceAction::StartBreak);
                assert_eq!(workplace.as_deref(), Some("4"));
            }
            _ => panic!("expected punch"),
        }
    }

    #[test]
    fn test_coordinates_must_come_in_pairs() {
        assert!(Cli::try_parse_from(["attendance", "--lat", "45.4", "status"]).is_err());

        let cli = Cli::try_parse_from(["attendance", "status", "--lat", "45.4", "--lon", "-9.1"]).unwrap();
        assert_eq!(cli.global.lat, Some(45.4));
        assert_eq!(cli.global.lon, Some(-9.1));
    }

    #[test]
    fn test_report_dates_are_parsed() {
        let cli = Cli::try_parse_from(["attendance", "report", "--from", "2025-03-01", "--name", "rossi"]).unwrap();
        match cli.command {
            Some(Commands::Report { from, to, name, .. }) => {
                assert_eq!(from, NaiveDate::from_ymd_opt(2025, 3, 1));
                assert_eq!(to, None);
                assert_eq!(name.as_deref(), Some("rossi"));
            }
            _ => panic!("expected report"),
        }
        assert!(Cli::try_parse_from(["attendance", "report", "--from", "01/03/2025"]).is_err());
    }
}
