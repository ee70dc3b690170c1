use anyhow::Result;
use chrono::NaiveDate;

use super::{Command, CommandContext};
use crate::attendance::WorkplaceId;
use crate::reports::{fetch_report, report_workplaces, ReportFilter};

pub struct ReportCommand {
    pub workplace: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub name: Option<String>,
}

impl ReportCommand {
    fn filter(&self) -> ReportFilter {
        ReportFilter {
            workplace: self.workplace.as_deref().map(WorkplaceId::new),
            start_date: self.from,
            end_date: self.to,
            name: self.name.clone(),
        }
    }
}

impl Command for ReportCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let session = ctx.session().await?;
        let filter = self.filter();

        if let Some(id) = filter.workplace.as_ref() {
            let workplaces = report_workplaces(ctx.api.as_ref(), &session).await?;
            match workplaces.iter().find(|wp| &wp.id == id) {
                Some(wp) => println!("🏢 {}", wp.name),
                None => println!("⚠️  Workplace {id} is not in the directory"),
            }
        }

        let records = fetch_report(ctx.api.as_ref(), &session, &filter).await?;
        if records.is_empty() {
            println!("📭 No attendance records match the filter");
            return Ok(());
        }

        println!("📋 ATTENDANCE REPORT ({} records)", records.len());
        println!("{:<24} {:<10} {:>6} {:>15} {:>6}", "Employee", "Date", "In", "Break", "Out");
        println!("{}", "─".repeat(71));
        for record in &records {
            println!(
                "{:<24} {:<10} {:>6} {:>15} {:>6}",
                record.employee(),
                record.date,
                record.check_in_time(),
                record.break_span(),
                record.check_out_time()
            );
        }
        Ok(())
    }
}
