use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

use roost_accounting::{CsvDirectorySink, RoostConfig, Services};
use roost_core::CalendarMonth;

#[derive(Args, Debug)]
pub struct DeclarationCommand {
    #[arg(long)]
    accommodation: i64,

    /// 1-12
    #[arg(long)]
    month: u32,

    #[arg(long)]
    year: i32,

    /// Directory for the CSV report (default: reports.output_dir)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Print the declaration and warnings as JSON
    #[arg(long)]
    json: bool,
}

impl DeclarationCommand {
    pub async fn run(self, services: &Services, config: &RoostConfig) -> anyhow::Result<()> {
        let month = CalendarMonth::new(self.year, self.month)?;
        let out_dir = self.out_dir.unwrap_or_else(|| config.reports.output_dir.clone());
        let mut sink = CsvDirectorySink::new(out_dir);

        let outcome = services
            .accounting
            .evaluate_monthly_declaration(self.accommodation, month, &mut sink)
            .await
            .with_context(|| format!("declaration for accommodation {} in {}", self.accommodation, month))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            return Ok(());
        }

        let declaration = &outcome.declaration;
        println!("City tax declaration, accommodation #{} {}", declaration.accommodation_id, month);
        println!("  Reservations:          {}", outcome.reservations);
        println!("  Total city tax amount: {}", declaration.total_city_tax);
        println!("  Total guests:          {}", declaration.total_guests);
        println!("  Total nights:          {}", declaration.total_nights);
        println!("  Evaluated city tax:    {}", declaration.total_evaluated);
        for warning in &outcome.warnings {
            println!("  ⚠ {warning}");
        }
        for path in sink.written() {
            println!("Report written to {}", path.display());
        }
        Ok(())
    }
}
