use anyhow::Result;
use energy_client::EnergyAnalytics;
use energy_ingestion::{config::AppConfig, load_readings, observability};
use std::env;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let mut cfg = AppConfig::load()?;

    // A positional argument overrides the configured readings file.
    if let Some(path) = env::args().nth(1) {
        cfg.source.path = path;
    }

    let analytics = EnergyAnalytics::new(cfg.analytics.base_rate)?;
    tracing::info!(path = %cfg.source.path, base_rate = analytics.base_rate(), "starting energy monitor");

    let readings = load_readings(&cfg.source.path).await?;
    if readings.is_empty() {
        println!("No data found in {}", cfg.source.path);
        return Ok(());
    }

    let summary = analytics.summarize(&readings, cfg.analytics.monthly_budget)?;
    tracing::info!(
        total_readings = summary.total_readings,
        efficiency_score = summary.efficiency_score,
        projected_cost = summary.projected_cost,
        exceeded = summary.exceeded,
        "energy summary computed"
    );

    println!("--- Energy Summary Report ---");
    println!("Total Readings: {}", summary.total_readings);
    println!("Efficiency Score: {:.4}", summary.efficiency_score);
    println!("Projected Monthly Cost: ${:.2}", summary.projected_cost);
    println!("Budget: ${:.2}", summary.budget);
    if summary.exceeded {
        println!("ALERT: Projected cost exceeds budget!");
    } else {
        println!("Budget Status: Within limits.");
    }

    Ok(())
}
