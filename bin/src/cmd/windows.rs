//! Windows command implementation.

use anyhow::Result;
use salou::FundamentalsProvider;
use salou::data::CsvFundamentalsProvider;
use salou::eval::{report_dates, schedule};
use salou::signals::derive_ratios;
use std::path::Path;

/// Print one holding period per report date found in `fundamentals`.
pub(crate) fn show_windows(fundamentals: &Path, buffer: u32) -> Result<()> {
    let records = CsvFundamentalsProvider::new(fundamentals).fundamentals()?;
    let derived = derive_ratios(&records);
    let dates = report_dates(&derived.ratios, None, None);
    let windows = schedule(&dates, buffer)?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     Rebalance Schedule                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Records:   {}", records.len());
    println!("Discarded: {}", derived.discarded);
    println!("Buffer:    {buffer} month(s)");
    println!();

    println!("{:<12} {:<12} {:<12} {:>10}", "Report", "Buy", "Sell", "Filers");
    println!("{}", "-".repeat(50));
    for window in &windows {
        let filers = derived
            .ratios
            .iter()
            .filter(|r| r.period_end_date == window.report_date)
            .count();
        println!(
            "{:<12} {:<12} {:<12} {:>10}",
            window.report_date.to_string(),
            window.buy_date.to_string(),
            window.sell_date.to_string(),
            filers
        );
    }
    println!();

    Ok(())
}
