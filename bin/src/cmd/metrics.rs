//! Metrics command implementation.

use salou::signals::available_metrics;

/// Print the quality metrics a backtest can rank by.
pub(crate) fn list_metrics(verbose: bool) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                   Available Quality Metrics                  ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    for info in available_metrics() {
        if verbose {
            println!(
                "  {:18} {} / {}",
                info.metric.name(),
                info.numerator,
                info.denominator
            );
            println!("  {:18} {}", "", info.description);
        } else {
            println!("  {}", info.metric.name());
        }
    }
    println!();

    if !verbose {
        println!("Use --verbose for formulas and descriptions.\n");
    }
    println!("Aliases: roe -> return_on_equity, roa -> return_on_assets\n");
}
