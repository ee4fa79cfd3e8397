use dipscan::config::fetch_config;
use dipscan::scanner::{ScanOptions, scan_symbols};
use dipscan::{DipscanError, ExchangeClient};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), DipscanError> {
    // Initialize tracing subscriber for logging output.
    tracing_subscriber::fmt::init();

    let app_config = fetch_config()?;
    let strategy = app_config.strategy()?;
    let client = ExchangeClient::new(
        app_config.client_settings(),
        app_config.exchange.credentials.clone(),
    )?;

    let symbols = client.list_trading_symbols().await;
    if symbols.is_empty() {
        warn!("no trading symbols available, nothing to scan");
        return Ok(());
    }

    let options = ScanOptions::new(app_config.scan.interval)
        .with_concurrency(app_config.exchange.max_inflight);
    info!(
        symbols = symbols.len(),
        interval = %options.interval,
        rules = ?app_config.scan.rules,
        "starting scan"
    );

    let reports = tokio::select! {
        reports = scan_symbols(&client, symbols, &options, &strategy, &app_config.scan.rules) => reports?,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, aborting scan");
            return Ok(());
        }
    };

    for report in reports.iter().filter(|r| r.is_match()) {
        for signal in &report.signals {
            println!(
                "{}\tbuy {}\ttarget {}\tat {}",
                report.symbol, signal.trigger_price, signal.target_sell_price, signal.time
            );
        }
    }

    Ok(())
}
