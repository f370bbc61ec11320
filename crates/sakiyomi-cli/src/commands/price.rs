use crate::cli::{Cli, PriceArgs};
use crate::error::CliError;

/// Dry run: resolve and print, no browser session.
pub async fn run(cli: &Cli, _args: &PriceArgs) -> Result<(), CliError> {
    let forecast = super::resolve_forecast(cli).await?;

    if cli.json {
        let summary = serde_json::json!({
            "symbol": forecast.symbol,
            "window": forecast.window,
            "resolved": forecast.resolved,
            "amount": forecast.amount,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{}: resolved {} at epoch {} -> {}",
            forecast.symbol, forecast.resolved.price, forecast.resolved.ts, forecast.amount,
        );
    }

    Ok(())
}
