use std::sync::Arc;

use time::OffsetDateTime;

use sakiyomi_core::{
    round_to_unit, select_in_window, ChartSource, ForecastAmount, HttpClient, Interval,
    ReqwestHttpClient, ResolvedPrice, SeriesRequest, SeriesSource, SessionClock, SessionWindow,
    StooqSource, Symbol,
};

use crate::cli::{Cli, Command, ProviderArg};
use crate::error::CliError;

mod price;
mod run;

pub async fn dispatch(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::Run(args) => run::run(cli, args).await,
        Command::Price(args) => price::run(cli, args).await,
    }
}

/// Everything the submission stage needs from the data stage.
pub(crate) struct ResolvedForecast {
    pub symbol: Symbol,
    pub window: SessionWindow,
    pub resolved: ResolvedPrice,
    pub amount: ForecastAmount,
}

/// Fetch, select and format; no browser session is involved, so any
/// failure here aborts the run before one is opened.
pub(crate) async fn resolve_forecast(cli: &Cli) -> Result<ResolvedForecast, CliError> {
    let symbol = Symbol::parse(&cli.symbol)?;
    let interval = Interval::parse(&cli.interval)?;
    let request = SeriesRequest::new(symbol.clone(), cli.range_days, interval)?;

    let clock = SessionClock::with_offset_hours(cli.offset_hours)?;
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());

    let source: Box<dyn SeriesSource> = match cli.provider {
        ProviderArg::Chart => {
            let mut chart = ChartSource::new(Arc::clone(&http));
            if let Some(endpoint) = &cli.endpoint {
                chart = chart.with_base_url(endpoint);
            }
            Box::new(chart)
        }
        ProviderArg::Stooq => {
            let mut stooq = StooqSource::new(Arc::clone(&http)).with_offset(clock.offset);
            if let Some(endpoint) = &cli.endpoint {
                stooq = stooq.with_base_url(endpoint);
            }
            Box::new(stooq)
        }
    };

    tracing::info!(%symbol, provider = %source.id(), "fetching price series");
    let series = source.fetch(&request).await?;

    let window = clock.window_at(OffsetDateTime::now_utc());
    let resolved = select_in_window(&series, &window)?;
    tracing::info!(
        price = resolved.price,
        ts = resolved.ts,
        "resolved session price"
    );

    let snapped = round_to_unit(resolved.price, cli.round_unit);
    let amount = ForecastAmount::from_price(snapped)?;

    Ok(ResolvedForecast {
        symbol,
        window,
        resolved,
        amount,
    })
}
