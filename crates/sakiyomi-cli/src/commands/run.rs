use std::sync::Arc;
use std::time::Duration;

use sakiyomi_core::{
    failure_message, success_message, BrowserPage, FsDiagnosticSink, HttpClient, NoopNotifier,
    NotificationSink, ReqwestHttpClient, SiteProfile, SubmissionMachine, SubmissionOutcome,
    SubmissionTimeouts, WebDriverPage, WebhookNotifier,
};

use crate::cli::{Cli, RunArgs};
use crate::config;
use crate::error::CliError;

/// Full pipeline: fetch → select → format → submit → notify.
pub async fn run(cli: &Cli, args: &RunArgs) -> Result<(), CliError> {
    // Data stage first: no browser session exists until a price has
    // been resolved, so no partial submission can ever happen.
    let forecast = super::resolve_forecast(cli).await?;
    let credentials = config::credentials_from_env()?;

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let notifier: Box<dyn NotificationSink> = match config::webhook_from_env() {
        Some(url) => Box::new(WebhookNotifier::new(Arc::clone(&http), url)),
        None => Box::new(NoopNotifier),
    };

    let mut profile = SiteProfile::default();
    if let Some(login_url) = &args.login_url {
        profile.login_url = login_url.clone();
    }
    let timeouts = SubmissionTimeouts {
        probe: Duration::from_millis(args.probe_timeout_ms),
        enable: Duration::from_millis(args.enable_timeout_ms),
        navigation: Duration::from_millis(args.navigation_timeout_ms),
        ..SubmissionTimeouts::default()
    };

    let page = WebDriverPage::connect(&args.webdriver_url)
        .await?
        .with_key_pause(Duration::from_millis(args.key_pause_ms));
    let diagnostics = FsDiagnosticSink::new(&args.diagnostics_dir);

    let machine = SubmissionMachine::new(&page, &diagnostics, profile).with_timeouts(timeouts);
    let outcome = machine.run(&credentials, &forecast.amount).await;

    // The session is released on every path, success or failure.
    if let Err(error) = page.close().await {
        tracing::warn!(%error, "failed to close browser session");
    }

    match outcome {
        SubmissionOutcome::Success => {
            let message = success_message(&forecast.symbol, &forecast.resolved, &forecast.amount);
            notifier.notify(&message).await;

            if cli.json {
                let summary = serde_json::json!({
                    "outcome": "success",
                    "symbol": forecast.symbol,
                    "window": forecast.window,
                    "resolved": forecast.resolved,
                    "amount": forecast.amount,
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{message}");
            }
            Ok(())
        }
        SubmissionOutcome::Failed(failure) => {
            let message = failure_message(&forecast.symbol, &failure, &forecast.amount);
            notifier.notify(&message).await;
            Err(CliError::Submission(failure))
        }
    }
}
