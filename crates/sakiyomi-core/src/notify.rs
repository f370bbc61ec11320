//! Outcome notification.
//!
//! One formatted text message per run. A missing webhook configuration
//! silently disables the sink; a delivery failure is logged and never
//! affects the run's outcome or exit status.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::amount::ForecastAmount;
use crate::http::{HttpClient, HttpRequest};
use crate::submit::StageFailure;
use crate::{ResolvedPrice, Symbol};

/// Accepts the run's single summary message.
pub trait NotificationSink: Send + Sync {
    fn notify<'a>(
        &'a self,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

/// Posts `{"text": ...}` to a webhook through the transport seam.
#[derive(Clone)]
pub struct WebhookNotifier {
    http: Arc<dyn HttpClient>,
    url: String,
}

impl WebhookNotifier {
    pub fn new(http: Arc<dyn HttpClient>, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

impl NotificationSink for WebhookNotifier {
    fn notify<'a>(
        &'a self,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            let request = HttpRequest::post(&self.url)
                .with_json_body(&serde_json::json!({ "text": message }));

            match self.http.execute(request).await {
                Ok(response) if response.is_success() => {
                    tracing::debug!("notification delivered");
                }
                Ok(response) => {
                    tracing::warn!(status = response.status, "notification rejected");
                }
                Err(error) => {
                    tracing::warn!(%error, "notification delivery failed");
                }
            }
        })
    }
}

/// Sink used when no webhook is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl NotificationSink for NoopNotifier {
    fn notify<'a>(
        &'a self,
        _message: &'a str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async {})
    }
}

/// Success summary: resolved price, formatted amount, sample timestamp.
pub fn success_message(
    symbol: &Symbol,
    resolved: &ResolvedPrice,
    amount: &ForecastAmount,
) -> String {
    format!(
        "forecast submitted: {symbol} {amount} (resolved {price} at {ts})",
        price = resolved.price,
        ts = render_epoch(resolved.ts),
    )
}

/// Failure summary: stage, cause, and the amount that was attempted.
pub fn failure_message(
    symbol: &Symbol,
    failure: &StageFailure,
    attempted: &ForecastAmount,
) -> String {
    format!(
        "forecast submission failed: {symbol} at stage '{stage}' ({cause}); attempted {attempted}",
        stage = failure.stage,
        cause = failure.cause,
    )
}

fn render_epoch(ts: i64) -> String {
    OffsetDateTime::from_unix_timestamp(ts)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
        .unwrap_or_else(|| format!("epoch {ts}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submit::Stage;

    #[test]
    fn success_message_carries_price_amount_and_timestamp() {
        let symbol = Symbol::parse("NK=F").expect("valid");
        let resolved = ResolvedPrice {
            price: 50320.5,
            ts: 1_766_620_800,
        };
        let amount = ForecastAmount::from_price(50320.5).expect("valid");

        let message = success_message(&symbol, &resolved, &amount);
        assert!(message.contains("NK=F"));
        assert!(message.contains("50320.50"));
        assert!(message.contains("2025-12-25T00:00:00Z"));
    }

    #[test]
    fn failure_message_names_stage_cause_and_attempt() {
        let symbol = Symbol::parse("NK=F").expect("valid");
        let failure = StageFailure {
            stage: Stage::Fill,
            cause: String::from("required element 'major amount field' could not be resolved"),
        };
        let amount = ForecastAmount::from_price(50320.5).expect("valid");

        let message = failure_message(&symbol, &failure, &amount);
        assert!(message.contains("stage 'fill'"));
        assert!(message.contains("major amount field"));
        assert!(message.contains("50320.50"));
    }
}
