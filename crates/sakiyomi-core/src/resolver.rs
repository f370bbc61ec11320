//! Ordered-candidate element resolution.
//!
//! The target site's DOM is externally controlled and shifts between
//! deployments, so every logical role carries an ordered candidate list
//! instead of one hardcoded selector. Resolution is centralized here
//! rather than scattered as inline try/catch guesses.

use std::time::Duration;

use crate::browser::{BrowserError, BrowserPage, Selector};

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(8);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Probes candidate selectors in preference order under one shared
/// time budget.
#[derive(Debug, Clone, Copy)]
pub struct ElementResolver {
    probe_timeout: Duration,
    poll_interval: Duration,
}

impl Default for ElementResolver {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ElementResolver {
    pub fn new(probe_timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            probe_timeout,
            poll_interval,
        }
    }

    /// Return the first candidate that becomes visible, or `None` when
    /// the aggregate budget runs out — absence is the caller's call,
    /// not an error.
    ///
    /// Candidates are probed strictly in order: an immediate existence
    /// check first (a missing candidate costs nothing), then a bounded
    /// visibility wait. Earlier candidates therefore win whenever more
    /// than one would match.
    pub async fn resolve(
        &self,
        page: &dyn BrowserPage,
        role: &str,
        candidates: &[Selector],
    ) -> Result<Option<Selector>, BrowserError> {
        let deadline = tokio::time::Instant::now() + self.probe_timeout;

        for candidate in candidates {
            if !page.is_present(candidate).await? {
                tracing::debug!(role, selector = %candidate, "candidate absent, trying next");
                continue;
            }

            loop {
                if page.is_visible(candidate).await? {
                    tracing::debug!(role, selector = %candidate, "resolved");
                    return Ok(Some(candidate.clone()));
                }
                if tokio::time::Instant::now() >= deadline {
                    break;
                }
                tokio::time::sleep(self.poll_interval).await;
            }

            if tokio::time::Instant::now() >= deadline {
                tracing::debug!(role, "probe budget exhausted");
                break;
            }
        }

        Ok(None)
    }
}
