//! Guarded submission state machine.
//!
//! One-directional `LoggingIn -> Navigating -> Filling -> Submitting`
//! sequence over a [`BrowserPage`]. No stage is retried and no stage is
//! rolled back; the first failure captures diagnostics and terminates
//! the run as `Failed(stage, cause)`.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::amount::ForecastAmount;
use crate::browser::{BrowserError, BrowserPage, Selector};
use crate::diag::DiagnosticSink;
use crate::resolver::ElementResolver;
use crate::ValidationError;

/// One phase of the submission sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Login,
    Navigate,
    Fill,
    Submit,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Navigate => "navigate",
            Self::Fill => "fill",
            Self::Submit => "submit",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure attributed to the stage that produced it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("stage '{stage}' failed: {cause}")]
pub struct StageFailure {
    pub stage: Stage,
    pub cause: String,
}

/// Terminal result of one submission run; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success,
    Failed(StageFailure),
}

impl SubmissionOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Login credentials, supplied externally and never persisted.
#[derive(Clone)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(
        identifier: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let identifier = identifier.into();
        let secret = secret.into();
        if identifier.trim().is_empty() {
            return Err(ValidationError::EmptyIdentifier);
        }
        if secret.trim().is_empty() {
            return Err(ValidationError::EmptySecret);
        }
        Ok(Self { identifier, secret })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Where the fragile form's controls live.
///
/// Login fields use fixed single selectors (observed stable); everything
/// downstream carries an ordered candidate list, most specific first.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub login_url: String,
    pub identifier_field: Selector,
    pub secret_field: Selector,
    pub login_button: Selector,
    pub top_link: Vec<Selector>,
    pub major_field: Vec<Selector>,
    pub minor_field: Vec<Selector>,
    pub submit_button: Vec<Selector>,
    /// Tokens whose presence on the landing page confirms acceptance.
    /// Absence of all of them is ambiguous, not fatal.
    pub confirmation_tokens: Vec<String>,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            login_url: String::from("https://kabuyoso.example.jp/login"),
            identifier_field: Selector::css("input[name='email']"),
            secret_field: Selector::css("input[name='password']"),
            login_button: Selector::css("button[type='submit']"),
            top_link: vec![
                Selector::link_text("TOP"),
                Selector::xpath("//a[contains(normalize-space(.), 'TOP')]"),
                Selector::link_text("トップ"),
            ],
            major_field: vec![
                Selector::css("input.forecast-major"),
                Selector::css("input[name='yoso_int']"),
                Selector::css("form input[type='text']"),
            ],
            minor_field: vec![
                Selector::css("input.forecast-minor"),
                Selector::css("input[name='yoso_dec']"),
                Selector::css("form input[type='text'] ~ input[type='text']"),
            ],
            // The site reuses one control for first-time and amended
            // submissions; both action labels must be recognized.
            submit_button: vec![
                Selector::css("input[type='submit'][value='登録']"),
                Selector::css("input[type='submit'][value='修正']"),
                Selector::xpath(
                    "//input[@type='submit'][contains(@value,'登録') or contains(@value,'修正')]",
                ),
            ],
            confirmation_tokens: vec![
                String::from("登録しました"),
                String::from("修正しました"),
                String::from("受け付けました"),
            ],
        }
    }
}

/// Bounds for every remote wait a stage performs.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionTimeouts {
    /// Aggregate element-resolution budget per role.
    pub probe: Duration,
    /// Enabled-state poll bound for gated controls.
    pub enable: Duration,
    /// Document-ready bound after navigations.
    pub navigation: Duration,
    /// Poll interval for visibility/enablement checks.
    pub poll: Duration,
}

impl Default for SubmissionTimeouts {
    fn default() -> Self {
        Self {
            probe: Duration::from_secs(8),
            enable: Duration::from_secs(10),
            navigation: Duration::from_secs(20),
            poll: Duration::from_millis(250),
        }
    }
}

/// Drives one login-to-submit pass over a page.
pub struct SubmissionMachine<'a> {
    page: &'a dyn BrowserPage,
    diagnostics: &'a dyn DiagnosticSink,
    resolver: ElementResolver,
    profile: SiteProfile,
    timeouts: SubmissionTimeouts,
}

impl<'a> SubmissionMachine<'a> {
    pub fn new(
        page: &'a dyn BrowserPage,
        diagnostics: &'a dyn DiagnosticSink,
        profile: SiteProfile,
    ) -> Self {
        let timeouts = SubmissionTimeouts::default();
        Self {
            page,
            diagnostics,
            resolver: ElementResolver::new(timeouts.probe, timeouts.poll),
            profile,
            timeouts,
        }
    }

    pub fn with_timeouts(mut self, timeouts: SubmissionTimeouts) -> Self {
        self.resolver = ElementResolver::new(timeouts.probe, timeouts.poll);
        self.timeouts = timeouts;
        self
    }

    /// Run the full sequence. Stages are strictly sequential; the first
    /// failing stage captures diagnostics exactly once and ends the run.
    pub async fn run(
        &self,
        credentials: &Credentials,
        amount: &ForecastAmount,
    ) -> SubmissionOutcome {
        if let Err(error) = self.log_in(credentials).await {
            return self.fail(Stage::Login, error).await;
        }
        if let Err(error) = self.navigate().await {
            return self.fail(Stage::Navigate, error).await;
        }
        if let Err(error) = self.fill(amount).await {
            return self.fail(Stage::Fill, error).await;
        }
        if let Err(error) = self.submit_form().await {
            return self.fail(Stage::Submit, error).await;
        }

        SubmissionOutcome::Success
    }

    async fn fail(&self, stage: Stage, error: BrowserError) -> SubmissionOutcome {
        tracing::error!(%stage, %error, "submission stage failed");
        self.diagnostics.capture(self.page, stage.as_str()).await;
        SubmissionOutcome::Failed(StageFailure {
            stage,
            cause: error.to_string(),
        })
    }

    async fn log_in(&self, credentials: &Credentials) -> Result<(), BrowserError> {
        tracing::info!(url = %self.profile.login_url, "opening login page");
        self.page.goto(&self.profile.login_url).await?;
        self.page.wait_ready(self.timeouts.navigation).await?;

        self.page
            .type_text(&self.profile.identifier_field, &credentials.identifier)
            .await?;
        self.page
            .type_text(&self.profile.secret_field, &credentials.secret)
            .await?;

        // The submit control only enables once the form has seen real
        // input events; gate the click on that signal.
        self.wait_enabled(&self.profile.login_button, "login control")
            .await?;
        self.page.click(&self.profile.login_button).await?;
        self.page.wait_ready(self.timeouts.navigation).await
    }

    async fn navigate(&self) -> Result<(), BrowserError> {
        let link = self
            .resolve_required("top link", &self.profile.top_link)
            .await?;
        self.page.click(&link).await?;
        self.page.wait_ready(self.timeouts.navigation).await
    }

    async fn fill(&self, amount: &ForecastAmount) -> Result<(), BrowserError> {
        let major = self
            .resolve_required("major amount field", &self.profile.major_field)
            .await?;
        self.page
            .type_text(&major, &amount.major.to_string())
            .await?;

        let minor = self
            .resolve_required("minor amount field", &self.profile.minor_field)
            .await?;
        self.page.type_text(&minor, &amount.minor_padded()).await
    }

    async fn submit_form(&self) -> Result<(), BrowserError> {
        let button = self
            .resolve_required("submit control", &self.profile.submit_button)
            .await?;
        self.page.click(&button).await?;
        self.page.wait_ready(self.timeouts.navigation).await?;

        // Confirmation wording is not guaranteed stable; treat a missing
        // token as ambiguous rather than failed.
        match self.page.body_text().await {
            Ok(body) => {
                let confirmed = self
                    .profile
                    .confirmation_tokens
                    .iter()
                    .any(|token| body.contains(token.as_str()));
                if !confirmed {
                    tracing::warn!(
                        "no expected confirmation token on landing page; \
                         treating submission as accepted"
                    );
                }
            }
            Err(error) => {
                tracing::warn!(%error, "could not read landing page text");
            }
        }

        Ok(())
    }

    async fn resolve_required(
        &self,
        role: &str,
        candidates: &[Selector],
    ) -> Result<Selector, BrowserError> {
        let resolved = self
            .resolver
            .resolve(self.page, role, candidates)
            .await?
            .ok_or_else(|| BrowserError::ElementNotFound {
                role: role.to_owned(),
            })?;

        // The trailing candidate of a multi-entry list is the broad
        // generic guess; it is best-effort only, never authoritative.
        if candidates.len() > 1 && Some(&resolved) == candidates.last() {
            tracing::warn!(role, selector = %resolved, "generic fallback selector matched");
        }

        Ok(resolved)
    }

    async fn wait_enabled(&self, selector: &Selector, what: &str) -> Result<(), BrowserError> {
        let deadline = tokio::time::Instant::now() + self.timeouts.enable;
        loop {
            if self.page.is_enabled(selector).await? {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(BrowserError::Timeout {
                    what: format!("{what} to become enabled"),
                    waited_ms: self.timeouts.enable.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.timeouts.poll).await;
        }
    }
}
