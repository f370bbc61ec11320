//! # sakiyomi-core
//!
//! Core contracts for the sakiyomi forecast submitter: resolve one
//! authoritative session price from a gapped provider series, format it
//! as a major/minor pair, and push it through a fragile third-party web
//! form with deterministic failure capture.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌────────────────┐   ┌────────────────┐
//! │ SeriesSource │──▶│ select_in_     │──▶│ ForecastAmount │
//! │ (chart/stooq)│   │ window         │   │ (major/minor)  │
//! └──────────────┘   └────────────────┘   └───────┬────────┘
//!                                                 │
//!                                                 ▼
//! ┌──────────────┐   ┌────────────────┐   ┌────────────────┐
//! │ Notification │◀──│ Submission     │──▶│ DiagnosticSink │
//! │ Sink         │   │ Machine        │   │ (on failure)   │
//! └──────────────┘   └────────────────┘   └────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`amount`] | Major/minor price formatting with carry |
//! | [`browser`] | Browser capability seam + WebDriver backend |
//! | [`diag`] | Best-effort failure diagnostics |
//! | [`domain`] | Symbols, samples, series, intervals |
//! | [`http`] | HTTP transport seam |
//! | [`notify`] | Outcome notification |
//! | [`provider`] | Quote provider adapters |
//! | [`resolver`] | Ordered-candidate element resolution |
//! | [`submit`] | Guarded submission state machine |
//! | [`window`] | Session windows and price selection |
//!
//! All remote waits are timeout-bounded and every component takes its
//! collaborators explicitly; nothing reads ambient process state.

pub mod amount;
pub mod browser;
pub mod diag;
pub mod domain;
pub mod error;
pub mod http;
pub mod notify;
pub mod provider;
pub mod resolver;
pub mod submit;
pub mod window;

pub use amount::{round_to_unit, ForecastAmount};
pub use browser::{BrowserError, BrowserPage, Selector, WebDriverPage};
pub use diag::{DiagnosticSink, FsDiagnosticSink, NoopDiagnosticSink};
pub use domain::{Interval, PriceSeries, ResolvedPrice, Sample, Symbol};
pub use error::ValidationError;
pub use http::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};
pub use notify::{failure_message, success_message, NoopNotifier, NotificationSink, WebhookNotifier};
pub use provider::{ChartSource, FetchError, ProviderKind, SeriesRequest, SeriesSource, StooqSource};
pub use resolver::ElementResolver;
pub use submit::{
    Credentials, SiteProfile, Stage, StageFailure, SubmissionMachine, SubmissionOutcome,
    SubmissionTimeouts,
};
pub use window::{select_in_window, NoValidPrice, SessionClock, SessionWindow};
