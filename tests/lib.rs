//! Scripted fakes shared by the behavior tests.
//!
//! `CannedHttpClient` stands in for the HTTP transport and
//! `ScriptedPage` for the browser capability, both recording what the
//! system under test asked of them.

use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use sakiyomi_core::{
    BrowserError, BrowserPage, DiagnosticSink, HttpClient, HttpError, HttpRequest, HttpResponse,
    Selector, SiteProfile, SubmissionTimeouts,
};

/// Transport that replays canned responses in order and records every
/// request it saw.
pub struct CannedHttpClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl CannedHttpClient {
    pub fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn single(response: Result<HttpResponse, HttpError>) -> Self {
        Self::new(vec![response])
    }

    pub fn recorded_requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }
}

impl HttpClient for CannedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);
        let response = self
            .responses
            .lock()
            .expect("response store should not be poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::new("canned transport exhausted")));
        Box::pin(async move { response })
    }
}

/// Browser fake driven by visibility/enablement sets keyed on the
/// selector's display form (`css:#login`, `link:TOP`, ...).
#[derive(Default)]
pub struct ScriptedPage {
    visible: Mutex<HashSet<String>>,
    enabled: Mutex<HashSet<String>>,
    body: Mutex<String>,
    actions: Mutex<Vec<String>>,
}

impl ScriptedPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_visible(self, selector: &Selector) -> Self {
        self.visible
            .lock()
            .expect("visible set should not be poisoned")
            .insert(selector.to_string());
        self
    }

    pub fn with_enabled(self, selector: &Selector) -> Self {
        self.enabled
            .lock()
            .expect("enabled set should not be poisoned")
            .insert(selector.to_string());
        self
    }

    pub fn with_body(self, body: &str) -> Self {
        *self.body.lock().expect("body should not be poisoned") = body.to_owned();
        self
    }

    /// Everything the machine did, in order.
    pub fn actions(&self) -> Vec<String> {
        self.actions
            .lock()
            .expect("action log should not be poisoned")
            .clone()
    }

    fn record(&self, action: String) {
        self.actions
            .lock()
            .expect("action log should not be poisoned")
            .push(action);
    }

    fn contains(&self, set: &Mutex<HashSet<String>>, selector: &Selector) -> bool {
        set.lock()
            .expect("set should not be poisoned")
            .contains(&selector.to_string())
    }
}

impl BrowserPage for ScriptedPage {
    fn goto<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), BrowserError>> + Send + 'a>> {
        self.record(format!("goto:{url}"));
        Box::pin(async { Ok(()) })
    }

    fn is_present<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> Pin<Box<dyn Future<Output = Result<bool, BrowserError>> + Send + 'a>> {
        let present = self.contains(&self.visible, selector);
        Box::pin(async move { Ok(present) })
    }

    fn is_visible<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> Pin<Box<dyn Future<Output = Result<bool, BrowserError>> + Send + 'a>> {
        let visible = self.contains(&self.visible, selector);
        Box::pin(async move { Ok(visible) })
    }

    fn is_enabled<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> Pin<Box<dyn Future<Output = Result<bool, BrowserError>> + Send + 'a>> {
        let enabled = self.contains(&self.enabled, selector);
        Box::pin(async move { Ok(enabled) })
    }

    fn click<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> Pin<Box<dyn Future<Output = Result<(), BrowserError>> + Send + 'a>> {
        self.record(format!("click:{selector}"));
        Box::pin(async { Ok(()) })
    }

    fn type_text<'a>(
        &'a self,
        selector: &'a Selector,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), BrowserError>> + Send + 'a>> {
        self.record(format!("type:{selector}={text}"));
        Box::pin(async { Ok(()) })
    }

    fn wait_ready<'a>(
        &'a self,
        _timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<(), BrowserError>> + Send + 'a>> {
        Box::pin(async { Ok(()) })
    }

    fn body_text<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<String, BrowserError>> + Send + 'a>> {
        let body = self.body.lock().expect("body should not be poisoned").clone();
        Box::pin(async move { Ok(body) })
    }

    fn page_source<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<String, BrowserError>> + Send + 'a>> {
        Box::pin(async { Ok(String::from("<html></html>")) })
    }

    fn screenshot<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, BrowserError>> + Send + 'a>> {
        Box::pin(async { Ok(vec![0x89, b'P', b'N', b'G']) })
    }

    fn close<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<(), BrowserError>> + Send + 'a>> {
        self.record(String::from("close"));
        Box::pin(async { Ok(()) })
    }
}

/// Diagnostic sink that only counts captures.
#[derive(Default)]
pub struct CountingDiagnosticSink {
    labels: Mutex<Vec<String>>,
}

impl CountingDiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> Vec<String> {
        self.labels
            .lock()
            .expect("label store should not be poisoned")
            .clone()
    }

    pub fn count(&self) -> usize {
        self.labels().len()
    }
}

impl DiagnosticSink for CountingDiagnosticSink {
    fn capture<'a>(
        &'a self,
        _page: &'a dyn BrowserPage,
        label: &'a str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        self.labels
            .lock()
            .expect("label store should not be poisoned")
            .push(label.to_owned());
        Box::pin(async {})
    }
}

/// Simple stable site geometry for submission tests.
pub fn test_profile() -> SiteProfile {
    SiteProfile {
        login_url: String::from("https://forecast.test/login"),
        identifier_field: Selector::css("#id"),
        secret_field: Selector::css("#pw"),
        login_button: Selector::css("#login"),
        top_link: vec![Selector::link_text("TOP")],
        major_field: vec![Selector::css("#major")],
        minor_field: vec![Selector::css("#minor")],
        submit_button: vec![Selector::css("#submit")],
        confirmation_tokens: vec![String::from("accepted")],
    }
}

/// Millisecond-scale bounds so timeout paths finish quickly.
pub fn fast_timeouts() -> SubmissionTimeouts {
    SubmissionTimeouts {
        probe: Duration::from_millis(100),
        enable: Duration::from_millis(100),
        navigation: Duration::from_secs(1),
        poll: Duration::from_millis(10),
    }
}
