//! Browser capability seam.
//!
//! The submission machine drives a [`BrowserPage`] the same way the
//! providers drive an [`HttpClient`](crate::http::HttpClient): through a
//! trait owned by this crate, with the real engine (a WebDriver session
//! via fantoccini) behind one implementation and scripted fakes in the
//! behavior tests. The engine itself is consumed, never reimplemented.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use thiserror::Error;

const DEFAULT_KEY_PAUSE: Duration = Duration::from_millis(60);
const READY_POLL: Duration = Duration::from_millis(250);

/// One candidate locator for a logical UI role.
///
/// Candidate lists are ordered most-specific-first; the resolver prefers
/// earlier entries when several match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Css(String),
    LinkText(String),
    XPath(String),
}

impl Selector {
    pub fn css(value: impl Into<String>) -> Self {
        Self::Css(value.into())
    }

    pub fn link_text(value: impl Into<String>) -> Self {
        Self::LinkText(value.into())
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::XPath(value.into())
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(value) => write!(f, "css:{value}"),
            Self::LinkText(value) => write!(f, "link:{value}"),
            Self::XPath(value) => write!(f, "xpath:{value}"),
        }
    }
}

/// Failures surfaced by a browser capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BrowserError {
    #[error("webdriver session could not be established: {0}")]
    Session(String),

    #[error("browser command failed: {0}")]
    Command(String),

    #[error("required element '{role}' could not be resolved")]
    ElementNotFound { role: String },

    #[error("timed out after {waited_ms}ms waiting for {what}")]
    Timeout { what: String, waited_ms: u64 },
}

/// Capability contract for one page/document context.
///
/// Presence/visibility/enablement probes report `false` for a missing
/// element instead of failing, so polling loops stay simple; actions
/// (`click`, `type_text`) on a missing element are command errors.
pub trait BrowserPage: Send + Sync {
    fn goto<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), BrowserError>> + Send + 'a>>;

    fn is_present<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> Pin<Box<dyn Future<Output = Result<bool, BrowserError>> + Send + 'a>>;

    fn is_visible<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> Pin<Box<dyn Future<Output = Result<bool, BrowserError>> + Send + 'a>>;

    fn is_enabled<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> Pin<Box<dyn Future<Output = Result<bool, BrowserError>> + Send + 'a>>;

    fn click<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> Pin<Box<dyn Future<Output = Result<(), BrowserError>> + Send + 'a>>;

    /// Human-like text entry: click, clear, then keystroke-paced typing.
    /// The target form only validates on real input events.
    fn type_text<'a>(
        &'a self,
        selector: &'a Selector,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), BrowserError>> + Send + 'a>>;

    fn wait_ready<'a>(
        &'a self,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<(), BrowserError>> + Send + 'a>>;

    /// Rendered text of the whole document.
    fn body_text<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<String, BrowserError>> + Send + 'a>>;

    fn page_source<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<String, BrowserError>> + Send + 'a>>;

    fn screenshot<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, BrowserError>> + Send + 'a>>;

    fn close<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<(), BrowserError>> + Send + 'a>>;
}

/// Production capability backed by a WebDriver session.
#[derive(Clone)]
pub struct WebDriverPage {
    client: Client,
    key_pause: Duration,
}

impl WebDriverPage {
    /// Open a fresh session against a running WebDriver endpoint.
    pub async fn connect(webdriver_url: &str) -> Result<Self, BrowserError> {
        let client = ClientBuilder::native()
            .connect(webdriver_url)
            .await
            .map_err(|e| BrowserError::Session(e.to_string()))?;

        Ok(Self {
            client,
            key_pause: DEFAULT_KEY_PAUSE,
        })
    }

    pub fn with_key_pause(mut self, pause: Duration) -> Self {
        self.key_pause = pause;
        self
    }

    async fn find(&self, selector: &Selector) -> Result<Option<Element>, BrowserError> {
        let locator = match selector {
            Selector::Css(value) => Locator::Css(value),
            Selector::LinkText(value) => Locator::LinkText(value),
            Selector::XPath(value) => Locator::XPath(value),
        };

        match self.client.find(locator).await {
            Ok(element) => Ok(Some(element)),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(BrowserError::Command(e.to_string())),
        }
    }

    async fn require(&self, selector: &Selector) -> Result<Element, BrowserError> {
        self.find(selector).await?.ok_or_else(|| {
            BrowserError::Command(format!("no element matches '{selector}'"))
        })
    }
}

impl BrowserPage for WebDriverPage {
    fn goto<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), BrowserError>> + Send + 'a>> {
        Box::pin(async move {
            self.client
                .goto(url)
                .await
                .map_err(|e| BrowserError::Command(e.to_string()))
        })
    }

    fn is_present<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> Pin<Box<dyn Future<Output = Result<bool, BrowserError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.find(selector).await?.is_some()) })
    }

    fn is_visible<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> Pin<Box<dyn Future<Output = Result<bool, BrowserError>> + Send + 'a>> {
        Box::pin(async move {
            match self.find(selector).await? {
                Some(element) => element
                    .is_displayed()
                    .await
                    .map_err(|e| BrowserError::Command(e.to_string())),
                None => Ok(false),
            }
        })
    }

    fn is_enabled<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> Pin<Box<dyn Future<Output = Result<bool, BrowserError>> + Send + 'a>> {
        Box::pin(async move {
            match self.find(selector).await? {
                Some(element) => element
                    .is_enabled()
                    .await
                    .map_err(|e| BrowserError::Command(e.to_string())),
                None => Ok(false),
            }
        })
    }

    fn click<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> Pin<Box<dyn Future<Output = Result<(), BrowserError>> + Send + 'a>> {
        Box::pin(async move {
            let element = self.require(selector).await?;
            element
                .click()
                .await
                .map_err(|e| BrowserError::Command(e.to_string()))
        })
    }

    fn type_text<'a>(
        &'a self,
        selector: &'a Selector,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), BrowserError>> + Send + 'a>> {
        Box::pin(async move {
            let element = self.require(selector).await?;
            element
                .click()
                .await
                .map_err(|e| BrowserError::Command(e.to_string()))?;
            element
                .clear()
                .await
                .map_err(|e| BrowserError::Command(e.to_string()))?;

            let mut buffer = [0_u8; 4];
            for ch in text.chars() {
                element
                    .send_keys(ch.encode_utf8(&mut buffer))
                    .await
                    .map_err(|e| BrowserError::Command(e.to_string()))?;
                tokio::time::sleep(self.key_pause).await;
            }
            Ok(())
        })
    }

    fn wait_ready<'a>(
        &'a self,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<(), BrowserError>> + Send + 'a>> {
        Box::pin(async move {
            let deadline = tokio::time::Instant::now() + timeout;
            loop {
                let state = self
                    .client
                    .execute("return document.readyState;", Vec::new())
                    .await
                    .map_err(|e| BrowserError::Command(e.to_string()))?;
                if state.as_str() == Some("complete") {
                    return Ok(());
                }
                if tokio::time::Instant::now() >= deadline {
                    return Err(BrowserError::Timeout {
                        what: String::from("document to become ready"),
                        waited_ms: timeout.as_millis() as u64,
                    });
                }
                tokio::time::sleep(READY_POLL).await;
            }
        })
    }

    fn body_text<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<String, BrowserError>> + Send + 'a>> {
        Box::pin(async move {
            let body = self.require(&Selector::css("body")).await?;
            body.text()
                .await
                .map_err(|e| BrowserError::Command(e.to_string()))
        })
    }

    fn page_source<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<String, BrowserError>> + Send + 'a>> {
        Box::pin(async move {
            self.client
                .source()
                .await
                .map_err(|e| BrowserError::Command(e.to_string()))
        })
    }

    fn screenshot<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, BrowserError>> + Send + 'a>> {
        Box::pin(async move {
            self.client
                .screenshot()
                .await
                .map_err(|e| BrowserError::Command(e.to_string()))
        })
    }

    fn close<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<(), BrowserError>> + Send + 'a>> {
        Box::pin(async move {
            // `Client::close` consumes a handle; the session itself is
            // shared, so closing a clone closes the session.
            self.client
                .clone()
                .close()
                .await
                .map_err(|e| BrowserError::Command(e.to_string()))
        })
    }
}
