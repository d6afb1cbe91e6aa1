//! Browser session abstraction
//!
//! Flows and scenarios only talk to a [`Session`]. Every primitive waits
//! implicitly for its target up to the session's timeout budget and fails
//! with [`E2eError::Timeout`](crate::E2eError::Timeout) when it runs out.

use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

use crate::error::E2eResult;
use crate::spec::TestStep;

#[async_trait]
pub trait Session: Send {
    /// Navigate to a URL (absolute, or relative to the base URL)
    async fn goto(&mut self, url: &str) -> E2eResult<()>;

    async fn click(&mut self, selector: &str) -> E2eResult<()>;

    async fn fill(&mut self, selector: &str, value: &str) -> E2eResult<()>;

    async fn check(&mut self, selector: &str) -> E2eResult<()>;

    /// Select a dropdown option by value or label
    async fn select_option(&mut self, selector: &str, value: &str) -> E2eResult<()>;

    async fn set_input_files(&mut self, selector: &str, path: &Path) -> E2eResult<()>;

    /// Accept the next dialog the page opens. One-shot.
    async fn accept_next_dialog(&mut self) -> E2eResult<()>;

    async fn expect_title(&mut self, title: &str) -> E2eResult<()>;

    async fn expect_visible(&mut self, selector: &str) -> E2eResult<()>;

    /// The element is visible and its text contains `text`
    async fn expect_text(&mut self, selector: &str, text: &str) -> E2eResult<()>;

    /// The element is visible and its whole text equals `text`
    async fn expect_exact_text(&mut self, selector: &str, text: &str) -> E2eResult<()>;

    /// No matching element is visible
    async fn expect_hidden(&mut self, selector: &str) -> E2eResult<()>;

    /// Exactly `count` elements match
    async fn expect_count(&mut self, selector: &str, count: usize) -> E2eResult<()>;

    /// Text of every element matching `selector`, in document order. Does not wait.
    async fn text_contents(&mut self, selector: &str) -> E2eResult<Vec<String>>;

    async fn screenshot(&mut self, path: &Path, full_page: bool) -> E2eResult<()>;

    /// Tear the browser down. Further calls fail.
    async fn close(&mut self) -> E2eResult<()>;

    /// Run one declarative step on top of the primitives
    async fn perform(&mut self, step: &TestStep) -> E2eResult<()> {
        debug!("Executing step: {}", step.describe());

        match step {
            TestStep::Navigate { url } => self.goto(url).await,
            TestStep::Click { selector } => self.click(selector).await,
            TestStep::Fill { selector, value } => self.fill(selector, value).await,
            TestStep::Check { selector } => self.check(selector).await,
            TestStep::Select { selector, value } => self.select_option(selector, value).await,
            TestStep::Upload { selector, path } => self.set_input_files(selector, path).await,
            TestStep::AcceptDialog => self.accept_next_dialog().await,
            TestStep::Assert {
                selector,
                visible,
                text,
                text_contains,
                count,
            } => {
                match visible {
                    Some(false) => self.expect_hidden(selector).await?,
                    Some(true) => self.expect_visible(selector).await?,
                    None if text.is_none() && text_contains.is_none() && count.is_none() => {
                        self.expect_visible(selector).await?
                    }
                    None => {}
                }
                if let Some(expected) = text {
                    self.expect_exact_text(selector, expected).await?;
                }
                if let Some(needle) = text_contains {
                    self.expect_text(selector, needle).await?;
                }
                if let Some(expected) = count {
                    self.expect_count(selector, *expected).await?;
                }
                Ok(())
            }
            TestStep::AssertTitle { title } => self.expect_title(title).await,
            TestStep::TextContents { selector } => {
                let texts = self.text_contents(selector).await?;
                info!("[TEST] {} -> {:?}", selector, texts);
                Ok(())
            }
            TestStep::Screenshot { path, full_page } => self.screenshot(path, *full_page).await,
            TestStep::Log { message } => {
                info!("[TEST LOG] {}", message);
                Ok(())
            }
        }
    }
}

/// Opens one fresh, isolated session per scenario
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> E2eResult<Box<dyn Session>>;
}
