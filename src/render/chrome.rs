//! Chrome rendering session over the DevTools protocol

use crate::config::BrowserConfig;
use crate::render::{RenderError, RenderResult, Renderer};
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// How often `wait_for` re-queries the page
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A single Chrome tab driven through `chromiumoxide`
pub struct ChromeRenderer {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeRenderer {
    /// Launches Chrome and opens a blank tab
    pub async fn launch(config: &BrowserConfig) -> RenderResult<Self> {
        let mut builder =
            LaunchConfig::builder().window_size(config.window_width, config.window_height);
        if !config.headless {
            builder = builder.with_head();
        }
        let launch_config = builder.build().map_err(RenderError::Launch)?;

        let (browser, mut handler) = Browser::launch(launch_config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        // The CDP connection only makes progress while its handler is polled
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler event error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        tracing::info!(
            "Chrome session ready ({}x{}, headless: {})",
            config.window_width,
            config.window_height,
            config.headless
        );

        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    /// Closes the browser and stops the protocol handler
    pub async fn close(mut self) -> RenderResult<()> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Waiting for the browser process failed: {}", e);
        }
        self.handler.abort();
        closed
            .map(|_| ())
            .map_err(|e| RenderError::Launch(format!("close failed: {}", e)))
    }
}

impl Renderer for ChromeRenderer {
    type Element = Element;

    async fn navigate(&mut self, url: &str) -> RenderResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| RenderError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> RenderResult<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if !self.find_elements(selector).await?.is_empty() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn find_elements(&mut self, selector: &str) -> RenderResult<Vec<Element>> {
        self.page
            .find_elements(selector)
            .await
            .map_err(|e| RenderError::Query {
                selector: selector.to_string(),
                message: e.to_string(),
            })
    }

    async fn attribute(&mut self, element: &Element, name: &str) -> RenderResult<Option<String>> {
        element
            .attribute(name)
            .await
            .map_err(|e| RenderError::Element(e.to_string()))
    }

    async fn outer_html(&mut self, element: &Element) -> RenderResult<Option<String>> {
        element
            .outer_html()
            .await
            .map_err(|e| RenderError::Element(e.to_string()))
    }

    async fn execute(&mut self, script: &str, target: Option<&Element>) -> RenderResult<()> {
        match target {
            Some(element) => {
                element
                    .call_js_fn(script, false)
                    .await
                    .map_err(|e| RenderError::Script(e.to_string()))?;
            }
            None => {
                let expression = format!("({})()", script);
                self.page
                    .evaluate(expression.as_str())
                    .await
                    .map_err(|e| RenderError::Script(e.to_string()))?;
            }
        }
        Ok(())
    }
}
