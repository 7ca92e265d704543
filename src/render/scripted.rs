//! Deterministic rendering session for offline runs and tests
//!
//! A scripted page is a list of frames. Each frame is the set of result cards
//! the virtualized list has materialized at that scroll position. Navigation
//! shows the first frame, and every executed script advances one frame,
//! holding on the last one once the script runs out.

use crate::crawler::{RESULT_SELECTOR, SCROLL_ROOT_SELECTORS};
use crate::render::{RenderError, RenderResult, Renderer};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// One rendered result card
#[derive(Debug, Clone)]
pub struct ScriptedCard {
    pid: Option<String>,
    html: String,
}

impl ScriptedCard {
    /// A card with an explicit id and markup
    pub fn new(pid: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            pid: Some(pid.into()),
            html: html.into(),
        }
    }

    /// A card whose node carries no `data-pid` value
    pub fn without_pid(html: impl Into<String>) -> Self {
        Self {
            pid: None,
            html: html.into(),
        }
    }

    /// A minimal listing card linking to `https://listings.test/{pid}.html`
    pub fn listing(pid: &str, price: Option<u32>) -> Self {
        let price_span = price
            .map(|p| format!(r#"<span class="priceinfo">${}</span>"#, p))
            .unwrap_or_default();
        let html = format!(
            r#"<div data-pid="{pid}"><a class="cl-app-anchor" href="https://listings.test/{pid}.html">listing {pid}</a>{price_span}<div class="meta">1br<br>test hood</div></div>"#
        );
        Self::new(pid, html)
    }
}

/// Handle to a scripted element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedElement {
    /// Index into the frame that was current when the query ran
    Card(usize),
    /// The scrollable result container
    ScrollRoot,
}

/// A script executed against the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptCall {
    pub script: String,
    pub targeted: bool,
}

/// Scripted [`Renderer`] backend
#[derive(Debug, Default)]
pub struct ScriptedRenderer {
    pages: HashMap<String, Vec<Vec<ScriptedCard>>>,
    failing: HashSet<String>,
    scroll_root: bool,
    current: Option<String>,
    frame: usize,
    navigations: Vec<String>,
    scripts: Vec<ScriptCall>,
}

impl ScriptedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the frames rendered for `url`
    pub fn with_page(mut self, url: impl Into<String>, frames: Vec<Vec<ScriptedCard>>) -> Self {
        self.pages.insert(url.into(), frames);
        self
    }

    /// Makes navigation to `url` fail
    pub fn with_failing_navigation(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }

    /// Exposes a scrollable result container
    pub fn with_scroll_root(mut self) -> Self {
        self.scroll_root = true;
        self
    }

    /// URLs navigated to, in order
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    /// Scripts executed, in order
    pub fn scripts(&self) -> &[ScriptCall] {
        &self.scripts
    }

    fn current_frame(&self) -> &[ScriptedCard] {
        self.current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .and_then(|frames| {
                frames
                    .get(self.frame)
                    .or_else(|| frames.last())
            })
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn frame_count(&self) -> usize {
        self.current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn card(&self, element: &ScriptedElement) -> RenderResult<&ScriptedCard> {
        match element {
            ScriptedElement::Card(index) => self
                .current_frame()
                .get(*index)
                .ok_or_else(|| RenderError::Element(format!("stale card handle {}", index))),
            ScriptedElement::ScrollRoot => Err(RenderError::Element(
                "scroll root has no card content".to_string(),
            )),
        }
    }
}

impl Renderer for ScriptedRenderer {
    type Element = ScriptedElement;

    async fn navigate(&mut self, url: &str) -> RenderResult<()> {
        self.navigations.push(url.to_string());
        if self.failing.contains(url) {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                message: "scripted failure".to_string(),
            });
        }
        self.current = Some(url.to_string());
        self.frame = 0;
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> RenderResult<bool> {
        Ok(!self.find_elements(selector).await?.is_empty())
    }

    async fn find_elements(&mut self, selector: &str) -> RenderResult<Vec<ScriptedElement>> {
        if selector == RESULT_SELECTOR {
            return Ok((0..self.current_frame().len())
                .map(ScriptedElement::Card)
                .collect());
        }
        if self.scroll_root && selector == SCROLL_ROOT_SELECTORS[0] {
            return Ok(vec![ScriptedElement::ScrollRoot]);
        }
        Ok(Vec::new())
    }

    async fn attribute(
        &mut self,
        element: &ScriptedElement,
        name: &str,
    ) -> RenderResult<Option<String>> {
        let card = self.card(element)?;
        Ok(match name {
            "data-pid" => card.pid.clone(),
            _ => None,
        })
    }

    async fn outer_html(&mut self, element: &ScriptedElement) -> RenderResult<Option<String>> {
        Ok(Some(self.card(element)?.html.clone()))
    }

    async fn execute(
        &mut self,
        script: &str,
        target: Option<&ScriptedElement>,
    ) -> RenderResult<()> {
        self.scripts.push(ScriptCall {
            script: script.to_string(),
            targeted: target.is_some(),
        });
        if self.frame + 1 < self.frame_count() {
            self.frame += 1;
        }
        Ok(())
    }
}
