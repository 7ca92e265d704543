//! Rendering session abstraction
//!
//! The listing enumerator drives a page-rendering session through this trait,
//! so the scroll-and-diff loop can run against a real browser
//! ([`ChromeRenderer`]) or a deterministic script ([`ScriptedRenderer`]).

mod chrome;
mod scripted;

pub use chrome::ChromeRenderer;
pub use scripted::{ScriptCall, ScriptedCard, ScriptedElement, ScriptedRenderer};

use std::time::Duration;
use thiserror::Error;

/// Errors raised by a rendering session
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Element query '{selector}' failed: {message}")]
    Query { selector: String, message: String },

    #[error("Element read failed: {0}")]
    Element(String),

    #[error("Script execution failed: {0}")]
    Script(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// A stateful, single-owner page-rendering session
///
/// Sessions are not shared: every method takes `&mut self`, and the
/// enumerator holds the session for the duration of one bucket.
#[allow(async_fn_in_trait)]
pub trait Renderer {
    /// Handle to a rendered element, valid until the next navigation
    type Element;

    /// Loads `url` in the session
    async fn navigate(&mut self, url: &str) -> RenderResult<()>;

    /// Waits until at least one element matches `selector`
    ///
    /// Returns `Ok(false)` when the timeout elapses with no match. That case
    /// is not an error.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> RenderResult<bool>;

    /// Returns every element currently matching `selector`, in document order
    ///
    /// An empty vector means nothing matched.
    async fn find_elements(&mut self, selector: &str) -> RenderResult<Vec<Self::Element>>;

    /// Reads an attribute of `element`; `None` when absent
    async fn attribute(
        &mut self,
        element: &Self::Element,
        name: &str,
    ) -> RenderResult<Option<String>>;

    /// Reads the outer markup of `element`
    async fn outer_html(&mut self, element: &Self::Element) -> RenderResult<Option<String>>;

    /// Runs a JavaScript function declaration
    ///
    /// The function is called with `this` bound to `target`, or to the window
    /// when `target` is `None`.
    async fn execute(
        &mut self,
        script: &str,
        target: Option<&Self::Element>,
    ) -> RenderResult<()>;
}
