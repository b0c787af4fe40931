//! PageDriver - the page automation seam
//!
//! Everything above this trait (locators, waits, the smoke scenario) is
//! written against `PageDriver`, so the same scenario runs on a real
//! Chromium page or on the scripted in-memory [`MockDriver`].
//!
//! # Implementations
//!
//! - `Page` - Chromium over CDP via chromiumoxide (`browser` feature)
//! - [`MockDriver`] - scripted DOM for unit testing

use crate::locator::{BoundingBox, ElementSnapshot, Selector};
use crate::result::{VerifyError, VerifyResult};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// PNG file signature
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Screenshot capture options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenshotOptions {
    /// Capture the whole scrollable page rather than the viewport
    pub full_page: bool,
}

impl Default for ScreenshotOptions {
    fn default() -> Self {
        Self { full_page: true }
    }
}

/// Abstract driver trait for one browser page
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL
    async fn navigate(&mut self, url: &str) -> VerifyResult<()>;

    /// Resolve a selector against the current DOM
    async fn query(&self, selector: &Selector) -> VerifyResult<ElementSnapshot>;

    /// Click the first element matching the selector
    async fn click(&self, selector: &Selector) -> VerifyResult<()>;

    /// Take a PNG screenshot
    async fn screenshot(&self, options: ScreenshotOptions) -> VerifyResult<Vec<u8>>;

    /// Get current URL
    async fn current_url(&self) -> VerifyResult<String>;

    /// Close the page. Any later call fails with `InvalidState`.
    async fn close(&mut self) -> VerifyResult<()>;
}

// ============================================================================
// Mock driver
// ============================================================================

/// An element in the [`MockDriver`] DOM
#[derive(Debug, Clone, PartialEq)]
pub struct MockElement {
    /// Element tag name
    pub tag: String,
    /// `data-testid` attribute
    pub test_id: Option<String>,
    /// Text content
    pub text: String,
    /// Whether the element renders at all
    pub visible: bool,
    /// Queries that must miss the element before it is in the DOM
    pub detached_polls: u32,
    /// Queries that must observe the element hidden before it shows
    pub hidden_polls: u32,
    /// Bounding box when visible
    pub bounding_box: BoundingBox,
}

impl MockElement {
    /// Create a visible element with the given tag
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            test_id: None,
            text: String::new(),
            visible: true,
            detached_polls: 0,
            hidden_polls: 0,
            bounding_box: BoundingBox::new(10.0, 10.0, 120.0, 40.0),
        }
    }

    /// Set the `data-testid` attribute
    #[must_use]
    pub fn with_test_id(mut self, id: impl Into<String>) -> Self {
        self.test_id = Some(id.into());
        self
    }

    /// Set the text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Never render the element
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Render the element only after `polls` queries have seen it hidden,
    /// simulating asynchronous rendering.
    #[must_use]
    pub const fn visible_after_polls(mut self, polls: u32) -> Self {
        self.hidden_polls = polls;
        self
    }

    /// Insert the element only after `polls` queries have missed it
    #[must_use]
    pub const fn attached_after_polls(mut self, polls: u32) -> Self {
        self.detached_polls = polls;
        self
    }

    fn matches(&self, selector: &Selector) -> bool {
        match selector {
            Selector::Css(tag) => &self.tag == tag,
            Selector::Text(text) => normalize_space(&self.text).contains(&normalize_space(text)),
            Selector::TestIdPrefix(prefix) => self
                .test_id
                .as_deref()
                .is_some_and(|id| id.starts_with(prefix.as_str())),
        }
    }

    fn is_attached(&self) -> bool {
        self.detached_polls == 0
    }

    fn is_rendered(&self) -> bool {
        self.visible && self.hidden_polls == 0
    }
}

/// Collapse whitespace runs to one space and trim, as text selectors do
fn normalize_space(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Elements appended to the DOM when a selector is clicked
#[derive(Debug, Clone)]
struct RevealRule {
    trigger: Selector,
    elements: Vec<MockElement>,
}

#[derive(Debug, Default)]
struct MockState {
    current_url: String,
    elements: Vec<MockElement>,
    reveals: Vec<RevealRule>,
    navigation_error: Option<String>,
    screenshot_data: Option<Vec<u8>>,
    call_history: Vec<String>,
    closed: bool,
}

/// Mock driver for unit testing
///
/// Holds a flat list of elements in document order. Clicking a selector
/// fires every reveal rule registered for it, which is how tests model the
/// application reacting to input.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create new mock driver with an empty DOM
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an element present from the start
    #[must_use]
    pub fn with_element(self, element: MockElement) -> Self {
        self.state().elements.push(element);
        self
    }

    /// Append `elements` to the DOM whenever `trigger` is clicked
    #[must_use]
    pub fn on_click(self, trigger: Selector, elements: Vec<MockElement>) -> Self {
        self.state().reveals.push(RevealRule { trigger, elements });
        self
    }

    /// Make navigation fail with the given message
    #[must_use]
    pub fn with_navigation_error(self, message: impl Into<String>) -> Self {
        self.state().navigation_error = Some(message.into());
        self
    }

    /// Set mock screenshot bytes (defaults to a bare PNG signature)
    #[must_use]
    pub fn with_screenshot(self, data: Vec<u8>) -> Self {
        self.state().screenshot_data = Some(data);
        self
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().call_history.clone()
    }

    /// Check if a call starting with `method` was made
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_history.iter().any(|c| c.starts_with(method))
    }

    /// Count calls starting with `method`
    #[must_use]
    pub fn count_calls(&self, method: &str) -> usize {
        self.state()
            .call_history
            .iter()
            .filter(|c| c.starts_with(method))
            .count()
    }

    /// Whether `close` has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    fn record(&self, call: String) -> VerifyResult<MutexGuard<'_, MockState>> {
        let mut state = self.state();
        if state.closed {
            return Err(VerifyError::InvalidState {
                message: format!("{call} on a closed page"),
            });
        }
        state.call_history.push(call);
        Ok(state)
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&mut self, url: &str) -> VerifyResult<()> {
        let mut state = self.record(format!("navigate:{url}"))?;
        if let Some(message) = state.navigation_error.clone() {
            return Err(VerifyError::NavigationError {
                url: url.to_string(),
                message,
            });
        }
        state.current_url = url.to_string();
        Ok(())
    }

    async fn query(&self, selector: &Selector) -> VerifyResult<ElementSnapshot> {
        let mut state = self.record(format!("query:{selector}"))?;
        let mut snapshot = ElementSnapshot::missing();

        for element in state.elements.iter_mut().filter(|e| e.matches(selector)) {
            if !element.is_attached() {
                element.detached_polls -= 1;
                continue;
            }
            if snapshot.count == 0 {
                snapshot.visible = element.is_rendered();
                snapshot.bounding_box = snapshot.visible.then_some(element.bounding_box);
            }
            element.hidden_polls = element.hidden_polls.saturating_sub(1);
            snapshot.count += 1;
        }

        Ok(snapshot)
    }

    async fn click(&self, selector: &Selector) -> VerifyResult<()> {
        let mut state = self.record(format!("click:{selector}"))?;
        let clickable = state
            .elements
            .iter()
            .find(|e| e.matches(selector) && e.is_attached())
            .is_some_and(MockElement::is_rendered);
        if !clickable {
            return Err(VerifyError::InputError {
                message: format!("no visible element for {selector}"),
            });
        }

        let revealed: Vec<MockElement> = state
            .reveals
            .iter()
            .filter(|rule| &rule.trigger == selector)
            .flat_map(|rule| rule.elements.iter().cloned())
            .collect();
        state.elements.extend(revealed);
        Ok(())
    }

    async fn screenshot(&self, options: ScreenshotOptions) -> VerifyResult<Vec<u8>> {
        let state = self.record(format!("screenshot:full_page={}", options.full_page))?;
        Ok(state
            .screenshot_data
            .clone()
            .unwrap_or_else(|| PNG_SIGNATURE.to_vec()))
    }

    async fn current_url(&self) -> VerifyResult<String> {
        let state = self.record("current_url".to_string())?;
        Ok(state.current_url.clone())
    }

    async fn close(&mut self) -> VerifyResult<()> {
        let mut state = self.record("close".to_string())?;
        state.closed = true;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
