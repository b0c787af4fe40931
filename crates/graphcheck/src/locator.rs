//! Locator abstraction for element selection and interaction.
//!
//! # Design Philosophy
//!
//! - **Lazy**: a locator is a description, re-resolved against the live DOM
//!   on every use
//! - **First match**: resolution always targets the first matching element
//!   in document order
//! - **Auto-waiting**: clicks and `expect()` assertions poll until the element
//!   is actionable or the deadline passes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

use crate::driver::PageDriver;
use crate::result::{VerifyError, VerifyResult};
use crate::wait::{poll_until, Check, WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};

/// Attribute used by the application to tag testable elements
pub const TEST_ID_ATTRIBUTE: &str = "data-testid";

/// A point in 2D space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding box for an element, in CSS pixels relative to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X position
    pub x: f64,
    /// Y position
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the center point
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the box has a non-zero area
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// Innermost elements whose whitespace-normalized text contains the value
    Text(String),
    /// Elements whose `data-testid` starts with the value
    TestIdPrefix(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a test ID prefix selector
    #[must_use]
    pub fn test_id_prefix(prefix: impl Into<String>) -> Self {
        Self::TestIdPrefix(prefix.into())
    }

    /// JavaScript expression evaluating to an array of all matches in
    /// document order.
    #[must_use]
    pub fn to_query_all(&self) -> String {
        match self {
            Self::Css(s) => format!("Array.from(document.querySelectorAll({}))", js_string(s)),
            Self::Text(t) => format!(
                "(() => {{ \
                 const norm = s => (s || '').replace(/\\s+/g, ' ').trim(); \
                 const needle = norm({}); \
                 const skip = new Set(['SCRIPT', 'STYLE', 'NOSCRIPT', 'TEMPLATE']); \
                 const hits = el => !skip.has(el.tagName) && norm(el.textContent).includes(needle); \
                 const root = document.body; \
                 if (!root) return []; \
                 return Array.from(root.querySelectorAll('*')) \
                   .filter(hits) \
                   .filter(el => !Array.from(el.children).some(hits)); \
                 }})()",
                js_string(t)
            ),
            Self::TestIdPrefix(p) => format!(
                "Array.from(document.querySelectorAll('[{TEST_ID_ATTRIBUTE}]')) \
                 .filter(el => (el.getAttribute('{TEST_ID_ATTRIBUTE}') || '').startsWith({}))",
                js_string(p)
            ),
        }
    }

    /// JavaScript expression producing an [`ElementSnapshot`] for the first
    /// match.
    #[must_use]
    pub fn to_snapshot_query(&self) -> String {
        format!(
            "(() => {{ \
             const all = {}; \
             const el = all[0]; \
             if (!el) return {{ count: 0, visible: false, bounding_box: null }}; \
             const r = el.getBoundingClientRect(); \
             const style = window.getComputedStyle(el); \
             const visible = r.width > 0 && r.height > 0 \
               && style.visibility !== 'hidden' && style.display !== 'none'; \
             return {{ count: all.length, visible, \
               bounding_box: {{ x: r.x, y: r.y, width: r.width, height: r.height }} }}; \
             }})()",
            self.to_query_all()
        )
    }

    /// JavaScript expression that scrolls the first match into view and
    /// produces a [`ClickTarget`].
    #[must_use]
    pub fn to_click_target_query(&self) -> String {
        format!(
            "(() => {{ \
             const el = ({})[0]; \
             if (!el) return {{ bounding_box: null }}; \
             el.scrollIntoView({{ block: 'center', inline: 'center' }}); \
             const r = el.getBoundingClientRect(); \
             return {{ bounding_box: {{ x: r.x, y: r.y, width: r.width, height: r.height }} }}; \
             }})()",
            self.to_query_all()
        )
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css {s:?}"),
            Self::Text(t) => write!(f, "text {t:?}"),
            Self::TestIdPrefix(p) => write!(f, "[{TEST_ID_ATTRIBUTE}^={p:?}]"),
        }
    }
}

/// Quote a string as a JavaScript string literal
fn js_string(s: &str) -> String {
    // JSON string literals are valid JavaScript string literals
    serde_json::to_string(s).unwrap_or_else(|_| String::from("\"\""))
}

/// The state of a locator's first match at one instant
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Number of matching elements
    pub count: usize,
    /// Whether the first match is visible
    pub visible: bool,
    /// Bounding box of the first match
    pub bounding_box: Option<BoundingBox>,
}

impl ElementSnapshot {
    /// Snapshot of a selector with no matches
    #[must_use]
    pub const fn missing() -> Self {
        Self {
            count: 0,
            visible: false,
            bounding_box: None,
        }
    }

    /// Whether at least one element matched
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.count > 0
    }

    /// Short human-readable state, used in timeout messages
    #[must_use]
    pub fn describe(&self) -> String {
        match (self.count, self.visible) {
            (0, _) => "no matching elements".to_string(),
            (n, true) => format!("{n} match(es), first visible"),
            (n, false) => format!("{n} match(es), first hidden"),
        }
    }
}

/// Where to click the first match; `bounding_box` is `None` when the
/// element is gone.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClickTarget {
    /// Bounding box after scrolling into view
    pub bounding_box: Option<BoundingBox>,
}

/// Locator options for customizing behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorOptions {
    /// Timeout for auto-waiting
    pub timeout: Duration,
    /// Polling interval for auto-waiting
    pub poll_interval: Duration,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl LocatorOptions {
    fn wait_options(&self) -> WaitOptions {
        self.wait_options_within(self.timeout)
    }

    fn wait_options_within(&self, timeout: Duration) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(timeout.as_millis() as u64)
            .with_poll_interval(self.poll_interval.as_millis() as u64)
    }
}

/// A locator for finding and interacting with elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Locator {
    /// The selector for finding elements
    selector: Selector,
    /// Options for locator behavior
    options: LocatorOptions,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            options: LocatorOptions::default(),
        }
    }

    /// Locate by text content
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::text(text))
    }

    /// Locate by `data-testid` prefix
    #[must_use]
    pub fn test_id_prefix(prefix: impl Into<String>) -> Self {
        Self::from_selector(Selector::test_id_prefix(prefix))
    }

    /// Set a custom timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Set a custom polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.options.poll_interval = poll_interval;
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the options
    #[must_use]
    pub const fn options(&self) -> &LocatorOptions {
        &self.options
    }

    /// Resolve the locator once against the current DOM
    pub async fn resolve<D: PageDriver + ?Sized>(&self, driver: &D) -> VerifyResult<ElementSnapshot> {
        driver.query(&self.selector).await
    }

    /// Wait until at least one element matches.
    ///
    /// Fails with [`VerifyError::ElementNotFound`] at the deadline.
    pub async fn wait_for_attached<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
    ) -> VerifyResult<ElementSnapshot> {
        let selector = &self.selector;
        let waited = poll_until(
            &self.options.wait_options(),
            format!("{selector} to be attached"),
            move || async move {
                let snapshot = driver.query(selector).await?;
                Ok(if snapshot.is_attached() {
                    Check::Ready(snapshot)
                } else {
                    Check::Pending(snapshot.describe())
                })
            },
        )
        .await;

        match waited {
            Ok(result) => Ok(result.value),
            Err(VerifyError::AssertionTimeout { timeout_ms, .. }) => {
                Err(VerifyError::ElementNotFound {
                    selector: selector.to_string(),
                    timeout_ms,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Wait until the first match is visible
    pub async fn wait_for_visible<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
    ) -> VerifyResult<ElementSnapshot> {
        self.wait_for_state(driver, true, self.options.wait_options()).await
    }

    /// Wait until nothing matches or the first match is hidden
    pub async fn wait_for_hidden<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
    ) -> VerifyResult<ElementSnapshot> {
        self.wait_for_state(driver, false, self.options.wait_options()).await
    }

    async fn wait_for_state<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        visible: bool,
        options: WaitOptions,
    ) -> VerifyResult<ElementSnapshot> {
        let selector = &self.selector;
        let wanted = if visible { "visible" } else { "hidden" };
        poll_until(
            &options,
            format!("{selector} to be {wanted}"),
            move || async move {
                let snapshot = driver.query(selector).await?;
                Ok(if snapshot.visible == visible {
                    Check::Ready(snapshot)
                } else {
                    Check::Pending(snapshot.describe())
                })
            },
        )
        .await
        .map(|result| result.value)
    }

    /// Click the first match once it is attached and visible.
    ///
    /// Both waits share one deadline of the locator timeout.
    pub async fn click<D: PageDriver + ?Sized>(&self, driver: &D) -> VerifyResult<()> {
        let started = Instant::now();
        let attached = self.wait_for_attached(driver).await?;
        if !attached.visible {
            let remaining = self.options.timeout.saturating_sub(started.elapsed());
            self.wait_for_state(driver, true, self.options.wait_options_within(remaining))
                .await?;
        }
        tracing::debug!(selector = %self.selector, "clicking");
        driver.click(&self.selector).await
    }
}

/// Create an auto-retrying assertion for a locator
#[must_use]
pub fn expect(locator: &Locator) -> Expect {
    Expect::new(locator.clone())
}

/// Smart assertion builder for locators (Playwright's `expect()`)
#[derive(Debug, Clone)]
pub struct Expect {
    locator: Locator,
}

impl Expect {
    /// Create a new expectation for a locator
    #[must_use]
    pub const fn new(locator: Locator) -> Self {
        Self { locator }
    }

    /// Assert the first match becomes visible within the locator timeout
    pub async fn to_be_visible<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
    ) -> VerifyResult<ElementSnapshot> {
        self.locator.wait_for_visible(driver).await
    }

    /// Assert the first match becomes hidden (or disappears)
    pub async fn to_be_hidden<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
    ) -> VerifyResult<ElementSnapshot> {
        self.locator.wait_for_hidden(driver).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};

    fn fast(locator: Locator) -> Locator {
        locator
            .with_timeout(Duration::from_millis(300))
            .with_poll_interval(Duration::from_millis(50))
    }

    mod selector_tests {
        use super::*;

        #[test]
        fn test_display() {
            assert_eq!(Selector::text("Generate Random").to_string(), "text \"Generate Random\"");
            assert_eq!(
                Selector::test_id_prefix("node-").to_string(),
                "[data-testid^=\"node-\"]"
            );
            assert_eq!(Selector::css("button").to_string(), "css \"button\"");
        }

        #[test]
        fn test_test_id_prefix_query_filters_by_prefix() {
            let query = Selector::test_id_prefix("node-").to_query_all();
            assert!(query.contains("[data-testid]"));
            assert!(query.contains("startsWith(\"node-\")"));
        }

        #[test]
        fn test_text_query_prefers_innermost() {
            let query = Selector::text("Release Management").to_query_all();
            assert!(query.contains("\"Release Management\""));
            assert!(query.contains("el.children"));
        }

        #[test]
        fn test_snapshot_query_wraps_query_all() {
            let selector = Selector::css("div > span");
            let snapshot = selector.to_snapshot_query();
            assert!(snapshot.contains(&selector.to_query_all()));
            assert!(snapshot.contains("bounding_box"));
        }

        #[test]
        fn test_click_target_scrolls_into_view() {
            let query = Selector::text("Generate Random").to_click_target_query();
            assert!(query.contains("scrollIntoView"));
            assert!(query.contains("return { bounding_box: null }"));
        }

        #[test]
        fn test_js_string_escapes_quotes() {
            assert_eq!(js_string("it's \"x\""), "\"it's \\\"x\\\"\"");
        }
    }

    mod bounding_box_tests {
        use super::*;

        #[test]
        fn test_center() {
            let bbox = BoundingBox::new(10.0, 20.0, 100.0, 50.0);
            assert_eq!(bbox.center(), Point::new(60.0, 45.0));
        }

        #[test]
        fn test_has_area() {
            assert!(BoundingBox::new(0.0, 0.0, 1.0, 1.0).has_area());
            assert!(!BoundingBox::new(0.0, 0.0, 0.0, 10.0).has_area());
        }
    }

    mod snapshot_tests {
        use super::*;

        #[test]
        fn test_missing() {
            let snapshot = ElementSnapshot::missing();
            assert!(!snapshot.is_attached());
            assert_eq!(snapshot.describe(), "no matching elements");
        }

        #[test]
        fn test_deserialize_from_page_shape() {
            let value = serde_json::json!({
                "count": 3,
                "visible": true,
                "bounding_box": { "x": 1.0, "y": 2.0, "width": 30.0, "height": 40.0 }
            });
            let snapshot: ElementSnapshot = serde_json::from_value(value).unwrap();
            assert_eq!(snapshot.count, 3);
            assert!(snapshot.visible);
            assert_eq!(snapshot.describe(), "3 match(es), first visible");
        }

        #[test]
        fn test_click_target_for_detached_element() {
            let target: ClickTarget =
                serde_json::from_value(serde_json::json!({ "bounding_box": null })).unwrap();
            assert_eq!(target.bounding_box, None);
        }

        #[test]
        fn test_click_target_with_box() {
            let value = serde_json::json!({
                "bounding_box": { "x": 0.0, "y": 0.0, "width": 8.0, "height": 4.0 }
            });
            let target: ClickTarget = serde_json::from_value(value).unwrap();
            assert_eq!(target.bounding_box.map(|b| b.center()), Some(Point::new(4.0, 2.0)));
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_builders() {
            let locator = Locator::text("x")
                .with_timeout(Duration::from_secs(1))
                .with_poll_interval(Duration::from_millis(10));
            assert_eq!(locator.selector(), &Selector::text("x"));
            assert_eq!(locator.options().timeout, Duration::from_secs(1));
            assert_eq!(locator.options().poll_interval, Duration::from_millis(10));
        }

        #[test]
        fn test_default_options() {
            let locator = Locator::new("button");
            assert_eq!(locator.options().timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
        }

        #[tokio::test(start_paused = true)]
        async fn test_wait_for_attached_times_out_as_not_found() {
            let driver = MockDriver::new();
            let err = fast(Locator::text("Generate Random"))
                .wait_for_attached(&driver)
                .await
                .unwrap_err();
            assert!(matches!(err, VerifyError::ElementNotFound { timeout_ms: 300, .. }));
        }

        #[tokio::test(start_paused = true)]
        async fn test_visible_after_polls() {
            let driver = MockDriver::new().with_element(
                MockElement::new("g")
                    .with_test_id("node-1")
                    .visible_after_polls(3),
            );
            let snapshot = expect(&fast(Locator::test_id_prefix("node-")))
                .to_be_visible(&driver)
                .await
                .unwrap();
            assert!(snapshot.visible);
            assert_eq!(driver.count_calls("query:"), 4);
        }

        #[tokio::test(start_paused = true)]
        async fn test_to_be_visible_times_out() {
            let driver = MockDriver::new().with_element(MockElement::new("div").hidden());
            let err = expect(&fast(Locator::new("div")))
                .to_be_visible(&driver)
                .await
                .unwrap_err();
            match err {
                VerifyError::AssertionTimeout { last_state, .. } => {
                    assert_eq!(last_state, "1 match(es), first hidden");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_to_be_hidden_when_absent() {
            let driver = MockDriver::new();
            let snapshot = expect(&fast(Locator::text("gone")))
                .to_be_hidden(&driver)
                .await
                .unwrap();
            assert_eq!(snapshot.count, 0);
        }

        #[tokio::test(start_paused = true)]
        async fn test_click_waits_for_visibility_first() {
            let driver = MockDriver::new().with_element(
                MockElement::new("button")
                    .with_text("Generate Random")
                    .visible_after_polls(2),
            );
            fast(Locator::text("Generate Random"))
                .click(&driver)
                .await
                .unwrap();
            let history = driver.history();
            assert_eq!(history.last().map(String::as_str), Some("click:text \"Generate Random\""));
        }

        #[tokio::test(start_paused = true)]
        async fn test_click_shares_one_deadline() {
            // attaches at 200ms, would render only after 500ms
            let driver = MockDriver::new().with_element(
                MockElement::new("button")
                    .with_text("Generate Random")
                    .attached_after_polls(4)
                    .visible_after_polls(10),
            );
            let started = Instant::now();
            let err = fast(Locator::text("Generate Random"))
                .click(&driver)
                .await
                .unwrap_err();
            assert!(matches!(err, VerifyError::AssertionTimeout { .. }));
            assert!(started.elapsed() <= Duration::from_millis(300));
            assert!(!driver.was_called("click"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_click_late_attach_and_render_within_budget() {
            let driver = MockDriver::new().with_element(
                MockElement::new("button")
                    .with_text("Generate Random")
                    .attached_after_polls(2)
                    .visible_after_polls(2),
            );
            let started = Instant::now();
            fast(Locator::text("Generate Random"))
                .click(&driver)
                .await
                .unwrap();
            assert!(started.elapsed() <= Duration::from_millis(300));
            assert!(driver.was_called("click"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_click_missing_element_never_clicks() {
            let driver = MockDriver::new();
            let result = fast(Locator::text("Generate Random")).click(&driver).await;
            assert!(result.is_err());
            assert!(!driver.was_called("click"));
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn js_string_is_a_faithful_literal(s in ".*") {
                let literal = js_string(&s);
                let parsed: String = serde_json::from_str(&literal).unwrap();
                prop_assert_eq!(parsed, s);
            }

            #[test]
            fn text_query_embeds_quoted_literal(s in "[a-z\"'\\\\]{0,12}") {
                let query = Selector::text(s.clone()).to_query_all();
                prop_assert!(query.contains(&js_string(&s)));
            }
        }
    }
}
