//! Selector semantics against a real Chromium page
//!
//! Requires a local Chromium. Run with:
//!   cargo test -p graphcheck --features browser -- --ignored

#![cfg(feature = "browser")]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use graphcheck::{
    expect, Browser, BrowserConfig, Locator, Page, PageDriver, Selector, VerifyError,
};
use std::time::Duration;

/// Welcome modal with the generate button, a script mentioning the same
/// text, and graph nodes in mixed visibility states
const FIXTURE: &str = r#"<!doctype html>
<html><body>
<script>const label = "Generate Random";</script>
<style>.x::after { content: "Generate Random"; }</style>
<div id="modal">
  <button id="generate" style="padding:20px"
    onclick="document.body.insertAdjacentHTML('beforeend', '<p id=details>Release Management</p>')">
    <h3 id="label">Generate
       Random</h3>
    <p>Start from a sample graph</p>
  </button>
</div>
<div data-testid="legend-node" style="width:20px;height:20px">legend</div>
<div data-testid="node-a" style="display:none;width:40px;height:40px">A</div>
<div data-testid="node-b" style="width:40px;height:40px">B</div>
<div data-testid="node-c" style="visibility:hidden;width:40px;height:40px">C</div>
</body></html>"#;

fn data_url(html: &str) -> String {
    let encoded = html
        .replace('%', "%25")
        .replace('#', "%23")
        .replace('\n', "%0A")
        .replace(' ', "%20");
    format!("data:text/html;charset=utf-8,{encoded}")
}

async fn open_fixture() -> (Browser, Page) {
    let config = BrowserConfig::default().with_no_sandbox();
    let browser = Browser::launch(&config).await.expect("chromium should launch");
    let mut page = browser.new_page().await.unwrap();
    page.navigate(&data_url(FIXTURE)).await.unwrap();
    (browser, page)
}

async fn shut_down(browser: Browser, mut page: Page) {
    page.close().await.unwrap();
    browser.close().await.unwrap();
}

#[tokio::test]
#[ignore = "needs a local Chromium"]
async fn test_text_selector_picks_innermost_label_not_script() {
    let (browser, page) = open_fixture().await;

    let text = page.query(&Selector::text("Generate Random")).await.unwrap();
    let label = page.query(&Selector::css("#label")).await.unwrap();

    // only the <h3>: script, style, button and modal are skipped
    assert_eq!(text.count, 1);
    assert!(text.visible);
    assert_eq!(text.bounding_box, label.bounding_box);

    shut_down(browser, page).await;
}

#[tokio::test]
#[ignore = "needs a local Chromium"]
async fn test_test_id_prefix_first_match_in_document_order() {
    let (browser, page) = open_fixture().await;

    let nodes = page.query(&Selector::test_id_prefix("node-")).await.unwrap();
    assert_eq!(nodes.count, 3);
    // node-a comes first and is display:none
    assert!(!nodes.visible);

    let hidden = page.query(&Selector::css("[data-testid=node-c]")).await.unwrap();
    assert_eq!(hidden.count, 1);
    assert!(!hidden.visible);

    let shown = page.query(&Selector::css("[data-testid=node-b]")).await.unwrap();
    assert!(shown.visible);
    assert!(shown.bounding_box.is_some_and(|b| b.has_area()));

    shut_down(browser, page).await;
}

#[tokio::test]
#[ignore = "needs a local Chromium"]
async fn test_click_on_text_reaches_the_button() {
    let (browser, page) = open_fixture().await;

    Locator::text("Generate Random")
        .with_timeout(Duration::from_secs(2))
        .click(&page)
        .await
        .unwrap();

    let details = expect(&Locator::text("Release Management").with_timeout(Duration::from_secs(2)))
        .to_be_visible(&page)
        .await
        .unwrap();
    assert_eq!(details.count, 1);

    shut_down(browser, page).await;
}

#[tokio::test]
#[ignore = "needs a local Chromium"]
async fn test_click_on_missing_element_is_input_error() {
    let (browser, page) = open_fixture().await;

    let err = page.click(&Selector::css("#does-not-exist")).await.unwrap_err();
    assert!(matches!(err, VerifyError::InputError { .. }));
    assert!(err.to_string().contains("detached before click"));

    shut_down(browser, page).await;
}
