//! Scoped page and browser sessions.
//!
//! A page is closed after the scenario whether it passed or not, and a
//! browser launched for a run is closed after its page.

use crate::driver::PageDriver;
use crate::result::VerifyResult;
use crate::scenario::{ScenarioReport, SmokeScenario, StepListener};

/// Run `scenario` on `driver`, then close the driver.
///
/// A scenario error takes precedence over a close error; the latter is only
/// logged in that case.
pub async fn run_guarded<D, L>(
    driver: &mut D,
    scenario: &SmokeScenario,
    listener: &mut L,
) -> VerifyResult<ScenarioReport>
where
    D: PageDriver + ?Sized,
    L: StepListener + ?Sized,
{
    let outcome = scenario.run_with(driver, listener).await;
    let closed = driver.close().await;
    merge(outcome, closed, "page")
}

/// Keep the first error, log the second
fn merge<T>(outcome: VerifyResult<T>, closed: VerifyResult<()>, what: &str) -> VerifyResult<T> {
    match (outcome, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_error)) => Err(close_error),
        (Err(error), Ok(())) => Err(error),
        (Err(error), Err(close_error)) => {
            tracing::warn!(error = %close_error, "failed to close {what} after a failed run");
            Err(error)
        }
    }
}

/// Launch Chromium, run the scenario on a fresh page, and always close the
/// browser.
#[cfg(feature = "browser")]
pub async fn run_in_browser<L>(
    scenario: &SmokeScenario,
    listener: &mut L,
) -> VerifyResult<ScenarioReport>
where
    L: StepListener + ?Sized,
{
    let browser = crate::browser::Browser::launch(&scenario.config().browser).await?;

    let outcome = match browser.new_page().await {
        Ok(mut page) => run_guarded(&mut page, scenario, listener).await,
        Err(error) => Err(error),
    };

    let closed = browser.close().await;
    merge(outcome, closed, "browser")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::VerifyConfig;
    use crate::scenario::NoopListener;
    use crate::driver::{MockDriver, MockElement};
    use crate::locator::Selector;
    use crate::result::VerifyError;
    use crate::scenario::Step;
    use tempfile::TempDir;

    fn scenario(dir: &TempDir) -> SmokeScenario {
        SmokeScenario::new(
            VerifyConfig::default()
                .with_screenshot_path(dir.path().join("shot.png"))
                .with_timeout(200)
                .with_poll_interval(50),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_closes_after_success() {
        let dir = TempDir::new().unwrap();
        let mut driver = MockDriver::new()
            .with_element(MockElement::new("h3").with_text("Generate Random"))
            .on_click(
                Selector::text("Generate Random"),
                vec![MockElement::new("g").with_test_id("node-1")],
            )
            .on_click(
                Selector::test_id_prefix("node-"),
                vec![MockElement::new("div").with_text("Release Management")],
            );

        let report = run_guarded(&mut driver, &scenario(&dir), &mut NoopListener).await.unwrap();

        assert!(report.passed());
        assert!(driver.is_closed());
        assert_eq!(driver.history().last().map(String::as_str), Some("close"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closes_after_failure() {
        let dir = TempDir::new().unwrap();
        let mut driver = MockDriver::new();

        let err = run_guarded(&mut driver, &scenario(&dir), &mut NoopListener)
            .await
            .unwrap_err();

        assert_eq!(err.step(), Some(Step::Trigger));
        assert!(driver.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_page_is_not_reusable() {
        let dir = TempDir::new().unwrap();
        let mut driver = MockDriver::new();
        let _ = run_guarded(&mut driver, &scenario(&dir), &mut NoopListener).await;

        let err = run_guarded(&mut driver, &scenario(&dir), &mut NoopListener)
            .await
            .unwrap_err();

        assert_eq!(err.step(), Some(Step::Navigate));
    }

    #[test]
    fn test_merge_prefers_run_error() {
        let run_error = VerifyError::InvalidState {
            message: "run".to_string(),
        };
        let close_error = VerifyError::PageError {
            message: "close".to_string(),
        };
        let merged = merge::<()>(Err(run_error), Err(close_error), "page").unwrap_err();
        assert!(merged.to_string().contains("run"));
    }

    #[test]
    fn test_merge_reports_close_error_after_success() {
        let close_error = VerifyError::PageError {
            message: "close".to_string(),
        };
        let merged = merge(Ok(1), Err(close_error), "page").unwrap_err();
        assert!(matches!(merged, VerifyError::PageError { .. }));
    }
}
