//! Browser control for headless testing.
//!
//! Real browser control via the Chrome `DevTools` Protocol. When compiled
//! with the `browser` feature, chromiumoxide launches Chromium and each
//! [`Page`] implements [`PageDriver`](crate::PageDriver). Without the
//! feature only the configuration is available and the scenario can run on
//! [`MockDriver`](crate::MockDriver).

use serde::{Deserialize, Serialize};

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::BrowserConfig;
    use crate::driver::{PageDriver, ScreenshotOptions};
    use crate::locator::{ClickTarget, ElementSnapshot, Selector};
    use crate::result::{VerifyError, VerifyResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
    use chromiumoxide::handler::viewport::Viewport;
    use chromiumoxide::layout::Point as CdpPoint;
    use chromiumoxide::page::{Page as CdpPage, ScreenshotParams};
    use futures::StreamExt;

    /// Prefix of the document Chromium shows when a load fails
    const CHROME_ERROR_PREFIX: &str = "chrome-error://";

    /// Browser instance with real CDP connection
    #[derive(Debug)]
    pub struct Browser {
        inner: CdpBrowser,
        handle: tokio::task::JoinHandle<()>,
    }

    impl Browser {
        /// Launch a new browser instance with real CDP
        ///
        /// # Errors
        ///
        /// Returns error if browser cannot be launched
        pub async fn launch(config: &BrowserConfig) -> VerifyResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height)
                .viewport(Viewport {
                    width: config.viewport_width,
                    height: config.viewport_height,
                    ..Viewport::default()
                });

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| VerifyError::BrowserLaunchError { message })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                VerifyError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            // Spawn handler task
            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if let Err(e) = event {
                        tracing::debug!(error = %e, "CDP handler error");
                    }
                }
                tracing::debug!("CDP handler event loop ended");
            });

            tracing::info!(
                headless = config.headless,
                width = config.viewport_width,
                height = config.viewport_height,
                "browser launched"
            );

            Ok(Self {
                inner: browser,
                handle,
            })
        }

        /// Create a new page
        ///
        /// # Errors
        ///
        /// Returns error if page cannot be created
        pub async fn new_page(&self) -> VerifyResult<Page> {
            let cdp_page =
                self.inner
                    .new_page("about:blank")
                    .await
                    .map_err(|e| VerifyError::PageError {
                        message: e.to_string(),
                    })?;

            Ok(Page {
                url: String::from("about:blank"),
                inner: Some(cdp_page),
            })
        }

        /// Close the browser and stop the CDP handler
        ///
        /// # Errors
        ///
        /// Returns error if the browser did not shut down cleanly
        pub async fn close(mut self) -> VerifyResult<()> {
            let closed = self.inner.close().await.map(|_| ());
            let waited = self.inner.wait().await.map(|_| ());
            self.handle.abort();
            tracing::info!("browser closed");

            closed.map_err(|e| VerifyError::BrowserLaunchError {
                message: format!("close failed: {e}"),
            })?;
            waited.map_err(VerifyError::Io)
        }
    }

    /// A browser page with real CDP connection
    #[derive(Debug)]
    pub struct Page {
        /// Last URL navigated to
        url: String,
        /// CDP page handle, `None` once closed
        inner: Option<CdpPage>,
    }

    impl Page {
        fn page(&self) -> VerifyResult<&CdpPage> {
            self.inner.as_ref().ok_or_else(|| VerifyError::InvalidState {
                message: "page already closed".to_string(),
            })
        }

        async fn evaluate<T: serde::de::DeserializeOwned>(&self, script: String) -> VerifyResult<T> {
            let result = self
                .page()?
                .evaluate(script)
                .await
                .map_err(|e| VerifyError::ScriptError {
                    message: e.to_string(),
                })?;
            result.into_value().map_err(|e| VerifyError::ScriptError {
                message: e.to_string(),
            })
        }
    }

    #[async_trait]
    impl PageDriver for Page {
        async fn navigate(&mut self, url: &str) -> VerifyResult<()> {
            let page = self.page()?;
            tracing::debug!(url, "navigating");
            page.goto(url)
                .await
                .map_err(|e| VerifyError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

            let landed = page
                .url()
                .await
                .map_err(|e| VerifyError::PageError {
                    message: e.to_string(),
                })?
                .unwrap_or_default();
            if landed.starts_with(CHROME_ERROR_PREFIX) {
                return Err(VerifyError::NavigationError {
                    url: url.to_string(),
                    message: format!("browser showed error page {landed}"),
                });
            }

            self.url = url.to_string();
            Ok(())
        }

        async fn query(&self, selector: &Selector) -> VerifyResult<ElementSnapshot> {
            self.evaluate(selector.to_snapshot_query()).await
        }

        async fn click(&self, selector: &Selector) -> VerifyResult<()> {
            let target: ClickTarget = self.evaluate(selector.to_click_target_query()).await?;
            let bbox = target.bounding_box.ok_or_else(|| VerifyError::InputError {
                message: format!("{selector} detached before click"),
            })?;
            if !bbox.has_area() {
                return Err(VerifyError::InputError {
                    message: format!("{selector} has no clickable area"),
                });
            }

            let center = bbox.center();
            self.page()?
                .click(CdpPoint::new(center.x, center.y))
                .await
                .map_err(|e| VerifyError::InputError {
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn screenshot(&self, options: ScreenshotOptions) -> VerifyResult<Vec<u8>> {
            let params = ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .full_page(options.full_page)
                .build();
            self.page()?
                .screenshot(params)
                .await
                .map_err(|e| VerifyError::ScreenshotError {
                    message: e.to_string(),
                })
        }

        async fn current_url(&self) -> VerifyResult<String> {
            self.page()?;
            Ok(self.url.clone())
        }

        async fn close(&mut self) -> VerifyResult<()> {
            let page = self.inner.take().ok_or_else(|| VerifyError::InvalidState {
                message: "page already closed".to_string(),
            })?;
            page.close().await.map_err(|e| VerifyError::PageError {
                message: e.to_string(),
            })
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{Browser, Page};
