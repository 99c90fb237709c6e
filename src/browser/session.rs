//! Browser session management
//!
//! Launches and controls a single Chromium instance over CDP. The session
//! stays interactive so the user can complete the SSO login in the opened
//! window before scraping starts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn, debug};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;

use super::BrowserError;

/// Find Chrome/Chromium executable on the system
fn find_chrome() -> Option<std::path::PathBuf> {
    let candidates: Vec<std::path::PathBuf> = if cfg!(target_os = "windows") {
        let mut paths = vec![
            std::path::PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
            std::path::PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
        ];
        // Also check %LOCALAPPDATA%
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            paths.push(std::path::PathBuf::from(format!(r"{}\Google\Chrome\Application\chrome.exe", local)));
        }
        paths
    } else if cfg!(target_os = "macos") {
        vec![
            std::path::PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            std::path::PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ]
    } else {
        vec![
            std::path::PathBuf::from("/usr/bin/chromium"),
            std::path::PathBuf::from("/usr/bin/chromium-browser"),
            std::path::PathBuf::from("/usr/bin/google-chrome"),
            std::path::PathBuf::from("/usr/bin/google-chrome-stable"),
        ]
    };

    candidates.into_iter().find(|p| p.exists())
}

/// Configuration for a browser session
#[derive(Debug, Clone)]
pub struct BrowserSessionConfig {
    /// Path to Chrome/Chromium executable
    pub chrome_path: Option<String>,
    /// Run in headless mode
    pub headless: bool,
    /// User data directory
    pub user_data_dir: Option<String>,
    /// Wait timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BrowserSessionConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: false,
            user_data_dir: None,
            timeout_secs: 120,
        }
    }
}

impl BrowserSessionConfig {
    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set Chrome path
    pub fn chrome_path(mut self, path: Option<String>) -> Self {
        self.chrome_path = path;
        self
    }

    /// Set user data directory
    pub fn user_data_dir(mut self, dir: Option<String>) -> Self {
        self.user_data_dir = dir;
        self
    }

    /// Set wait timeout
    pub fn timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// A browser session for scraping the portal
pub struct BrowserSession {
    /// The browser instance
    browser: Browser,
    /// The active page
    page: Page,
    /// Session configuration
    config: BrowserSessionConfig,
    /// Whether the browser connection is still up
    alive: Arc<AtomicBool>,
}

impl BrowserSession {
    /// Launch a browser with the given config
    pub async fn launch(config: BrowserSessionConfig) -> Result<Self, BrowserError> {
        info!("Launching browser (headless: {})", config.headless);

        // Check if Chrome is available before attempting launch
        if config.chrome_path.is_none() && find_chrome().is_none() {
            return Err(BrowserError::LaunchFailed(
                "No Chrome/Chromium executable found. Install Chromium or set --chrome / CHROMIUM_PATH.".to_string()
            ));
        }

        // Build browser config. No fixed viewport: the portal lays out the
        // account list like a normal browser window.
        let mut builder = BrowserConfig::builder().viewport(None);

        if !config.headless {
            builder = builder.with_head();
        }

        // Set Chrome path if specified (or use auto-detected path)
        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        } else if let Some(chrome_path) = find_chrome() {
            info!("Auto-detected Chrome at: {}", chrome_path.display());
            builder = builder.chrome_executable(chrome_path);
        }

        // Set user data directory
        if let Some(ref dir) = config.user_data_dir {
            // Create directory if it doesn't exist
            let _ = std::fs::create_dir_all(dir);
            builder = builder.user_data_dir(dir);
        }

        let browser_config = builder.build()
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        // Launch browser
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        // Spawn handler in background; when the handler ends, Chrome has disconnected
        let alive = Arc::new(AtomicBool::new(true));
        let alive_for_handler = alive.clone();
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
            warn!("Chrome disconnected (event handler ended)");
            alive_for_handler.store(false, Ordering::Relaxed);
        });

        // Get existing page or create new one (Chrome opens with a blank tab)
        let page = {
            let mut pages = browser.pages().await
                .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

            // Take the first page as our main page
            let main_page = if !pages.is_empty() {
                pages.remove(0)
            } else {
                browser.new_page("about:blank")
                    .await
                    .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?
            };

            // Close any extra blank tabs
            for extra_page in pages {
                debug!("Closing extra blank tab");
                let _ = extra_page.close().await;
            }

            main_page
        };

        info!("Browser session ready");

        Ok(Self {
            browser,
            page,
            config,
            alive,
        })
    }

    /// Check if the browser connection is still alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Navigate to a URL
    pub async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        debug!("Navigating to: {}", url);
        self.page.goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;

        Ok(())
    }

    /// Wait until a selector matches at least one element on the page.
    /// The portal renders the account list only once login completes, so
    /// this can legitimately take as long as the user needs to sign in.
    pub async fn wait_for_selector(&self, selector: &str) -> Result<(), BrowserError> {
        let timeout_secs = self.config.timeout_secs;
        debug!("Waiting up to {}s for selector: {}", timeout_secs, selector);

        tokio::time::timeout(Duration::from_secs(timeout_secs), async {
            loop {
                if !self.is_alive() {
                    return Err(BrowserError::ConnectionLost(
                        "Browser closed while waiting for the page".to_string(),
                    ));
                }
                match self.page.find_elements(selector).await {
                    Ok(elements) if !elements.is_empty() => return Ok(()),
                    // Not rendered yet, or a transient CDP error during login redirects
                    _ => tokio::time::sleep(Duration::from_millis(500)).await,
                }
            }
        })
        .await
        .map_err(|_| BrowserError::Timeout(format!(
            "Timed out after {}s waiting for {}", timeout_secs, selector
        )))?
    }

    /// Evaluate JavaScript on the page and return its JSON result
    pub async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        let timeout_secs = self.config.timeout_secs;

        let result = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            self.page.evaluate(script),
        )
        .await
        .map_err(|_| BrowserError::Timeout(format!("JavaScript execution timed out after {}s", timeout_secs)))?
        .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        result.into_value()
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))
    }

    /// Close the page and terminate the browser process.
    /// Called on success and failure paths alike; the Chromium process must
    /// not outlive the run.
    pub async fn close(mut self) {
        self.alive.store(false, Ordering::Relaxed);

        // Close page first (stops navigation/JS execution)
        let _ = self.page.clone().close().await;

        // Try graceful close first, give Chrome a moment, then force kill
        let _ = self.browser.close().await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        let _ = self.browser.kill().await;

        info!("Browser session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_config() {
        let config = BrowserSessionConfig::default();
        assert!(!config.headless);
        assert!(config.chrome_path.is_none());
        assert!(config.user_data_dir.is_none());
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_session_config_setters() {
        let config = BrowserSessionConfig::default()
            .headless(true)
            .chrome_path(Some("/usr/bin/chromium".to_string()))
            .user_data_dir(Some("/tmp/profile".to_string()))
            .timeout(30);

        assert!(config.headless);
        assert_eq!(config.chrome_path.as_deref(), Some("/usr/bin/chromium"));
        assert_eq!(config.user_data_dir.as_deref(), Some("/tmp/profile"));
        assert_eq!(config.timeout_secs, 30);
    }
}
