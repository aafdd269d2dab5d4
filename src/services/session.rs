use thirtyfour::{ChromiumLikeCapabilities, DesiredCapabilities, WebDriver};

use crate::configuration::TrackerSettings;

/// Exclusively-owned WebDriver handle. One session serves the whole batch;
/// `release` must run on every exit path so the browser process is not
/// leaked.
pub struct BrowserSession {
    driver: WebDriver,
}

#[derive(Debug, thiserror::Error)]
#[error("webdriver session setup failed: {source}")]
pub struct SessionSetupError {
    #[from]
    source: thirtyfour::error::WebDriverError,
}

impl BrowserSession {
    pub async fn acquire(config: &TrackerSettings) -> Result<Self, SessionSetupError> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--disable-gpu")?;
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-dev-shm-usage")?;
        caps.add_arg("--log-level=3")?;
        caps.add_arg(&format!("user-agent={}", config.user_agent))?;
        caps.add_experimental_option("excludeSwitches", ["enable-logging"])?;

        let driver = WebDriver::new(&config.webdriver_url, caps).await?;
        driver.maximize_window().await?;

        log::info!("WebDriver setup successful ({})", config.webdriver_url);
        Ok(BrowserSession { driver })
    }

    pub fn driver(&self) -> &WebDriver {
        &self.driver
    }

    /// Consumes the session and quits the browser. A failed quit is logged
    /// rather than propagated; there is nothing useful to do about it at the
    /// end of a run.
    pub async fn release(self) {
        log::info!("Closing browser");
        if let Err(e) = self.driver.quit().await {
            log::error!("Failed to quit webdriver session cleanly: {}", e);
        }
    }
}
