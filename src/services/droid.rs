use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use fake_user_agent::get_chrome_rua;
use thirtyfour::{By, ChromiumLikeCapabilities, DesiredCapabilities, WebDriver};

use crate::configuration::ScraperSettings;

pub struct Droid {
    settings: ScraperSettings,
}

impl Droid {
    pub fn new(settings: ScraperSettings) -> Self {
        Droid { settings }
    }

    // The caller owns the returned session and quits it on all exit paths.
    pub async fn new_session(&self, headless: bool) -> anyhow::Result<WebDriver> {
        let mut caps = DesiredCapabilities::chrome();
        if headless {
            caps.set_headless()?;
        }
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-setuid-sandbox")?;
        caps.add_arg("--window-size=1366,768")?;
        caps.add_arg(&format!("--user-agent={}", get_chrome_rua()))?;

        let driver = WebDriver::new(&self.settings.webdriver_url, caps)
            .await
            .context("failed to start a browser session")?;

        let timeout = Duration::from_millis(self.settings.page_timeout_ms);
        if let Err(e) = driver.set_page_load_timeout(timeout).await {
            // The session is already live here; quit it before surfacing.
            if let Err(quit_err) = driver.quit().await {
                log::warn!("failed to quit the misconfigured session: {:?}", quit_err);
            }
            return Err(e).context("failed to set the page load timeout");
        }

        Ok(driver)
    }
}

// Polls document.readyState until complete or the budget runs out; script
// errors read as not settled yet.
pub async fn wait_until_settled(driver: &WebDriver, budget_ms: u64) {
    let started = Instant::now();
    let budget = Duration::from_millis(budget_ms);

    loop {
        let complete = match driver.execute("return document.readyState", Vec::new()).await {
            Ok(ret) => matches!(ret.json().as_str(), Some("complete")),
            Err(_) => false,
        };
        if complete || started.elapsed() >= budget {
            return;
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}

// A missing node, stale element or dead session reads as None, never an
// error, so extraction tiers stay free to fall through.
#[async_trait]
pub trait PageReader {
    async fn first_text(&self, css: &str) -> Option<String>;
    async fn first_attr(&self, css: &str, name: &str) -> Option<String>;
    async fn body_text(&self) -> Option<String>;
}

pub struct LivePage<'a> {
    driver: &'a WebDriver,
}

impl<'a> LivePage<'a> {
    pub fn new(driver: &'a WebDriver) -> Self {
        LivePage { driver }
    }
}

#[async_trait]
impl PageReader for LivePage<'_> {
    async fn first_text(&self, css: &str) -> Option<String> {
        let element = self.driver.find(By::Css(css)).await.ok()?;
        element.text().await.ok()
    }

    async fn first_attr(&self, css: &str, name: &str) -> Option<String> {
        let element = self.driver.find(By::Css(css)).await.ok()?;
        element.attr(name).await.ok()?
    }

    async fn body_text(&self) -> Option<String> {
        let body = self.driver.find(By::Tag("body")).await.ok()?;
        body.text().await.ok()
    }
}
