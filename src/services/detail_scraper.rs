use std::ops::RangeInclusive;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use rand::{thread_rng, Rng};
use thirtyfour::WebDriver;

use crate::configuration::ScraperSettings;
use crate::domain::listing::Card;
use crate::services::description::extract_description;
use crate::services::droid::{wait_until_settled, Droid, LivePage};
use crate::services::llm_client::LlmClient;
use crate::services::orchestrator::CardEnricher;

const CARD_PAUSE_MS: RangeInclusive<u64> = 400..=700;

// One browser session per card; sessions never outlive the card they serve.
pub struct DetailScraper<'a> {
    droid: &'a Droid,
    llm: &'a LlmClient,
    settings: &'a ScraperSettings,
    headless: bool,
}

impl<'a> DetailScraper<'a> {
    pub fn new(
        droid: &'a Droid,
        llm: &'a LlmClient,
        settings: &'a ScraperSettings,
        headless: bool,
    ) -> Self {
        DetailScraper {
            droid,
            llm,
            settings,
            headless,
        }
    }

    async fn describe_on(&self, driver: &WebDriver, card: &Card) -> anyhow::Result<String> {
        driver
            .goto(&card.href)
            .await
            .context("failed to load the detail page")?;
        wait_until_settled(driver, self.settings.page_timeout_ms).await;

        let pause = thread_rng().gen_range(CARD_PAUSE_MS);
        tokio::time::sleep(Duration::from_millis(pause)).await;

        let page = LivePage::new(driver);
        Ok(extract_description(&page, self.llm).await)
    }
}

#[async_trait]
impl CardEnricher for DetailScraper<'_> {
    async fn describe(&self, card: &Card) -> anyhow::Result<String> {
        let driver = self.droid.new_session(self.headless).await?;

        // Quit on every path; only then surface the outcome.
        let described = self.describe_on(&driver, card).await;
        if let Err(e) = driver.quit().await {
            log::warn!("failed to quit a detail session: {:?}", e);
        }

        described
    }
}
