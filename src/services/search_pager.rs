use anyhow::Context;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use thirtyfour::WebDriver;
use url::form_urlencoded;

use crate::configuration::ScraperSettings;
use crate::domain::listing::{Card, ListingPage};
use crate::domain::text::clean_text;
use crate::services::droid::wait_until_settled;
use crate::services::orchestrator::ListingSource;

const SEARCH_ENDPOINT: &str = "https://www.ebay.com/sch/i.html";

// Every field reads the stable class first, the data-testid variant second.
const CARD_ROW: &str = "li.s-item";
const CARD_LINK_PRIMARY: &str = "a.s-item__link";
const CARD_LINK_FALLBACK: &str = "a[href]";
const CARD_TITLE_PRIMARY: &str = ".s-item__title";
const CARD_TITLE_FALLBACK: &str = "[data-testid='item-title']";
const CARD_PRICE_PRIMARY: &str = ".s-item__price";
const CARD_PRICE_FALLBACK: &str = "[data-testid='item-price']";
const NEXT_PAGE_MARKERS: &str =
    "a[aria-label*='Next'], a[aria-label*='next'], a.pagination__next, a[rel='next']";

pub fn build_search_url(keyword: &str, page: u32) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("_from", "R40")
        .append_pair("_nkw", keyword)
        .append_pair("_sacat", "0")
        .append_pair("rt", "nc")
        .append_pair("_pgn", &page.to_string())
        .finish();
    format!("{}?{}", SEARCH_ENDPOINT, query)
}

// Positions follow the row index, so a row dropped for a bad link still
// consumes its slot.
pub fn cards_from_html(html: &str) -> Vec<Card> {
    let row_selector = Selector::parse(CARD_ROW).unwrap();
    let link_primary = Selector::parse(CARD_LINK_PRIMARY).unwrap();
    let link_fallback = Selector::parse(CARD_LINK_FALLBACK).unwrap();
    let title_primary = Selector::parse(CARD_TITLE_PRIMARY).unwrap();
    let title_fallback = Selector::parse(CARD_TITLE_FALLBACK).unwrap();
    let price_primary = Selector::parse(CARD_PRICE_PRIMARY).unwrap();
    let price_fallback = Selector::parse(CARD_PRICE_FALLBACK).unwrap();

    let document = Html::parse_document(html);
    let mut cards = Vec::new();

    for (index, row) in document.select(&row_selector).enumerate() {
        let href = row
            .select(&link_primary)
            .next()
            .or_else(|| row.select(&link_fallback).next())
            .and_then(|link| link.value().attr("href"))
            .map(|href| href.to_string());

        let href = match href {
            Some(href) if href.starts_with("http") => href,
            _ => continue,
        };

        cards.push(Card {
            href,
            title: first_text(&row, &title_primary, &title_fallback),
            price: first_text(&row, &price_primary, &price_fallback),
            position: index as u32 + 1,
        });
    }

    cards
}

pub fn has_next_from_html(html: &str) -> bool {
    let next_selector = Selector::parse(NEXT_PAGE_MARKERS).unwrap();
    Html::parse_document(html).select(&next_selector).next().is_some()
}

fn first_text(row: &ElementRef, primary: &Selector, fallback: &Selector) -> String {
    row.select(primary)
        .next()
        .or_else(|| row.select(fallback).next())
        .map(|tag| clean_text(&tag.text().collect::<String>()))
        .unwrap_or_default()
}

// One live browser session; each page is parsed from a single source snapshot.
pub struct SearchPager<'a> {
    driver: &'a WebDriver,
    settings: &'a ScraperSettings,
}

impl<'a> SearchPager<'a> {
    pub fn new(driver: &'a WebDriver, settings: &'a ScraperSettings) -> Self {
        SearchPager { driver, settings }
    }
}

#[async_trait]
impl ListingSource for SearchPager<'_> {
    async fn fetch_listing(&self, keyword: &str, page: u32) -> anyhow::Result<ListingPage> {
        let url = build_search_url(keyword, page);

        self.driver
            .goto(&url)
            .await
            .context("failed to load the results page")?;
        wait_until_settled(self.driver, self.settings.page_timeout_ms).await;

        let html = self
            .driver
            .source()
            .await
            .context("failed to read the results page source")?;

        let cards = cards_from_html(&html);
        let has_next = has_next_from_html(&html);
        log::info!(
            "results page {}: {} cards, next page marker present? {}",
            page,
            cards.len(),
            has_next
        );

        Ok(ListingPage { cards, has_next })
    }
}
