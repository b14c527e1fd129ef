use std::ops::RangeInclusive;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use futures::future::join_all;
use rand::{thread_rng, Rng};
use uuid::Uuid;

use crate::configuration::Settings;
use crate::domain::listing::{Card, Item, ListingPage, ScrapeParams, ScrapeResult};
use crate::domain::text::dash_if_empty;
use crate::services::detail_scraper::DetailScraper;
use crate::services::droid::Droid;
use crate::services::limiter::Limiter;
use crate::services::llm_client::LlmClient;
use crate::services::search_pager::SearchPager;

const PAGE_PAUSE_MS: RangeInclusive<u64> = 800..=1200;

#[async_trait]
pub trait ListingSource {
    async fn fetch_listing(&self, keyword: &str, page: u32) -> anyhow::Result<ListingPage>;
}

#[async_trait]
pub trait CardEnricher {
    async fn describe(&self, card: &Card) -> anyhow::Result<String>;
}

// Walks result pages until the cap, an empty page or a missing next-page
// marker stops it, enriching every card under the limiter.
pub async fn collect_items(
    source: &impl ListingSource,
    enricher: &impl CardEnricher,
    limiter: &Limiter,
    keyword: &str,
    page_cap: u32,
) -> anyhow::Result<Vec<Item>> {
    let mut items = Vec::new();
    if page_cap == 0 {
        return Ok(items);
    }

    let mut page = 1u32;
    loop {
        let listing = source.fetch_listing(keyword, page).await?;
        if listing.cards.is_empty() {
            log::info!("page {} came back empty, stopping pagination", page);
            break;
        }

        let mut page_items = join_all(
            listing
                .cards
                .iter()
                .map(|card| limiter.run(enrich_card(enricher, page, card))),
        )
        .await;

        // Concurrency must never reorder the result.
        page_items.sort_by_key(|item| item.position);
        items.extend(page_items);

        if !listing.has_next {
            break;
        }
        page += 1;
        if page > page_cap {
            log::info!("page cap {} reached, stopping pagination", page_cap);
            break;
        }

        let pause = thread_rng().gen_range(PAGE_PAUSE_MS);
        tokio::time::sleep(Duration::from_millis(pause)).await;
    }

    Ok(items)
}

// A failed card keeps the placeholder description; it never takes the page
// or the run down with it.
async fn enrich_card(enricher: &impl CardEnricher, page: u32, card: &Card) -> Item {
    let mut item = Item::from_card(page, card);
    match enricher.describe(card).await {
        Ok(description) => item.description = dash_if_empty(&description),
        Err(e) => log::warn!(
            "card {} on page {} failed, keeping the placeholder: {:?}",
            card.position,
            page,
            e
        ),
    }
    item
}

// One listing session walks the pages; every card gets its own detail
// session. All sessions are torn down before returning.
pub async fn run_scrape(
    params: ScrapeParams,
    settings: &Settings,
    llm: &LlmClient,
) -> anyhow::Result<ScrapeResult> {
    let run_id = Uuid::new_v4();
    let page_cap = params
        .max_pages
        .unwrap_or(settings.scraper.hard_max_pages)
        .min(settings.scraper.hard_max_pages);

    let llm = match params.use_llm {
        true => llm,
        false => &LlmClient::Disabled,
    };
    log::info!(
        "scrape {}: keyword='{}' pages<={} llm={} headless={}",
        run_id,
        params.keyword,
        page_cap,
        llm.provider(),
        params.headless
    );

    let droid = Droid::new(settings.scraper.clone());
    let listing_session = droid
        .new_session(params.headless)
        .await
        .context("failed to start the listing session")?;

    let outcome = {
        let pager = SearchPager::new(&listing_session, &settings.scraper);
        let enricher = DetailScraper::new(&droid, llm, &settings.scraper, params.headless);
        let limiter = Limiter::new(settings.scraper.max_concurrency);
        collect_items(&pager, &enricher, &limiter, &params.keyword, page_cap).await
    };

    if let Err(e) = listing_session.quit().await {
        log::warn!("failed to quit the listing session: {:?}", e);
    }

    let items = outcome?;
    log::info!("scrape {}: finished with {} items", run_id, items.len());

    Ok(ScrapeResult::new(params.keyword, items))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{collect_items, CardEnricher, ListingSource};
    use crate::domain::listing::{Card, ListingPage};
    use crate::services::limiter::Limiter;

    fn card(position: u32) -> Card {
        Card {
            href: format!("https://www.ebay.com/itm/{}", position),
            title: format!("item {}", position),
            price: "$10.00".to_string(),
            position,
        }
    }

    struct FakeSource {
        pages: Vec<ListingPage>,
        fetched: Mutex<Vec<u32>>,
    }

    impl FakeSource {
        fn new(pages: Vec<ListingPage>) -> Self {
            FakeSource {
                pages,
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn fetched(&self) -> Vec<u32> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ListingSource for FakeSource {
        async fn fetch_listing(&self, _keyword: &str, page: u32) -> anyhow::Result<ListingPage> {
            self.fetched.lock().unwrap().push(page);
            Ok(self
                .pages
                .get(page as usize - 1)
                .cloned()
                .unwrap_or(ListingPage {
                    cards: Vec::new(),
                    has_next: false,
                }))
        }
    }

    // Positions listed in failing reject; everything else answers after a
    // pause that shrinks with the position, so later cards finish first.
    struct FakeEnricher {
        failing: Vec<u32>,
    }

    #[async_trait]
    impl CardEnricher for FakeEnricher {
        async fn describe(&self, card: &Card) -> anyhow::Result<String> {
            if self.failing.contains(&card.position) {
                anyhow::bail!("browser session dropped");
            }
            tokio::time::sleep(Duration::from_millis(120 / u64::from(card.position))).await;
            Ok(format!("described {}", card.href))
        }
    }

    fn enricher() -> FakeEnricher {
        FakeEnricher { failing: Vec::new() }
    }

    #[tokio::test]
    async fn stops_at_the_requested_page_cap() {
        let source = FakeSource::new(vec![
            ListingPage { cards: vec![card(1)], has_next: true },
            ListingPage { cards: vec![card(1)], has_next: true },
            ListingPage { cards: vec![card(1)], has_next: true },
        ]);
        let limiter = Limiter::new(3);

        let items = collect_items(&source, &enricher(), &limiter, "mouse", 2)
            .await
            .unwrap();

        assert_eq!(source.fetched(), vec![1, 2]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].page, 1);
        assert_eq!(items[1].page, 2);
    }

    #[tokio::test]
    async fn zero_page_cap_fetches_nothing() {
        let source = FakeSource::new(vec![ListingPage {
            cards: vec![card(1)],
            has_next: true,
        }]);
        let limiter = Limiter::new(3);

        let items = collect_items(&source, &enricher(), &limiter, "mouse", 0)
            .await
            .unwrap();

        assert!(items.is_empty());
        assert!(source.fetched().is_empty());
    }

    #[tokio::test]
    async fn empty_page_ends_the_walk_quietly() {
        let source = FakeSource::new(vec![
            ListingPage { cards: vec![card(1), card(2)], has_next: true },
            ListingPage { cards: Vec::new(), has_next: true },
        ]);
        let limiter = Limiter::new(3);

        let items = collect_items(&source, &enricher(), &limiter, "mouse", 50)
            .await
            .unwrap();

        assert_eq!(source.fetched(), vec![1, 2]);
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn missing_next_marker_ends_the_walk() {
        let source = FakeSource::new(vec![ListingPage {
            cards: vec![card(1)],
            has_next: false,
        }]);
        let limiter = Limiter::new(3);

        let items = collect_items(&source, &enricher(), &limiter, "mouse", 50)
            .await
            .unwrap();

        assert_eq!(source.fetched(), vec![1]);
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn failing_card_keeps_its_placeholder_and_its_slot() {
        let source = FakeSource::new(vec![ListingPage {
            cards: vec![card(1), card(2), card(3)],
            has_next: false,
        }]);
        let limiter = Limiter::new(3);
        let enricher = FakeEnricher { failing: vec![2] };

        let items = collect_items(&source, &enricher, &limiter, "mouse", 50)
            .await
            .unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].description, "described https://www.ebay.com/itm/1");
        assert_eq!(items[1].description, "-");
        assert_eq!(items[2].description, "described https://www.ebay.com/itm/3");
        assert!(items.iter().all(|item| !item.description.is_empty()));
    }

    #[tokio::test]
    async fn items_come_back_position_sorted_despite_completion_order() {
        let source = FakeSource::new(vec![ListingPage {
            cards: vec![card(1), card(2), card(3), card(4)],
            has_next: false,
        }]);
        let limiter = Limiter::new(4);

        let items = collect_items(&source, &enricher(), &limiter, "mouse", 50)
            .await
            .unwrap();

        let positions: Vec<u32> = items.iter().map(|item| item.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn every_item_carries_its_page_number() {
        let source = FakeSource::new(vec![
            ListingPage { cards: vec![card(1), card(2)], has_next: true },
            ListingPage { cards: vec![card(1)], has_next: false },
        ]);
        let limiter = Limiter::new(2);

        let items = collect_items(&source, &enricher(), &limiter, "mouse", 50)
            .await
            .unwrap();

        let pages: Vec<u32> = items.iter().map(|item| item.page).collect();
        assert_eq!(pages, vec![1, 1, 2]);
    }
}
