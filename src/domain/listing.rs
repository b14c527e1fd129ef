use serde::Serialize;

use crate::domain::text::{dash_if_empty, PLACEHOLDER};

#[derive(Debug, Clone)]
pub struct ScrapeParams {
    pub keyword: String,
    pub max_pages: Option<u32>,
    pub use_llm: bool,
    pub headless: bool,
}

// Only navigable cards (absolute http href) survive extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub href: String,
    pub title: String,
    pub price: String,
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    pub cards: Vec<Card>,
    pub has_next: bool,
}

// Every string field is either content or "-", never empty.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Item {
    pub page: u32,
    pub position: u32,
    pub url: String,
    pub title: String,
    pub price: String,
    pub description: String,
}

impl Item {
    pub fn from_card(page: u32, card: &Card) -> Self {
        Item {
            page,
            position: card.position,
            url: card.href.clone(),
            title: dash_if_empty(&card.title),
            price: dash_if_empty(&card.price),
            description: PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScrapeResult {
    pub query: String,
    pub total: usize,
    pub items: Vec<Item>,
}

impl ScrapeResult {
    // total always mirrors items.len()
    pub fn new(query: String, items: Vec<Item>) -> Self {
        ScrapeResult {
            query,
            total: items.len(),
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, Item, ScrapeResult};

    #[test]
    fn from_card_never_leaves_empty_fields() {
        let card = Card {
            href: "https://www.ebay.com/itm/1234567890".to_string(),
            title: "".to_string(),
            price: "  ".to_string(),
            position: 4,
        };
        let item = Item::from_card(2, &card);

        assert_eq!(item.page, 2);
        assert_eq!(item.position, 4);
        assert_eq!(item.url, "https://www.ebay.com/itm/1234567890");
        assert_eq!(item.title, "-");
        assert_eq!(item.price, "-");
        assert_eq!(item.description, "-");
    }

    #[test]
    fn from_card_cleans_scraped_whitespace() {
        let card = Card {
            href: "https://www.ebay.com/itm/42".to_string(),
            title: " Nike  Air\nZoom ".to_string(),
            price: " $89.00 ".to_string(),
            position: 1,
        };
        let item = Item::from_card(1, &card);

        assert_eq!(item.title, "Nike Air Zoom");
        assert_eq!(item.price, "$89.00");
    }

    #[test]
    fn result_total_mirrors_item_count() {
        let card = Card {
            href: "https://www.ebay.com/itm/7".to_string(),
            title: "thing".to_string(),
            price: "$1.00".to_string(),
            position: 1,
        };
        let items = vec![Item::from_card(1, &card), Item::from_card(2, &card)];

        let result = ScrapeResult::new("thing".to_string(), items);
        assert_eq!(result.total, 2);
        assert_eq!(result.total, result.items.len());
    }
}
