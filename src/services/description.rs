use crate::domain::text::{clean_text, PLACEHOLDER};
use crate::services::droid::PageReader;
use crate::services::llm_client::LlmClient;

// Containers sellers put their copy in, most specific first.
const DESCRIPTION_SELECTORS: [&str; 8] = [
    "#viTabs_0_is",
    "#vi-desc-maincntr",
    "section[itemprop='description']",
    "[data-testid='x-item-description']",
    "div.d-item-desc",
    "div#desc_div",
    "div[itemprop='description']",
    "div#viTabs_0_pd",
];

// Regions fed to the language model when the structural tiers come up empty.
const ABOUT_REGIONS: [&str; 4] = [
    "[data-testid='x-about-this-item']",
    "[data-testid='x-item-description']",
    "#viTabs_0_is",
    "section[itemprop='description']",
];

// A snippet must beat this length to count as a description.
const MIN_STRUCTURAL_CHARS: usize = 20;

// Cheapest tier first; lands on "-" when every tier misses.
pub async fn extract_description(page: &impl PageReader, llm: &LlmClient) -> String {
    for selector in DESCRIPTION_SELECTORS {
        if let Some(text) = page.first_text(selector).await {
            let cleaned = clean_text(&text);
            if cleaned.chars().count() > MIN_STRUCTURAL_CHARS {
                return cleaned;
            }
        }
    }

    for meta in ["meta[name='description']", "meta[property='og:description']"] {
        if let Some(content) = page.first_attr(meta, "content").await {
            let cleaned = clean_text(&content);
            if !cleaned.is_empty() {
                return cleaned;
            }
        }
    }

    if llm.enabled() {
        let raw = composite_text(page).await;
        if !raw.is_empty() {
            match llm.extract_description(&raw).await {
                Ok(answer) => return answer,
                Err(e) => log::warn!("language model extraction failed: {:?}", e),
            }
        }
    }

    PLACEHOLDER.to_string()
}

async fn composite_text(page: &impl PageReader) -> String {
    let mut parts = Vec::new();
    for selector in ABOUT_REGIONS {
        if let Some(text) = page.first_text(selector).await {
            let cleaned = clean_text(&text);
            if !cleaned.is_empty() {
                parts.push(cleaned);
            }
        }
    }

    match parts.is_empty() {
        true => match page.body_text().await {
            Some(body) => clean_text(&body),
            None => String::new(),
        },
        false => parts.join("\n\n"),
    }
}
