use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::configuration::Settings;
use crate::domain::listing::ScrapeParams;
use crate::services::llm_client::LlmClient;
use crate::services::orchestrator::run_scrape;

#[derive(Deserialize)]
struct ScrapeQuery {
    query: Option<String>,
    // accepted as an alias for query
    q: Option<String>,
    max_pages: Option<u32>,
    use_ai: Option<String>,
    headless: Option<String>,
}

fn is_truthy(raw: &str) -> bool {
    ["1", "true", "yes"].contains(&raw.to_lowercase().as_str())
}

#[get("/scrape")]
async fn scrape(
    params: web::Query<ScrapeQuery>,
    settings: web::Data<Settings>,
    llm: web::Data<LlmClient>,
) -> HttpResponse {
    let keyword = params
        .query
        .as_deref()
        .or(params.q.as_deref())
        .unwrap_or("")
        .trim()
        .to_string();
    if keyword.is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "Missing ?query= keyword" }));
    }

    let params = ScrapeParams {
        keyword,
        max_pages: params.max_pages,
        use_llm: params.use_ai.as_deref().map(is_truthy).unwrap_or(true),
        headless: params
            .headless
            .as_deref()
            .map(is_truthy)
            .unwrap_or(settings.scraper.headless),
    };

    match run_scrape(params, settings.get_ref(), llm.get_ref()).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            log::error!("scrape failed: {:?}", e);
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}
