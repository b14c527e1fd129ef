use serde_aux::field_attributes::{deserialize_bool_from_anything, deserialize_number_from_string};

// Built once in main and passed explicitly. Every key reads from the
// environment with a __ separator and has a default, so the binary starts
// with no configuration at all.
#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub scraper: ScraperSettings,
    pub llm: LlmSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct ScraperSettings {
    pub webdriver_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub page_timeout_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub hard_max_pages: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_concurrency: usize,
    #[serde(deserialize_with = "deserialize_bool_from_anything")]
    pub headless: bool,
}

#[derive(serde::Deserialize, Clone)]
pub struct LlmSettings {
    // empty keeps the language-model capability disabled
    pub provider: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.host", "0.0.0.0")?
        .set_default("application.port", 3000_i64)?
        .set_default("scraper.webdriver_url", "http://localhost:9515")?
        .set_default("scraper.page_timeout_ms", 30_000_i64)?
        .set_default("scraper.hard_max_pages", 50_i64)?
        .set_default("scraper.max_concurrency", 3_i64)?
        .set_default("scraper.headless", true)?
        .set_default("llm.provider", "")?
        .add_source(config::Environment::default().separator("__"))
        .build()?;

    settings.try_deserialize::<Settings>()
}
