use std::net::TcpListener;

use env_logger::Env;
use rummage::{configuration::get_configuration, services::LlmClient, startup::run};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(address)?;
    log::info!(
        "listening on {}:{}, scraping through {}",
        configuration.application.host,
        configuration.application.port,
        configuration.scraper.webdriver_url
    );

    let llm_client = LlmClient::from_settings(&configuration.llm);

    run(listener, configuration, llm_client)?.await
}
