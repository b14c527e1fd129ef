use std::net::TcpListener;

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};

use crate::{
    configuration::Settings,
    routes::{default_route, health_route, scrape_route},
    services::LlmClient,
};

pub fn run(
    listener: TcpListener,
    settings: Settings,
    llm_client: LlmClient,
) -> Result<Server, std::io::Error> {
    let settings = web::Data::new(settings);
    let llm_client = web::Data::new(llm_client);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::default)
            .service(health_route::health)
            .service(scrape_route::scrape)
            .app_data(settings.clone())
            .app_data(llm_client.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
