pub mod default_route;
pub mod health_route;
pub mod scrape_route;
