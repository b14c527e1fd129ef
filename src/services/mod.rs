pub mod description;
pub mod detail_scraper;
pub mod droid;
pub mod limiter;
pub mod llm_client;
pub mod orchestrator;
pub mod search_pager;

pub use description::*;
pub use detail_scraper::*;
pub use droid::*;
pub use limiter::*;
pub use llm_client::*;
pub use orchestrator::*;
pub use search_pager::*;
