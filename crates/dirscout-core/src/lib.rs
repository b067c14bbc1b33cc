pub mod config;
pub mod record;

pub use config::{load_scrape_config, ConfigError, ScrapeConfig};
pub use record::{BusinessRecord, SearchQuery, PREFERRED_COLUMNS};
