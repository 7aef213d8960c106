pub mod config;
pub mod diff;
pub mod notify;
mod parser;
pub mod scraper;
pub mod session;
pub mod store;
pub mod types;
pub mod watcher;

pub use config::WatchConfig;
pub use parser::{HeadingStrategy, ParseError, normalize_link, parse_listing};
pub use scraper::{ScraperError, WebScraper};
pub use session::{SessionContext, SessionError};
pub use watcher::{RunOutcome, Watcher};

pub(crate) const BASE_URL: &str = "https://mostaql.com";
