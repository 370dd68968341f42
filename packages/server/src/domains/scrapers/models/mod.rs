pub mod scraper;
pub mod scraper_run;

pub use scraper::Scraper;
pub use scraper_run::{NewScraperRun, RunSource, ScraperRun};
