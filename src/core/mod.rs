mod config;
pub use config::{AppConfig, CorpusSource, CrawlConfig};
