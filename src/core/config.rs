use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Error, bail};
use serde::Serialize;

/// Where the prompt context comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CorpusSource {
    /// The summary compiled into the binary
    Bundled,
    /// A breadth-first crawl of the project homepage at startup
    Crawl,
}

impl fmt::Display for CorpusSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CorpusSource::Bundled => write!(f, "bundled"),
            CorpusSource::Crawl => write!(f, "crawl"),
        }
    }
}

impl FromStr for CorpusSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bundled" => Ok(CorpusSource::Bundled),
            "crawl" => Ok(CorpusSource::Crawl),
            other => bail!("Unknown corpus source: {}", other),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CrawlConfig {
    pub max_pages: usize,
    pub per_page_chars: usize,
    pub total_chars: usize,
    pub fetch_timeout: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 50,
            per_page_chars: 5000,
            total_chars: 30000,
            fetch_timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm_api_hostname: String,
    pub llm_api_key: String,
    pub llm_deployment: String,
    pub llm_api_version: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    pub llm_timeout: Duration,
    pub home_url: String,
    pub corpus_source: CorpusSource,
    pub crawl: CrawlConfig,
    pub web_ui_path: String,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let crawl_defaults = CrawlConfig::default();

        // Not validated here, a missing key surfaces as an upstream
        // auth failure on the first chat request
        let llm_api_key = env::var("HKU_API_KEY").unwrap_or_default();
        let llm_api_hostname =
            env::var("INSMART_LLM_HOST").unwrap_or_else(|_| "https://api.hku.hk".to_string());
        let llm_deployment =
            env::var("INSMART_LLM_DEPLOYMENT").unwrap_or_else(|_| "gpt-4.1-nano".to_string());
        let llm_api_version = env::var("INSMART_LLM_API_VERSION")
            .unwrap_or_else(|_| "2025-01-01-preview".to_string());
        let home_url = env::var("INSMART_HOME_URL")
            .unwrap_or_else(|_| "https://insmart.cite.hku.hk/".to_string());
        let web_ui_path = env::var("INSMART_WEB_UI_PATH").unwrap_or_else(|_| "./web-ui".to_string());

        Self {
            llm_api_hostname,
            llm_api_key,
            llm_deployment,
            llm_api_version,
            llm_temperature: env_or("INSMART_LLM_TEMPERATURE", 0.5),
            llm_max_tokens: env_or("INSMART_LLM_MAX_TOKENS", 800),
            llm_timeout: Duration::from_secs(env_or("INSMART_LLM_TIMEOUT_SECS", 60)),
            home_url,
            corpus_source: env_or("INSMART_CORPUS_SOURCE", CorpusSource::Crawl),
            crawl: CrawlConfig {
                max_pages: env_or("INSMART_CRAWL_MAX_PAGES", crawl_defaults.max_pages),
                per_page_chars: env_or("INSMART_CRAWL_PAGE_CHARS", crawl_defaults.per_page_chars),
                total_chars: env_or("INSMART_CRAWL_TOTAL_CHARS", crawl_defaults.total_chars),
                fetch_timeout: Duration::from_secs(env_or(
                    "INSMART_CRAWL_TIMEOUT_SECS",
                    crawl_defaults.fetch_timeout.as_secs(),
                )),
            },
            web_ui_path,
        }
    }
}
