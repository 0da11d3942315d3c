use anyhow::Result;

use crate::core::AppConfig;
use crate::corpus::crawl;

pub async fn run(url: Option<String>, max_pages: Option<usize>) -> Result<()> {
    let mut config = AppConfig::default();
    if let Some(max_pages) = max_pages {
        config.crawl.max_pages = max_pages;
    }
    let seed = url.unwrap_or(config.home_url);

    let report = crawl(&seed, &config.crawl).await?;
    for url in &report.visited {
        tracing::info!("Visited {}", url);
    }
    println!("{}", report.corpus);

    Ok(())
}
