//! Bounded breadth-first crawl of a single site.
//!
//! Only links on the seed's scheme family (http/https) and host are
//! followed. A page that fails to load leaves a note in the corpus
//! and the crawl moves on.

use std::collections::{HashSet, VecDeque};
use std::sync::LazyLock;

use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use scraper::{Html, Selector};
use thiserror::Error;

use crate::core::CrawlConfig;

pub const USER_AGENT: &str = "INSMART-QA-Bot/1.0 (+HKU)";
pub const PAGE_TRUNCATED: &str = "\n...[content truncated]";
pub const CORPUS_TRUNCATED: &str = "\n...[overall corpus truncated]";

const SKIPPED_TAGS: [&str; 3] = ["script", "style", "noscript"];

static LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("Invalid link selector"));

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid start URL: {0}")]
    InvalidSeed(String),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug)]
pub struct CrawlReport {
    pub corpus: String,
    /// Every URL a fetch was attempted for, in visiting order
    pub visited: Vec<String>,
}

/// Cut `text` to `max_chars` characters, appending `marker` if
/// anything was dropped.
pub fn truncate_chars(text: &str, max_chars: usize, marker: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}{}", &text[..idx], marker),
        None => text.to_string(),
    }
}

fn visible_text(document: &Html) -> String {
    let mut raw = String::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|el| SKIPPED_TAGS.contains(&el.name()))
        });
        if !hidden {
            raw.push_str(text);
            raw.push('\n');
        }
    }

    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_same_site(url: &Url, seed: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
        && url.host_str() == seed.host_str()
        && url.port() == seed.port()
}

// Fragments point into the same document so they don't count as a
// new page. Everything else about the URL is kept as-is.
fn visit_key(mut url: Url) -> String {
    url.set_fragment(None);
    url.to_string()
}

/// Text of one HTML page, one non-empty trimmed line per text node
/// capped at `max_chars`, and its same-site links. Kept synchronous
/// since the parsed document can't be held across an await.
fn parse_page(html: &str, page_url: &Url, seed: &Url, max_chars: usize) -> (String, Vec<String>) {
    let document = Html::parse_document(html);
    let text = truncate_chars(&visible_text(&document), max_chars, PAGE_TRUNCATED);
    let links = document
        .select(&LINKS)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| page_url.join(href.trim()).ok())
        .filter(|url| is_same_site(url, seed))
        .map(visit_key)
        .collect();
    (text, links)
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<(String, String), reqwest::Error> {
    let resp = client.get(url).send().await?.error_for_status()?;
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = resp.text().await?;
    Ok((body, content_type))
}

fn parse_seed(seed: &str) -> Result<Url, CrawlError> {
    let url = Url::parse(seed).map_err(|_| CrawlError::InvalidSeed(seed.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(CrawlError::InvalidSeed(seed.to_string()));
    }
    Ok(url)
}

/// Crawl from `seed` until the queue is empty, `max_pages` pages were
/// visited, or the collected text reaches `total_chars`.
pub async fn crawl(seed: &str, config: &CrawlConfig) -> Result<CrawlReport, CrawlError> {
    let seed_url = parse_seed(seed)?;
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.fetch_timeout)
        .build()?;

    let mut visited: HashSet<String> = HashSet::new();
    let mut order: Vec<String> = Vec::new();
    let mut queue: VecDeque<String> = VecDeque::from([visit_key(seed_url.clone())]);
    let mut collected = String::new();
    let mut collected_chars = 0;

    while visited.len() < config.max_pages && collected_chars < config.total_chars {
        let Some(url) = queue.pop_front() else {
            break;
        };
        if !visited.insert(url.clone()) {
            continue;
        }
        order.push(url.clone());

        let record = match fetch(&client, &url).await {
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                format!("\n[Failed to fetch {}: {}]\n", url, e)
            }
            Ok((body, content_type)) if !content_type.contains("text/html") => {
                let text = truncate_chars(&body, config.per_page_chars, PAGE_TRUNCATED);
                format!("\n[Content of {}]\n{}\n", url, text)
            }
            Ok((body, _)) => {
                // Already a valid absolute URL, it came out of `Url`
                let page_url = Url::parse(&url).unwrap_or_else(|_| seed_url.clone());
                let (text, links) = parse_page(&body, &page_url, &seed_url, config.per_page_chars);
                queue.extend(links.into_iter().filter(|link| !visited.contains(link)));
                format!("\n[Content of {}]\n{}\n", url, text)
            }
        };

        tracing::debug!("Crawled {} ({} chars)", url, record.chars().count());
        collected_chars += record.chars().count();
        collected.push_str(&record);
    }

    Ok(CrawlReport {
        corpus: truncate_chars(&collected, config.total_chars, CORPUS_TRUNCATED),
        visited: order,
    })
}
