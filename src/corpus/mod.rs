//! Background knowledge injected into every prompt. Built once before
//! the server starts accepting requests and never changed afterwards.

pub mod crawl;
pub use crawl::{CrawlError, CrawlReport, crawl};

use chrono::{DateTime, Utc};

use crate::core::{AppConfig, CorpusSource};

pub const BUNDLED_SUMMARY: &str = r#"
- Chinese name: 「IN-SMART 培育STEAM及人工智能人才的創新網絡計劃」
- Main goals:
  1. Strengthen curriculum leadership and teachers' professional capacity through a training-team model;
  2. Enhance teachers' ability to design STEAM learning tasks that foster students' self-directed learning,
     especially integrating AI elements;
  3. Develop a professional development framework for teachers' AI literacy and suggest enabling
     conditions and environments;
  4. Enhance teachers' ability to develop students' digital literacy through STEAM education;
  5. Support schools to design and coordinate multi-level connected learning to promote educational innovation.

IN-SMART（「培育STEAM及人工智能人才的創新網絡計劃」）的支援目標包括：
1. 透過培育培訓團隊模式，並著重培育課程領導人才，提升學校課程領導能力和教師團隊專業水平；
2. 提升教師設計STEAM學習設計，以促進學生自主學習的能力，特別是將人工智能學習元素融入STEAM教學活動；
3. 制定培養教師人工智能素養的專業發展框架，並就提高教師人工智能素養和教學能力所需的有利學習條件和環境提出建議；
4. 提升教師通過STEAM教育，發展學生數碼素養的能力；
5. 發展學校設計和協調多層級連繫學習的能力，以促進學校的教育創新。

聯絡：
- 聯絡人：陳敏柔女士（計劃助理）
- 電話：3917 0744
- 電郵：yoyocmi@hku.hk
"#;

#[derive(Clone, Debug)]
pub struct Corpus {
    content: String,
    source: CorpusSource,
    error: Option<String>,
    built_at: DateTime<Utc>,
}

impl Corpus {
    pub fn bundled() -> Self {
        Self {
            content: BUNDLED_SUMMARY.trim().to_string(),
            source: CorpusSource::Bundled,
            error: None,
            built_at: Utc::now(),
        }
    }

    pub fn crawled(content: &str) -> Self {
        Self {
            content: content.to_string(),
            source: CorpusSource::Crawl,
            error: None,
            built_at: Utc::now(),
        }
    }

    /// An empty corpus remembering why the crawl didn't happen.
    pub fn failed(error: &str) -> Self {
        Self {
            content: String::new(),
            source: CorpusSource::Crawl,
            error: Some(error.to_string()),
            built_at: Utc::now(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn source(&self) -> CorpusSource {
        self.source
    }

    pub fn is_crawled(&self) -> bool {
        self.source == CorpusSource::Crawl
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn chars(&self) -> usize {
        self.content.chars().count()
    }

    /// Build the corpus for `config`. A failed crawl is not fatal, the
    /// server runs without crawled context and reports the error.
    pub async fn load(config: &AppConfig) -> Self {
        match config.corpus_source {
            CorpusSource::Bundled => Self::bundled(),
            CorpusSource::Crawl => {
                tracing::info!(
                    "Crawling up to {} pages from {}",
                    config.crawl.max_pages,
                    config.home_url
                );
                match crawl(&config.home_url, &config.crawl).await {
                    Ok(report) => {
                        let corpus = Self::crawled(&report.corpus);
                        tracing::info!(
                            "Crawl finished. Pages: {}, length: {}",
                            report.visited.len(),
                            corpus.chars()
                        );
                        corpus
                    }
                    Err(e) => {
                        tracing::error!("Crawl failed: {}", e);
                        Self::failed(&e.to_string())
                    }
                }
            }
        }
    }
}
