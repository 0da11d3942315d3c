use std::sync::Arc;

use anyhow::Result;

use crate::ai::chat::ChatService;
use crate::ai::prompt::system_instructions;
use crate::core::AppConfig;
use crate::corpus::Corpus;
use crate::openai::{Completion, CompletionClient};

/// Everything a request handler needs. Built once before serving and
/// read-only afterwards, so it's shared without a lock.
pub struct AppState {
    pub config: AppConfig,
    pub corpus: Corpus,
    pub chat: ChatService,
}

impl AppState {
    pub fn new(config: AppConfig, corpus: Corpus, client: Arc<dyn Completion>) -> Result<Self> {
        let instructions = system_instructions(&corpus, &config.home_url, config.crawl.max_pages)?;
        let chat = ChatService::new(&instructions, client);
        Ok(Self {
            config,
            corpus,
            chat,
        })
    }

    /// The startup phase: build the corpus (crawling if configured)
    /// and the completion client. Blocks until the crawl is done.
    pub async fn initialize(config: AppConfig) -> Result<Self> {
        let corpus = Corpus::load(&config).await;
        let client = CompletionClient::new(&config);
        tracing::debug!("Using completion endpoint {}", client.url());
        Self::new(config, corpus, Arc::new(client))
    }
}
