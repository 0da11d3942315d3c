use anyhow::Result;

use crate::api::{self, AppState};
use crate::core::{AppConfig, CorpusSource};

/// Config from the environment with an optional override of the
/// corpus source from the command line.
pub fn config_with(corpus: Option<CorpusSource>) -> AppConfig {
    let mut config = AppConfig::default();
    if let Some(source) = corpus {
        config.corpus_source = source;
    }
    config
}

pub async fn run(host: &str, port: &str, corpus: Option<CorpusSource>) -> Result<()> {
    let app_state = AppState::initialize(config_with(corpus)).await?;
    api::serve(host, port, app_state).await
}
