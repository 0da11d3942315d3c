use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod chat;
pub mod crawl;
pub mod invoke;
pub mod serve;

use crate::core::CorpusSource;

#[derive(Subcommand)]
enum Command {
    /// Build the corpus and run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "5000")]
        port: String,

        /// Override INSMART_CORPUS_SOURCE
        #[arg(long, value_enum)]
        corpus: Option<CorpusSource>,
    },
    /// Handle one serverless style HTTP event read from stdin
    Invoke {
        #[arg(long, value_enum)]
        corpus: Option<CorpusSource>,
    },
    /// Start an interactive chat session in the terminal
    Chat {
        #[arg(long, value_enum)]
        corpus: Option<CorpusSource>,
    },
    /// Crawl the site and print the resulting corpus
    Crawl {
        /// Seed URL, defaults to INSMART_HOME_URL
        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        max_pages: Option<usize>,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

/// Logs go to stderr so `invoke` and `crawl` can print their results
/// to stdout.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format! {
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                }
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    init_tracing();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port, corpus }) => {
            serve::run(&host, &port, corpus).await?;
        }
        Some(Command::Invoke { corpus }) => {
            invoke::run(corpus).await?;
        }
        Some(Command::Chat { corpus }) => {
            chat::run(corpus).await?;
        }
        Some(Command::Crawl { url, max_pages }) => {
            crawl::run(url, max_pages).await?;
        }
        None => {}
    }

    Ok(())
}
