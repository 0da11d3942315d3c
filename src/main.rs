use anyhow::Result;
use insmart_qa::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
