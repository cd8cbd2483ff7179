use anyhow::Result;
use visual_lab::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
