use anyhow::Result;
use clap::Parser;
use texforged::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    texforge_core::init_tracing(config.json, config.log_level());
    texforged::serve(&config).await
}
