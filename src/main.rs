use anyhow::Context;
use clap::Parser;
use order_book_engine::cli::{self, Cli};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to install tracing subscriber")?;

    let cli = Cli::parse();
    cli::run(cli)
}
