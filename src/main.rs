use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

mod generate;
mod imaging;
mod listing;
mod llm;
mod output;
mod pipeline;
mod product;
mod scrape;
mod search;
mod telemetry;

#[derive(Parser)]
#[command(name = "listing-gen", about = "Amazon listing generator: scrape, rewrite, prepare images")]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape one product page into a structured record
    Scrape(scrape::ScrapeCmd),
    /// Scrape a search results page
    Search(search::SearchCmd),
    /// Generate bilingual title, bullets and description
    Generate(generate::GenerateCmd),
    /// Resize and compose product photography
    Image(imaging::ImageCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and LISTING_LOG_FORMAT
    telemetry::config::init_tracing();

    match cli.command {
        Commands::Scrape(args) => scrape::run(args).await?,
        Commands::Search(args) => search::run(args).await?,
        Commands::Generate(args) => generate::run(args).await?,
        Commands::Image(args) => imaging::run(args).await?,
    }

    Ok(())
}
