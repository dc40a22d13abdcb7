use clap::Parser;
use hypem_tracks::{ClientConfig, HypemClientImpl, PageRequest, DEFAULT_BASE_URL};

/// Fetch one Hype Machine listing page as JSON track records
#[derive(Parser)]
#[command(
    name = "hypem-tracks",
    about = "Fetch one Hype Machine listing page as JSON track records",
    long_about = None
)]
struct Cli {
    /// Collection name, e.g. "popular" or "latest"
    collection: String,

    /// Listing mode, e.g. "3day" or "now"
    mode: String,

    /// Page number
    page: u32,

    /// Sort order (accepted for compatibility, not sent upstream)
    #[arg(long)]
    sort: Option<String>,

    /// Upstream base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Maximum number of track URL requests in flight
    #[arg(long, default_value = "4")]
    concurrency: usize,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Log the decoded listing page data
    #[arg(long)]
    dump_page: bool,

    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let default_level = if args.verbose || args.dump_page {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    let config = ClientConfig::new()
        .with_base_url(args.base_url)
        .with_resolve_concurrency(args.concurrency)
        .with_page_dump_level(args.dump_page.then_some(log::Level::Debug));

    let http_client = http_client::native::NativeClient::new();
    let client = HypemClientImpl::with_config(Box::new(http_client), config);

    let request = PageRequest::new(args.collection, args.mode, args.page).with_sort(args.sort);

    let tracks = match client.fetch_page(&request).await {
        Ok(tracks) => tracks,
        Err(e) => {
            eprintln!("❌ Failed to fetch page: {e}");
            std::process::exit(1);
        }
    };

    if args.verbose {
        eprintln!("✅ Assembled {} tracks", tracks.len());
    }

    let output = if args.pretty {
        serde_json::to_string_pretty(&tracks)?
    } else {
        serde_json::to_string(&tracks)?
    };
    println!("{output}");

    Ok(())
}
