use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use url::Url;
use wikifeat_core::pipeline::{DEFAULT_RULES_URL, DEFAULT_SOURCE_URL};
use wikifeat_core::{
    FetchConfig, FileCheckpoint, HttpFetcher, Language, OverlayFetcher, Pipeline, RunConfig, RunOutcome,
    StaticFetcher, TelegramPublisher,
};

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Republish a wiki's featured article to Telegram channels when it changes
#[derive(Parser, Debug)]
#[command(name = "wikifeat")]
#[command(author = "wikifeat contributors")]
#[command(version)]
#[command(about = "Republish a wiki's featured article to Telegram channels when it changes", long_about = None)]
struct Args {
    /// Destination channel (repeatable, or comma-separated in the environment)
    #[arg(long = "channel", value_name = "ID", env = "WIKIFEAT_CHANNELS", value_delimiter = ',')]
    channels: Vec<String>,

    /// Where the "text license" link points
    #[arg(long, value_name = "URL", env = "WIKIFEAT_RULES_URL", default_value = DEFAULT_RULES_URL)]
    rules_url: String,

    /// Wiki page holding the featured article
    #[arg(long, value_name = "URL", env = "WIKIFEAT_SOURCE", default_value = DEFAULT_SOURCE_URL)]
    source: Url,

    /// File remembering the last published title
    #[arg(long, value_name = "FILE", env = "WIKIFEAT_CHECKPOINT", default_value = "last_article.txt")]
    checkpoint: PathBuf,

    /// Publish text only, without resolving an image
    #[arg(long)]
    no_image: bool,

    /// Telegram bot token
    #[arg(long, value_name = "TOKEN", env = "WIKIFEAT_TOKEN", hide_env_values = true, required_unless_present = "dry_run")]
    token: Option<String>,

    /// Caption and console language (ru, en)
    #[arg(long, default_value = "ru", value_name = "LANG")]
    lang: Language,

    /// Print the caption instead of publishing it; the checkpoint is not written
    #[arg(long)]
    dry_run: bool,

    /// With --dry-run, print the located article as JSON
    #[arg(long, requires = "dry_run")]
    json: bool,

    /// Read the source page from a saved HTML snapshot
    #[arg(long, value_name = "FILE")]
    html: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    let labels = args.lang.labels();
    let config = RunConfig::builder()
        .channels(args.channels.iter().filter(|c| !c.trim().is_empty()).cloned())
        .rules_url(&args.rules_url)
        .source_url(args.source.as_str())
        .images(!args.no_image)
        .language(args.lang)
        .build();
    tracing::debug!(channels = ?config.channels, source = %config.source_url, images = config.images, "Configured run");

    let mut fetch_config = FetchConfig { timeout: args.timeout, ..Default::default() };
    if let Some(user_agent) = &args.user_agent {
        fetch_config.user_agent = user_agent.clone();
    }
    let http = HttpFetcher::new(&fetch_config).context("Failed to build HTTP client")?;

    let mut snapshot = StaticFetcher::new();
    if let Some(path) = &args.html {
        if args.verbose {
            echo::print_step(1, 3, &format!("Reading snapshot {}", path.display().bright_white()));
        }
        let html = fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
        snapshot = snapshot.with_page(args.source.as_str(), html);
    } else if args.verbose {
        echo::print_step(1, 3, &format!("Fetching {}", args.source.bright_white().underline()));
    }

    let fetcher = OverlayFetcher::new(snapshot, http);
    let checkpoint = FileCheckpoint::new(&args.checkpoint);
    let pipeline = Pipeline::new(config, fetcher, checkpoint);

    if args.dry_run {
        if args.verbose {
            echo::print_step(2, 3, "Locating featured article");
        }
        let Some(draft) = pipeline.draft().await.context("Failed to locate the featured article")? else {
            println!("{}", labels.unchanged);
            return Ok(());
        };

        if args.verbose {
            echo::print_article_details(&draft.article, &draft.caption);
            echo::print_step(3, 3, "Printing caption (dry run)");
        }

        if args.json {
            let json = serde_json::to_string_pretty(&draft.article).context("Failed to serialize article")?;
            println!("{}", json);
        } else {
            if let Some(photo) = &draft.caption.photo {
                echo::print_info(&format!("Photo: {}", photo));
            }
            println!("{}", draft.caption.text);
        }
        return Ok(());
    }

    let token = args.token.as_deref().unwrap_or_default();
    let publisher = TelegramPublisher::new(token, args.timeout).context("Failed to set up Telegram delivery")?;

    if args.verbose {
        echo::print_step(2, 3, "Locating and publishing featured article");
    }

    match pipeline.run(&publisher).await.context("Run failed")? {
        RunOutcome::Published { title } => {
            if args.verbose {
                echo::print_step(3, 3, "Writing checkpoint");
                echo::print_success(&format!("Checkpoint written to {}", args.checkpoint.display().bright_white()));
            }
            println!("{}: {}", labels.published, title);
        }
        RunOutcome::Unchanged => {
            if args.verbose {
                echo::print_warning("Nothing to publish");
            }
            println!("{}", labels.unchanged);
        }
    }

    Ok(())
}
