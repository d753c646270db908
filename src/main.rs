//! Page-Harvest main entry point
//!
//! This is the command-line interface for the Page-Harvest extraction engine.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use page_harvest::config::Config;
use page_harvest::extract::ExtractOptions;
use page_harvest::output::{write_report, OutputFormat};
use page_harvest::product::ProductSelectors;
use page_harvest::scrape::PageOptions;
use page_harvest::Engine;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Page-Harvest: web content extraction and crawling
///
/// Scrapes pages, crawls sites breadth-first, and extracts prices, ratings,
/// contacts, addresses and products from raw HTML. Results are printed as
/// JSON; crawl and compare results can also be rendered as Markdown.
#[derive(Parser, Debug)]
#[command(name = "page-harvest")]
#[command(version)]
#[command(about = "Web content extraction and crawling engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json, global = true)]
    format: Format,

    /// Write the result to a file instead of stdout
    #[arg(short, long, value_name = "FILE", global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape one page: content, headings, links, images, meta, contacts
    Page {
        url: String,

        /// Skip link extraction
        #[arg(long)]
        no_links: bool,

        /// Skip image extraction
        #[arg(long)]
        no_images: bool,

        /// Extra named selector, repeatable
        #[arg(long = "select", value_name = "NAME=CSS", value_parser = parse_named_selector)]
        select: Vec<(String, String)>,
    },

    /// Scrape many pages with bounded concurrency
    Batch {
        #[arg(required = true)]
        urls: Vec<String>,

        /// Concurrent fetches per batch (overrides config)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Crawl a site breadth-first from a start URL
    Crawl {
        url: String,

        /// Maximum pages to return (overrides config)
        #[arg(long)]
        max_pages: Option<usize>,

        /// Maximum link depth (overrides config)
        #[arg(long)]
        max_depth: Option<u32>,

        /// Follow links to other hosts
        #[arg(long)]
        allow_external: bool,
    },

    /// Extract prices, ratings, contacts, addresses and social links
    Extract {
        url: String,

        /// Category to leave out, repeatable
        #[arg(long, value_enum)]
        skip: Vec<Category>,
    },

    /// Extract one product
    Product { url: String },

    /// Scrape product cards from listing pages
    Listing {
        url: String,

        /// Selector matching one element per product
        #[arg(long, value_name = "SELECTOR")]
        item: String,

        /// Selector of the next-page link
        #[arg(long, value_name = "SELECTOR")]
        next: Option<String>,

        /// Maximum products (overrides config)
        #[arg(long)]
        max_products: Option<usize>,

        /// Maximum listing pages (overrides config)
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Compare up to ten products
    Compare {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Markdown,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Markdown => OutputFormat::Markdown,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Category {
    Prices,
    Ratings,
    Contacts,
    Addresses,
    JsonLd,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so results on stdout stay machine-readable.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("page_harvest=info,warn"),
            1 => EnvFilter::new("page_harvest=debug,info"),
            2 => EnvFilter::new("page_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let engine = match &cli.config {
        Some(path) => Engine::from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Engine::new(Config::default())?,
    };
    let format = OutputFormat::from(cli.format);
    let output = cli.output.as_deref();

    match cli.command {
        Command::Page {
            url,
            no_links,
            no_images,
            select,
        } => {
            let options = PageOptions {
                extract_links: !no_links,
                extract_images: !no_images,
                custom_selectors: select.into_iter().collect(),
            };
            let page = engine.scrape_page(&url, &options).await?;
            write_report(&page, format, output)?;
        }

        Command::Batch { urls, concurrency } => {
            let mut options = engine.batch_options(PageOptions::default());
            if let Some(concurrency) = concurrency {
                options.max_concurrent = concurrency;
            }
            let result = engine.scrape_many(&urls, &options).await?;
            write_report(&result, format, output)?;
        }

        Command::Crawl {
            url,
            max_pages,
            max_depth,
            allow_external,
        } => {
            let mut options = engine.crawl_options();
            if let Some(max_pages) = max_pages {
                options.max_pages = max_pages;
            }
            if let Some(max_depth) = max_depth {
                options.max_depth = max_depth;
            }
            if allow_external {
                options.same_domain_only = false;
            }
            let result = engine.crawl(&url, &options).await?;
            write_report(&result, format, output)?;
        }

        Command::Extract { url, skip } => {
            let options = ExtractOptions {
                prices: !skip.contains(&Category::Prices),
                ratings: !skip.contains(&Category::Ratings),
                contacts: !skip.contains(&Category::Contacts),
                addresses: !skip.contains(&Category::Addresses),
                json_ld: !skip.contains(&Category::JsonLd),
            };
            let record = engine.extract(&url, &options).await?;
            write_report(&record, format, output)?;
        }

        Command::Product { url } => {
            let product = engine
                .scrape_product(&url, &ProductSelectors::default())
                .await?;
            write_report(&product, format, output)?;
        }

        Command::Listing {
            url,
            item,
            next,
            max_products,
            max_pages,
        } => {
            let mut options = engine.listing_options(item);
            options.pagination_selector = next;
            if let Some(max_products) = max_products {
                options.max_products = max_products;
            }
            if let Some(max_pages) = max_pages {
                options.max_pages = max_pages;
            }
            let result = engine.scrape_listing(&url, &options).await?;
            write_report(&result, format, output)?;
        }

        Command::Compare { urls } => {
            let result = engine.compare_products(&urls).await?;
            write_report(&result, format, output)?;
        }
    }

    Ok(())
}

/// Parses `NAME=CSS` into its two halves
fn parse_named_selector(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, selector)) if !name.trim().is_empty() && !selector.trim().is_empty() => {
            Ok((name.trim().to_string(), selector.trim().to_string()))
        }
        _ => Err(format!("expected NAME=CSS, got '{}'", raw)),
    }
}
