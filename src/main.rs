//! CLI entry point for the manga sources tool.

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use clap::Parser;
use manga_sources::{
    Chapter, HttpClient, Manga, Source, SourceRegistry, build_default_source_registry,
};
use serde::Serialize;
use tracing::{debug, info};

mod app_config;
mod cli;

use app_config::{LoadedConfig, load_config};
use cli::{Args, Command, ItemArgs, ListingArgs};

#[derive(Debug, Serialize)]
struct SourceSummary<'a> {
    id: &'a str,
    name: &'a str,
    lang: &'a str,
    base_url: &'a str,
    supports_latest: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    let loaded = load_config(args.config.as_deref())?;

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config verbosity > info
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => loaded
                .config
                .verbosity
                .map_or("info", app_config::VerbositySetting::level),
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");
    if loaded.loaded_from_file {
        info!(path = ?loaded.path, "Loaded configuration file");
    }

    let registry = build_default_source_registry();
    run(&args, &loaded, &registry).await
}

async fn run(args: &Args, loaded: &LoadedConfig, registry: &SourceRegistry) -> Result<()> {
    match &args.command {
        Command::List => {
            let summaries: Vec<SourceSummary<'_>> = registry
                .iter()
                .map(|source| SourceSummary {
                    id: source.id(),
                    name: source.name(),
                    lang: source.lang(),
                    base_url: source.base_url(),
                    supports_latest: source.supports_latest(),
                })
                .collect();
            print_json(&summaries)
        }
        Command::Filters { source } => print_json(&registry.get(source)?.filters()),
        Command::Popular(ListingArgs { source, page }) => {
            let source = registry.get(source)?;
            let client = client_for(args, loaded, source)?;
            print_json(&source.fetch_popular_manga(&client, *page).await?)
        }
        Command::Latest(ListingArgs { source, page }) => {
            let source = registry.get(source)?;
            let client = client_for(args, loaded, source)?;
            print_json(&source.fetch_latest_updates(&client, *page).await?)
        }
        Command::Search {
            listing,
            query,
            filters,
        } => {
            let source = registry.get(&listing.source)?;
            let mut filter_list = source.filters();
            for (key, value) in filters {
                if !filter_list.apply(key, value) {
                    bail!(
                        "Source '{}' has no filter '{key}' accepting '{value}'",
                        source.id()
                    );
                }
            }
            let client = client_for(args, loaded, source)?;
            let page = source
                .fetch_search_manga(&client, listing.page, query, &filter_list)
                .await?;
            print_json(&page)
        }
        Command::Details(ItemArgs { source, url }) => {
            let source = registry.get(source)?;
            let client = client_for(args, loaded, source)?;
            let manga = source
                .fetch_manga_details(&client, &Manga::new(url.as_str(), ""))
                .await
                .with_context(|| format!("Failed to load details for '{url}'"))?;
            print_json(&manga)
        }
        Command::Chapters(ItemArgs { source, url }) => {
            let source = registry.get(source)?;
            let client = client_for(args, loaded, source)?;
            let chapters = source
                .fetch_chapter_list(&client, &Manga::new(url.as_str(), ""))
                .await
                .with_context(|| format!("Failed to load chapters for '{url}'"))?;
            info!(count = chapters.len(), "Chapters loaded");
            print_json(&chapters)
        }
        Command::Pages(ItemArgs { source, url }) => {
            let source = registry.get(source)?;
            let client = client_for(args, loaded, source)?;
            let mut pages = source
                .fetch_page_list(&client, &Chapter::new(url.as_str(), ""))
                .await
                .with_context(|| format!("Failed to load pages for '{url}'"))?;
            for page in &mut pages {
                if page.image_url.is_none() {
                    page.image_url = Some(source.fetch_image_url(&client, page).await?);
                }
            }
            print_json(&pages)
        }
    }
}

/// A client configured from file and flags, with the source's limits declared.
fn client_for(args: &Args, loaded: &LoadedConfig, source: &dyn Source) -> Result<HttpClient> {
    let mut settings = loaded.config.client_settings();
    if args.no_rate_limit {
        settings.enforce_rate_limits = false;
    }
    let client = HttpClient::new(&settings)?;
    client.declare(&source.rate_limits());
    debug!(source = source.id(), client = ?client, "Client ready");
    Ok(client)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
