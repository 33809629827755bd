// search-sync: administrative client for the search index
//
// Reads the connection from SEARCH_* environment variables and talks to the
// search server directly, without a primary store.

use anyhow::{Context, Result, bail};
use search_index_sync::search::dispatch::{IndexTransport, SolrHttpTransport};
use search_index_sync::search::query::{group_hits, parse_select_response};
use search_index_sync::{SearchConfig, log_search_operation};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: search-sync <query TEXT... | ping>";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_default();

    let config = SearchConfig::from_env().context("Failed to load search configuration")?;
    let transport = SolrHttpTransport::new(&config)?;

    match command.as_str() {
        "query" => {
            let text = args.collect::<Vec<_>>().join(" ");
            if text.trim().is_empty() {
                bail!(USAGE);
            }
            run_query(&transport, &text, config.rows()).await
        }
        "ping" => ping(&transport, &config).await,
        _ => bail!(USAGE),
    }
}

/// Print matching ids per entry type, in ranking order
async fn run_query(transport: &SolrHttpTransport, text: &str, rows: Option<u32>) -> Result<()> {
    let body = log_search_operation!(transport.select(text, rows).await, text)?;
    let hits = parse_select_response(&body)?;
    if hits.is_empty() {
        println!("no matches for {text:?}");
        return Ok(());
    }

    for (entry_type, ids) in group_hits(hits) {
        let ids: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        println!("{entry_type} ({}): {}", ids.len(), ids.join(", "));
    }
    Ok(())
}

async fn ping(transport: &SolrHttpTransport, config: &SearchConfig) -> Result<()> {
    let start = std::time::Instant::now();
    let body = transport
        .select("*:*", Some(0))
        .await
        .with_context(|| format!("Search server at {} is unreachable", config.base_url()))?;
    parse_select_response(&body).context("Search server answered with an unexpected body")?;

    println!(
        "search server at {} is up ({} ms)",
        config.base_url(),
        start.elapsed().as_millis()
    );
    Ok(())
}
