//! th0rn0 CLI - command-line front end for the th0rn0 tools
//!
//! Runs the greeting, clock and web search tools directly from a shell.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use th0rn0::{
    config::{CACHE_TTL_VAR, GOOGLE_API_KEY_VAR, GOOGLE_CSE_ID_VAR, REQUEST_TIMEOUT_VAR},
    tools, GoogleCredentials, SearchAggregator, SearchConfig, SearchResult,
};

#[derive(Parser)]
#[command(name = "th0rn0")]
#[command(about = "Greeting, clock and web search tools (Google & DuckDuckGo)")]
#[command(version)]
struct Cli {
    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a greeting
    Greet {
        /// Who to greet
        name: String,
    },

    /// Print the current local time
    Time,

    /// Search Google and DuckDuckGo
    Search {
        /// Search query
        #[arg(value_name = "QUERY")]
        query: String,

        /// Maximum number of results
        #[arg(short = 'n', long, default_value = "20")]
        num_results: usize,

        /// Google API key
        #[arg(long, env = GOOGLE_API_KEY_VAR, hide_env_values = true)]
        google_api_key: Option<String>,

        /// Google programmable search engine id
        #[arg(long, env = GOOGLE_CSE_ID_VAR)]
        google_cse_id: Option<String>,

        /// Per-request timeout in seconds
        #[arg(long, env = REQUEST_TIMEOUT_VAR, default_value = "5")]
        timeout: u64,

        /// Cache time-to-live in seconds
        #[arg(long, env = CACHE_TTL_VAR, default_value = "600")]
        cache_ttl: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// List the tool definitions offered to a host runtime
    Tools,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
    Simple,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Command::Greet { name } => println!("{}", tools::greet(&name)),
        Command::Time => println!("{}", tools::get_time()),
        Command::Tools => {
            println!("{}", serde_json::to_string_pretty(&tools::tool_definitions())?);
        }
        Command::Search {
            query,
            num_results,
            google_api_key,
            google_cse_id,
            timeout,
            cache_ttl,
            format,
        } => {
            let config = SearchConfig {
                google: GoogleCredentials::from_parts(google_api_key, google_cse_id),
                request_timeout_seconds: timeout,
                cache_ttl_seconds: cache_ttl,
                ..Default::default()
            };
            handle_search(&query, num_results, config, &format).await?;
        }
    }

    Ok(())
}

async fn handle_search(
    query: &str,
    num_results: usize,
    config: SearchConfig,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    if query.trim().is_empty() {
        eprintln!("{}", "Error: Search query is required".red());
        eprintln!("Usage: th0rn0 search \"your search query\" -n 10");
        std::process::exit(1);
    }

    if config.google.is_none() {
        eprintln!(
            "{}",
            format!("Google is not configured (set {GOOGLE_API_KEY_VAR} and {GOOGLE_CSE_ID_VAR}); using DuckDuckGo only")
                .yellow()
        );
    }

    let aggregator = SearchAggregator::from_config(&config).context("invalid configuration")?;
    let results = aggregator
        .search(query, num_results)
        .await
        .context("search failed")?;

    display_results(&results, format)?;
    Ok(())
}

fn display_results(results: &[SearchResult], format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results)?);
        }
        OutputFormat::Simple => {
            for (i, result) in results.iter().enumerate() {
                println!("{}. {}", i + 1, result.title.as_deref().unwrap_or("(untitled)"));
                if let Some(url) = &result.url {
                    println!("   {url}");
                }
                println!();
            }
        }
        OutputFormat::Table => {
            println!("{}", "Search Results".bold());
            println!("{}", "─".repeat(80).dimmed());

            for (i, result) in results.iter().enumerate() {
                let title = result.title.as_deref().unwrap_or("(untitled)");
                match &result.url {
                    Some(url) => {
                        println!("{}. {}", (i + 1).to_string().bold(), title.bold());
                        println!("   🔗 {}", url.blue().underline());
                    }
                    // provider failures carry no url
                    None => println!("{}. {}", (i + 1).to_string().bold(), title.red()),
                }
                println!();
            }

            println!("{} {}", "Total results:".bold(), results.len().to_string().bold());
        }
    }
    Ok(())
}
