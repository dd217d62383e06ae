//! sushi-nav - menu, feature flags and cached subgraph queries from the command line
//!
//! Run with: cargo run -- menu --chain 1 --account 0xABC

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sushi_nav::chain::ChainId;
use sushi_nav::config::Config;
use sushi_nav::context::{wallet_context, WalletContext};
use sushi_nav::features::{openmev_available, openmev_uri, Feature, FeatureTable};
use sushi_nav::graph::{GraphHooks, QueryOptions, Resource, SubgraphClient};
use sushi_nav::menu::{Menu, MenuBuilder, MenuItem};

#[derive(Parser)]
#[command(name = "sushi-nav")]
#[command(about = "Navigation menu, feature flags and subgraph queries for the Sushi front end")]
#[command(version)]
struct Cli {
    /// Skip the banner and configuration summary
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the menu for a chain and account
    Menu {
        #[arg(long)]
        chain: Option<ChainId>,
        #[arg(long)]
        account: Option<String>,
        /// Print the menu as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the feature matrix
    Features {
        #[arg(long)]
        chain: Option<ChainId>,
    },
    /// Run one cached subgraph query
    Query {
        /// Resource name, e.g. kashiPairs or bento-tokens
        resource: String,
        #[arg(long)]
        chain: Option<ChainId>,
        /// Query variables as a JSON object
        #[arg(long)]
        vars: Option<String>,
    },
    /// Read "chain [account]" lines from stdin and print the menu on every change
    Watch,
}

fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!("{}", style(" 🍣 SUSHI NAV - Menu & Subgraph Explorer").cyan().bold());
    println!(
        "{}",
        style("    Feature Flags | Wallet Context | SWR Subgraph Cache").cyan()
    );
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

fn print_menu(menu: &Menu) {
    if menu.is_empty() {
        println!("{}", style("(empty menu)").dim());
        return;
    }
    for item in menu {
        match item {
            MenuItem::Leaf(leaf) => {
                println!(
                    "{} {:<30} {}",
                    style("•").cyan(),
                    style(&leaf.title).bold(),
                    style(&leaf.link).dim()
                );
            }
            MenuItem::Node(node) => {
                println!("{} {}", style("▸").cyan(), style(&node.title).bold());
                for leaf in &node.items {
                    println!("    {:<30} {}", leaf.title, style(&leaf.link).dim());
                }
            }
        }
    }
}

fn print_features(table: &FeatureTable, chain: Option<ChainId>) {
    let chains = match chain {
        Some(chain) => vec![chain],
        None => table.chains(),
    };

    for chain in chains {
        let enabled = table.features_on(chain);
        println!(
            "{} {} ({})",
            style("▸").cyan(),
            style(chain.name()).bold(),
            chain
        );
        for feature in Feature::ALL {
            let mark = if enabled.contains(&feature) {
                style("✓").green()
            } else {
                style("✗").red()
            };
            println!("    {} {}", mark, feature);
        }
        let openmev = if openmev_available(Some(chain)) {
            format!("✓ {}", openmev_uri(chain).unwrap_or_default())
        } else {
            "✗".to_string()
        };
        println!("    OpenMEV: {}", openmev);
    }
}

/// `"137 0xABC"` → (chain, account); a blank line or `-` disconnects
fn parse_wallet_event(line: &str) -> Result<WalletContext> {
    let mut parts = line.split_whitespace();
    let chain = match parts.next() {
        None | Some("-") => return Ok(WalletContext::default()),
        Some(chain) => chain
            .parse::<ChainId>()
            .map_err(|_| eyre!("Invalid chain id: {}", chain))?,
    };
    let account = parts.next().map(String::from);
    Ok(WalletContext::new(Some(chain), account))
}

async fn run_query(
    config: &Config,
    features: Arc<FeatureTable>,
    resource: &str,
    chain: Option<ChainId>,
    vars: Option<String>,
) -> Result<()> {
    let resource: Resource = resource.parse()?;
    let variables: Value = match vars {
        Some(vars) => serde_json::from_str(&vars).map_err(|e| eyre!("Invalid --vars JSON: {}", e))?,
        None => Value::Null,
    };

    let client = SubgraphClient::http(config.request_timeout(), config.graph_host.clone())?;
    let hooks = GraphHooks::new(client, features, config.cache_config());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
    spinner.set_message(format!("Querying {}...", resource));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let start = Instant::now();
    let options = QueryOptions {
        chain_id: chain.or(config.default_chain_id),
        variables,
        ..Default::default()
    };
    let state = hooks.query(resource, options).await;
    spinner.finish_and_clear();

    if let Some(err) = &state.error {
        error!("{} failed: {}", resource, err);
        return Err(eyre!("{} failed: {}", resource, err));
    }
    match &state.data {
        Some(data) => {
            println!("{}", serde_json::to_string_pretty(data.as_ref())?);
            println!(
                "{} {} fetched in {:?} ({} request(s))",
                style("✓").green(),
                resource,
                start.elapsed(),
                hooks.cache().request_count()
            );
        }
        None => warn!(
            "Nothing fetched: no chain given or fetching is switched off for {}",
            resource
        ),
    }
    Ok(())
}

fn menu_changed(last: &Arc<Menu>, menu: &Arc<Menu>) -> bool {
    !Arc::ptr_eq(last, menu)
}

async fn run_watch(builder: Arc<MenuBuilder>, default_chain: Option<ChainId>) -> Result<()> {
    let (writer, mut reader) = wallet_context();
    if default_chain.is_some() {
        writer.update(WalletContext::new(default_chain, None));
    }
    let initial = builder.menu(&reader.snapshot());
    print_menu(&initial);

    let printer = {
        let builder = builder.clone();
        tokio::spawn(async move {
            // The default chain update above is still pending on this reader
            let mut last = initial;
            while let Some(context) = reader.changed().await {
                let menu = builder.menu(&context);
                if !menu_changed(&last, &menu) {
                    continue;
                }
                println!();
                println!(
                    "{}",
                    style(format!(
                        "── chain={} account={} ──",
                        context.chain_id.map(|c| c.to_string()).unwrap_or_else(|| "-".into()),
                        context.account().unwrap_or("-")
                    ))
                    .magenta()
                );
                print_menu(&menu);
                last = menu;
            }
        })
    };

    info!("Waiting for wallet events on stdin (\"chain [account]\", \"-\" to disconnect)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_wallet_event(&line) {
            Ok(context) => {
                writer.update(context);
            }
            Err(e) => warn!("{}", e),
        }
    }

    drop(writer);
    printer.await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sushi_nav=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        error!("Please check your .env file");
        return Err(e);
    }

    if !cli.quiet {
        print_banner();
        config.print_summary();
        println!();
    }

    let features = Arc::new(config.feature_table()?);
    let catalog = config.catalog()?;
    if catalog.locale() != config.locale {
        warn!(
            "LOCALE is {} but the catalog provides {}",
            config.locale,
            catalog.locale()
        );
    }

    match cli.command {
        Commands::Menu { chain, account, json } => {
            let builder = MenuBuilder::new(features, catalog);
            let menu = builder.menu_for(chain.or(config.default_chain_id), account.as_deref());
            if json {
                println!("{}", serde_json::to_string_pretty(menu.as_ref())?);
            } else {
                print_menu(&menu);
            }
        }
        Commands::Features { chain } => {
            print_features(&features, chain);
        }
        Commands::Query { resource, chain, vars } => {
            run_query(&config, features, &resource, chain, vars).await?;
        }
        Commands::Watch => {
            let builder = Arc::new(MenuBuilder::new(features, catalog));
            run_watch(builder, config.default_chain_id).await?;
        }
    }

    Ok(())
}
