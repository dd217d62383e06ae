//! Diagnostic tool - Check configuration and subgraph coverage
//!
//! Run with: cargo run --bin diagnose

use std::env;

use sushi_nav::chain::ChainId;
use sushi_nav::config::Config;
use sushi_nav::features::openmev_available;
use sushi_nav::graph::{Endpoints, Service};

fn main() {
    println!("🔍 SUSHI NAV DIAGNOSTIC CHECK\n");

    // Load .env
    dotenvy::dotenv().ok();

    println!("═══════════════════════════════════════════════════");
    println!("                  CONFIGURATION                     ");
    println!("═══════════════════════════════════════════════════\n");

    let checks = [
        ("GRAPH_HOST", "per chain", "Subgraph host override"),
        ("REQUEST_TIMEOUT_SECS", "15", "HTTP timeout per request"),
        ("DEDUPE_INTERVAL_MS", "2000", "Cache freshness window"),
        ("REVALIDATE_IF_STALE", "true", "Serve stale data while refetching?"),
        ("DEFAULT_CHAIN_ID", "none", "Chain before a wallet connects"),
        ("LOCALE", "en", "Menu language"),
        ("CATALOG_PATH", "built-in", "Message catalog file"),
        ("FEATURES_ENABLED", "", "Extra feature@chain flags"),
        ("FEATURES_DISABLED", "", "Removed feature@chain flags"),
    ];

    for (key, default, desc) in checks {
        let value = env::var(key).unwrap_or_else(|_| default.to_string());
        let is_default = env::var(key).is_err();
        let marker = if is_default { "(default)" } else { "(from .env)" };
        println!("  {}: {} {}", key, value, marker);
        println!("    └─ {}\n", desc);
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("  ❌ Could not load configuration: {}", e);
            return;
        }
    };

    match config.validate() {
        Ok(()) => println!("  ✅ Configuration is valid"),
        Err(e) => println!("  ❌ Configuration invalid: {}", e),
    }

    println!("\n═══════════════════════════════════════════════════");
    println!("                SUBGRAPH COVERAGE                   ");
    println!("═══════════════════════════════════════════════════\n");

    let endpoints = Endpoints::new(config.graph_host.clone());
    for chain in ChainId::KNOWN {
        println!("  {} ({})", chain.name(), chain);
        for service in [Service::BentoBox, Service::Blocks, Service::Miso] {
            match endpoints.resolve(service, chain) {
                Some(url) => println!("    ✅ {:<9} {}", service, url),
                None => println!("    ❌ {:<9} not deployed", service),
            }
        }
        if openmev_available(Some(chain)) {
            println!("    ✅ openmev   available");
        }
        println!();
    }

    println!("\n═══════════════════════════════════════════════════");
    println!("                   FEATURE FLAGS                    ");
    println!("═══════════════════════════════════════════════════\n");

    match config.feature_table() {
        Ok(table) => {
            for chain in table.chains() {
                let names: Vec<String> =
                    table.features_on(chain).iter().map(|f| f.to_string()).collect();
                println!("  {:<16} {}", chain.name(), names.join(", "));
            }
        }
        Err(e) => println!("  ❌ Invalid feature override: {}", e),
    }

    println!("\n✅ Diagnostic complete!\n");
}
