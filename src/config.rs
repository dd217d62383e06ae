//! Runtime configuration for sushi-nav
//!
//! Loaded from the environment (with `.env` support) or a TOML file. Covers
//! the subgraph transport, cache freshness, feature flag overrides and the
//! message catalog.

use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::chain::ChainId;
use crate::features::{parse_override, FeatureTable};
use crate::graph::CacheConfig;
use crate::i18n::Catalog;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // ========== Subgraphs ==========
    /// Replaces every chain's graph host when set
    pub graph_host: Option<String>,

    /// HTTP timeout per GraphQL request
    pub request_timeout_secs: u64,

    // ========== Cache ==========
    /// How long a cache entry counts as fresh
    pub dedupe_interval_ms: u64,

    /// Serve stale data while refetching it
    pub revalidate_if_stale: bool,

    // ========== Wallet ==========
    /// Chain assumed before a wallet reports one
    pub default_chain_id: Option<ChainId>,

    // ========== Localisation ==========
    pub locale: String,

    /// TOML message catalog, English built-ins when unset
    pub catalog_path: Option<String>,

    // ========== Feature flags ==========
    /// `feature@chain` entries switched on over the built-in table
    pub features_enabled: Vec<String>,

    /// `feature@chain` entries switched off over the built-in table
    pub features_disabled: Vec<String>,
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup, unknown keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            graph_host: lookup("GRAPH_HOST").filter(|h| !h.trim().is_empty()),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),

            dedupe_interval_ms: lookup("DEDUPE_INTERVAL_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.dedupe_interval_ms),
            revalidate_if_stale: lookup("REVALIDATE_IF_STALE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.revalidate_if_stale),

            default_chain_id: match lookup("DEFAULT_CHAIN_ID") {
                Some(v) if !v.trim().is_empty() => Some(
                    v.parse()
                        .map_err(|_| eyre!("Invalid DEFAULT_CHAIN_ID: {}", v))?,
                ),
                _ => None,
            },

            locale: lookup("LOCALE").unwrap_or(defaults.locale),
            catalog_path: lookup("CATALOG_PATH").filter(|p| !p.trim().is_empty()),

            features_enabled: lookup("FEATURES_ENABLED")
                .map(|s| split_list(&s))
                .unwrap_or_default(),
            features_disabled: lookup("FEATURES_DISABLED")
                .map(|s| split_list(&s))
                .unwrap_or_default(),
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(eyre!("REQUEST_TIMEOUT_SECS must be greater than zero"));
        }

        if let Some(host) = &self.graph_host {
            if !(host.starts_with("http://") || host.starts_with("https://")) {
                return Err(eyre!("GRAPH_HOST must be an http(s) URL (got {})", host));
            }
        }

        for entry in self.features_enabled.iter().chain(&self.features_disabled) {
            parse_override(entry)?;
        }

        if let Some(path) = &self.catalog_path {
            if !Path::new(path).exists() {
                return Err(eyre!("CATALOG_PATH does not exist: {}", path));
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            dedupe_interval: Duration::from_millis(self.dedupe_interval_ms),
            revalidate_if_stale: self.revalidate_if_stale,
        }
    }

    /// Built-in feature table with the configured overrides applied
    pub fn feature_table(&self) -> Result<FeatureTable> {
        let mut table = FeatureTable::builtin();
        table.apply_overrides(&self.features_enabled, &self.features_disabled)?;
        Ok(table)
    }

    pub fn catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            Some(path) => Catalog::from_file(path),
            None => Ok(Catalog::english()),
        }
    }

    pub fn print_summary(&self) {
        let chain = self
            .default_chain_id
            .map(|c| format!("{} ({})", c.name(), c))
            .unwrap_or_else(|| "none".to_string());

        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║                SUSHI NAV - CONFIGURATION                   ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ SUBGRAPHS                                                  ║");
        let host = self.graph_host.as_deref().unwrap_or("per chain");
        println!("║ • Graph Host:      {:^40} ║", host);
        println!("║ • Timeout:         {:>38} s ║", self.request_timeout_secs);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ CACHE                                                      ║");
        println!("║ • Dedupe Interval: {:>37} ms ║", self.dedupe_interval_ms);
        let revalidate = if self.revalidate_if_stale {
            "✓ Enabled"
        } else {
            "✗ Disabled"
        };
        println!("║ • Stale Revalidate:{:^40} ║", revalidate);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ WALLET                                                     ║");
        println!("║ • Default Chain:   {:^40} ║", chain);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ LOCALE                                                     ║");
        println!("║ • Locale:          {:^40} ║", self.locale);
        let catalog = self.catalog_path.as_deref().unwrap_or("built-in");
        println!("║ • Catalog:         {:^40} ║", catalog);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ FEATURE OVERRIDES                                          ║");
        println!("║ • Enabled:         {:^40} ║", self.features_enabled.len());
        println!("║ • Disabled:        {:^40} ║", self.features_disabled.len());
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            graph_host: None,
            request_timeout_secs: 15,
            dedupe_interval_ms: 2000,
            revalidate_if_stale: true,
            default_chain_id: None,
            locale: "en".to_string(),
            catalog_path: None,
            features_enabled: vec![],
            features_disabled: vec![],
        }
    }
}
