//! sushi-nav: navigation and subgraph data layer for the Sushi front end
//!
//! Modules:
//! - `features` / `menu` / `context`: feature flags, the navigation menu and
//!   the wallet snapshot it is derived from
//! - `graph`: subgraph fetchers behind a deduplicating stale-while-revalidate cache
//! - `views`, `amount`, `oracle`, `tokens`: display models for Kashi and MISO

pub mod amount;
pub mod chain;
pub mod config;
pub mod context;
pub mod features;
pub mod graph;
pub mod i18n;
pub mod menu;
pub mod oracle;
pub mod tokens;
pub mod views;
