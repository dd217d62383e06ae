//! Message catalog for menu titles.
//!
//! Source strings are English and double as message ids. A catalog maps them
//! to another locale; anything missing falls through untranslated.

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub locale: String,
    #[serde(default)]
    pub messages: HashMap<String, String>,
}

impl Catalog {
    /// Identity catalog for the source locale
    pub fn english() -> Self {
        Self { locale: "en".to_string(), messages: HashMap::new() }
    }

    /// Load a TOML catalog:
    ///
    /// ```toml
    /// locale = "fr"
    /// [messages]
    /// Swap = "Échanger"
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let catalog: Self = toml::from_str(&content)?;
        Ok(catalog)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn translate(&self, message: &str) -> String {
        self.messages
            .get(message)
            .cloned()
            .unwrap_or_else(|| message.to_string())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::english()
    }
}
