//! Connection settings for the hosted table.

use serde::Deserialize;

pub const DEFAULT_TABLE: &str = "todos";

/// Where the `todos` table lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`. The REST prefix is added
    /// by the client.
    pub url: String,
    /// Anonymous or service key, sent as `apikey` and bearer token.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl StoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            table: default_table(),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}
