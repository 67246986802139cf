use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use super::tokens::{DeckConfiguration, Kind};

pub const CONFIG_KEY: &str = "deck-config";

/// Opaque key-value storage for the last used deck configuration
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}

/// Reads the persisted configuration. Anything missing or unreadable falls
/// back to all zero counts.
pub fn load_config(store: &impl SettingsStore) -> DeckConfiguration {
    let Some(raw) = store.get(CONFIG_KEY) else {
        debug!("no saved deck configuration");
        return DeckConfiguration::new();
    };
    parse_config(&raw)
}

pub fn save_config(store: &mut impl SettingsStore, config: &DeckConfiguration) {
    match serde_json::to_string(config) {
        Ok(json) => store.set(CONFIG_KEY, json),
        Err(err) => warn!(%err, "could not serialize deck configuration"),
    }
}

/// Lenient parse: unknown kinds are skipped, bad counts become 0 and large
/// counts are clamped.
pub fn parse_config(raw: &str) -> DeckConfiguration {
    let mut config = DeckConfiguration::new();
    let entries = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(entries)) => entries,
        Ok(other) => {
            warn!(kind = ?other, "saved deck configuration is not an object");
            return config;
        }
        Err(err) => {
            warn!(%err, "saved deck configuration is not valid json");
            return config;
        }
    };
    for (code, value) in entries {
        let Some(kind) = Kind::from_code(&code) else {
            debug!(code, "ignoring unknown token kind");
            continue;
        };
        config.set(kind, value.as_i64().unwrap_or(0));
    }
    config
}
