use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate_fps: f64,
    /// Quiet period after the last keystroke before the filter runs.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_cards_per_row")]
    pub cards_per_row: u16,
    #[serde(default = "default_cities")]
    pub cities: Vec<String>,
}

fn default_tick_rate() -> f64 {
    30.0
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_cards_per_row() -> u16 {
    3
}

fn default_cities() -> Vec<String> {
    [
        "Zagreb", "Split", "Rijeka", "London", "Paris", "Berlin", "Madrid", "Rome", "Vienna",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_rate_fps: default_tick_rate(),
            debounce_ms: default_debounce_ms(),
            cards_per_row: default_cards_per_row(),
            cities: default_cities(),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config/skycast/config.toml"))
}

pub fn load_config() -> AppConfig {
    let Some(path) = config_path() else {
        return AppConfig::default();
    };

    let Ok(contents) = fs::read_to_string(&path) else {
        return AppConfig::default();
    };

    toml::from_str(&contents).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.cards_per_row, 3);
        assert!(!config.cities.is_empty());
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: AppConfig = toml::from_str("cities = [\"Oslo\", \"Bergen\"]").unwrap();
        assert_eq!(config.cities, vec!["Oslo", "Bergen"]);
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.tick_rate_fps, 30.0);
    }

    #[test]
    fn overrides_apply() {
        let config: AppConfig = toml::from_str("debounce_ms = 150\ncards_per_row = 2").unwrap();
        assert_eq!(config.debounce_ms, 150);
        assert_eq!(config.cards_per_row, 2);
    }
}
