use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::classify::PoiFilter;
use crate::error::{ExtractError, Result};

/// Optional TOML configuration for the extractor.
///
/// ```toml
/// [filter]
/// key = "amenity"
/// value = "pub"
/// ```
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub filter: FilterConfig,
}

/// Each field falls back to the built-in `amenity=pub` default when unset.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FilterConfig {
    pub key: Option<String>,
    pub value: Option<String>,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ExtractError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ExtractError::Config(e.to_string()))
    }

    /// Resolve the filter: explicit overrides, then the file, then defaults.
    pub fn poi_filter(&self, key: Option<&str>, value: Option<&str>) -> PoiFilter {
        let default = PoiFilter::default();
        let key = key
            .map(str::to_string)
            .or_else(|| self.filter.key.clone())
            .unwrap_or(default.key);
        let value = value
            .map(str::to_string)
            .or_else(|| self.filter.value.clone())
            .unwrap_or(default.value);
        PoiFilter::new(key, value)
    }
}
