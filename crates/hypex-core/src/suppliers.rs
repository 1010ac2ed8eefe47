use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::supplier::SupplierTag;
use crate::ConfigError;

/// Currency assumed for feed prices when the file does not say.
pub const DEFAULT_FEED_CURRENCY: &str = "USD";

/// Placeholder substituted with the tracking number in tracking URL templates.
pub const TRACKING_PLACEHOLDER: &str = "{tracking}";

/// Per-supplier adapter settings from `config/suppliers.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierConfig {
    pub supplier: SupplierTag,
    /// Name of the env var holding the supplier API key. The key itself is
    /// never stored in the file.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// JSON product feed used by the sync runner.
    #[serde(default)]
    pub feed_url: Option<String>,
    /// Currency of the prices in `feed_url`.
    #[serde(default = "default_feed_currency")]
    pub feed_currency: String,
    /// e.g. `"https://track.example/{tracking}"`.
    #[serde(default)]
    pub tracking_url_template: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SupplierConfig {
    /// Reads the API key from the env var named by `api_key_env`.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Renders the tracking URL for `tracking_number`, if a template is set.
    #[must_use]
    pub fn tracking_url(&self, tracking_number: &str) -> Option<String> {
        self.tracking_url_template
            .as_deref()
            .map(|template| template.replace(TRACKING_PLACEHOLDER, tracking_number))
    }

    /// Settings with nothing configured, used when the file omits a supplier.
    #[must_use]
    pub fn unconfigured(supplier: SupplierTag) -> Self {
        Self {
            supplier,
            api_key_env: None,
            feed_url: None,
            feed_currency: default_feed_currency(),
            tracking_url_template: None,
            notes: None,
        }
    }
}

fn default_feed_currency() -> String {
    DEFAULT_FEED_CURRENCY.to_string()
}

#[derive(Debug, Default, Deserialize)]
pub struct SuppliersFile {
    #[serde(default)]
    pub suppliers: Vec<SupplierConfig>,
}

impl SuppliersFile {
    /// Settings for `tag`, or an unconfigured entry when absent.
    #[must_use]
    pub fn get(&self, tag: SupplierTag) -> SupplierConfig {
        self.suppliers
            .iter()
            .find(|s| s.supplier == tag)
            .cloned()
            .unwrap_or_else(|| SupplierConfig::unconfigured(tag))
    }
}

/// Load and validate the supplier configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_suppliers(path: &Path) -> Result<SuppliersFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SuppliersFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let suppliers_file: SuppliersFile =
        serde_yaml::from_str(&content).map_err(ConfigError::SuppliersFileParse)?;

    validate_suppliers(&suppliers_file)?;

    Ok(suppliers_file)
}

fn validate_suppliers(suppliers_file: &SuppliersFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in &suppliers_file.suppliers {
        if !seen.insert(entry.supplier) {
            return Err(ConfigError::Validation(format!(
                "duplicate supplier entry: '{}'",
                entry.supplier
            )));
        }

        if let Some(feed_url) = &entry.feed_url {
            let parsed = url::Url::parse(feed_url).map_err(|e| {
                ConfigError::Validation(format!(
                    "supplier '{}' has invalid feed_url '{feed_url}': {e}",
                    entry.supplier
                ))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::Validation(format!(
                    "supplier '{}' feed_url must be http(s), got '{}'",
                    entry.supplier,
                    parsed.scheme()
                )));
            }
        }

        if !matches!(entry.feed_currency.as_str(), "NOK" | "USD" | "EUR") {
            return Err(ConfigError::Validation(format!(
                "supplier '{}' feed_currency must be NOK, USD or EUR, got '{}'",
                entry.supplier, entry.feed_currency
            )));
        }

        if let Some(template) = &entry.tracking_url_template {
            if !template.contains(TRACKING_PLACEHOLDER) {
                return Err(ConfigError::Validation(format!(
                    "supplier '{}' tracking_url_template must contain {TRACKING_PLACEHOLDER}",
                    entry.supplier
                )));
            }
        }

        if entry
            .api_key_env
            .as_deref()
            .is_some_and(|var| var.trim().is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "supplier '{}' has an empty api_key_env",
                entry.supplier
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "suppliers_test.rs"]
mod tests;
