use std::collections::BTreeMap;
use std::path::PathBuf;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Recognized configuration for the validator.
///
/// Every field has a production default; construct with
/// `ValidatorConfig::default()` and override what differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Directory holding cached XSD blobs and their sidecar records.
    pub schema_cache_dir: PathBuf,
    /// Base URL the schema fetcher resolves schema names against.
    pub schema_base_url: String,
    /// Hours a cached schema stays fresh before a refetch is attempted.
    pub schema_refresh_hours: u32,
    /// Timeout for schema fetches and registry lookups.
    pub http_timeout_seconds: u64,
    /// Absolute tolerance for monetary comparisons.
    pub monetary_tolerance: Decimal,
    /// Consumidor-final cap in GTQ; documents at or above it are rejected.
    pub max_cf_amount_gtq: Decimal,
    /// Maximum days between emission and certification.
    pub max_emission_days_back: i64,
    /// Rulebook edition surfaced in every verdict for audit.
    pub rulebook_version: String,
    /// GTQ per unit of foreign currency, keyed by ISO-4217 code.
    /// The CF cap is skipped with a warning for currencies not listed here.
    pub gtq_rates: BTreeMap<String, Decimal>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            schema_cache_dir: PathBuf::from("schema-cache"),
            schema_base_url: "https://cat.sat.gob.gt/xsd/alfa/".to_string(),
            schema_refresh_hours: 24,
            http_timeout_seconds: 30,
            monetary_tolerance: dec!(0.01),
            max_cf_amount_gtq: dec!(2500.00),
            max_emission_days_back: 5,
            rulebook_version: "1.7.9".to_string(),
            gtq_rates: BTreeMap::new(),
        }
    }
}

impl ValidatorConfig {
    /// GTQ conversion rate for `currency`, if configured. GTQ itself is 1.
    pub fn gtq_rate(&self, currency: &str) -> Option<Decimal> {
        if currency == "GTQ" {
            return Some(Decimal::ONE);
        }
        self.gtq_rates.get(currency).copied()
    }
}
