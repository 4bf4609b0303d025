//! Ledger configuration.

use crate::error::LedgerError;
use config::{Config as Cfg, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Flat tax rate applied when an invoice draft carries line items but no
    /// explicit rate.
    #[serde(default = "default_tax_rate")]
    pub default_tax_rate: Decimal,

    /// Upper bound on a single reminder dispatch. Dispatch must never block
    /// ledger mutations.
    #[serde(default = "default_reminder_timeout_ms")]
    pub reminder_timeout_ms: u64,
}

fn default_tax_rate() -> Decimal {
    Decimal::ZERO
}

fn default_reminder_timeout_ms() -> u64 {
    5_000
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_tax_rate: default_tax_rate(),
            reminder_timeout_ms: default_reminder_timeout_ms(),
        }
    }
}

impl LedgerConfig {
    pub fn load() -> Result<Self, LedgerError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn reminder_timeout(&self) -> Duration {
        Duration::from_millis(self.reminder_timeout_ms)
    }
}
