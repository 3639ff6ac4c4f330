//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the dashboard and
//! screens. Binaries read the environment; the core only ever sees the resolved values, which
//! keeps tests free of process-wide state.

use crate::constants::DEFAULT_CURRENCY;
use crate::error::{HmsError, HmsResult};
use crate::money::Money;
use crate::store::SeedData;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    seed_file: Option<PathBuf>,
    today: Option<NaiveDate>,
    currency: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            seed_file: None,
            today: None,
            currency: DEFAULT_CURRENCY.to_owned(),
        }
    }
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `today` pins the date used for dashboard counts and for new records; `None` follows the
    /// system clock.
    pub fn new(
        seed_file: Option<PathBuf>,
        today: Option<NaiveDate>,
        currency: impl Into<String>,
    ) -> HmsResult<Self> {
        let currency = currency.into().trim().to_owned();
        if currency.is_empty() {
            return Err(HmsError::InvalidInput("currency label cannot be empty".into()));
        }

        Ok(Self {
            seed_file,
            today,
            currency,
        })
    }

    pub fn seed_file(&self) -> Option<&Path> {
        self.seed_file.as_deref()
    }

    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Renders an amount with the configured currency label, e.g. `Rs. 1,500`.
    pub fn format_amount(&self, amount: Money) -> String {
        format!("{} {}", self.currency, amount)
    }

    /// Loads the configured seed file, or the bundled snapshot when none is configured.
    pub fn load_seed(&self) -> HmsResult<SeedData> {
        match &self.seed_file {
            Some(path) => SeedData::load(path),
            None => SeedData::bundled(),
        }
    }
}

/// Parse a pinned "today" from an optional environment value.
///
/// `None` or blank means "follow the system clock".
pub fn today_from_env_value(value: Option<String>) -> HmsResult<Option<NaiveDate>> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d").map_err(|e| {
                HmsError::InvalidInput(format!("today must be YYYY-MM-DD, got '{v}': {e}"))
            })
        })
        .transpose()
}

/// Resolve a seed file path from an optional environment value.
///
/// A configured path must point at an existing file; a typo should fail at startup rather than
/// silently fall back to the bundled seed.
pub fn seed_file_from_env_value(value: Option<String>) -> HmsResult<Option<PathBuf>> {
    let Some(value) = value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let path = PathBuf::from(value);
    if !path.is_file() {
        return Err(HmsError::InvalidInput(format!(
            "seed file does not exist: {}",
            path.display()
        )));
    }
    Ok(Some(path))
}

/// Resolve the currency label from an optional environment value.
pub fn currency_from_env_value(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned())
}
