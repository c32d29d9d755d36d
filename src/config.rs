use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::TenorPolicy;
use crate::decimal::Rate;
use crate::errors::{FinancingError, Result};
use crate::payments::InstallmentCalculator;

/// default margin rate (20% a year, flat)
pub const DEFAULT_MARGIN_RATE_BPS: u32 = 2000;

/// calendar format accepted for `start_date`
pub const DEFAULT_START_DATE_FORMAT: &str = "%Y-%m-%d";

/// financing service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancingConfig {
    pub margin_rate: Rate,
    pub allowed_tenors: TenorPolicy,
    pub start_date_format: String,
    pub server: ServerConfig,
}

/// http listener configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for FinancingConfig {
    fn default() -> Self {
        Self {
            margin_rate: Rate::from_bps(DEFAULT_MARGIN_RATE_BPS),
            allowed_tenors: TenorPolicy::standard(),
            start_date_format: DEFAULT_START_DATE_FORMAT.to_string(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

impl FinancingConfig {
    /// parse configuration from json, missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| FinancingError::InvalidConfiguration {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| FinancingError::InvalidConfiguration {
            message: format!("reading {}: {}", path.display(), e),
        })?;
        Self::from_json(&json)
    }

    /// load from an optional file, then apply `FINANCING_*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// apply overrides from a key lookup
    ///
    /// Recognised keys: `FINANCING_MARGIN_RATE` (decimal fraction),
    /// `FINANCING_ALLOWED_TENORS` (comma separated months) and
    /// `FINANCING_BIND_ADDRESS`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(raw) = lookup("FINANCING_MARGIN_RATE") {
            let rate = Decimal::from_str(raw.trim()).map_err(|e| FinancingError::InvalidConfiguration {
                message: format!("FINANCING_MARGIN_RATE: {}", e),
            })?;
            self.margin_rate = Rate::from_decimal(rate);
        }

        if let Some(raw) = lookup("FINANCING_ALLOWED_TENORS") {
            let tenors = raw
                .split(',')
                .map(|part| part.trim().parse::<u32>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| FinancingError::InvalidConfiguration {
                    message: format!("FINANCING_ALLOWED_TENORS: {}", e),
                })?;
            self.allowed_tenors = TenorPolicy::new(tenors)?;
        }

        if let Some(addr) = lookup("FINANCING_BIND_ADDRESS") {
            self.server.bind_address = addr;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.margin_rate.is_negative() {
            return Err(FinancingError::InvalidConfiguration {
                message: format!("margin rate must not be negative: {}", self.margin_rate),
            });
        }
        if self.start_date_format.trim().is_empty() {
            return Err(FinancingError::InvalidConfiguration {
                message: "start date format must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn calculator(&self) -> InstallmentCalculator {
        InstallmentCalculator::new(self.margin_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = FinancingConfig::default();
        assert_eq!(config.margin_rate, Rate::from_decimal(dec!(0.20)));
        assert_eq!(config.allowed_tenors.allowed(), &[6, 12, 18, 24, 30, 36]);
        assert_eq!(config.start_date_format, "%Y-%m-%d");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = FinancingConfig::from_json(r#"{"margin_rate": 0.15}"#).unwrap();
        assert_eq!(config.margin_rate, Rate::from_decimal(dec!(0.15)));
        assert_eq!(config.allowed_tenors, TenorPolicy::standard());
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_full_json() {
        let config = FinancingConfig::from_json(
            r#"{
                "margin_rate": 0.1,
                "allowed_tenors": [12, 24],
                "start_date_format": "%d/%m/%Y",
                "server": {"bind_address": "127.0.0.1:3000"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.allowed_tenors.allowed(), &[12, 24]);
        assert_eq!(config.start_date_format, "%d/%m/%Y");
        assert_eq!(config.server.bind_address, "127.0.0.1:3000");
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(FinancingConfig::from_json(r#"{"margin_rate": -0.2}"#).is_err());
        assert!(FinancingConfig::from_json(r#"{"allowed_tenors": []}"#).is_err());
        assert!(FinancingConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("FINANCING_MARGIN_RATE", "0.25"),
            ("FINANCING_ALLOWED_TENORS", "36, 6,12"),
            ("FINANCING_BIND_ADDRESS", "127.0.0.1:9000"),
        ]);

        let config = FinancingConfig::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.margin_rate, Rate::from_percentage(25));
        assert_eq!(config.allowed_tenors.allowed(), &[6, 12, 36]);
        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let result = FinancingConfig::default().with_overrides(|key| {
            (key == "FINANCING_ALLOWED_TENORS").then(|| "6,twelve".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_calculator_uses_configured_rate() {
        let config = FinancingConfig::from_json(r#"{"margin_rate": 0.1}"#).unwrap();
        assert_eq!(config.calculator().margin_rate(), Rate::from_percentage(10));
    }
}
