use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::domain::PaymentMethod;
use crate::product_actor::StockThresholds;
use crate::reservation::ExpiryPolicy;

/// Shop configuration, read from environment variables.
///
/// Every value has a default; unparsable or out-of-range values fall back to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Collection window for cash orders, in minutes
    pub cash_expiry_minutes: i64,
    /// Collection window for mobile-money orders, in minutes
    pub mobile_money_expiry_minutes: i64,
    /// Flat fee added to every order
    pub service_fee: Decimal,
    pub low_stock_threshold: u32,
    pub critical_stock_threshold: u32,
    /// How often pending orders are checked for expiry
    pub sweep_interval: Duration,
    /// Mailbox capacity of every actor
    pub actor_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cash_expiry_minutes: 15,
            mobile_money_expiry_minutes: 60,
            service_fee: Decimal::new(50, 2),
            low_stock_threshold: 7,
            critical_stock_threshold: 5,
            sweep_interval: Duration::from_secs(5),
            actor_buffer_size: 100,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; `from_env` uses the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            cash_expiry_minutes: parse_var(&lookup, "CASH_EXPIRY_MINUTES")
                .filter(|&minutes: &i64| minutes > 0)
                .unwrap_or(defaults.cash_expiry_minutes),
            mobile_money_expiry_minutes: parse_var(&lookup, "MOBILE_MONEY_EXPIRY_MINUTES")
                .filter(|&minutes: &i64| minutes > 0)
                .unwrap_or(defaults.mobile_money_expiry_minutes),
            service_fee: parse_var(&lookup, "SERVICE_FEE").unwrap_or(defaults.service_fee),
            low_stock_threshold: parse_var(&lookup, "LOW_STOCK_THRESHOLD").unwrap_or(defaults.low_stock_threshold),
            critical_stock_threshold: parse_var(&lookup, "CRITICAL_STOCK_THRESHOLD")
                .unwrap_or(defaults.critical_stock_threshold),
            sweep_interval: parse_var(&lookup, "EXPIRY_SWEEP_INTERVAL_SECS")
                .filter(|&secs: &u64| secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
            actor_buffer_size: parse_var(&lookup, "ACTOR_BUFFER_SIZE")
                .filter(|&size: &usize| size > 0)
                .unwrap_or(defaults.actor_buffer_size),
        }
    }

    pub fn expiry_policy(&self) -> ExpiryPolicy {
        ExpiryPolicy::new(chrono::Duration::minutes(self.cash_expiry_minutes))
            .with_window(PaymentMethod::Cash, chrono::Duration::minutes(self.cash_expiry_minutes))
            .with_window(
                PaymentMethod::MobileMoney,
                chrono::Duration::minutes(self.mobile_money_expiry_minutes),
            )
    }

    pub fn stock_thresholds(&self) -> StockThresholds {
        StockThresholds {
            low: self.low_stock_threshold,
            critical: self.critical_stock_threshold,
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.service_fee, dec!(0.50));
        assert_eq!(config.expiry_policy(), ExpiryPolicy::default());
        assert_eq!(config.stock_thresholds(), StockThresholds::default());
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("CASH_EXPIRY_MINUTES", "10"),
            ("SERVICE_FEE", " 0.75 "),
            ("EXPIRY_SWEEP_INTERVAL_SECS", "1"),
            ("LOW_STOCK_THRESHOLD", "lots"),
            ("ACTOR_BUFFER_SIZE", "0"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.cash_expiry_minutes, 10);
        assert_eq!(config.expiry_policy().window(PaymentMethod::Cash), chrono::Duration::minutes(10));
        assert_eq!(config.service_fee, dec!(0.75));
        assert_eq!(config.sweep_interval, Duration::from_secs(1));
        assert_eq!(config.low_stock_threshold, 7);
        assert_eq!(config.actor_buffer_size, 100);
    }

    #[test]
    fn test_non_positive_durations_fall_back() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("CASH_EXPIRY_MINUTES", "0"),
            ("MOBILE_MONEY_EXPIRY_MINUTES", "-30"),
            ("EXPIRY_SWEEP_INTERVAL_SECS", "0"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.cash_expiry_minutes, 15);
        assert_eq!(config.mobile_money_expiry_minutes, 60);
        assert_eq!(config.sweep_interval, Duration::from_secs(5));
        assert_eq!(config.expiry_policy(), ExpiryPolicy::default());
    }
}
