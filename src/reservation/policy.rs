use std::collections::BTreeMap;

use chrono::Duration;

use crate::domain::PaymentMethod;

/// How long a collection token stays valid, per payment method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryPolicy {
    windows: BTreeMap<PaymentMethod, Duration>,
    fallback: Duration,
}

impl ExpiryPolicy {
    /// A policy where every method uses `fallback` until overridden.
    pub fn new(fallback: Duration) -> Self {
        Self { windows: BTreeMap::new(), fallback }
    }

    pub fn with_window(mut self, method: PaymentMethod, window: Duration) -> Self {
        self.windows.insert(method, window);
        self
    }

    pub fn window(&self, method: PaymentMethod) -> Duration {
        self.windows.get(&method).copied().unwrap_or(self.fallback)
    }
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self::new(Duration::minutes(15))
            .with_window(PaymentMethod::Cash, Duration::minutes(15))
            .with_window(PaymentMethod::MobileMoney, Duration::minutes(60))
    }
}
