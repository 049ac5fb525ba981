use chrono::{DateTime, Utc};
use thiserror::Error;

/// Collection-time token failures. None of them touch the order.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TokenError {
    #[error("QR code has expired (at {expired_at})")]
    Expired { expired_at: DateTime<Utc> },
    #[error("Invalid QR code format: {0}")]
    Malformed(String),
}
