use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::{Order, OrderId, OrderItem, PaymentMethod};

/// Order summary carried by the collection QR code.
///
/// Field order is the wire key order. Unknown keys are ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub order_id: OrderId,
    pub total: Decimal,
    pub items: Vec<OrderItem>,
    #[serde(alias = "timestamp")]
    pub issued_at: DateTime<Utc>,
    pub expiry_time: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl TokenPayload {
    /// A fresh payload for `order`; only the timestamps differ between reissues.
    pub fn mint(order: &Order, issued_at: DateTime<Utc>, expiry_time: DateTime<Utc>) -> Self {
        Self {
            order_id: order.id,
            total: order.total,
            items: order.items.clone(),
            issued_at,
            expiry_time,
            payment_method: order.payment_method,
            phone_number: order.phone_number.clone(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry_time
    }
}
