use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::ProductId;
use super::token::TokenPayload;

/// Human-readable order number, displayed as `ORD-000042`.
///
/// Ordering is numeric, so ids sort the way they were issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderId(u64);

impl OrderId {
    const PREFIX: &'static str = "ORD-";

    pub fn new(sequence: u64) -> Self {
        Self(sequence)
    }

    pub fn sequence(&self) -> u64 {
        self.0
    }

    /// The id following the highest one issued so far.
    pub fn next_after(last: Option<&OrderId>) -> Self {
        Self(last.map_or(1, |id| id.0 + 1))
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:06}", Self::PREFIX, self.0)
    }
}

impl FromStr for OrderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| format!("order id must start with {}: {}", Self::PREFIX, s))?;
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|e| format!("invalid order id {}: {}", s, e))
    }
}

impl TryFrom<String> for OrderId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderId> for String {
    fn from(id: OrderId) -> Self {
        id.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    #[serde(alias = "ecocash")]
    MobileMoney,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::MobileMoney => write!(f, "mobile_money"),
        }
    }
}

/// Lifecycle of an order.
///
/// `pending → processing → ready → completed`, and `cancelled` from
/// `pending` or `processing`. `completed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Ready)
                | (Ready, Completed)
                | (Pending, Cancelled)
                | (Processing, Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown order status: {}", s))
    }
}

/// One line of an order, frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Represents a customer order.
///
/// `items` and `total` never change after creation; only `status` and the
/// collection token move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub customer: Option<String>,
    pub phone_number: Option<String>,
    pub collection_token: TokenPayload,
}

/// Payload for creating a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub customer: Option<String>,
    pub phone_number: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expiry_time: DateTime<Utc>,
}

impl Order {
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    pub fn expiry_time(&self) -> DateTime<Utc> {
        self.collection_token.expiry_time
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}
