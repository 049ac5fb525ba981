use std::collections::HashMap;

use super::error::ReservationError;
use crate::domain::{Cart, OrderItem, PaymentMethod, Product, ProductId};
use crate::product_actor::{StockError, StockShortfall};

/// What the shopper submits along with their cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
    pub customer: Option<String>,
    /// Required for mobile money.
    pub phone_number: Option<String>,
}

impl CheckoutRequest {
    pub fn cash() -> Self {
        Self { payment_method: PaymentMethod::Cash, customer: None, phone_number: None }
    }

    pub fn mobile_money(phone_number: impl Into<String>) -> Self {
        Self {
            payment_method: PaymentMethod::MobileMoney,
            customer: None,
            phone_number: Some(phone_number.into()),
        }
    }

    pub fn customer(mut self, name: impl Into<String>) -> Self {
        self.customer = Some(name.into());
        self
    }
}

/// Re-prices every cart line from the live catalog.
///
/// Fails with one `StockError` naming every line that can't be covered,
/// including products that no longer exist.
pub fn price_lines(cart: &Cart, catalog: &[Product]) -> Result<Vec<OrderItem>, ReservationError> {
    let by_id: HashMap<ProductId, &Product> = catalog.iter().map(|p| (p.id, p)).collect();
    let mut items = Vec::with_capacity(cart.lines.len());
    let mut shortfalls = Vec::new();

    for line in &cart.lines {
        if line.quantity == 0 {
            return Err(ReservationError::ValidationError(format!(
                "Quantity for {} must be at least 1",
                line.name
            )));
        }
        match by_id.get(&line.product_id) {
            Some(product) if product.stock >= line.quantity => items.push(OrderItem {
                id: product.id,
                name: product.name.clone(),
                price: product.price,
                quantity: line.quantity,
            }),
            found => shortfalls.push(StockShortfall {
                product_id: line.product_id,
                name: found.map_or_else(|| line.name.clone(), |p| p.name.clone()),
                requested: line.quantity,
                available: found.map_or(0, |p| p.stock),
            }),
        }
    }

    if !shortfalls.is_empty() {
        return Err(StockError { shortfalls }.into());
    }
    Ok(items)
}
