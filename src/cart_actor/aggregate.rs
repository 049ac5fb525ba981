//! Cart arithmetic and stock reconciliation.
//!
//! Everything here is a pure function of a cart and catalog data, so the
//! session service and checkout share one set of rules.

use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;

use super::error::CartError;
use crate::domain::{Cart, CartLine, Product, ProductId};
use crate::product_actor::{StockError, StockShortfall};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// The product was deleted from the catalog.
    Discontinued,
    /// The product has no stock left.
    OutOfStock,
}

/// A change reconciliation made to a cart the shopper should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAdjustment {
    Removed {
        product_id: ProductId,
        name: String,
        reason: RemovalReason,
    },
    Clamped {
        product_id: ProductId,
        name: String,
        from: u32,
        to: u32,
    },
}

impl fmt::Display for CartAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartAdjustment::Removed { name, reason: RemovalReason::Discontinued, .. } => {
                write!(f, "{} is no longer available and was removed from your cart", name)
            }
            CartAdjustment::Removed { name, reason: RemovalReason::OutOfStock, .. } => {
                write!(f, "{} is out of stock and was removed from your cart", name)
            }
            CartAdjustment::Clamped { name, to, .. } => {
                write!(f, "Quantity for {} adjusted to match available stock ({})", name, to)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    pub cart: Cart,
    pub adjustments: Vec<CartAdjustment>,
}

/// Brings every line back within live stock.
///
/// Lines for deleted or sold-out products are dropped and quantities above
/// stock are clamped. Reconciling an already reconciled cart changes nothing.
pub fn reconcile(cart: &Cart, catalog: &[Product]) -> Reconciled {
    let by_id: HashMap<ProductId, &Product> = catalog.iter().map(|p| (p.id, p)).collect();
    let mut reconciled = Reconciled::default();

    for line in &cart.lines {
        let Some(product) = by_id.get(&line.product_id) else {
            reconciled.adjustments.push(CartAdjustment::Removed {
                product_id: line.product_id,
                name: line.name.clone(),
                reason: RemovalReason::Discontinued,
            });
            continue;
        };
        if !product.is_in_stock() {
            reconciled.adjustments.push(CartAdjustment::Removed {
                product_id: line.product_id,
                name: line.name.clone(),
                reason: RemovalReason::OutOfStock,
            });
            continue;
        }

        let mut line = line.clone();
        if line.quantity > product.stock {
            reconciled.adjustments.push(CartAdjustment::Clamped {
                product_id: line.product_id,
                name: line.name.clone(),
                from: line.quantity,
                to: product.stock,
            });
            line.quantity = product.stock;
        }
        line.stock_at_last_sync = product.stock;
        reconciled.cart.lines.push(line);
    }
    reconciled
}

fn new_line(product: &Product, quantity: u32) -> CartLine {
    CartLine {
        product_id: product.id,
        name: product.name.clone(),
        price: product.price,
        quantity,
        stock_at_last_sync: product.stock,
    }
}

fn shortfall(product: &Product, requested: u32) -> CartError {
    CartError::Stock(StockError::single(StockShortfall {
        product_id: product.id,
        name: product.name.clone(),
        requested,
        available: product.stock,
    }))
}

/// Adds `quantity` of `product`, merging into an existing line.
///
/// # Errors
/// `Stock` if the cart would then hold more than the product's stock.
pub fn add_item(mut cart: Cart, product: &Product, quantity: u32) -> Result<Cart, CartError> {
    if quantity == 0 {
        return Err(CartError::ValidationError("Quantity must be at least 1".to_string()));
    }
    let requested = cart.quantity_of(product.id).saturating_add(quantity);
    if requested > product.stock {
        return Err(shortfall(product, requested));
    }

    match cart.lines.iter_mut().find(|line| line.product_id == product.id) {
        Some(line) => {
            line.quantity = requested;
            line.stock_at_last_sync = product.stock;
        }
        None => cart.lines.push(new_line(product, quantity)),
    }
    Ok(cart)
}

/// Sets the line for `product` to exactly `quantity`; zero removes it.
pub fn set_quantity(mut cart: Cart, product: &Product, quantity: u32) -> Result<Cart, CartError> {
    if quantity == 0 {
        return Ok(remove_item(cart, product.id));
    }
    if quantity > product.stock {
        return Err(shortfall(product, quantity));
    }
    match cart.lines.iter_mut().find(|line| line.product_id == product.id) {
        Some(line) => {
            line.quantity = quantity;
            line.stock_at_last_sync = product.stock;
        }
        None => cart.lines.push(new_line(product, quantity)),
    }
    Ok(cart)
}

pub fn remove_item(mut cart: Cart, product_id: ProductId) -> Cart {
    cart.lines.retain(|line| line.product_id != product_id);
    cart
}

/// Sum of the line snapshots. Checkout re-prices from the live catalog.
pub fn subtotal(cart: &Cart) -> Decimal {
    cart.lines.iter().map(CartLine::line_total).sum()
}

pub fn checkout_total(cart: &Cart, service_fee: Decimal) -> Decimal {
    subtotal(cart) + service_fee
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductFields;
    use rust_decimal_macros::dec;

    fn product(id: ProductId, name: &str, price: Decimal, stock: u32) -> Product {
        Product::from_fields(id, ProductFields::new(name, price, "Snacks", stock, format!("12345678{}", id)))
    }

    #[test]
    fn test_add_item_merges_and_checks_stock() {
        let pie = product(1, "Chicken Pie", dec!(2.50), 3);
        let cart = add_item(Cart::new(), &pie, 2).unwrap();
        let cart = add_item(cart, &pie, 1).unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.quantity_of(1), 3);

        let err = add_item(cart.clone(), &pie, 1).unwrap_err();
        let CartError::Stock(stock) = err else { panic!("Unexpected error: {:?}", err) };
        assert_eq!(stock.shortfalls[0].requested, 4);
        assert_eq!(stock.shortfalls[0].available, 3);

        assert!(matches!(add_item(cart, &pie, 0), Err(CartError::ValidationError(_))));
    }

    #[test]
    fn test_set_quantity() {
        let water = product(8, "Water 500ml", dec!(0.50), 40);
        let cart = set_quantity(Cart::new(), &water, 5).unwrap();
        assert_eq!(cart.quantity_of(8), 5);
        let cart = set_quantity(cart, &water, 2).unwrap();
        assert_eq!(cart.quantity_of(8), 2);
        assert!(set_quantity(cart.clone(), &water, 41).is_err());
        assert!(set_quantity(cart, &water, 0).unwrap().is_empty());
    }

    #[test]
    fn test_totals() {
        let pie = product(1, "Chicken Pie", dec!(2.50), 15);
        let cola = product(3, "Coca Cola 500ml", dec!(1.00), 25);
        let cart = add_item(Cart::new(), &pie, 2).unwrap();
        let cart = add_item(cart, &cola, 1).unwrap();
        assert_eq!(subtotal(&cart), dec!(6.00));
        assert_eq!(checkout_total(&cart, dec!(0.50)), dec!(6.50));
        assert_eq!(checkout_total(&Cart::new(), dec!(0.50)), dec!(0.50));
    }

    #[test]
    fn test_reconcile_clamps_and_removes() {
        let pie = product(1, "Chicken Pie", dec!(2.50), 5);
        let bar = product(5, "Chocolate Bar", dec!(0.75), 3);
        let chips = product(6, "Potato Chips", dec!(0.85), 2);
        let sandwich = product(7, "Sandwich", dec!(1.50), 5);
        let mut cart = add_item(Cart::new(), &pie, 5).unwrap();
        cart = add_item(cart, &bar, 3).unwrap();
        cart = add_item(cart, &chips, 2).unwrap();
        cart = add_item(cart, &sandwich, 1).unwrap();

        // pie drops to 2, chips sell out, the sandwich is deleted
        let live = vec![
            Product { stock: 2, ..pie },
            bar.clone(),
            Product { stock: 0, ..chips },
        ];
        let reconciled = reconcile(&cart, &live);

        assert_eq!(reconciled.cart.quantity_of(1), 2);
        assert_eq!(reconciled.cart.line(1).unwrap().stock_at_last_sync, 2);
        assert_eq!(reconciled.cart.quantity_of(5), 3);
        assert!(reconciled.cart.line(6).is_none());
        assert!(reconciled.cart.line(7).is_none());
        assert_eq!(
            reconciled.adjustments,
            vec![
                CartAdjustment::Clamped { product_id: 1, name: "Chicken Pie".into(), from: 5, to: 2 },
                CartAdjustment::Removed { product_id: 6, name: "Potato Chips".into(), reason: RemovalReason::OutOfStock },
                CartAdjustment::Removed { product_id: 7, name: "Sandwich".into(), reason: RemovalReason::Discontinued },
            ]
        );
        assert_eq!(
            reconciled.adjustments[0].to_string(),
            "Quantity for Chicken Pie adjusted to match available stock (2)"
        );
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let pie = product(1, "Chicken Pie", dec!(2.50), 5);
        let cola = product(3, "Coca Cola 500ml", dec!(1.00), 25);
        let cart = add_item(add_item(Cart::new(), &pie, 4).unwrap(), &cola, 2).unwrap();
        let live = vec![Product { stock: 1, ..pie }];

        let once = reconcile(&cart, &live);
        let twice = reconcile(&once.cart, &live);
        assert_eq!(twice.cart, once.cart);
        assert!(twice.adjustments.is_empty());
    }
}
