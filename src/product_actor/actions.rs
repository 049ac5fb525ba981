use crate::domain::Product;

/// Custom actions for Product entities.
///
/// These actions represent domain-specific operations that can be performed
/// on a product beyond standard CRUD operations.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Checks the current stock level without modifying it.
    CheckStock,
    /// Applies `stock += delta`.
    ///
    /// # Errors
    /// Fails with `InsufficientStock` if the result would be negative.
    AdjustStock(i64),
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone)]
pub enum ProductActionResult {
    StockLevel(u32),
    Adjusted(Product),
}
