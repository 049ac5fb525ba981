use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::ProductId;

/// One item that can't be covered by current stock.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{name} (requested: {requested}, available: {available})")]
pub struct StockShortfall {
    pub product_id: ProductId,
    pub name: String,
    pub requested: u32,
    pub available: u32,
}

/// Every item of a request that exceeds available stock.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Some items have insufficient stock: {}", list_shortfalls(.shortfalls))]
pub struct StockError {
    pub shortfalls: Vec<StockShortfall>,
}

impl StockError {
    pub fn single(shortfall: StockShortfall) -> Self {
        Self { shortfalls: vec![shortfall] }
    }

    pub fn names_product(&self, product_id: ProductId) -> bool {
        self.shortfalls.iter().any(|s| s.product_id == product_id)
    }
}

fn list_shortfalls(shortfalls: &[StockShortfall]) -> String {
    shortfalls.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Errors that can occur during catalog operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Product not found: {0}")]
    NotFound(ProductId),
    #[error("No product with barcode: {0}")]
    BarcodeNotFound(String),
    #[error("Product validation error: {0}")]
    ValidationError(String),
    #[error("Insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        requested: u32,
        available: u32,
    },
    #[error(transparent)]
    Stock(#[from] StockError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl CatalogError {
    /// The shortfall carried by a stock failure, if this is one.
    pub fn shortfalls(&self) -> Option<Vec<StockShortfall>> {
        match self {
            CatalogError::InsufficientStock { product_id, name, requested, available } => {
                Some(vec![StockShortfall {
                    product_id: *product_id,
                    name: name.clone(),
                    requested: *requested,
                    available: *available,
                }])
            }
            CatalogError::Stock(e) => Some(e.shortfalls.clone()),
            _ => None,
        }
    }
}

impl From<FrameworkError> for CatalogError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::DuplicateId(id) => CatalogError::ValidationError(format!("Duplicate product id: {}", id)),
            other => CatalogError::ActorCommunicationError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_error_lists_every_item() {
        let err = StockError {
            shortfalls: vec![
                StockShortfall { product_id: 1, name: "Chicken Pie".into(), requested: 4, available: 2 },
                StockShortfall { product_id: 6, name: "Potato Chips".into(), requested: 1, available: 0 },
            ],
        };
        assert_eq!(
            err.to_string(),
            "Some items have insufficient stock: Chicken Pie (requested: 4, available: 2), \
             Potato Chips (requested: 1, available: 0)"
        );
        assert!(err.names_product(6));
        assert!(!err.names_product(2));
    }
}
