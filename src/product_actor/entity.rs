use rust_decimal::Decimal;

use super::actions::{ProductAction, ProductActionResult};
use super::error::{CatalogError, StockError};
use crate::actor_framework::Entity;
use crate::domain::{Product, ProductFields, ProductId};

impl Entity for Product {
    type Id = ProductId;
    type CreatePayload = ProductFields;
    type Patch = ProductFields;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Error = CatalogError;

    fn id(&self) -> &ProductId {
        &self.id
    }

    /// Creates a new Product after validating its fields.
    fn from_create(id: ProductId, fields: ProductFields) -> Result<Self, CatalogError> {
        Ok(Product::from_fields(id, validated(fields)?))
    }

    fn not_found(id: &ProductId) -> CatalogError {
        CatalogError::NotFound(*id)
    }

    /// Stock failures are merged into one `StockError`; anything else wins outright.
    fn combine_errors(errors: Vec<CatalogError>) -> CatalogError {
        let mut shortfalls = Vec::new();
        for error in errors {
            match error.shortfalls() {
                Some(mut s) => shortfalls.append(&mut s),
                None => return error,
            }
        }
        CatalogError::Stock(StockError { shortfalls })
    }

    fn check_conflict(&self, other: &Self) -> Result<(), CatalogError> {
        if self.barcode == other.barcode {
            return Err(CatalogError::ValidationError(format!(
                "Barcode {} already used by product {}",
                self.barcode, other.id
            )));
        }
        Ok(())
    }

    /// Full replace of every field except the id.
    fn on_update(&mut self, fields: ProductFields) -> Result<(), CatalogError> {
        *self = Product::from_fields(self.id, validated(fields)?);
        Ok(())
    }

    /// Handles product-specific actions.
    ///
    /// # Errors
    /// Returns `InsufficientStock` if an adjustment would take stock below zero.
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, CatalogError> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::StockLevel(self.stock)),
            ProductAction::AdjustStock(delta) => {
                let next = i64::from(self.stock) + delta;
                if next < 0 {
                    return Err(CatalogError::InsufficientStock {
                        product_id: self.id,
                        name: self.name.clone(),
                        requested: u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX),
                        available: self.stock,
                    });
                }
                self.stock = u32::try_from(next).map_err(|_| {
                    CatalogError::ValidationError(format!("Stock of {} would overflow", self.name))
                })?;
                Ok(ProductActionResult::Adjusted(self.clone()))
            }
        }
    }
}

/// Trims the text fields that are matched on, then checks them.
fn validated(mut fields: ProductFields) -> Result<ProductFields, CatalogError> {
    for text in [&mut fields.name, &mut fields.category, &mut fields.barcode] {
        *text = text.trim().to_string();
    }
    if fields.name.is_empty() {
        return Err(CatalogError::ValidationError("Name required".to_string()));
    }
    if fields.category.is_empty() {
        return Err(CatalogError::ValidationError("Category required".to_string()));
    }
    if fields.barcode.is_empty() {
        return Err(CatalogError::ValidationError("Barcode required".to_string()));
    }
    if fields.price < Decimal::ZERO {
        return Err(CatalogError::ValidationError(format!(
            "Price must be non-negative, got {}",
            fields.price
        )));
    }
    Ok(fields)
}
