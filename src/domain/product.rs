use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type ProductId = u64;

/// Represents a product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub stock: u32,
    pub barcode: String,
}

/// Every field of a product except its id.
///
/// Used both to create a product and as the full-replace patch of an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub stock: u32,
    pub barcode: String,
}

impl ProductFields {
    pub fn new(
        name: impl Into<String>,
        price: Decimal,
        category: impl Into<String>,
        stock: u32,
        barcode: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price,
            category: category.into(),
            stock,
            barcode: barcode.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Product {
    pub fn from_fields(id: ProductId, fields: ProductFields) -> Self {
        Self {
            id,
            name: fields.name,
            description: fields.description,
            price: fields.price,
            category: fields.category,
            stock: fields.stock,
            barcode: fields.barcode,
        }
    }

    pub fn fields(&self) -> ProductFields {
        ProductFields {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            category: self.category.clone(),
            stock: self.stock,
            barcode: self.barcode.clone(),
        }
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }
}
