//! Catalog browsing helpers: search, categories and stock badges.

use std::collections::BTreeSet;

use crate::domain::{contains_ignore_case, Product, SortDirection};

/// Stock levels that drive the low-stock warning and the urgent badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockThresholds {
    /// `stock < low` shows a low-stock warning.
    pub low: u32,
    /// `stock <= critical` shows the urgent badge.
    pub critical: u32,
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self { low: 7, critical: 5 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    OutOfStock,
    Critical,
    Low,
    InStock,
}

impl StockThresholds {
    pub fn level(&self, stock: u32) -> StockLevel {
        if stock == 0 {
            StockLevel::OutOfStock
        } else if stock <= self.critical {
            StockLevel::Critical
        } else if stock < self.low {
            StockLevel::Low
        } else {
            StockLevel::InStock
        }
    }

    /// In stock but below the low threshold.
    pub fn is_low(&self, stock: u32) -> bool {
        stock > 0 && stock < self.low
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    #[default]
    Name,
    Price,
    Stock,
}

/// Filter and ordering for a catalog listing.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    /// `None` means every category.
    pub category: Option<String>,
    /// Matched against name and description.
    pub search: Option<String>,
    pub sort: ProductSort,
    pub direction: SortDirection,
}

impl CatalogQuery {
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn sort_by(mut self, sort: ProductSort, direction: SortDirection) -> Self {
        self.sort = sort;
        self.direction = direction;
        self
    }

    fn matches(&self, product: &Product) -> bool {
        let in_category = self
            .category
            .as_deref()
            .map_or(true, |category| product.category == category);
        let text = self.search.as_deref().unwrap_or("");
        in_category
            && (contains_ignore_case(&product.name, text) || contains_ignore_case(&product.description, text))
    }
}

pub fn search(products: &[Product], query: &CatalogQuery) -> Vec<Product> {
    let mut found: Vec<Product> = products.iter().filter(|p| query.matches(p)).cloned().collect();
    found.sort_by(|a, b| {
        let ordering = match query.sort {
            ProductSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            ProductSort::Price => a.price.cmp(&b.price),
            ProductSort::Stock => a.stock.cmp(&b.stock),
        };
        query.direction.apply(ordering)
    });
    found
}

pub fn categories(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .map(|p| p.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn low_stock(products: &[Product], thresholds: &StockThresholds) -> Vec<Product> {
    products.iter().filter(|p| thresholds.is_low(p.stock)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductFields;
    use rust_decimal_macros::dec;

    fn catalog() -> Vec<Product> {
        vec![
            Product::from_fields(1, ProductFields::new("Chicken Pie", dec!(2.50), "Food", 15, "1").with_description("Freshly baked")),
            Product::from_fields(2, ProductFields::new("Coca Cola 500ml", dec!(1.00), "Drinks", 25, "2")),
            Product::from_fields(3, ProductFields::new("Chocolate Bar", dec!(0.75), "Snacks", 3, "3")),
            Product::from_fields(4, ProductFields::new("Potato Chips", dec!(0.85), "Snacks", 0, "4")),
            Product::from_fields(5, ProductFields::new("Sandwich", dec!(1.50), "Food", 6, "5")),
            Product::from_fields(6, ProductFields::new("Fanta Orange 500ml", dec!(1.00), "Drinks", 20, "6")),
        ]
    }

    #[test]
    fn test_stock_levels() {
        let thresholds = StockThresholds::default();
        assert_eq!(thresholds.level(0), StockLevel::OutOfStock);
        assert_eq!(thresholds.level(5), StockLevel::Critical);
        assert_eq!(thresholds.level(6), StockLevel::Low);
        assert_eq!(thresholds.level(7), StockLevel::InStock);

        let custom = StockThresholds { low: 10, critical: 2 };
        assert_eq!(custom.level(3), StockLevel::Low);
        assert_eq!(custom.level(2), StockLevel::Critical);
    }

    #[test]
    fn test_low_stock_excludes_sold_out() {
        let low: Vec<u64> = low_stock(&catalog(), &StockThresholds::default()).iter().map(|p| p.id).collect();
        assert_eq!(low, vec![3, 5]);
    }

    #[test]
    fn test_search_filters_and_sorts() {
        let query = CatalogQuery::default().category("Food").search("baked");
        let ids: Vec<u64> = search(&catalog(), &query).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1]);

        let by_name: Vec<u64> = search(&catalog(), &CatalogQuery::default()).iter().map(|p| p.id).collect();
        assert_eq!(by_name, vec![1, 3, 2, 6, 4, 5]);
    }

    #[test]
    fn test_price_sort_is_stable_both_ways() {
        let asc = CatalogQuery::default().category("Drinks").sort_by(ProductSort::Price, SortDirection::Ascending);
        let desc = CatalogQuery::default().category("Drinks").sort_by(ProductSort::Price, SortDirection::Descending);
        let asc_ids: Vec<u64> = search(&catalog(), &asc).iter().map(|p| p.id).collect();
        let desc_ids: Vec<u64> = search(&catalog(), &desc).iter().map(|p| p.id).collect();
        // Equal prices keep catalog order
        assert_eq!(asc_ids, vec![2, 6]);
        assert_eq!(desc_ids, vec![2, 6]);
    }

    #[test]
    fn test_categories_are_distinct_and_sorted() {
        assert_eq!(categories(&catalog()), vec!["Drinks", "Food", "Snacks"]);
    }
}
