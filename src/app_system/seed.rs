use rust_decimal::Decimal;

use crate::domain::ProductFields;

/// The shop's starter catalog.
pub fn starter_products() -> Vec<ProductFields> {
    let item = |name: &str, description: &str, cents: i64, category: &str, stock: u32, barcode: &str| {
        ProductFields::new(name, Decimal::new(cents, 2), category, stock, barcode).with_description(description)
    };
    vec![
        item("Chicken Pie", "Freshly baked chicken pie", 250, "Food", 15, "1234567890"),
        item("Beef Pie", "Delicious beef pie", 275, "Food", 10, "1234567891"),
        item("Coca Cola 500ml", "Refreshing cola drink", 100, "Drinks", 25, "1234567892"),
        item("Fanta Orange 500ml", "Orange flavored soda", 100, "Drinks", 20, "1234567893"),
        item("Chocolate Bar", "Sweet milk chocolate", 75, "Snacks", 3, "1234567894"),
        item("Potato Chips", "Crispy salted chips", 85, "Snacks", 0, "1234567895"),
        item("Sandwich", "Fresh chicken and mayo sandwich", 150, "Food", 5, "1234567896"),
        item("Water 500ml", "Bottled mineral water", 50, "Drinks", 40, "1234567897"),
    ]
}
