//! Order listings for the staff dashboard.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::domain::{contains_ignore_case, Order, OrderStatus, SortDirection};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderSort {
    #[default]
    Id,
    Date,
    Total,
}

#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    /// `None` means every status.
    pub status: Option<OrderStatus>,
    /// Matched against the order id and the customer name.
    pub search: Option<String>,
    pub sort: OrderSort,
    pub direction: SortDirection,
}

impl OrderQuery {
    pub fn with_status(status: OrderStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn sort_by(mut self, sort: OrderSort, direction: SortDirection) -> Self {
        self.sort = sort;
        self.direction = direction;
        self
    }

    fn matches(&self, order: &Order) -> bool {
        let status_ok = self.status.map_or(true, |status| order.status == status);
        let text = self.search.as_deref().unwrap_or("");
        status_ok
            && (contains_ignore_case(&order.id.to_string(), text)
                || order.customer.as_deref().is_some_and(|c| contains_ignore_case(c, text)))
    }
}

/// Filters then stable-sorts `orders`; equal keys keep their input order.
pub fn select(orders: Vec<Order>, query: &OrderQuery) -> Vec<Order> {
    let mut selected: Vec<Order> = orders.into_iter().filter(|o| query.matches(o)).collect();
    selected.sort_by(|a, b| {
        let ordering = match query.sort {
            OrderSort::Id => a.id.cmp(&b.id),
            OrderSort::Date => a.created_at.cmp(&b.created_at),
            OrderSort::Total => a.total.cmp(&b.total),
        };
        query.direction.apply(ordering)
    });
    selected
}

/// Dashboard totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSummary {
    pub total_orders: usize,
    pub by_status: HashMap<OrderStatus, usize>,
    /// Sum of completed order totals.
    pub revenue: Decimal,
}

impl LedgerSummary {
    pub fn count(&self, status: OrderStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

pub fn summarize(orders: &[Order]) -> LedgerSummary {
    let mut summary = LedgerSummary { total_orders: orders.len(), ..LedgerSummary::default() };
    for order in orders {
        *summary.by_status.entry(order.status).or_insert(0) += 1;
        if order.status == OrderStatus::Completed {
            summary.revenue += order.total;
        }
    }
    summary
}
