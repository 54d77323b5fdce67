//! Cart pricing calculations.
//!
//! Everything here is pure and total: quantities below zero count as zero and
//! arithmetic saturates instead of overflowing.

use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Anything that can be priced as a cart line.
pub trait Priced {
    /// Price charged per unit.
    fn unit_price(&self) -> Money;

    /// Pre-discount price per unit, if the line has one.
    fn reference_price(&self) -> Option<Money>;

    /// Number of units.
    fn quantity(&self) -> i64;
}

fn units<T: Priced + ?Sized>(item: &T) -> i64 {
    item.quantity().max(0)
}

/// `price * quantity`.
pub fn line_total<T: Priced + ?Sized>(item: &T) -> Money {
    item.unit_price() * units(item)
}

/// `(actual_price ?? price) * quantity`. A reference price below the unit
/// price is treated as absent.
pub fn line_reference_total<T: Priced + ?Sized>(item: &T) -> Money {
    let price = item.unit_price();
    let reference = match item.reference_price() {
        Some(reference) if reference >= price => reference,
        _ => price,
    };
    reference * units(item)
}

/// Savings on one line, never negative.
pub fn line_savings<T: Priced + ?Sized>(item: &T) -> Money {
    let savings = line_reference_total(item) - line_total(item);
    if savings.is_negative() {
        Money::ZERO
    } else {
        savings
    }
}

/// Sum of line totals.
pub fn total<T: Priced>(items: &[T]) -> Money {
    items.iter().map(line_total).sum()
}

/// Sum of line reference totals.
pub fn reference_total<T: Priced>(items: &[T]) -> Money {
    items.iter().map(line_reference_total).sum()
}

/// `reference_total - total`, never negative.
pub fn savings<T: Priced>(items: &[T]) -> Money {
    let savings = reference_total(items) - total(items);
    if savings.is_negative() {
        Money::ZERO
    } else {
        savings
    }
}

/// Sum of quantities.
pub fn item_count<T: Priced>(items: &[T]) -> i64 {
    items.iter().map(units).fold(0, i64::saturating_add)
}

/// Complete pricing breakdown for a cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartPricing {
    /// Amount payable.
    pub total: Money,
    /// What the lines would cost at reference prices.
    pub reference_total: Money,
    /// `reference_total - total`.
    pub savings: Money,
    /// Sum of quantities.
    pub item_count: i64,
    /// Per-line breakdown, in cart order.
    pub line_items: Vec<LinePricing>,
}

impl CartPricing {
    /// Price a collection of lines.
    pub fn calculate<T: Priced>(items: &[T]) -> Self {
        let line_items: Vec<LinePricing> = items.iter().map(LinePricing::of).collect();
        let total: Money = line_items.iter().map(|l| l.total).sum();
        let reference_total: Money = line_items.iter().map(|l| l.reference_total).sum();
        Self {
            total,
            reference_total,
            savings: savings(items),
            item_count: item_count(items),
            line_items,
        }
    }

    /// Check if any line is discounted.
    pub fn has_savings(&self) -> bool {
        self.savings.paise > 0
    }

    /// Savings as a whole percentage of the reference total.
    pub fn savings_percentage(&self) -> u8 {
        self.savings.percent_of(self.reference_total)
    }
}

/// Pricing breakdown for a single line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LinePricing {
    pub unit_price: Money,
    pub quantity: i64,
    pub total: Money,
    pub reference_total: Money,
    pub savings: Money,
}

impl LinePricing {
    /// Price one line.
    pub fn of<T: Priced + ?Sized>(item: &T) -> Self {
        Self {
            unit_price: item.unit_price(),
            quantity: units(item),
            total: line_total(item),
            reference_total: line_reference_total(item),
            savings: line_savings(item),
        }
    }
}
