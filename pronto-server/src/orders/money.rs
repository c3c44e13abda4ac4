//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to
//! `f64` (2 decimal places, half-up) for storage/serialization.

use rust_decimal::prelude::*;
use shared::models::{DiningSession, Order, OrderItem};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Round to 2 decimal places, half-up
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_else(|| {
        tracing::error!(value = %value, "Decimal out of f64 range, defaulting to zero");
        0.0
    })
}

/// Two amounts are equal within one cent
pub fn amounts_match(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() < MONEY_TOLERANCE
}

/// Tax mode and rate
#[derive(Debug, Clone, Copy)]
pub struct TaxPolicy {
    pub rate: Decimal,
    /// Menu prices already include tax
    pub included: bool,
}

impl TaxPolicy {
    pub fn new(rate: f64, included: bool) -> Self {
        Self {
            rate: to_decimal(rate),
            included,
        }
    }
}

/// Subtotal / tax / total triple
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

impl Totals {
    pub fn of_order(order: &Order) -> Self {
        Self {
            subtotal: to_decimal(order.subtotal),
            tax_amount: to_decimal(order.tax_amount),
            total_amount: to_decimal(order.total_amount),
        }
    }

    /// `self - before`
    pub fn delta_from(&self, before: &Totals) -> Totals {
        Totals {
            subtotal: self.subtotal - before.subtotal,
            tax_amount: self.tax_amount - before.tax_amount,
            total_amount: self.total_amount - before.total_amount,
        }
    }

    pub fn negated(&self) -> Totals {
        Totals {
            subtotal: -self.subtotal,
            tax_amount: -self.tax_amount,
            total_amount: -self.total_amount,
        }
    }

    pub fn write_to_order(&self, order: &mut Order) {
        order.subtotal = to_f64(self.subtotal);
        order.tax_amount = to_f64(self.tax_amount);
        order.total_amount = to_f64(self.total_amount);
    }
}

/// Line total = unit price × quantity
pub fn line_total(unit_price: f64, quantity: u32) -> f64 {
    to_f64(to_decimal(unit_price) * Decimal::from(quantity))
}

/// Compute order totals from its lines
///
/// - tax excluded: `tax = round(subtotal × rate)`, `total = subtotal + tax`
/// - tax included: `total = Σ lines`, `tax = round(total − total / (1 + rate))`,
///   `subtotal = total − tax`
pub fn compute_totals(items: &[OrderItem], policy: &TaxPolicy) -> Totals {
    let gross: Decimal = items.iter().map(|i| to_decimal(i.line_total)).sum();

    if policy.included {
        let total = round_money(gross);
        let tax = round_money(total - total / (Decimal::ONE + policy.rate));
        Totals {
            subtotal: total - tax,
            tax_amount: tax,
            total_amount: total,
        }
    } else {
        let subtotal = round_money(gross);
        let tax = round_money(subtotal * policy.rate);
        Totals {
            subtotal,
            tax_amount: tax,
            total_amount: subtotal + tax,
        }
    }
}

/// Roll an order-level change into the session totals
///
/// Session totals change only through this function.
pub fn apply_delta(session: &mut DiningSession, delta: &Totals) {
    session.subtotal = to_f64(to_decimal(session.subtotal) + delta.subtotal);
    session.tax_amount = to_f64(to_decimal(session.tax_amount) + delta.tax_amount);
    session.total_amount = to_f64(to_decimal(session.total_amount) + delta.total_amount);
}

/// Equal shares in whole cents
///
/// Everyone gets `floor(total / people)`; the leftover cents go one each to
/// the first payers, so shares differ by at most 0.01 and sum to `total`
/// exactly. Returns `None` when there are more people than cents.
pub fn equal_shares(total: f64, people: u32) -> Option<Vec<f64>> {
    let cents = (round_money(to_decimal(total)) * Decimal::ONE_HUNDRED).to_i64()?;
    let people_count = i64::from(people);
    if people == 0 || cents < people_count {
        return None;
    }
    let base = cents / people_count;
    let extra = cents % people_count;

    let shares = (0..people_count)
        .map(|idx| {
            let share = base + i64::from(idx < extra);
            to_f64(Decimal::new(share, 2))
        })
        .collect();
    Some(shares)
}
