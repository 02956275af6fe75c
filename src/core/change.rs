//! Day-over-day price change computation

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeDirection {
    Down,
    Flat,
    Up,
}

impl ChangeDirection {
    pub fn between(current_price: f64, prior_price: f64) -> Self {
        if current_price < prior_price {
            ChangeDirection::Down
        } else if current_price > prior_price {
            ChangeDirection::Up
        } else {
            ChangeDirection::Flat
        }
    }
}

/// Percent difference between a live price and its prior reference price.
///
/// The magnitude is always non-negative; direction carries the sign. Equal
/// inputs produce `Flat` with a `0.00` percent, never an empty cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceDifference {
    pub direction: ChangeDirection,
    pub percent: f64,
}

impl PriceDifference {
    /// Computes the change of `current_price` relative to `prior_price`.
    ///
    /// Returns `None` when the prior price is zero or either input is not
    /// finite, so callers render a no-data cell instead of `inf%`.
    pub fn between(current_price: f64, prior_price: f64) -> Option<Self> {
        if !current_price.is_finite() || !prior_price.is_finite() || prior_price == 0.0 {
            return None;
        }

        Some(Self {
            direction: ChangeDirection::between(current_price, prior_price),
            percent: 100.0 * (current_price - prior_price).abs() / prior_price,
        })
    }

    /// Percent magnitude with exactly two fractional digits, e.g. "5.00".
    pub fn format_percent(&self) -> String {
        format!("{:.2}", self.percent)
    }
}
