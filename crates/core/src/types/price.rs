//! Monetary amounts as rendered by the storefront.
//!
//! Vendure's `Money` scalar is an integer count of minor units (cents for
//! USD). The storefront view model carries amounts as two-decimal strings so
//! templates never deal with integer cents, and uses `rust_decimal` for the
//! conversion so no precision is lost along the way.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency used when the backend does not report one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Monetary amount with currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Decimal amount as string (e.g., "12.99").
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Money {
    /// Build a `Money` from a Vendure minor-unit amount.
    ///
    /// ```rust
    /// # use vendure_storefront_core::Money;
    /// let price = Money::from_minor_units(1299, "USD");
    /// assert_eq!(price.amount, "12.99");
    /// ```
    #[must_use]
    pub fn from_minor_units(value: i64, currency_code: impl Into<String>) -> Self {
        Self {
            amount: Decimal::new(value, 2).to_string(),
            currency_code: currency_code.into(),
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub fn zero(currency_code: impl Into<String>) -> Self {
        Self::from_minor_units(0, currency_code)
    }

    /// The amount as a decimal, or zero if the string is malformed.
    #[must_use]
    pub fn decimal(&self) -> Decimal {
        self.amount.parse().unwrap_or_default()
    }

    /// Format for display (e.g., "$19.99", "€5.00", "JPY 1200.00").
    #[must_use]
    pub fn display(&self) -> String {
        let amount = self.decimal().round_dp(2);
        match currency_symbol(&self.currency_code) {
            Some(symbol) => format!("{symbol}{amount:.2}"),
            None => format!("{} {amount:.2}", self.currency_code),
        }
    }
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" | "CAD" | "AUD" | "NZD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        _ => None,
    }
}
