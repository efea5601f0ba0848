//! Order states reported by the Vendure order process.

use serde::{Deserialize, Serialize};

/// State of a Vendure order.
///
/// Vendure's order process is configurable, so unknown states are kept
/// verbatim in [`OrderState::Other`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum OrderState {
    Created,
    Draft,
    #[default]
    AddingItems,
    ArrangingPayment,
    PaymentAuthorized,
    PaymentSettled,
    PartiallyShipped,
    Shipped,
    PartiallyDelivered,
    Delivered,
    Modifying,
    ArrangingAdditionalPayment,
    Cancelled,
    Other(String),
}

impl OrderState {
    /// Parse a state name as returned by the Shop API. Never fails.
    #[must_use]
    pub fn parse(state: &str) -> Self {
        match state {
            "Created" => Self::Created,
            "Draft" => Self::Draft,
            "AddingItems" => Self::AddingItems,
            "ArrangingPayment" => Self::ArrangingPayment,
            "PaymentAuthorized" => Self::PaymentAuthorized,
            "PaymentSettled" => Self::PaymentSettled,
            "PartiallyShipped" => Self::PartiallyShipped,
            "Shipped" => Self::Shipped,
            "PartiallyDelivered" => Self::PartiallyDelivered,
            "Delivered" => Self::Delivered,
            "Modifying" => Self::Modifying,
            "ArrangingAdditionalPayment" => Self::ArrangingAdditionalPayment,
            "Cancelled" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }

    /// The state name as used by the Shop API.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "Created",
            Self::Draft => "Draft",
            Self::AddingItems => "AddingItems",
            Self::ArrangingPayment => "ArrangingPayment",
            Self::PaymentAuthorized => "PaymentAuthorized",
            Self::PaymentSettled => "PaymentSettled",
            Self::PartiallyShipped => "PartiallyShipped",
            Self::Shipped => "Shipped",
            Self::PartiallyDelivered => "PartiallyDelivered",
            Self::Delivered => "Delivered",
            Self::Modifying => "Modifying",
            Self::ArrangingAdditionalPayment => "ArrangingAdditionalPayment",
            Self::Cancelled => "Cancelled",
            Self::Other(state) => state,
        }
    }

    /// Whether lines can still be added, adjusted, or removed.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Created | Self::AddingItems)
    }
}

impl From<String> for OrderState {
    fn from(state: String) -> Self {
        Self::parse(&state)
    }
}

impl From<OrderState> for String {
    fn from(state: OrderState) -> Self {
        state.as_str().to_string()
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
