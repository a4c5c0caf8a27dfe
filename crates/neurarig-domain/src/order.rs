//! Order lifecycle types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fulfilment status of an order.
///
/// Forward path: `Processing` → `Confirmed` → `Shipped` → `Delivered`.
/// `Cancelled` is reachable from `Processing` and `Confirmed` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Processing,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Position on the forward fulfilment path; `None` for `Cancelled`.
    fn stage(self) -> Option<u8> {
        match self {
            Self::Processing => Some(0),
            Self::Confirmed => Some(1),
            Self::Shipped => Some(2),
            Self::Delivered => Some(3),
            Self::Cancelled => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether an administrator may move an order from `self` to `next`.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if self.is_terminal() || self == next {
            return false;
        }
        match next {
            Self::Cancelled => matches!(self, Self::Processing | Self::Confirmed),
            _ => match (self.stage(), next.stage()) {
                (Some(from), Some(to)) => to > from,
                _ => false,
            },
        }
    }

    /// Whether the order owner may cancel it.
    pub fn can_be_cancelled_by_owner(self) -> bool {
        self == Self::Processing
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string cannot be parsed as an [`OrderStatus`].
#[derive(Debug, Error)]
#[error("unknown order status: {0:?}")]
pub struct UnknownOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(Self::Processing),
            "confirmed" => Ok(Self::Confirmed),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownOrderStatus(other.to_owned())),
        }
    }
}

/// How the customer intends to pay. Recorded only; no payment is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CashOnDelivery,
    CreditCard,
    Paypal,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "cash_on_delivery",
            Self::CreditCard => "credit_card",
            Self::Paypal => "paypal",
        }
    }
}

/// Error returned when a string cannot be parsed as a [`PaymentMethod`].
#[derive(Debug, Error)]
#[error("unknown payment method: {0:?}")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash_on_delivery" => Ok(Self::CashOnDelivery),
            "credit_card" => Ok(Self::CreditCard),
            "paypal" => Ok(Self::Paypal),
            other => Err(UnknownPaymentMethod(other.to_owned())),
        }
    }
}
