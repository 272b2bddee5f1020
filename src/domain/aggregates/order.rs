//! Order Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use crate::domain::aggregates::checkout::{CheckoutSubmission, ContactDetails, OrderSummary, PaymentDetails, ShippingAddress};
use crate::domain::events::{DomainEvent, OrderEvent};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: Uuid,
    order_number: String,
    status: OrderStatus,
    customer: ContactDetails,
    shipping_address: ShippingAddress,
    payment: PaymentReference,
    summary: OrderSummary,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

/// Payment method as kept on the order. Card numbers are reduced to their
/// last four digits; the security code and expiry are dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentReference {
    #[serde(rename_all = "camelCase")]
    Card { last_four: String, card_name: String },
    #[serde(rename_all = "camelCase")]
    Mobile { mobile_number: String },
}

impl From<&PaymentDetails> for PaymentReference {
    fn from(details: &PaymentDetails) -> Self {
        match details {
            PaymentDetails::Card { card_number, card_name, .. } => {
                let digits: Vec<char> = card_number.chars().filter(char::is_ascii_digit).collect();
                let last_four = digits[digits.len().saturating_sub(4)..].iter().collect();
                Self::Card { last_four, card_name: card_name.trim().to_string() }
            }
            PaymentDetails::Mobile { mobile_number } => Self::Mobile { mobile_number: mobile_number.trim().to_string() },
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus { #[default] Pending, Confirmed, Shipped, Delivered, Cancelled }

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending", Self::Confirmed => "confirmed", Self::Shipped => "shipped",
            Self::Delivered => "delivered", Self::Cancelled => "cancelled",
        }
    }
}

impl Order {
    pub fn place(order_number: impl Into<String>, submission: CheckoutSubmission) -> Self {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let CheckoutSubmission { form, summary } = submission;
        let mut order = Self {
            id, order_number: order_number.into(), status: OrderStatus::Pending,
            customer: form.contact, shipping_address: form.address, payment: PaymentReference::from(&form.payment),
            summary, notes: form.notes.filter(|n| !n.trim().is_empty()), created_at: now, updated_at: now, events: vec![],
        };
        order.raise_event(DomainEvent::Order(OrderEvent::Placed {
            order_id: id, order_number: order.order_number.clone(), total: order.summary.total.amount(),
        }));
        order
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn order_number(&self) -> &str { &self.order_number }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn summary(&self) -> &OrderSummary { &self.summary }
    pub fn customer(&self) -> &ContactDetails { &self.customer }
    pub fn payment(&self) -> &PaymentReference { &self.payment }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    /// Pending → Confirmed → Shipped → Delivered; any non-delivered order can
    /// be cancelled. Re-applying the current status is a no-op.
    pub fn transition(&mut self, to: OrderStatus) -> Result<(), OrderError> {
        use OrderStatus::*;
        if self.status == to { return Ok(()); }
        let allowed = matches!(
            (self.status, to),
            (Pending, Confirmed) | (Confirmed, Shipped) | (Shipped, Delivered)
                | (Pending | Confirmed | Shipped, Cancelled)
        );
        if !allowed { return Err(OrderError::InvalidTransition { from: self.status, to }); }
        self.status = to;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::StatusChanged { order_id: self.id, status: to.as_str().to_string() }));
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone, Error)]
pub enum OrderError {
    #[error("cannot move order from {} to {}", from.as_str(), to.as_str())]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}
