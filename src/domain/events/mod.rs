//! Domain events
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "aggregate", rename_all = "lowercase")]
pub enum DomainEvent {
    Wig(WigEvent),
    Order(OrderEvent),
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> String {
        match self {
            Self::Wig(e) => format!("luxewig.wig.{}", e.name()),
            Self::Order(e) => format!("luxewig.order.{}", e.name()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WigEvent {
    Created { wig_id: Uuid, slug: String },
    Updated { wig_id: Uuid },
    VisibilityChanged { wig_id: Uuid, is_visible: bool },
    StockDecremented { wig_id: Uuid, quantity: u32, remaining: u32 },
    Deleted { wig_id: Uuid },
}

impl WigEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
            Self::VisibilityChanged { .. } => "visibility_changed",
            Self::StockDecremented { .. } => "stock_decremented",
            Self::Deleted { .. } => "deleted",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OrderEvent {
    Placed { order_id: Uuid, order_number: String, total: u64 },
    StatusChanged { order_id: Uuid, status: String },
}

impl OrderEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::Placed { .. } => "placed",
            Self::StatusChanged { .. } => "status_changed",
        }
    }
}
