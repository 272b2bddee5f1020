//! In-process order book for orders placed through checkout.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;
use crate::domain::aggregates::checkout::CheckoutSubmission;
use crate::domain::aggregates::order::{Order, OrderStatus};
use crate::domain::events::DomainEvent;
use crate::{Result, StoreError};

const FIRST_ORDER_NUMBER: u64 = 1001;

pub struct OrderBook {
    next_number: AtomicU64,
    orders: RwLock<Vec<Order>>,
}

impl Default for OrderBook {
    fn default() -> Self { Self { next_number: AtomicU64::new(FIRST_ORDER_NUMBER), orders: RwLock::new(vec![]) } }
}

impl OrderBook {
    pub fn new() -> Self { Self::default() }

    /// Numbers and stores the order; returns it with its pending events.
    pub async fn place(&self, submission: CheckoutSubmission) -> (Order, Vec<DomainEvent>) {
        let number = self.next_number.fetch_add(1, Ordering::Relaxed);
        let mut order = Order::place(format!("ORD-{number:08}"), submission);
        let events = order.take_events();
        self.orders.write().await.push(order.clone());
        (order, events)
    }

    /// Newest first.
    pub async fn list(&self) -> Vec<Order> {
        self.orders.read().await.iter().rev().cloned().collect()
    }

    pub async fn get(&self, id: Uuid) -> Option<Order> {
        self.orders.read().await.iter().find(|o| o.id() == id).cloned()
    }

    pub async fn transition(&self, id: Uuid, status: OrderStatus) -> Result<(Order, Vec<DomainEvent>)> {
        let mut orders = self.orders.write().await;
        let order = orders.iter_mut().find(|o| o.id() == id).ok_or(StoreError::OrderNotFound(id))?;
        order.transition(status)?;
        let events = order.take_events();
        Ok((order.clone(), events))
    }
}
