use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use super::auth::AdminUser;
use super::error::{ApiError, ApiJson, ApiPath};
use super::AppState;
use crate::domain::aggregates::{Order, OrderStatus};
use crate::StoreError;

pub async fn list(State(s): State<AppState>, _admin: AdminUser) -> Json<Vec<Order>> {
    Json(s.orders.list().await)
}

pub async fn get_one(State(s): State<AppState>, _admin: AdminUser, ApiPath(id): ApiPath<Uuid>) -> Result<Json<Order>, ApiError> {
    s.orders.get(id).await.map(Json).ok_or_else(|| StoreError::OrderNotFound(id).into())
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest { pub status: OrderStatus }

pub async fn update_status(State(s): State<AppState>, AdminUser(admin): AdminUser, ApiPath(id): ApiPath<Uuid>, ApiJson(r): ApiJson<StatusRequest>) -> Result<Json<Order>, ApiError> {
    let (order, events) = s.orders.transition(id, r.status).await?;
    tracing::info!(order_number = %order.order_number(), status = r.status.as_str(), by = %admin.user.email, "order status changed");
    s.events.publish(events).await;
    Ok(Json(order))
}
