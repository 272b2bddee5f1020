//! Cart endpoints. Every mutation answers with the full cart view.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use super::error::{ApiError, ApiJson, ApiPath};
use super::AppState;
use crate::domain::aggregates::checkout::OrderSummary;
use crate::domain::aggregates::{Cart, CartError, CartLine, CartLineInput, CartSnapshot};
use crate::domain::value_objects::Quantity;
use crate::sessions::SessionId;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub is_open: bool,
    pub total_items: u64,
    pub total_price: u64,
    pub currency: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let totals = cart.totals();
        Self {
            items: cart.items().to_vec(),
            is_open: cart.is_open(),
            total_items: totals.total_items,
            total_price: totals.total_price.amount(),
            currency: cart.currency().to_string(),
        }
    }
}

async fn mutate(s: &AppState, session: &str, f: impl FnOnce(&mut Cart) -> Result<(), CartError>) -> Result<Json<CartView>, ApiError> {
    let session = SessionId::parse(session)?;
    let view = s.carts.with_cart(&session, |cart| f(cart).map(|()| CartView::from(&*cart))).await?;
    Ok(Json(view))
}

pub async fn view(State(s): State<AppState>, ApiPath(session): ApiPath<String>) -> Result<Json<CartView>, ApiError> {
    let session = SessionId::parse(&session)?;
    Ok(Json(s.carts.read(&session, |cart| CartView::from(cart)).await))
}

pub async fn restore(State(s): State<AppState>, ApiPath(session): ApiPath<String>, ApiJson(snapshot): ApiJson<CartSnapshot>) -> Result<Json<CartView>, ApiError> {
    let session = SessionId::parse(&session)?;
    let cart = s.carts.restore(&session, snapshot).await;
    Ok(Json(CartView::from(&cart)))
}

pub async fn clear(State(s): State<AppState>, ApiPath(session): ApiPath<String>) -> Result<Json<CartView>, ApiError> {
    mutate(&s, &session, |cart| { cart.clear(); Ok(()) }).await
}

pub async fn add_item(State(s): State<AppState>, ApiPath(session): ApiPath<String>, ApiJson(input): ApiJson<CartLineInput>) -> Result<Json<CartView>, ApiError> {
    if input.id.trim().is_empty() { return Err(ApiError::BadRequest("item id is required".to_string())); }
    mutate(&s, &session, |cart| cart.add_item(input)).await
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    #[serde(default)]
    pub quantity: Value,
}

/// Numbers and numeric strings are taken as given; anything else reads as
/// NaN, which removes the line.
fn requested_quantity(raw: &Value) -> f64 {
    match raw {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

pub async fn update_quantity(State(s): State<AppState>, ApiPath((session, id)): ApiPath<(String, String)>, ApiJson(r): ApiJson<QuantityRequest>) -> Result<Json<CartView>, ApiError> {
    let quantity = Quantity::from_requested(requested_quantity(&r.quantity));
    mutate(&s, &session, |cart| cart.set_quantity(&id, quantity)).await
}

pub async fn remove_item(State(s): State<AppState>, ApiPath((session, id)): ApiPath<(String, String)>) -> Result<Json<CartView>, ApiError> {
    mutate(&s, &session, |cart| { cart.remove_item(&id); Ok(()) }).await
}

pub async fn open(State(s): State<AppState>, ApiPath(session): ApiPath<String>) -> Result<Json<CartView>, ApiError> {
    mutate(&s, &session, |cart| { cart.open(); Ok(()) }).await
}

pub async fn close(State(s): State<AppState>, ApiPath(session): ApiPath<String>) -> Result<Json<CartView>, ApiError> {
    mutate(&s, &session, |cart| { cart.close(); Ok(()) }).await
}

pub async fn toggle(State(s): State<AppState>, ApiPath(session): ApiPath<String>) -> Result<Json<CartView>, ApiError> {
    mutate(&s, &session, |cart| { cart.toggle(); Ok(()) }).await
}

pub async fn summary(State(s): State<AppState>, ApiPath(session): ApiPath<String>) -> Result<Json<OrderSummary>, ApiError> {
    let session = SessionId::parse(&session)?;
    let shipping = s.config.shipping_cost;
    Ok(Json(s.carts.read(&session, |cart| OrderSummary::assemble(cart, shipping)).await))
}
