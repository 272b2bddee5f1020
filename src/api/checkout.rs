use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use super::error::{ApiError, ApiJson, ApiPath};
use super::AppState;
use crate::domain::aggregates::checkout::{CheckoutError, CheckoutFlow, CheckoutForm, CheckoutStep, OrderSummary};
use crate::domain::aggregates::Order;
use crate::sessions::SessionId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRequest {
    pub step: CheckoutStep,
    #[serde(default)]
    pub form: CheckoutForm,
}

/// Checks one step of the form. The client keeps the step position; this
/// only tells it whether it may move on and where to.
pub async fn validate_step(ApiJson(r): ApiJson<StepRequest>) -> Result<Json<Value>, ApiError> {
    r.step.validate(&r.form).map_err(|errors| CheckoutError::Incomplete { step: r.step, errors })?;
    Ok(Json(json!({
        "valid": true,
        "step": r.step,
        "nextStep": r.step.next(),
        "complete": r.step == CheckoutStep::Payment,
    })))
}

pub async fn place_order(State(s): State<AppState>, ApiPath(session): ApiPath<String>, ApiJson(form): ApiJson<CheckoutForm>) -> Result<(StatusCode, Json<Order>), ApiError> {
    let session = SessionId::parse(&session)?;
    let shipping = s.config.shipping_cost;
    let flow = CheckoutFlow::with_form(form);
    let submission = s.carts.with_cart(&session, |cart| {
        let submission = flow.submit(cart, shipping)?;
        cart.clear();
        cart.close();
        Ok::<_, CheckoutError>(submission)
    }).await?;

    record_sales(&s, submission.summary.clone()).await;
    let (order, events) = s.orders.place(submission).await;
    tracing::info!(order_number = %order.order_number(), total = %order.summary().total, "order placed");
    s.events.publish(events).await;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Takes sold units out of catalog stock. Lines that are not catalog wigs,
/// or cannot be decremented, are logged and skipped; the order stands.
async fn record_sales(s: &AppState, summary: OrderSummary) {
    for line in summary.items {
        let Ok(wig_id) = Uuid::parse_str(&line.id) else {
            tracing::warn!(item = %line.id, "sold item is not a catalog wig");
            continue;
        };
        match s.wigs.decrement_stock(wig_id, line.quantity.get()).await {
            Ok(mut wig) => s.events.publish(wig.take_events()).await,
            Err(e) => tracing::warn!(wig_id = %wig_id, error = %e, "stock not decremented"),
        }
    }
}
