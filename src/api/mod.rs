//! HTTP surface: shared state, router and handlers.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod error;
pub mod orders;
pub mod wigs;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use crate::auth::AdminSessions;
use crate::catalog::{InMemoryWigRepository, WigRepository};
use crate::config::AppConfig;
use crate::events::EventPublisher;
use crate::orders::OrderBook;
use crate::sessions::CartSessions;

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub wigs: Arc<dyn WigRepository>,
    pub carts: Arc<CartSessions>,
    pub orders: Arc<OrderBook>,
    pub admins: Arc<AdminSessions>,
    pub events: EventPublisher,
}

impl AppState {
    pub fn new(config: AppConfig, wigs: Arc<dyn WigRepository>, events: EventPublisher) -> Self {
        Self {
            carts: Arc::new(CartSessions::new(&config.currency, config.cart_idle_ttl)),
            orders: Arc::new(OrderBook::new()),
            admins: Arc::new(AdminSessions::new(config.admin.clone())),
            config: Arc::new(config),
            wigs,
            events,
        }
    }

    /// In-memory catalog, no event broker.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(config, Arc::new(InMemoryWigRepository::new()), EventPublisher::disabled())
    }
}

fn cors(config: &AppConfig) -> CorsLayer {
    let origin = match HeaderValue::from_str(&config.frontend_url) {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(_) => {
            tracing::warn!(frontend_url = %config.frontend_url, "FRONTEND_URL is not a valid origin; cross-origin requests disabled");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub fn router(state: AppState) -> Router {
    let cors = cors(&state.config);
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/verify", post(auth::verify))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/wigs", get(wigs::list_public).post(wigs::create))
        .route("/api/wigs/admin", get(wigs::list_admin))
        .route("/api/wigs/:id", get(wigs::get_one).put(wigs::update).delete(wigs::remove))
        .route("/api/wigs/:id/visibility", patch(wigs::set_visibility))
        .route("/api/cart/:session", get(cart::view).put(cart::restore).delete(cart::clear))
        .route("/api/cart/:session/items", post(cart::add_item))
        .route("/api/cart/:session/items/:id", put(cart::update_quantity).delete(cart::remove_item))
        .route("/api/cart/:session/open", post(cart::open))
        .route("/api/cart/:session/close", post(cart::close))
        .route("/api/cart/:session/toggle", post(cart::toggle))
        .route("/api/cart/:session/summary", get(cart::summary))
        .route("/api/cart/:session/checkout", post(checkout::place_order))
        .route("/api/checkout/validate", post(checkout::validate_step))
        .route("/api/orders", get(orders::list))
        .route("/api/orders/:id", get(orders::get_one))
        .route("/api/orders/:id/status", patch(orders::update_status))
        .fallback(|| async { ApiError::NotFound("route not found".to_string()) })
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new())
                .layer(body_limit),
        )
        .with_state(state)
}

async fn health(State(s): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "LuxeWig API is running",
        "timestamp": Utc::now(),
        "activeCarts": s.carts.active().await,
    }))
}
