use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use luxewig::api::{self, AppState};
use luxewig::AppConfig;
use serde_json::{json, Value};
use tower::ServiceExt;

const PASSWORD: &str = "admin-pass";

fn app() -> Router {
    let mut config = AppConfig::default();
    config.admin.password_sha256 = Some(sha256::digest(PASSWORD));
    api::router(AppState::in_memory(config))
}

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => req.header(header::CONTENT_TYPE, "application/json").body(Body::from(body.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

async fn login(app: &Router) -> String {
    let (status, body) = call(app, Method::POST, "/api/auth/login", None, Some(json!({"email": "admin@luxewig.com", "password": PASSWORD}))).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn create_wig(app: &Router, token: &str, name: &str, price: u64) -> Value {
    let (status, wig) = call(app, Method::POST, "/api/wigs", Some(token), Some(json!({
        "name": name, "price": price, "priceRange": "standard", "hairType": "Cheveux Humains",
        "style": "Lisse", "length": "40cm", "stock": 5, "tags": ["naturel"],
    }))).await;
    assert_eq!(status, StatusCode::CREATED, "{wig}");
    wig
}

fn item(id: &str, price: u64) -> Value {
    json!({"id": id, "name": format!("Wig {id}"), "price": price, "image": "img.jpg"})
}

fn form() -> Value {
    json!({
        "contact": {"firstName": "Awa", "lastName": "Diallo", "email": "awa@example.com", "phone": "+228 90 12 34 56"},
        "address": {"address": "12 rue des Palmiers", "city": "Lomé", "country": "Togo"},
        "payment": {"method": "mobile", "mobileNumber": "90123456"},
    })
}

#[tokio::test]
async fn test_health_and_unknown_route() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    let (status, body) = call(&app, Method::GET, "/api/nothing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "route not found");
}

#[tokio::test]
async fn test_cart_flow() {
    let app = app();
    let (_, cart) = call(&app, Method::POST, "/api/cart/s1/items", None, Some(item("1", 1000))).await;
    assert_eq!((cart["totalItems"].as_u64(), cart["totalPrice"].as_u64()), (Some(1), Some(1000)));

    call(&app, Method::POST, "/api/cart/s1/items", None, Some(item("1", 9999))).await;
    let (_, cart) = call(&app, Method::POST, "/api/cart/s1/items", None, Some(item("2", 500))).await;
    assert_eq!(cart["items"][0]["quantity"], 2);
    assert_eq!(cart["items"][0]["price"], 1000);
    assert_eq!(cart["totalPrice"], 2500);

    let (_, cart) = call(&app, Method::PUT, "/api/cart/s1/items/1", None, Some(json!({"quantity": "5"}))).await;
    assert_eq!(cart["totalPrice"], 5500);
    let (_, cart) = call(&app, Method::PUT, "/api/cart/s1/items/2", None, Some(json!({"quantity": 0.5}))).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);

    let (_, cart) = call(&app, Method::POST, "/api/cart/s1/toggle", None, None).await;
    assert_eq!(cart["isOpen"], true);
    assert_eq!(cart["totalItems"], 5);

    let (_, summary) = call(&app, Method::GET, "/api/cart/s1/summary", None, None).await;
    assert_eq!(summary["subtotal"]["amount"], 5000);
    assert_eq!(summary["shipping"]["amount"], 5000);
    assert_eq!(summary["total"]["amount"], 10_000);

    let (_, other) = call(&app, Method::GET, "/api/cart/s2", None, None).await;
    assert_eq!(other["totalItems"], 0);

    let (_, cart) = call(&app, Method::DELETE, "/api/cart/s1/items/1", None, None).await;
    assert_eq!(cart["totalPrice"], 0);
    assert_eq!(cart["isOpen"], true);

    let (status, _) = call(&app, Method::GET, "/api/cart/bad.id", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cart_restore_normalizes_snapshot() {
    let app = app();
    let snapshot = json!({
        "items": [
            {"id": "a", "name": "A", "price": 100, "image": "i", "quantity": 2},
            {"id": "b", "name": "B", "price": 50, "image": "i", "quantity": 0},
            {"id": "a", "name": "A2", "price": 999, "image": "i", "quantity": 3},
        ],
        "isOpen": true,
    });
    let (status, cart) = call(&app, Method::PUT, "/api/cart/r1", None, Some(snapshot)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["quantity"], 5);
    assert_eq!(cart["items"][0]["name"], "A");
    assert_eq!(cart["totalPrice"], 500);
    assert_eq!(cart["isOpen"], true);
}

#[tokio::test]
async fn test_checkout_step_validation() {
    let app = app();
    let mut bad = form();
    bad["contact"]["email"] = json!("not-an-email");
    let (status, body) = call(&app, Method::POST, "/api/checkout/validate", None, Some(json!({"step": "contact", "form": bad}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["email"].is_string());

    let (status, body) = call(&app, Method::POST, "/api/checkout/validate", None, Some(json!({"step": "contact", "form": form()}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nextStep"], "address");

    let mut card = form();
    card["payment"] = json!({"method": "card", "cardNumber": "4111 1111 1111 1111", "expiryDate": "13/27", "cvv": "12", "cardName": ""});
    let (status, body) = call(&app, Method::POST, "/api/checkout/validate", None, Some(json!({"step": "payment", "form": card}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["expiryDate"].is_string());
    assert!(body["fields"]["cvv"].is_string());
    assert!(body["fields"]["cardName"].is_string());
    assert!(body["fields"].get("cardNumber").is_none());
}

#[tokio::test]
async fn test_checkout_places_order_and_records_sales() {
    let app = app();
    let token = login(&app).await;
    let wig = create_wig(&app, &token, "Bob Lisse", 45_000).await;
    let wig_id = wig["id"].as_str().unwrap();

    let (status, _) = call(&app, Method::POST, "/api/cart/buyer/checkout", None, Some(form())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    call(&app, Method::POST, "/api/cart/buyer/items", None, Some(item(wig_id, 45_000))).await;
    call(&app, Method::POST, "/api/cart/buyer/items", None, Some(item(wig_id, 45_000))).await;
    call(&app, Method::POST, "/api/cart/buyer/items", None, Some(item("gift-card", 10_000))).await;

    let mut incomplete = form();
    incomplete["address"]["city"] = json!("");
    let (status, body) = call(&app, Method::POST, "/api/cart/buyer/checkout", None, Some(incomplete)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["city"].is_string());

    let (status, order) = call(&app, Method::POST, "/api/cart/buyer/checkout", None, Some(form())).await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["orderNumber"], "ORD-00001001");
    assert_eq!(order["status"], "pending");
    assert_eq!(order["summary"]["total"]["amount"], 105_000);
    assert_eq!(order["payment"]["method"], "mobile");

    let (_, cart) = call(&app, Method::GET, "/api/cart/buyer", None, None).await;
    assert_eq!(cart["totalItems"], 0);

    let (_, wig) = call(&app, Method::GET, &format!("/api/wigs/{wig_id}"), None, None).await;
    assert_eq!(wig["stock"], 3);
    assert_eq!(wig["sales"], 2);

    let order_id = order["id"].as_str().unwrap();
    let (status, _) = call(&app, Method::GET, "/api/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (_, orders) = call(&app, Method::GET, "/api/orders", Some(&token), None).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);

    let status_uri = format!("/api/orders/{order_id}/status");
    let (status, updated) = call(&app, Method::PATCH, &status_uri, Some(&token), Some(json!({"status": "confirmed"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "confirmed");
    let (status, _) = call(&app, Method::PATCH, &status_uri, Some(&token), Some(json!({"status": "delivered"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_card_number_is_not_kept_on_order() {
    let app = app();
    call(&app, Method::POST, "/api/cart/card/items", None, Some(item("x", 20_000))).await;
    let mut card = form();
    card["payment"] = json!({"method": "card", "cardNumber": "4111 1111 1111 1234", "expiryDate": "12/29", "cvv": "123", "cardName": "Awa Diallo"});
    let (status, order) = call(&app, Method::POST, "/api/cart/card/checkout", None, Some(card)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["payment"]["lastFour"], "1234");
    assert!(!order.to_string().contains("4111 1111"));
}

#[tokio::test]
async fn test_admin_auth() {
    let app = app();
    let (status, body) = call(&app, Method::POST, "/api/auth/login", None, Some(json!({"email": "nope", "password": "123"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["email"].is_string());
    assert!(body["fields"]["password"].is_string());

    let (status, body) = call(&app, Method::POST, "/api/auth/login", None, Some(json!({"email": "admin@luxewig.com", "password": "wrong-pass"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid credentials");

    let token = login(&app).await;
    let (status, body) = call(&app, Method::POST, "/api/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "admin@luxewig.com");

    let (status, _) = call(&app, Method::POST, "/api/auth/verify", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    call(&app, Method::POST, "/api/auth/logout", Some(&token), None).await;
    let (status, _) = call(&app, Method::POST, "/api/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_disabled_without_configured_digest() {
    let app = api::router(AppState::in_memory(AppConfig::default()));
    let (status, _) = call(&app, Method::POST, "/api/auth/login", None, Some(json!({"email": "admin@luxewig.com", "password": PASSWORD}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wig_catalog_admin() {
    let app = app();
    let (status, _) = call(&app, Method::POST, "/api/wigs", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&app).await;
    let bob = create_wig(&app, &token, "Bob Lisse", 45_000).await;
    assert_eq!(bob["seo"]["slug"], "bob-lisse");
    assert_eq!(bob["isVisible"], true);
    create_wig(&app, &token, "Lace Royale", 450_000).await;

    let (status, _) = call(&app, Method::POST, "/api/wigs", Some(&token), Some(json!({
        "name": "BOB lisse!", "price": 1, "priceRange": "luxe", "hairType": "Mixte", "style": "Bouclé", "length": "25cm",
    }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(&app, Method::POST, "/api/wigs", Some(&token), Some(json!({
        "name": " ", "price": 1, "priceRange": "luxe", "hairType": "Mixte", "style": "Bouclé", "length": "25cm",
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["name"].is_string());

    let id = bob["id"].as_str().unwrap();
    let (status, hidden) = call(&app, Method::PATCH, &format!("/api/wigs/{id}/visibility"), Some(&token), Some(json!({"isVisible": false}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hidden["isVisible"], false);

    let (_, public) = call(&app, Method::GET, "/api/wigs", None, None).await;
    assert_eq!(public["pagination"]["total"], 1);
    assert_eq!(public["wigs"][0]["name"], "Lace Royale");
    let (_, admin) = call(&app, Method::GET, "/api/wigs/admin", Some(&token), None).await;
    assert_eq!(admin["pagination"]["total"], 2);

    let (_, filtered) = call(&app, Method::GET, "/api/wigs/admin?search=BOB", Some(&token), None).await;
    assert_eq!(filtered["pagination"]["total"], 1);
    let (status, body) = call(&app, Method::GET, "/api/wigs?hairType=Laine", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["hairType"].is_string());

    let (status, updated) = call(&app, Method::PUT, &format!("/api/wigs/{id}"), Some(&token), Some(json!({"price": 50_000, "stock": 0}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 50_000);
    assert_eq!(updated["name"], "Bob Lisse");

    let (status, _) = call(&app, Method::DELETE, &format!("/api/wigs/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, Method::GET, &format!("/api/wigs/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, Method::DELETE, &format!("/api/wigs/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = call(&app, Method::GET, "/api/wigs/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_public_listing_filters_and_pages() {
    let app = app();
    let token = login(&app).await;
    for (name, price) in [("Alpha", 30_000), ("Beta", 60_000), ("Gamma", 90_000)] {
        create_wig(&app, &token, name, price).await;
    }
    let (_, page) = call(&app, Method::GET, "/api/wigs?sortBy=price&sortOrder=asc&limit=2", None, None).await;
    assert_eq!(page["wigs"][0]["name"], "Alpha");
    assert_eq!(page["pagination"]["hasNext"], true);
    assert_eq!(page["pagination"]["pages"], 2);

    let (_, page) = call(&app, Method::GET, "/api/wigs?minPrice=50000&maxPrice=80000&priceRange=all", None, None).await;
    assert_eq!(page["pagination"]["total"], 1);
    assert_eq!(page["wigs"][0]["name"], "Beta");

    let (_, page) = call(&app, Method::GET, "/api/wigs?search=NATUREL", None, None).await;
    assert_eq!(page["pagination"]["total"], 3);
}

#[tokio::test]
async fn test_cart_total_never_overflows() {
    let app = app();
    let half = u64::MAX / 2 + 1;
    let (status, cart) = call(&app, Method::POST, "/api/cart/big/items", None, Some(item("a", half))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["totalPrice"].as_u64(), Some(half));

    let (status, body) = call(&app, Method::POST, "/api/cart/big/items", None, Some(item("a", half))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
    let (status, _) = call(&app, Method::PUT, "/api/cart/big/items/a", None, Some(json!({"quantity": 3}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, cart) = call(&app, Method::GET, "/api/cart/big", None, None).await;
    assert_eq!(cart["items"][0]["quantity"], 1);
    assert_eq!(cart["totalPrice"].as_u64(), Some(half));
}

#[tokio::test]
async fn test_untouched_sessions_hold_no_cart() {
    let app = app();
    for i in 0..50 {
        let (status, _) = call(&app, Method::DELETE, &format!("/api/cart/visitor-{i}/items/x"), None, None).await;
        assert_eq!(status, StatusCode::OK);
        call(&app, Method::POST, &format!("/api/cart/visitor-{i}/checkout"), None, Some(form())).await;
    }
    let (_, health) = call(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(health["activeCarts"], 0);

    call(&app, Method::POST, "/api/cart/keeper/items", None, Some(item("1", 100))).await;
    let (_, health) = call(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(health["activeCarts"], 1);
    call(&app, Method::POST, "/api/cart/keeper/checkout", None, Some(form())).await;
    let (_, health) = call(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(health["activeCarts"], 0);
}

#[tokio::test]
async fn test_add_item_needs_an_id() {
    let app = app();
    let (status, body) = call(&app, Method::POST, "/api/cart/s1/items", None, Some(item("  ", 100))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "item id is required");
    let (_, cart) = call(&app, Method::GET, "/api/cart/s1", None, None).await;
    assert_eq!(cart["totalItems"], 0);
}

#[tokio::test]
async fn test_admin_edit_keeps_recorded_sales() {
    let app = app();
    let token = login(&app).await;
    let wig = create_wig(&app, &token, "Body Wave", 95_000).await;
    let uri = format!("/api/wigs/{}", wig["id"].as_str().unwrap());

    for _ in 0..3 {
        call(&app, Method::POST, "/api/cart/shopper/items", None, Some(item(wig["id"].as_str().unwrap(), 95_000))).await;
    }
    let (status, _) = call(&app, Method::POST, "/api/cart/shopper/checkout", None, Some(form())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, edited) = call(&app, Method::PUT, &uri, Some(&token), Some(json!({"price": 90_000}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!((edited["stock"].as_u64(), edited["sales"].as_u64()), (Some(2), Some(3)));
    let (_, hidden) = call(&app, Method::PATCH, &format!("{uri}/visibility"), Some(&token), Some(json!({"isVisible": false}))).await;
    assert_eq!((hidden["stock"].as_u64(), hidden["sales"].as_u64(), hidden["price"].as_u64()), (Some(2), Some(3), Some(90_000)));
}

#[tokio::test]
async fn test_wig_numbers_are_bounded() {
    let app = app();
    let token = login(&app).await;
    let (status, body) = call(&app, Method::POST, "/api/wigs", Some(&token), Some(json!({
        "name": "Gold", "price": 1_000_000_000_001u64, "priceRange": "luxe", "hairType": "Mixte",
        "style": "Bouclé", "length": "25cm", "stock": 3_000_000_000u64,
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["price"].is_string());
    assert!(body["fields"]["stock"].is_string());

    let wig = create_wig(&app, &token, "Silver", 10_000).await;
    let uri = format!("/api/wigs/{}", wig["id"].as_str().unwrap());
    let (status, body) = call(&app, Method::PUT, &uri, Some(&token), Some(json!({"stock": 2_147_483_648u64}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["stock"].is_string());
}
