//! End-to-end flows through the fully layered router

use axum::Router;
use axum::body::Body;
use http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use trattoria_server::api::build_app;
use trattoria_server::auth::cookie::CART_COOKIE;
use trattoria_server::auth::totp;
use trattoria_server::services::CloudinaryConfig;
use trattoria_server::{Config, ErrorCode, ServerState};

const ADMIN_EMAIL: &str = "admin@trattoria.test";
const ADMIN_PASSWORD: &str = "admin-password-1";
const HOUR_MS: i64 = 3_600_000;

#[derive(Clone)]
struct TestApp {
    app: Router,
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl Reply {
    fn data(&self) -> &Value {
        &self.body["data"]
    }

    fn code(&self) -> Option<u16> {
        self.body["code"].as_u64().map(|c| c as u16)
    }
}

impl TestApp {
    async fn new() -> Self {
        Self::with_config(Config::for_tests()).await
    }

    /// App over a SQLite file, so the pool holds several connections
    async fn file_backed(path: &std::path::Path) -> Self {
        let mut config = Config::for_tests();
        config.database_url = path.to_string_lossy().into_owned();
        Self::with_config(config).await
    }

    async fn with_config(mut config: Config) -> Self {
        config.admin_email = Some(ADMIN_EMAIL.into());
        config.admin_password = Some(ADMIN_PASSWORD.into());
        let state = ServerState::initialize(&config).await.unwrap();
        Self {
            app: build_app(state),
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> Reply {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Reply {
            status,
            headers,
            body,
        }
    }

    /// Multipart upload with a single `image` field
    async fn upload(&self, token: Option<&str>, bytes: &[u8]) -> Reply {
        const BOUNDARY: &str = "trattoria-test-boundary";
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"dish.png\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.dispatch(builder.body(Body::from(body)).unwrap()).await
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> Reply {
        self.send(Method::GET, uri, token, None, None).await
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Reply {
        self.send(Method::POST, uri, token, None, Some(body)).await
    }

    async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Reply {
        self.send(Method::PUT, uri, token, None, Some(body)).await
    }

    async fn register(&self, name: &str, email: &str) -> String {
        let reply = self
            .post(
                "/api/auth/register",
                None,
                json!({"name": name, "email": email, "password": "password-123"}),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        reply.data()["token"].as_str().unwrap().to_string()
    }

    async fn admin_token(&self) -> String {
        let reply = self
            .post(
                "/api/auth/login",
                None,
                json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        reply.data()["token"].as_str().unwrap().to_string()
    }

    /// Category "Pizza" plus one product; returns the product id
    async fn seed_product(&self, admin: &str, price: i64, stock: i64) -> i64 {
        let category = self
            .post("/api/categories", Some(admin), json!({"name": "Pizza"}))
            .await;
        assert!(
            category.status == StatusCode::CREATED || category.status == StatusCode::CONFLICT,
            "{}",
            category.body
        );
        let product = self
            .post(
                "/api/menu",
                Some(admin),
                json!({
                    "name": "Margherita",
                    "price": price,
                    "stock": stock,
                    "ingredients": ["Tomato", "Mozzarella", "Basil"],
                    "category": "Pizza"
                }),
            )
            .await;
        assert_eq!(product.status, StatusCode::CREATED, "{}", product.body);
        product.data()["id"].as_i64().unwrap()
    }

    async fn stock_of(&self, product_id: i64) -> i64 {
        let reply = self.get(&format!("/api/menu/{product_id}"), None).await;
        reply.data()["stock"].as_i64().unwrap()
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[tokio::test]
async fn health_and_unknown_route() {
    let app = TestApp::new().await;

    let health = app.get("/health", None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "ok");
    assert!(health.headers.contains_key("x-request-id"));

    let missing = app.get("/api/nothing-here", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["success"], false);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = TestApp::new().await;
    app.register("Ana", "ana@example.com").await;

    let again = app
        .post(
            "/api/auth/register",
            None,
            json!({"name": "Ana", "email": "ANA@example.com", "password": "password-123"}),
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.code(), Some(ErrorCode::EmailAlreadyRegistered.code()));

    let invalid = app
        .post(
            "/api/auth/register",
            None,
            json!({"name": "Bo", "email": "not-an-email", "password": "short"}),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.body["success"], false);
}

#[tokio::test]
async fn guards_reject_anonymous_and_non_admin() {
    let app = TestApp::new().await;
    let user = app.register("Ana", "ana@example.com").await;
    let admin = app.admin_token().await;

    let anonymous = app.get("/api/auth/me", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let me = app.get("/api/auth/me", Some(&user)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.data()["email"], "ana@example.com");

    let forbidden = app
        .post("/api/categories", Some(&user), json!({"name": "Pasta"}))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let created = app
        .post("/api/categories", Some(&admin), json!({"name": "Pasta"}))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);

    let duplicate = app
        .post("/api/categories", Some(&admin), json!({"name": "Pasta"}))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.code(), Some(ErrorCode::CategoryNameExists.code()));

    let bad_token = app.get("/api/orders/mine", Some("garbage")).await;
    assert_eq!(bad_token.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn product_needs_active_category() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let reply = app
        .post(
            "/api/menu",
            Some(&admin),
            json!({"name": "Ghost", "price": 100, "category": "Nowhere"}),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cart_reserves_and_releases_stock() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let user = app.register("Ana", "ana@example.com").await;
    let product = app.seed_product(&admin, 900, 5).await;

    let added = app
        .post(
            "/api/cart/items",
            Some(&user),
            json!({"product_id": product, "quantity": 3}),
        )
        .await;
    assert_eq!(added.status, StatusCode::OK, "{}", added.body);
    assert_eq!(added.data()["subtotal"], 2700);
    assert_eq!(app.stock_of(product).await, 2);

    let too_many = app
        .post(
            "/api/cart/items",
            Some(&user),
            json!({"product_id": product, "quantity": 3}),
        )
        .await;
    assert_eq!(too_many.status, StatusCode::CONFLICT);
    assert_eq!(too_many.code(), Some(ErrorCode::ProductOutOfStock.code()));
    assert_eq!(app.stock_of(product).await, 2);

    let zero = app
        .put(
            &format!("/api/cart/items/{product}"),
            Some(&user),
            json!({"quantity": 0}),
        )
        .await;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);

    let shrunk = app
        .put(
            &format!("/api/cart/items/{product}"),
            Some(&user),
            json!({"quantity": 1}),
        )
        .await;
    assert_eq!(shrunk.status, StatusCode::OK);
    assert_eq!(shrunk.data()["subtotal"], 900);
    assert_eq!(app.stock_of(product).await, 4);

    let cleared = app
        .send(Method::DELETE, "/api/cart", Some(&user), None, None)
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert_eq!(app.stock_of(product).await, 5);
}

#[tokio::test]
async fn guest_cart_is_merged_on_register() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let product = app.seed_product(&admin, 900, 5).await;

    let added = app
        .post(
            "/api/cart/items",
            None,
            json!({"product_id": product, "quantity": 2}),
        )
        .await;
    assert_eq!(added.status, StatusCode::OK);
    let set_cookie = added.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with(CART_COOKIE));
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let guest_view = app
        .send(Method::GET, "/api/cart", None, Some(&cookie), None)
        .await;
    assert_eq!(guest_view.data()["items"][0]["quantity"], 2);

    let registered = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(&cookie),
            Some(json!({"name": "Ana", "email": "ana@example.com", "password": "password-123"})),
        )
        .await;
    assert_eq!(registered.status, StatusCode::CREATED);
    let token = registered.data()["token"].as_str().unwrap().to_string();

    let user_cart = app.get("/api/cart", Some(&token)).await;
    assert_eq!(user_cart.data()["items"][0]["quantity"], 2);
    assert_eq!(user_cart.data()["subtotal"], 1800);
    // Merging moves lines; stock stays reserved once
    assert_eq!(app.stock_of(product).await, 3);
}

#[tokio::test]
async fn checkout_applies_coupon_once() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let user = app.register("Ana", "ana@example.com").await;
    let product = app.seed_product(&admin, 900, 5).await;

    let coupon = app
        .post(
            "/api/coupons",
            Some(&admin),
            json!({
                "code": "save10",
                "discount_type": "percentage",
                "discount_value": 10,
                "valid_from": now_ms() - HOUR_MS,
                "valid_until": now_ms() + 24 * HOUR_MS
            }),
        )
        .await;
    assert_eq!(coupon.status, StatusCode::CREATED, "{}", coupon.body);
    assert_eq!(coupon.data()["code"], "SAVE10");

    app.post(
        "/api/cart/items",
        Some(&user),
        json!({"product_id": product, "quantity": 2}),
    )
    .await;

    let quote = app
        .post(
            "/api/coupons/validate",
            Some(&user),
            json!({"code": "SAVE10", "subtotal": 1800}),
        )
        .await;
    assert_eq!(quote.status, StatusCode::OK);
    assert_eq!(quote.data()["discount"], 180);
    assert_eq!(quote.data()["total"], 1620);

    let no_address = app
        .post(
            "/api/orders/checkout",
            Some(&user),
            json!({"payment_method": "card", "delivery_type": "delivery"}),
        )
        .await;
    assert_eq!(no_address.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_address.code(), Some(ErrorCode::DeliveryAddressRequired.code()));

    let order = app
        .post(
            "/api/orders/checkout",
            Some(&user),
            json!({
                "payment_method": "card",
                "delivery_type": "takeaway",
                "coupon_code": "save10"
            }),
        )
        .await;
    assert_eq!(order.status, StatusCode::CREATED, "{}", order.body);
    assert_eq!(order.data()["status"], "pending");
    assert_eq!(order.data()["subtotal"], 1800);
    assert_eq!(order.data()["discount"], 180);
    assert_eq!(order.data()["total"], 1620);
    assert_eq!(order.data()["items"][0]["quantity"], 2);
    assert_eq!(app.stock_of(product).await, 3);

    let cart = app.get("/api/cart", Some(&user)).await;
    assert_eq!(cart.data()["items"].as_array().unwrap().len(), 0);

    let empty = app
        .post(
            "/api/orders/checkout",
            Some(&user),
            json!({"payment_method": "cash", "delivery_type": "dine_in"}),
        )
        .await;
    assert_eq!(empty.code(), Some(ErrorCode::CartEmpty.code()));

    let reused = app
        .post(
            "/api/coupons/validate",
            Some(&user),
            json!({"code": "SAVE10", "subtotal": 1800}),
        )
        .await;
    assert_eq!(reused.status, StatusCode::BAD_REQUEST);
    assert_eq!(reused.code(), Some(ErrorCode::CouponUserLimitReached.code()));

    let coupon_id = coupon.data()["id"].as_i64().unwrap();
    let usages = app
        .get(&format!("/api/coupons/{coupon_id}/usages"), Some(&admin))
        .await;
    assert_eq!(usages.data().as_array().unwrap().len(), 1);

    let order_id = order.data()["id"].as_i64().unwrap();
    let cancelled = app
        .post(&format!("/api/orders/{order_id}/cancel"), Some(&user), json!({}))
        .await;
    assert_eq!(cancelled.status, StatusCode::OK);
    assert_eq!(cancelled.data()["status"], "cancelled");
    assert_eq!(app.stock_of(product).await, 5);
}

#[tokio::test]
async fn order_status_follows_kitchen_flow() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let user = app.register("Ana", "ana@example.com").await;
    let other = app.register("Bo", "bo@example.com").await;
    let product = app.seed_product(&admin, 500, 10).await;

    app.post(
        "/api/cart/items",
        Some(&user),
        json!({"product_id": product, "quantity": 1}),
    )
    .await;
    let order = app
        .post(
            "/api/orders/checkout",
            Some(&user),
            json!({"payment_method": "cash", "delivery_type": "dine_in"}),
        )
        .await;
    let id = order.data()["id"].as_i64().unwrap();

    let foreign = app.get(&format!("/api/orders/{id}"), Some(&other)).await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);

    let skip = app
        .put(
            &format!("/api/orders/{id}/status"),
            Some(&admin),
            json!({"status": "delivered"}),
        )
        .await;
    assert_eq!(skip.status, StatusCode::CONFLICT);
    assert_eq!(skip.code(), Some(ErrorCode::OrderInvalidTransition.code()));

    for next in ["confirmed", "preparing"] {
        let step = app
            .put(
                &format!("/api/orders/{id}/status"),
                Some(&admin),
                json!({"status": next}),
            )
            .await;
        assert_eq!(step.status, StatusCode::OK);
        assert_eq!(step.data()["status"], next);
    }

    let late_cancel = app
        .post(&format!("/api/orders/{id}/cancel"), Some(&user), json!({}))
        .await;
    assert_eq!(late_cancel.code(), Some(ErrorCode::OrderNotCancellable.code()));

    let paid = app
        .put(
            &format!("/api/orders/{id}/payment"),
            Some(&admin),
            json!({"payment_status": "paid"}),
        )
        .await;
    assert_eq!(paid.data()["payment_status"], "paid");

    let listing = app.get("/api/orders?status=preparing", Some(&admin)).await;
    assert_eq!(listing.data()["total"], 1);
}

#[tokio::test]
async fn reservations_reject_overlap_and_price_by_minute() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let user = app.register("Ana", "ana@example.com").await;

    let area = app
        .post(
            "/api/areas",
            Some(&admin),
            json!({
                "name": "Terrace",
                "min_capacity": 2,
                "max_capacity": 8,
                "price_per_hour": 2000
            }),
        )
        .await;
    assert_eq!(area.status, StatusCode::CREATED, "{}", area.body);
    let area_id = area.data()["id"].as_i64().unwrap();

    let start = (now_ms() / HOUR_MS + 24) * HOUR_MS;
    let end = start + 90 * 60_000;
    let booking = |s: i64, e: i64, guests: i64| {
        json!({"area_id": area_id, "start_time": s, "end_time": e, "guests": guests})
    };

    let first = app
        .post("/api/reservations", Some(&user), booking(start, end, 4))
        .await;
    assert_eq!(first.status, StatusCode::CREATED, "{}", first.body);
    assert_eq!(first.data()["price"], 3000);
    assert_eq!(first.data()["status"], "pending");

    let overlapping = app
        .post(
            "/api/reservations",
            Some(&user),
            booking(start + 30 * 60_000, end + HOUR_MS, 4),
        )
        .await;
    assert_eq!(overlapping.status, StatusCode::CONFLICT);
    assert_eq!(overlapping.code(), Some(ErrorCode::ReservationOverlap.code()));

    let touching = app
        .post("/api/reservations", Some(&user), booking(end, end + HOUR_MS, 2))
        .await;
    assert_eq!(touching.status, StatusCode::CREATED);

    let crowd = app
        .post(
            "/api/reservations",
            Some(&user),
            booking(start + 10 * HOUR_MS, start + 11 * HOUR_MS, 20),
        )
        .await;
    assert_eq!(crowd.code(), Some(ErrorCode::ReservationCapacityExceeded.code()));

    let past = app
        .post(
            "/api/reservations",
            Some(&user),
            booking(now_ms() - 2 * HOUR_MS, now_ms() - HOUR_MS, 2),
        )
        .await;
    assert_eq!(past.code(), Some(ErrorCode::ReservationInPast.code()));

    let availability = app
        .get(
            &format!("/api/areas/{area_id}/availability?start={start}&end={end}"),
            None,
        )
        .await;
    assert_eq!(availability.data()["available"], false);
    assert_eq!(availability.data()["conflicts"].as_array().unwrap().len(), 1);

    let first_id = first.data()["id"].as_i64().unwrap();
    let cancelled = app
        .post(
            &format!("/api/reservations/{first_id}/cancel"),
            Some(&user),
            json!({}),
        )
        .await;
    assert_eq!(cancelled.data()["status"], "cancelled");

    let rebooked = app
        .post("/api/reservations", Some(&user), booking(start, end, 4))
        .await;
    assert_eq!(rebooked.status, StatusCode::CREATED);

    let rebooked_id = rebooked.data()["id"].as_i64().unwrap();
    let paid = app
        .post(
            &format!("/api/reservations/{rebooked_id}/pay"),
            Some(&user),
            json!({}),
        )
        .await;
    assert_eq!(paid.data()["status"], "paid");
}

#[tokio::test]
async fn two_factor_login_requires_second_step() {
    let app = TestApp::new().await;
    let user = app.register("Ana", "ana@example.com").await;

    let setup = app.post("/api/auth/2fa/setup", Some(&user), json!({})).await;
    assert_eq!(setup.status, StatusCode::OK, "{}", setup.body);
    let secret = setup.data()["secret"].as_str().unwrap().to_string();
    let key = totp::base32_decode(&secret).unwrap();
    let code = totp::totp_at(&key, chrono::Utc::now().timestamp());

    let enabled = app
        .post("/api/auth/2fa/enable", Some(&user), json!({"code": code}))
        .await;
    assert_eq!(enabled.status, StatusCode::OK, "{}", enabled.body);
    let backup = enabled.data()["backup_codes"][0].as_str().unwrap().to_string();

    let login = app
        .post(
            "/api/auth/login",
            None,
            json!({"email": "ana@example.com", "password": "password-123"}),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.data()["requires_two_factor"], true);
    assert!(login.data().get("token").is_none());
    assert!(!login.headers.contains_key(header::SET_COOKIE));
    let pending = login.data()["pending_token"].as_str().unwrap().to_string();

    // A pending token is not a session
    let sneaky = app.get("/api/auth/me", Some(&pending)).await;
    assert_eq!(sneaky.status, StatusCode::UNAUTHORIZED);

    let wrong = app
        .post(
            "/api/auth/2fa/verify-login",
            None,
            json!({"pending_token": pending, "code": "000000"}),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let verified = app
        .post(
            "/api/auth/2fa/verify-login",
            None,
            json!({"pending_token": pending, "code": backup}),
        )
        .await;
    assert_eq!(verified.status, StatusCode::OK, "{}", verified.body);
    let session = verified.data()["token"].as_str().unwrap().to_string();
    assert_eq!(app.get("/api/auth/me", Some(&session)).await.status, StatusCode::OK);

    let replay = app
        .post(
            "/api/auth/2fa/verify-login",
            None,
            json!({"pending_token": pending, "code": backup}),
        )
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reviews_are_unique_per_target() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let ana = app.register("Ana", "ana@example.com").await;
    let bo = app.register("Bo", "bo@example.com").await;
    let product = app.seed_product(&admin, 900, 5).await;

    let review = |rating: i64| {
        json!({"target_type": "menu", "target_id": product, "rating": rating, "comment": "Buona"})
    };

    let first = app.post("/api/reviews", Some(&ana), review(5)).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.data()["user_name"], "Ana");

    let second = app.post("/api/reviews", Some(&ana), review(4)).await;
    assert_eq!(second.code(), Some(ErrorCode::ReviewAlreadyExists.code()));

    app.post("/api/reviews", Some(&bo), review(4)).await;

    let missing = app
        .post(
            "/api/reviews",
            Some(&bo),
            json!({"target_type": "area", "target_id": 999, "rating": 3}),
        )
        .await;
    assert_eq!(missing.code(), Some(ErrorCode::ReviewTargetNotFound.code()));

    let listing = app
        .get(
            &format!("/api/reviews?target_type=menu&target_id={product}"),
            None,
        )
        .await;
    assert_eq!(listing.data()["summary"]["count"], 2);
    assert_eq!(listing.data()["summary"]["average"], 4.5);

    let review_id = first.data()["id"].as_i64().unwrap();
    let not_author = app
        .send(
            Method::DELETE,
            &format!("/api/reviews/{review_id}"),
            Some(&bo),
            None,
            None,
        )
        .await;
    assert_eq!(not_author.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn offers_are_priced_from_products() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let product = app.seed_product(&admin, 900, 5).await;
    let now = now_ms();

    let too_expensive = app
        .post(
            "/api/offers",
            Some(&admin),
            json!({
                "title": "Pizza night",
                "items": [{"product_id": product, "quantity": 2}],
                "offer_price": 1800,
                "valid_from": now - HOUR_MS,
                "valid_until": now + HOUR_MS
            }),
        )
        .await;
    assert_eq!(too_expensive.code(), Some(ErrorCode::OfferInvalidPrice.code()));

    let offer = app
        .post(
            "/api/offers",
            Some(&admin),
            json!({
                "title": "Pizza night",
                "items": [{"product_id": product, "quantity": 2}],
                "offer_price": 1500,
                "valid_from": now - HOUR_MS,
                "valid_until": now + HOUR_MS
            }),
        )
        .await;
    assert_eq!(offer.status, StatusCode::CREATED, "{}", offer.body);
    assert_eq!(offer.data()["original_price"], 1800);
    assert_eq!(offer.data()["savings"], 300);
    assert_eq!(offer.data()["discount_percent"], 17);

    let live = app.get("/api/offers", None).await;
    assert_eq!(live.data().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn oversized_amounts_are_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let user = app.register("Ana", "ana@example.com").await;

    let coupon = app
        .post(
            "/api/coupons",
            Some(&admin),
            json!({
                "code": "TWENTY",
                "discount_type": "percentage",
                "discount_value": 20,
                "valid_from": now_ms() - HOUR_MS,
                "valid_until": now_ms() + HOUR_MS
            }),
        )
        .await;
    assert_eq!(coupon.status, StatusCode::CREATED, "{}", coupon.body);

    let huge = app
        .post(
            "/api/coupons/validate",
            Some(&user),
            json!({"code": "TWENTY", "subtotal": 1_000_000_000_000_000_000i64}),
        )
        .await;
    assert_eq!(huge.status, StatusCode::BAD_REQUEST, "{}", huge.body);
    assert_eq!(huge.code(), Some(ErrorCode::ValidationFailed.code()));

    let largest = app
        .post(
            "/api/coupons/validate",
            Some(&user),
            json!({"code": "TWENTY", "subtotal": 100_000_000_000i64}),
        )
        .await;
    assert_eq!(largest.status, StatusCode::OK, "{}", largest.body);
    assert_eq!(largest.data()["discount"], 20_000_000_000i64);

    let product = app.seed_product(&admin, 900, 5).await;
    let pricey = app
        .post(
            "/api/menu",
            Some(&admin),
            json!({"name": "Gold pizza", "price": i64::MAX, "category": "Pizza"}),
        )
        .await;
    assert_eq!(pricey.status, StatusCode::BAD_REQUEST);

    let bulk = app
        .post(
            "/api/cart/items",
            Some(&user),
            json!({"product_id": product, "quantity": i64::MAX}),
        )
        .await;
    assert_eq!(bulk.code(), Some(ErrorCode::InvalidQuantity.code()));
    assert_eq!(app.stock_of(product).await, 5);

    let restock = app
        .send(
            Method::PATCH,
            &format!("/api/menu/{product}/stock"),
            Some(&admin),
            None,
            Some(json!({"delta": i64::MAX})),
        )
        .await;
    assert_eq!(restock.code(), Some(ErrorCode::ValueOutOfRange.code()));

    let bundle = app
        .post(
            "/api/offers",
            Some(&admin),
            json!({
                "title": "Everything",
                "items": [{"product_id": product, "quantity": i64::MAX}],
                "offer_price": 100,
                "valid_from": now_ms() - HOUR_MS,
                "valid_until": now_ms() + HOUR_MS
            }),
        )
        .await;
    assert_eq!(bundle.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_is_admin_only_and_needs_cloudinary() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let user = app.register("Ana", "ana@example.com").await;
    let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    let anonymous = app.upload(None, png).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let client = app.upload(Some(&user), png).await;
    assert_eq!(client.status, StatusCode::FORBIDDEN);

    let unconfigured = app.upload(Some(&admin), png).await;
    assert_eq!(unconfigured.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(unconfigured.code(), Some(ErrorCode::UploadNotConfigured.code()));
}

#[tokio::test]
async fn upload_checks_file_before_sending() {
    let mut config = Config::for_tests();
    config.cloudinary = Some(CloudinaryConfig {
        cloud_name: "demo".into(),
        api_key: "key".into(),
        api_secret: "secret".into(),
        folder: "trattoria".into(),
    });
    let app = TestApp::with_config(config).await;
    let admin = app.admin_token().await;

    let text = app.upload(Some(&admin), b"just some text").await;
    assert_eq!(text.status, StatusCode::BAD_REQUEST);
    assert_eq!(text.code(), Some(ErrorCode::UnsupportedFileFormat.code()));

    let empty = app.upload(Some(&admin), b"").await;
    assert_eq!(empty.code(), Some(ErrorCode::EmptyFile.code()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_cart_adds_all_reserve_stock() {
    let dir = tempfile::tempdir().unwrap();
    let app = TestApp::file_backed(&dir.path().join("trattoria.db")).await;
    let admin = app.admin_token().await;
    let product = app.seed_product(&admin, 900, 1000).await;

    let mut handles = Vec::new();
    for _ in 0..40 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            app.post(
                "/api/cart/items",
                None,
                json!({"product_id": product, "quantity": 1}),
            )
            .await
        }));
    }
    for handle in handles {
        let reply = handle.await.unwrap();
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    }

    assert_eq!(app.stock_of(product).await, 960);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bookings_admit_exactly_one() {
    let dir = tempfile::tempdir().unwrap();
    let app = TestApp::file_backed(&dir.path().join("trattoria.db")).await;
    let admin = app.admin_token().await;
    let user = app.register("Ana", "ana@example.com").await;

    let area = app
        .post(
            "/api/areas",
            Some(&admin),
            json!({"name": "Cellar", "min_capacity": 1, "max_capacity": 10, "price_per_hour": 1000}),
        )
        .await;
    assert_eq!(area.status, StatusCode::CREATED, "{}", area.body);
    let area_id = area.data()["id"].as_i64().unwrap();
    let start = (now_ms() / HOUR_MS + 48) * HOUR_MS;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let app = app.clone();
        let user = user.clone();
        handles.push(tokio::spawn(async move {
            app.post(
                "/api/reservations",
                Some(&user),
                json!({
                    "area_id": area_id,
                    "start_time": start,
                    "end_time": start + HOUR_MS,
                    "guests": 4
                }),
            )
            .await
        }));
    }

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        let reply = handle.await.unwrap();
        match reply.status {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => conflicts += 1,
            other => panic!("unexpected {other}: {}", reply.body),
        }
    }
    assert_eq!((created, conflicts), (1, 7));
}
