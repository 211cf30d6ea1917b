//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::AppState;
use api::config::Config;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use checkout::PasswordHashing;
use domain::{CatalogItem, ProductId};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use store::{CatalogStore, InMemoryStore, ProductQuery};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

struct TestApp {
    router: Router,
    store: InMemoryStore,
}

impl TestApp {
    async fn new() -> Self {
        let store = InMemoryStore::new();
        let state = AppState::with_hashing(
            store.clone(),
            &Config::default(),
            PasswordHashing::with_params(8, 1, 1).unwrap(),
        );
        api::seed_demo_data(&state).await.unwrap();
        let router = api::create_app(Arc::new(state), get_metrics_handle());
        Self { router, store }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn product(&self, name: &str) -> CatalogItem {
        self.store
            .list_products(&ProductQuery::new().search(name))
            .await
            .unwrap()
            .into_iter()
            .find(|p| p.name == name)
            .unwrap()
    }

    async fn stock(&self, id: ProductId) -> u32 {
        self.store.get_product(id).await.unwrap().unwrap().stock
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, json) = self
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{json}");
        json["token"].as_str().unwrap().to_string()
    }
}

fn customer_info(email: &str) -> Value {
    json!({
        "name": "Jane Smith",
        "email": email,
        "phone": "555-0101",
        "street": "789 Espresso Lane",
        "city": "Seattle",
        "state": "WA",
        "zipCode": "98101"
    })
}

fn checkout_body(email: &str, item: &CatalogItem, quantity: u32) -> Value {
    json!({
        "customerInfo": customer_info(email),
        "items": [{
            "productId": item.id,
            "name": item.name,
            "price": item.price,
            "quantity": quantity,
            "grindOption": null
        }],
        "subtotal": 0, "shipping": 0, "tax": 0, "total": 0,
        "paymentMethod": "paypal"
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;
    let (status, json) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

mod products {
    use super::*;

    #[tokio::test]
    async fn lists_and_filters() {
        let app = TestApp::new().await;

        let (status, json) = app.send("GET", "/api/products", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["products"].as_array().unwrap().len(), 20);

        let (_, json) = app
            .send("GET", "/api/products?category=energy-drink", None, None)
            .await;
        let drinks = json["products"].as_array().unwrap();
        assert!(!drinks.is_empty());
        assert!(drinks.iter().all(|p| p["category"] == "energy-drink"));

        let (_, json) = app
            .send("GET", "/api/products?search=KONA", None, None)
            .await;
        assert_eq!(json["products"][0]["name"], "Hawaiian Kona");
    }

    #[tokio::test]
    async fn featured_is_capped_at_six() {
        let app = TestApp::new().await;
        let (status, json) = app.send("GET", "/api/products/featured", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let featured = json["products"].as_array().unwrap();
        assert_eq!(featured.len(), 6);
        assert!(featured.iter().all(|p| p["featured"] == true));
    }

    #[tokio::test]
    async fn by_id_and_not_found() {
        let app = TestApp::new().await;
        let kona = app.product("Hawaiian Kona").await;

        let (status, json) = app
            .send("GET", &format!("/api/products/{}", kona.id), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["product"]["price"], 34.99);

        for uri in [
            format!("/api/products/{}", ProductId::new()),
            "/api/products/not-a-uuid".to_string(),
        ] {
            let (status, json) = app.send("GET", &uri, None, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(json["message"], "Product not found");
        }
    }

    #[tokio::test]
    async fn unknown_query_parameter_is_rejected() {
        let app = TestApp::new().await;
        let (status, json) = app
            .send("GET", "/api/products?colour=brown", None, None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
    }
}

mod checkout_flow {
    use super::*;

    #[tokio::test]
    async fn places_order_and_reads_it_back() {
        let app = TestApp::new().await;
        let kona = app.product("Hawaiian Kona").await;
        let before = app.stock(kona.id).await;

        let (status, json) = app
            .send("POST", "/api/checkout", None, Some(checkout_body("jane@example.com", &kona, 2)))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Order placed successfully");
        assert_eq!(json["order"]["subtotal"], 69.98);
        assert_eq!(json["order"]["shipping"], 0.0);
        assert_eq!(json["order"]["status"], "pending");
        assert_eq!(app.stock(kona.id).await, before - 2);

        let order_id = json["orderId"].as_str().unwrap();
        let (status, json) = app
            .send("GET", &format!("/api/orders/{order_id}"), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["order"]["id"], order_id);
        assert_eq!(json["order"]["customer"]["email"], "jane@example.com");
        assert_eq!(json["order"]["products"][0]["name"], "Hawaiian Kona");
    }

    #[tokio::test]
    async fn missing_customer_info_is_400() {
        let app = TestApp::new().await;
        let (status, json) = app
            .send("POST", "/api/checkout", None, Some(json!({ "items": [] })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["message"],
            "Missing required fields: customerInfo and items are required"
        );
    }

    #[tokio::test]
    async fn unknown_product_is_400() {
        let app = TestApp::new().await;
        let mut ghost = app.product("Hawaiian Kona").await;
        ghost.id = ProductId::new();

        let (status, json) = app
            .send("POST", "/api/checkout", None, Some(checkout_body("a@b.co", &ghost, 1)))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "No valid items in cart");
    }

    #[tokio::test]
    async fn unknown_field_is_400() {
        let app = TestApp::new().await;
        let kona = app.product("Hawaiian Kona").await;
        let mut body = checkout_body("a@b.co", &kona, 1);
        body["couponCode"] = json!("FREECOFFEE");

        let (status, json) = app.send("POST", "/api/checkout", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert!(json["message"].as_str().unwrap().contains("couponCode"));
    }

    #[tokio::test]
    async fn shortfall_is_409_under_strict() {
        let app = TestApp::new().await;
        let kona = app.product("Hawaiian Kona").await;
        let stock = app.stock(kona.id).await;

        let (status, json) = app
            .send(
                "POST",
                "/api/checkout",
                None,
                Some(checkout_body("a@b.co", &kona, stock + 1)),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["message"], "Insufficient stock for Hawaiian Kona");
        assert_eq!(app.stock(kona.id).await, stock);
    }

    #[tokio::test]
    async fn unknown_order_is_404() {
        let app = TestApp::new().await;
        let (status, json) = app
            .send("GET", &format!("/api/orders/{}", ProductId::new()), None, None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Order not found");
    }

    #[tokio::test]
    async fn metrics_are_exported() {
        let app = TestApp::new().await;
        let kona = app.product("Hawaiian Kona").await;
        app.send("POST", "/api/checkout", None, Some(checkout_body("m@b.co", &kona, 1)))
            .await;

        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("checkout_requests_total"));
    }
}

mod auth {
    use super::*;

    #[tokio::test]
    async fn register_then_me() {
        let app = TestApp::new().await;
        let (status, json) = app
            .send(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "name": "Sam Brewer",
                    "email": "Sam@Example.com",
                    "password": "latte123",
                    "confirmPassword": "latte123"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        assert_eq!(json["user"]["email"], "sam@example.com");
        assert!(json["user"].get("passwordHash").is_none());
        let token = json["token"].as_str().unwrap().to_string();

        let (status, json) = app.send("GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["user"]["name"], "Sam Brewer");
    }

    #[tokio::test]
    async fn duplicate_registration_is_400() {
        let app = TestApp::new().await;
        let (status, json) = app
            .send(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "name": "John",
                    "email": "john@example.com",
                    "password": "password123",
                    "confirmPassword": "password123"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "User with this email already exists");
    }

    #[tokio::test]
    async fn bad_credentials_and_tokens_are_401() {
        let app = TestApp::new().await;
        let (status, json) = app
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "john@example.com", "password": "nope" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Invalid email or password");

        let (status, json) = app.send("GET", "/api/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Access denied. No token provided.");

        let (status, json) = app.send("GET", "/api/auth/me", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Invalid or expired token.");
    }

    #[tokio::test]
    async fn profile_update_and_password_change() {
        let app = TestApp::new().await;
        let token = app.login("john@example.com", "password123").await;

        let (status, json) = app
            .send(
                "PUT",
                "/api/auth/me",
                Some(&token),
                Some(json!({ "email": "jane@example.com" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Email is already taken by another account");

        let (status, json) = app
            .send(
                "PUT",
                "/api/auth/me",
                Some(&token),
                Some(json!({ "name": "Johnny Doe" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["user"]["name"], "Johnny Doe");

        let (status, json) = app
            .send(
                "POST",
                "/api/auth/change-password",
                Some(&token),
                Some(json!({ "currentPassword": "wrong-one", "newPassword": "mocha456" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Current password is incorrect");

        let (status, _) = app
            .send(
                "POST",
                "/api/auth/change-password",
                Some(&token),
                Some(json!({ "currentPassword": "password123", "newPassword": "mocha456" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        app.login("john@example.com", "mocha456").await;
    }
}

mod orders {
    use super::*;

    async fn place(app: &TestApp, email: &str, item: &CatalogItem, quantity: u32) -> String {
        let (status, json) = app
            .send("POST", "/api/checkout", None, Some(checkout_body(email, item, quantity)))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["orderId"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn customers_see_their_own_and_admins_see_all() {
        let app = TestApp::new().await;
        let kona = app.product("Hawaiian Kona").await;
        place(&app, "john@example.com", &kona, 1).await;
        place(&app, "jane@example.com", &kona, 1).await;

        let john = app.login("john@example.com", "password123").await;
        let (status, json) = app.send("GET", "/api/orders", Some(&john), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["orders"].as_array().unwrap().len(), 1);

        let admin = app.login("admin@caffeinecorner.com", "admin123").await;
        let (_, json) = app.send("GET", "/api/orders", Some(&admin), None).await;
        assert_eq!(json["orders"].as_array().unwrap().len(), 2);

        let (_, json) = app
            .send("GET", "/api/orders?status=shipped", Some(&admin), None)
            .await;
        assert!(json["orders"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_changes_are_admin_only_and_cancel_restocks() {
        let app = TestApp::new().await;
        let kona = app.product("Hawaiian Kona").await;
        let before = app.stock(kona.id).await;
        let order_id = place(&app, "john@example.com", &kona, 3).await;
        assert_eq!(app.stock(kona.id).await, before - 3);

        let uri = format!("/api/orders/{order_id}/status");
        let john = app.login("john@example.com", "password123").await;
        let (status, _) = app
            .send("PATCH", &uri, Some(&john), Some(json!({ "status": "cancelled" })))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = app.login("admin@caffeinecorner.com", "admin123").await;
        let (status, json) = app
            .send("PATCH", &uri, Some(&admin), Some(json!({ "status": "cancelled" })))
            .await;
        assert_eq!(status, StatusCode::OK, "{json}");
        assert_eq!(json["order"]["status"], "cancelled");
        assert_eq!(app.stock(kona.id).await, before);

        let (status, _) = app
            .send("PATCH", &uri, Some(&admin), Some(json!({ "status": "shipped" })))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
