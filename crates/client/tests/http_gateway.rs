use axum::{Json, Router, http::StatusCode, routing::post};
use serde_json::{Value, json};

use client::{CheckoutGateway, ClientConfig, GatewayError, HttpGateway, SubmitError};
use domain::{CheckoutRequest, OrderId};

/// Serves `router` on an ephemeral port and returns its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn gateway(base_url: &str) -> HttpGateway {
    HttpGateway::new(&ClientConfig::new(base_url)).unwrap()
}

#[tokio::test]
async fn created_response_yields_order_id() {
    let id = OrderId::new();
    let router = Router::new().route(
        "/api/checkout",
        post(move |Json(body): Json<Value>| async move {
            assert_eq!(body["paymentMethod"], "paypal");
            (
                StatusCode::CREATED,
                Json(json!({ "success": true, "message": "Order placed successfully", "orderId": id })),
            )
        }),
    );
    let url = serve(router).await;

    let placed = gateway(&url)
        .submit(&CheckoutRequest {
            payment_method: domain::PaymentMethod::Paypal,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(placed, id);
}

#[tokio::test]
async fn refusal_message_is_kept() {
    let router = Router::new().route(
        "/api/checkout",
        post(|| async {
            (
                StatusCode::CONFLICT,
                Json(json!({ "success": false, "message": "Insufficient stock for Kenyan AA" })),
            )
        }),
    );
    let url = serve(router).await;

    let err = gateway(&url)
        .submit(&CheckoutRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.server_message(), Some("Insufficient stock for Kenyan AA"));
    assert_eq!(
        SubmitError::from(err).to_string(),
        "Insufficient stock for Kenyan AA"
    );
}

#[tokio::test]
async fn bare_error_status_has_no_message() {
    let router = Router::new().route(
        "/api/checkout",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let url = serve(router).await;

    let err = gateway(&url)
        .submit(&CheckoutRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Rejected { status: 502, message: None }));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = gateway(&format!("http://{addr}"))
        .submit(&CheckoutRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Http(_)));
    assert!(matches!(SubmitError::from(err), SubmitError::Failed(_)));
}
