//! End-to-end tests for `POST /api/create-order` against a mock Shopify.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::body::Body;
use axum::http::{Method, StatusCode};
use egpc_integration_tests::{TEST_SHOP, TestContext};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

// =============================================================================
// Fixtures
// =============================================================================

fn legacy_order() -> Value {
    json!({
        "variantId": "44012345",
        "customer": { "name": "Ana María Restrepo", "email": "ana@example.com", "phone": "+573001234567" },
        "shippingAddress": {
            "address1": "Carrera 15 # 93-47",
            "city": "Bogotá",
            "province": "Cundinamarca",
            "country": "Colombia",
            "zip": "110221"
        }
    })
}

fn cart_order(total_price: Value) -> Value {
    json!({
        "line_items": [
            { "variant_id": 1001, "quantity": 2, "properties": { "Color": "Rojo" } },
            { "variant_id": 1002, "quantity": 1 }
        ],
        "customer": { "first_name": "Ana", "last_name": "Restrepo", "email": "ana@example.com" },
        "shippingAddress": { "address1": "Carrera 15 # 93-47", "city": "Bogotá" },
        "shop": TEST_SHOP,
        "total_price": total_price
    })
}

fn open_draft(subtotal: &str) -> Value {
    json!({
        "draft_order": {
            "id": 9001,
            "name": "#D12",
            "status": "open",
            "order_id": null,
            "subtotal_price": subtotal,
            "total_price": subtotal,
            "currency": "COP"
        }
    })
}

fn completed_draft() -> Value {
    json!({ "draft_order": { "id": 9001, "status": "completed", "order_id": 5001 } })
}

async fn mount_variant(ctx: &TestContext) {
    Mock::given(method("GET"))
        .and(path("/variants/44012345.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "variant": { "id": 44_012_345, "price": "89900.00", "title": "Talla M", "product_id": 7 }
        })))
        .mount(&ctx.shopify)
        .await;
}

async fn mount_create(ctx: &TestContext, subtotal: &str) {
    Mock::given(method("POST"))
        .and(path("/draft_orders.json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(open_draft(subtotal)))
        .mount(&ctx.shopify)
        .await;
}

async fn mount_complete(ctx: &TestContext, response: ResponseTemplate) {
    Mock::given(method("PUT"))
        .and(path("/draft_orders/9001/complete.json"))
        .and(query_param("payment_pending", "true"))
        .respond_with(response)
        .expect(1)
        .mount(&ctx.shopify)
        .await;
}

// =============================================================================
// Transport
// =============================================================================

#[tokio::test]
async fn test_preflight_returns_no_content() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(Method::OPTIONS, "/api/create-order", Body::empty())
        .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(
        response.headers()["access-control-allow-methods"],
        "POST, OPTIONS"
    );
    assert_eq!(response.headers()["access-control-max-age"], "86400");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(body.is_empty());
    assert_eq!(ctx.shopify_calls().await, 0);
}

#[tokio::test]
async fn test_wrong_method_rejected() {
    let ctx = TestContext::new().await;

    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let response = ctx.send(method, "/api/create-order", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }
    assert_eq!(ctx.shopify_calls().await, 0);
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;

    let response = ctx.send(Method::GET, "/health", Body::empty()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_cors_settings_from_config() {
    let ctx = TestContext::with_config(|config| {
        config.cors.max_age_secs = None;
        config.cors.allow_credentials = true;
    })
    .await;

    let response = ctx
        .send(Method::OPTIONS, "/api/create-order", Body::empty())
        .await;

    assert!(!response.headers().contains_key("access-control-max-age"));
    assert_eq!(
        response.headers()["access-control-allow-credentials"],
        "true"
    );
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_missing_customer_makes_no_calls() {
    let ctx = TestContext::new().await;
    let mut body = legacy_order();
    body.as_object_mut().unwrap().remove("customer");

    let (status, reply) = ctx.post_json(body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reply["success"], false);
    assert!(reply["message"].as_str().unwrap().contains("customer"));
    assert_eq!(ctx.shopify_calls().await, 0);
}

#[tokio::test]
async fn test_missing_shipping_address_makes_no_calls() {
    let ctx = TestContext::new().await;
    let mut body = legacy_order();
    body.as_object_mut().unwrap().remove("shippingAddress");

    let (status, reply) = ctx.post_json(body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        reply["message"]
            .as_str()
            .unwrap()
            .contains("shippingAddress")
    );
    assert_eq!(ctx.shopify_calls().await, 0);
}

#[tokio::test]
async fn test_invalid_json_rejected() {
    let ctx = TestContext::new().await;

    let (status, reply) = ctx.post_raw("{\"variantId\": ".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reply["message"], "Invalid JSON body.");
    assert!(reply["error"].is_string());
}

#[tokio::test]
async fn test_required_cart_fields_from_config() {
    let ctx = TestContext::with_config(|config| {
        config.checkout.require_total_price = true;
    })
    .await;
    let mut body = cart_order(Value::Null);
    body.as_object_mut().unwrap().remove("total_price");

    let (status, reply) = ctx.post_json(body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(reply["message"].as_str().unwrap().contains("total_price"));
    assert_eq!(ctx.shopify_calls().await, 0);
}

// =============================================================================
// Order Creation
// =============================================================================

#[tokio::test]
async fn test_unknown_variant_returns_not_found() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/variants/44012345.json"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "errors": "Not Found" })))
        .expect(1)
        .mount(&ctx.shopify)
        .await;
    Mock::given(method("POST"))
        .and(path("/draft_orders.json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(open_draft("0.00")))
        .expect(0)
        .mount(&ctx.shopify)
        .await;

    let (status, reply) = ctx.post_json(legacy_order()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(reply["success"], false);
    assert_eq!(reply["message"], "Product variant not found.");
}

#[tokio::test]
async fn test_legacy_order_created() {
    let ctx = TestContext::new().await;
    mount_variant(&ctx).await;
    Mock::given(method("POST"))
        .and(path("/draft_orders.json"))
        .and(body_partial_json(json!({
            "draft_order": {
                "line_items": [{ "variant_id": 44_012_345, "quantity": 1, "price": "89900.00", "title": "Talla M" }],
                "customer": { "first_name": "Ana", "last_name": "María Restrepo", "email": "ana@example.com" },
                "shipping_address": {
                    "address1": "Carrera 15 # 93-47",
                    "first_name": "Ana",
                    "last_name": "María Restrepo",
                    "phone": "+573001234567"
                },
                "use_customer_default_address": false,
                "tags": "EGPC",
                "note": "Pedido generado por formulario EGPC (Pago Contra Entrega)"
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(open_draft("89900.00")))
        .expect(1)
        .mount(&ctx.shopify)
        .await;
    mount_complete(
        &ctx,
        ResponseTemplate::new(200).set_body_json(completed_draft()),
    )
    .await;

    let (status, reply) = ctx.post_json(legacy_order()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        reply,
        json!({ "success": true, "orderId": 5001, "draftOrderId": 9001 })
    );
}

#[tokio::test]
async fn test_string_encoded_body_accepted() {
    let ctx = TestContext::new().await;
    mount_variant(&ctx).await;
    mount_create(&ctx, "89900.00").await;
    mount_complete(
        &ctx,
        ResponseTemplate::new(200).set_body_json(completed_draft()),
    )
    .await;

    let body = Value::String(legacy_order().to_string());
    let (status, reply) = ctx.post_json(body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["orderId"], 5001);
}

#[tokio::test]
async fn test_root_path_creates_order() {
    let ctx = TestContext::new().await;
    mount_variant(&ctx).await;
    mount_create(&ctx, "89900.00").await;
    mount_complete(
        &ctx,
        ResponseTemplate::new(200).set_body_json(completed_draft()),
    )
    .await;

    let response = ctx
        .send(Method::POST, "/", Body::from(legacy_order().to_string()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let reply: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        reply,
        json!({ "success": true, "orderId": 5001, "draftOrderId": 9001 })
    );
}

#[tokio::test]
async fn test_cart_order_with_discount() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/draft_orders.json"))
        .and(body_partial_json(json!({
            "draft_order": {
                "line_items": [
                    { "variant_id": 1001, "quantity": 2, "properties": [{ "name": "Color", "value": "Rojo" }] },
                    { "variant_id": 1002, "quantity": 1 }
                ],
                "tags": "EGPC, One-Step-Checkout"
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(open_draft("50000.00")))
        .expect(1)
        .mount(&ctx.shopify)
        .await;
    Mock::given(method("PUT"))
        .and(path("/draft_orders/9001.json"))
        .and(body_partial_json(json!({
            "draft_order": {
                "applied_discount": {
                    "title": "EGPC",
                    "value_type": "fixed_amount",
                    "value": "5000.00",
                    "amount": "5000.00"
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(open_draft("50000.00")))
        .expect(1)
        .mount(&ctx.shopify)
        .await;
    mount_complete(
        &ctx,
        ResponseTemplate::new(200).set_body_json(json!({
            "order": { "id": 5001, "order_number": 1042, "name": "#1042" }
        })),
    )
    .await;

    let (status, reply) = ctx.post_json(cart_order(json!(45000))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        reply,
        json!({ "success": true, "orderId": 5001, "orderNumber": 1042, "draftOrderId": 9001 })
    );
}

#[tokio::test]
async fn test_cart_order_for_other_shop_rejected() {
    let ctx = TestContext::new().await;
    let mut body = cart_order(json!("45000"));
    body["shop"] = json!("another-store.myshopify.com");

    let (status, reply) = ctx.post_json(body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reply["success"], false);
    assert_eq!(ctx.shopify_calls().await, 0);
}

#[tokio::test]
async fn test_unreadable_completion_is_success() {
    let ctx = TestContext::new().await;
    mount_variant(&ctx).await;
    mount_create(&ctx, "89900.00").await;
    mount_complete(
        &ctx,
        ResponseTemplate::new(200).set_body_string("<html>OK</html>"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/draft_orders/9001.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completed_draft()))
        .expect(1)
        .mount(&ctx.shopify)
        .await;

    let (status, reply) = ctx.post_json(legacy_order()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["success"], true);
    assert_eq!(reply["orderId"], 5001);
    assert!(reply["message"].is_string());
}

#[tokio::test]
async fn test_upstream_rejection_returns_server_error() {
    let ctx = TestContext::new().await;
    mount_variant(&ctx).await;
    Mock::given(method("POST"))
        .and(path("/draft_orders.json"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": { "shipping_address": ["province is not valid"] }
        })))
        .mount(&ctx.shopify)
        .await;

    let (status, reply) = ctx.post_json(legacy_order()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply["success"], false);
    assert_eq!(reply["message"], "Failed to create order.");
    assert!(
        reply["error"]
            .as_str()
            .unwrap()
            .contains("province is not valid")
    );
}

#[tokio::test]
async fn test_completion_failure_is_not_retried() {
    let ctx = TestContext::new().await;
    mount_variant(&ctx).await;
    mount_create(&ctx, "89900.00").await;
    mount_complete(
        &ctx,
        ResponseTemplate::new(429).insert_header("Retry-After", "2.0"),
    )
    .await;

    let (status, reply) = ctx.post_json(legacy_order()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(reply["error"].as_str().unwrap().contains("Rate limited"));
    assert_eq!(ctx.shopify_calls().await, 3);
}
