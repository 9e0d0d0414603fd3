//! Cart, checkout and cancellation against running admin and storefront servers.
//!
//! Run with: cargo test -p bloom-bouquet-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use bloom_bouquet_core::AdminRole;
use bloom_bouquet_integration_tests::TestContext;

fn checkout_body(method: &str) -> Value {
    json!({
        "shipping_name": "Test Customer",
        "shipping_phone": "0812 0000 0000",
        "shipping_address": "Jl. Melati No. 7, Bandung",
        "payment_method": method,
    })
}

async fn add_to_cart(ctx: &TestContext, product_id: &Value, quantity: i32) -> StatusCode {
    ctx.customer
        .post(ctx.store_api("/api/cart"))
        .json(&json!({ "product_id": product_id, "quantity": quantity }))
        .send()
        .await
        .expect("add to cart request")
        .status()
}

#[tokio::test]
#[ignore = "Requires running admin, storefront and database"]
async fn test_checkout_takes_stock_and_empties_cart() {
    let ctx = TestContext::new().await;
    ctx.login_admin(AdminRole::Admin).await;
    let product = ctx
        .create_product(&format!("Rose {}", Uuid::new_v4().simple()), "150000", 5)
        .await;
    let product_id = product["id"].as_i64().expect("id");

    ctx.verified_customer().await;
    assert_eq!(add_to_cart(&ctx, &product["id"], 2).await, StatusCode::OK);

    let resp = ctx
        .customer
        .post(ctx.store_api("/api/checkout"))
        .json(&checkout_body("bank_transfer"))
        .send()
        .await
        .expect("checkout request");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("order json");

    assert_eq!(order["status"], "waiting_for_payment");
    assert_eq!(order["payment_status"], "pending");
    assert!(order["order_number"].as_str().expect("number").starts_with("BB-"));
    assert_eq!(order["items"].as_array().expect("items").len(), 1);
    assert!(!order["payment_deadline"].is_null());
    assert_eq!(ctx.stock_of(product_id).await, 3);

    let cart: Value = ctx
        .customer
        .get(ctx.store_api("/api/cart"))
        .send()
        .await
        .expect("cart request")
        .json()
        .await
        .expect("cart json");
    assert_eq!(cart["item_count"], 0);

    let unread: Value = ctx
        .customer
        .get(ctx.store_api("/api/notifications/unread-count"))
        .send()
        .await
        .expect("unread request")
        .json()
        .await
        .expect("unread json");
    assert!(unread["count"].as_i64().expect("count") >= 1);
}

#[tokio::test]
#[ignore = "Requires running admin, storefront and database"]
async fn test_cancel_restores_stock_once() {
    let ctx = TestContext::new().await;
    ctx.login_admin(AdminRole::Admin).await;
    let product = ctx
        .create_product(&format!("Tulip {}", Uuid::new_v4().simple()), "90000", 4)
        .await;
    let product_id = product["id"].as_i64().expect("id");

    ctx.verified_customer().await;
    assert_eq!(add_to_cart(&ctx, &product["id"], 3).await, StatusCode::OK);
    let order: Value = ctx
        .customer
        .post(ctx.store_api("/api/checkout"))
        .json(&checkout_body("qris"))
        .send()
        .await
        .expect("checkout request")
        .json()
        .await
        .expect("order json");
    let number = order["order_number"].as_str().expect("number");
    assert_eq!(ctx.stock_of(product_id).await, 1);

    let cancel = ctx
        .customer
        .post(ctx.store_api(&format!("/api/orders/{number}/cancel")))
        .send()
        .await
        .expect("cancel request");
    assert_eq!(cancel.status(), StatusCode::OK);
    let cancelled: Value = cancel.json().await.expect("order json");
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(cancelled["payment_status"], "failed");
    assert_eq!(ctx.stock_of(product_id).await, 4);

    let again = ctx
        .customer
        .post(ctx.store_api(&format!("/api/orders/{number}/cancel")))
        .send()
        .await
        .expect("cancel request");
    assert_eq!(again.status(), StatusCode::CONFLICT);
    assert_eq!(ctx.stock_of(product_id).await, 4);
}

#[tokio::test]
#[ignore = "Requires running admin, storefront and database"]
async fn test_checkout_fails_when_stock_ran_out() {
    let ctx = TestContext::new().await;
    ctx.login_admin(AdminRole::Admin).await;
    let product = ctx
        .create_product(&format!("Orchid {}", Uuid::new_v4().simple()), "300000", 2)
        .await;
    let product_id = product["id"].as_i64().expect("id");

    ctx.verified_customer().await;
    assert_eq!(add_to_cart(&ctx, &product["id"], 2).await, StatusCode::OK);

    // Stock drops after the line was added.
    let resp = ctx
        .admin
        .patch(ctx.admin_api(&format!("/api/products/{product_id}/stock")))
        .json(&json!({ "stock": 1 }))
        .send()
        .await
        .expect("stock request");
    assert_eq!(resp.status(), StatusCode::OK);

    let checkout = ctx
        .customer
        .post(ctx.store_api("/api/checkout"))
        .json(&checkout_body("cash_on_delivery"))
        .send()
        .await
        .expect("checkout request");
    assert_eq!(checkout.status(), StatusCode::CONFLICT);
    assert_eq!(ctx.stock_of(product_id).await, 1);

    // Nothing was placed and the cart is intact.
    let cart: Value = ctx
        .customer
        .get(ctx.store_api("/api/cart"))
        .send()
        .await
        .expect("cart request")
        .json()
        .await
        .expect("cart json");
    assert_eq!(cart["item_count"], 2);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_empty_cart_checkout_is_rejected() {
    let ctx = TestContext::new().await;
    ctx.verified_customer().await;

    let resp = ctx
        .customer
        .post(ctx.store_api("/api/checkout"))
        .json(&checkout_body("qris"))
        .send()
        .await
        .expect("checkout request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
