//! Admin order status changes and expiry sweeps.
//!
//! Run with: cargo test -p bloom-bouquet-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use bloom_bouquet_core::AdminRole;
use bloom_bouquet_integration_tests::TestContext;

/// Place a one-line order as a fresh customer; returns (order, product id).
async fn place_order(ctx: &TestContext, method: &str, stock: i32) -> (Value, i64) {
    let product = ctx
        .create_product(&format!("Lily {}", Uuid::new_v4().simple()), "120000", stock)
        .await;
    ctx.verified_customer().await;

    let added = ctx
        .customer
        .post(ctx.store_api("/api/cart"))
        .json(&json!({ "product_id": product["id"], "quantity": 1 }))
        .send()
        .await
        .expect("add to cart request");
    assert_eq!(added.status(), StatusCode::OK);

    let resp = ctx
        .customer
        .post(ctx.store_api("/api/checkout"))
        .json(&json!({
            "shipping_name": "Test Customer",
            "shipping_phone": "0812 0000 0000",
            "shipping_address": "Jl. Mawar No. 3, Jakarta",
            "payment_method": method,
        }))
        .send()
        .await
        .expect("checkout request");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order = resp.json().await.expect("order json");
    (order, product["id"].as_i64().expect("id"))
}

#[tokio::test]
#[ignore = "Requires running admin, storefront and database"]
async fn test_paid_order_moves_to_processing() {
    let ctx = TestContext::new().await;
    ctx.login_admin(AdminRole::Admin).await;
    let (order, _) = place_order(&ctx, "bank_transfer", 3).await;
    let id = order["id"].as_i64().expect("order id");

    let resp = ctx
        .admin
        .patch(ctx.admin_api(&format!("/api/orders/{id}/payment-status")))
        .json(&json!({ "payment_status": "paid" }))
        .send()
        .await
        .expect("payment status request");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.expect("order json");
    assert_eq!(updated["payment_status"], "paid");
    assert_eq!(updated["status"], "processing");
    assert!(!updated["paid_at"].is_null());

    // The customer sees the change in their order and inbox.
    let number = order["order_number"].as_str().expect("number");
    let mine: Value = ctx
        .customer
        .get(ctx.store_api(&format!("/api/orders/{number}")))
        .send()
        .await
        .expect("order request")
        .json()
        .await
        .expect("order json");
    assert_eq!(mine["status"], "processing");
}

#[tokio::test]
#[ignore = "Requires running admin, storefront and database"]
async fn test_illegal_transition_is_conflict() {
    let ctx = TestContext::new().await;
    ctx.login_admin(AdminRole::Admin).await;
    let (order, _) = place_order(&ctx, "bank_transfer", 3).await;
    let id = order["id"].as_i64().expect("order id");

    let resp = ctx
        .admin
        .patch(ctx.admin_api(&format!("/api/orders/{id}/status")))
        .json(&json!({ "status": "delivered" }))
        .send()
        .await
        .expect("status request");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running admin, storefront and database"]
async fn test_cancelled_orders_cannot_be_paid() {
    let ctx = TestContext::new().await;
    ctx.login_admin(AdminRole::Admin).await;

    // Cancelled by the customer.
    let (order, product_id) = place_order(&ctx, "bank_transfer", 2).await;
    let number = order["order_number"].as_str().expect("number");
    let cancel = ctx
        .customer
        .post(ctx.store_api(&format!("/api/orders/{number}/cancel")))
        .send()
        .await
        .expect("cancel request");
    assert_eq!(cancel.status(), StatusCode::OK);

    let id = order["id"].as_i64().expect("order id");
    let resp = ctx
        .admin
        .patch(ctx.admin_api(&format!("/api/orders/{id}/payment-status")))
        .json(&json!({ "payment_status": "paid" }))
        .send()
        .await
        .expect("payment status request");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(ctx.stock_of(product_id).await, 2);

    // Cancelled by staff.
    let (order, _) = place_order(&ctx, "qris", 2).await;
    let id = order["id"].as_i64().expect("order id");
    let resp = ctx
        .admin
        .patch(ctx.admin_api(&format!("/api/orders/{id}/status")))
        .json(&json!({ "status": "cancelled" }))
        .send()
        .await
        .expect("status request");
    assert_eq!(resp.status(), StatusCode::OK);
    let cancelled: Value = resp.json().await.expect("order json");
    assert_eq!(cancelled["payment_status"], "failed");

    let resp = ctx
        .admin
        .patch(ctx.admin_api(&format!("/api/orders/{id}/payment-status")))
        .json(&json!({ "payment_status": "paid" }))
        .send()
        .await
        .expect("payment status request");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let detail: Value = ctx
        .admin
        .get(ctx.admin_api(&format!("/api/orders/{id}")))
        .send()
        .await
        .expect("order request")
        .json()
        .await
        .expect("order json");
    assert!(detail["paid_at"].is_null());
}

#[tokio::test]
#[ignore = "Requires running admin, storefront and database"]
async fn test_sweep_cancels_overdue_orders() {
    let ctx = TestContext::new().await;
    ctx.login_admin(AdminRole::Admin).await;
    let (order, product_id) = place_order(&ctx, "bank_transfer", 2).await;
    let id = i32::try_from(order["id"].as_i64().expect("order id")).expect("id fits i32");
    assert_eq!(ctx.stock_of(product_id).await, 1);

    sqlx::query("UPDATE orders SET payment_deadline = NOW() - INTERVAL '1 minute' WHERE id = $1")
        .bind(id)
        .execute(&ctx.pool)
        .await
        .expect("backdate deadline");

    let resp = ctx
        .admin
        .post(ctx.admin_api("/api/orders/sweep"))
        .send()
        .await
        .expect("sweep request");
    assert_eq!(resp.status(), StatusCode::OK);
    let reports: Vec<Value> = resp.json().await.expect("reports json");
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r["failed"] == 0));

    let detail: Value = ctx
        .admin
        .get(ctx.admin_api(&format!("/api/orders/{id}")))
        .send()
        .await
        .expect("order request")
        .json()
        .await
        .expect("order json");
    assert_eq!(detail["status"], "cancelled");
    assert_eq!(detail["payment_status"], "expired");
    assert_eq!(ctx.stock_of(product_id).await, 2);
}

async fn order_detail(ctx: &TestContext, id: i64) -> Value {
    ctx.admin
        .get(ctx.admin_api(&format!("/api/orders/{id}")))
        .send()
        .await
        .expect("order request")
        .json()
        .await
        .expect("order json")
}

async fn sweep(ctx: &TestContext) {
    let resp = ctx
        .admin
        .post(ctx.admin_api("/api/orders/sweep"))
        .send()
        .await
        .expect("sweep request");
    assert_eq!(resp.status(), StatusCode::OK);
}

async fn backdate(ctx: &TestContext, column: &str, id: i64) {
    sqlx::query(&format!(
        "UPDATE orders SET {column} = NOW() - INTERVAL '1 minute' WHERE id = $1"
    ))
    .bind(i32::try_from(id).expect("id fits i32"))
    .execute(&ctx.pool)
    .await
    .expect("backdate order");
}

#[tokio::test]
#[ignore = "Requires running admin, storefront and database"]
async fn test_sweep_only_touches_due_orders() {
    let ctx = TestContext::new().await;
    ctx.login_admin(AdminRole::Admin).await;

    let (paid, paid_product) = place_order(&ctx, "bank_transfer", 2).await;
    let paid_id = paid["id"].as_i64().expect("order id");
    let resp = ctx
        .admin
        .patch(ctx.admin_api(&format!("/api/orders/{paid_id}/payment-status")))
        .json(&json!({ "payment_status": "paid" }))
        .send()
        .await
        .expect("payment status request");
    assert_eq!(resp.status(), StatusCode::OK);
    backdate(&ctx, "payment_deadline", paid_id).await;

    let (cancelled, cancelled_product) = place_order(&ctx, "bank_transfer", 2).await;
    let cancelled_id = cancelled["id"].as_i64().expect("order id");
    let number = cancelled["order_number"].as_str().expect("number");
    let cancel = ctx
        .customer
        .post(ctx.store_api(&format!("/api/orders/{number}/cancel")))
        .send()
        .await
        .expect("cancel request");
    assert_eq!(cancel.status(), StatusCode::OK);
    backdate(&ctx, "payment_deadline", cancelled_id).await;

    let (waiting, waiting_product) = place_order(&ctx, "bank_transfer", 2).await;
    let waiting_id = waiting["id"].as_i64().expect("order id");

    let (qris, qris_product) = place_order(&ctx, "qris", 2).await;
    let qris_id = qris["id"].as_i64().expect("order id");
    backdate(&ctx, "qr_expires_at", qris_id).await;

    // A second pass finds nothing left to do.
    sweep(&ctx).await;
    sweep(&ctx).await;

    let detail = order_detail(&ctx, qris_id).await;
    assert_eq!(detail["status"], "cancelled");
    assert_eq!(detail["payment_status"], "expired");
    assert_eq!(ctx.stock_of(qris_product).await, 2);

    let detail = order_detail(&ctx, paid_id).await;
    assert_eq!(detail["status"], "processing");
    assert_eq!(detail["payment_status"], "paid");
    assert_eq!(ctx.stock_of(paid_product).await, 1);

    let detail = order_detail(&ctx, cancelled_id).await;
    assert_eq!(detail["status"], "cancelled");
    assert_eq!(detail["payment_status"], "failed");
    assert_eq!(ctx.stock_of(cancelled_product).await, 2);

    let detail = order_detail(&ctx, waiting_id).await;
    assert_eq!(detail["status"], "waiting_for_payment");
    assert_eq!(detail["payment_status"], "pending");
    assert_eq!(ctx.stock_of(waiting_product).await, 1);
}
