//! Admin catalog and staff management.
//!
//! Run with: cargo test -p bloom-bouquet-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use bloom_bouquet_core::AdminRole;
use bloom_bouquet_integration_tests::{PASSWORD, TestContext, unique_email};

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_colliding_product_slugs_get_suffixes() {
    let ctx = TestContext::new().await;
    ctx.login_admin(AdminRole::Admin).await;
    let name = format!("Peony Bouquet {}", Uuid::new_v4().simple());

    let first = ctx.create_product(&name, "250000", 1).await;
    let second = ctx.create_product(&name, "250000", 1).await;

    let base = first["slug"].as_str().expect("slug").to_string();
    assert_eq!(base, name.to_lowercase().replace(' ', "-"));
    assert_eq!(second["slug"], format!("{base}-1"));
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_update_without_rename_keeps_slug() {
    let ctx = TestContext::new().await;
    ctx.login_admin(AdminRole::Admin).await;
    let name = format!("Orchid Pot {}", Uuid::new_v4().simple());

    let first = ctx.create_product(&name, "300000", 1).await;
    let second = ctx.create_product(&name, "300000", 1).await;
    let suffixed = second["slug"].as_str().expect("slug").to_string();

    let resp = ctx
        .admin
        .delete(ctx.admin_api(&format!("/api/products/{}", first["id"])))
        .send()
        .await
        .expect("delete product request");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ctx
        .admin
        .put(ctx.admin_api(&format!("/api/products/{}", second["id"])))
        .json(&json!({
            "category_id": second["category_id"],
            "name": name,
            "price": "320000",
            "stock": 1,
        }))
        .send()
        .await
        .expect("update product request");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.expect("product json");
    assert_eq!(updated["slug"], suffixed.as_str());
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_price_beyond_column_range_is_field_error() {
    let ctx = TestContext::new().await;
    ctx.login_admin(AdminRole::Admin).await;
    let resp = ctx
        .admin
        .post(ctx.admin_api("/api/products"))
        .json(&json!({
            "name": format!("Gold Bouquet {}", Uuid::new_v4().simple()),
            "price": "10000000000",
        }))
        .send()
        .await
        .expect("create product request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("error json");
    assert!(body.to_string().contains("price"));
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_deleting_category_keeps_products() {
    let ctx = TestContext::new().await;
    ctx.login_admin(AdminRole::Admin).await;
    let product = ctx
        .create_product(&format!("Daisy {}", Uuid::new_v4().simple()), "80000", 1)
        .await;
    let category_id = product["category_id"].as_i64().expect("category id");
    let product_id = product["id"].as_i64().expect("product id");

    let resp = ctx
        .admin
        .delete(ctx.admin_api(&format!("/api/categories/{category_id}")))
        .send()
        .await
        .expect("delete category request");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let product: Value = ctx
        .admin
        .get(ctx.admin_api(&format!("/api/products/{product_id}")))
        .send()
        .await
        .expect("product request")
        .json()
        .await
        .expect("product json");
    assert!(product["category_id"].is_null());
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_stock_adjustment_cannot_go_negative() {
    let ctx = TestContext::new().await;
    ctx.login_admin(AdminRole::Admin).await;
    let product = ctx
        .create_product(&format!("Carnation {}", Uuid::new_v4().simple()), "60000", 2)
        .await;
    let id = product["id"].as_i64().expect("id");
    let url = ctx.admin_api(&format!("/api/products/{id}/stock"));

    let resp = ctx
        .admin
        .patch(&url)
        .json(&json!({ "adjustment": -3 }))
        .send()
        .await
        .expect("stock request");
    assert!(resp.status().is_client_error());
    assert_eq!(ctx.stock_of(id).await, 2);

    let resp = ctx
        .admin
        .patch(&url)
        .json(&json!({ "adjustment": 5 }))
        .send()
        .await
        .expect("stock request");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(ctx.stock_of(id).await, 7);
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_super_admin_cannot_delete_self() {
    let ctx = TestContext::new().await;
    let me = ctx.login_admin(AdminRole::SuperAdmin).await;

    let resp = ctx
        .admin
        .delete(ctx.admin_api(&format!("/api/admin-users/{me}")))
        .send()
        .await
        .expect("delete admin request");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_admin_users_require_super_admin() {
    let ctx = TestContext::new().await;
    ctx.login_admin(AdminRole::Admin).await;

    let list = ctx
        .admin
        .get(ctx.admin_api("/api/admin-users"))
        .send()
        .await
        .expect("list admins request");
    assert_eq!(list.status(), StatusCode::FORBIDDEN);

    let create = ctx
        .admin
        .post(ctx.admin_api("/api/admin-users"))
        .json(&json!({
            "email": unique_email("staff"),
            "name": "New Staff",
            "password": PASSWORD,
            "role": "admin",
        }))
        .send()
        .await
        .expect("create admin request");
    assert_eq!(create.status(), StatusCode::FORBIDDEN);
}
