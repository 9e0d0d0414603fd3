//! Registration, email verification and login against a running storefront.
//!
//! Run with: cargo test -p bloom-bouquet-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use bloom_bouquet_integration_tests::{KNOWN_CODE, PASSWORD, TestContext, unique_email};

#[tokio::test]
#[ignore = "Requires running storefront, SMTP catcher and database"]
async fn test_unverified_customer_cannot_log_in() {
    let ctx = TestContext::new().await;
    let email = unique_email("unverified");
    assert_eq!(ctx.register_customer(&email).await, StatusCode::CREATED);

    let resp = ctx
        .customer
        .post(ctx.store_api("/api/auth/login"))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await
        .expect("login request");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running storefront, SMTP catcher and database"]
async fn test_wrong_code_then_right_code() {
    let ctx = TestContext::new().await;
    let email = unique_email("verify");
    assert_eq!(ctx.register_customer(&email).await, StatusCode::CREATED);

    let wrong = ctx
        .customer
        .post(ctx.store_api("/api/auth/verify-otp"))
        .json(&json!({ "email": email, "code": "000000" }))
        .send()
        .await
        .expect("verify request");
    assert_eq!(wrong.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let right = ctx
        .customer
        .post(ctx.store_api("/api/auth/verify-otp"))
        .json(&json!({ "email": email, "code": KNOWN_CODE }))
        .send()
        .await
        .expect("verify request");
    assert_eq!(right.status(), StatusCode::OK);
    let user: Value = right.json().await.expect("user json");
    assert_eq!(user["email"], email.as_str());
    assert!(!user["email_verified_at"].is_null());

    // Verification logs the customer in.
    let me = ctx
        .customer
        .get(ctx.store_api("/api/auth/me"))
        .send()
        .await
        .expect("me request");
    assert_eq!(me.status(), StatusCode::OK);

    // The code is spent.
    let again = ctx
        .customer
        .post(ctx.store_api("/api/auth/verify-otp"))
        .json(&json!({ "email": email, "code": KNOWN_CODE }))
        .send()
        .await
        .expect("verify request");
    assert_eq!(again.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore = "Requires running storefront, SMTP catcher and database"]
async fn test_resend_is_throttled() {
    let ctx = TestContext::new().await;
    let email = unique_email("resend");
    assert_eq!(ctx.register_customer(&email).await, StatusCode::CREATED);

    // The planted code is backdated past the cooldown, so one resend works.
    let first = ctx
        .customer
        .post(ctx.store_api("/api/auth/resend-otp"))
        .json(&json!({ "email": email }))
        .send()
        .await
        .expect("resend request");
    assert_eq!(first.status(), StatusCode::OK);

    let second = ctx
        .customer
        .post(ctx.store_api("/api/auth/resend-otp"))
        .json(&json!({ "email": email }))
        .send()
        .await
        .expect("resend request");
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}

async fn register(ctx: &TestContext, name: &str, email: &str, password: &str) -> StatusCode {
    ctx.customer
        .post(ctx.store_api("/api/auth/register"))
        .json(&json!({
            "name": name,
            "email": email,
            "phone": "0899 9999 9999",
            "password": password,
            "password_confirmation": password,
        }))
        .send()
        .await
        .expect("register request")
        .status()
}

async fn login(ctx: &TestContext, email: &str, password: &str) -> StatusCode {
    ctx.customer
        .post(ctx.store_api("/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("login request")
        .status()
}

#[tokio::test]
#[ignore = "Requires running storefront, SMTP catcher and database"]
async fn test_repeat_registration_keeps_credentials() {
    let ctx = TestContext::new().await;
    let email = unique_email("repeat");
    let other_password = "anggrek-bulan-2026";
    assert_eq!(
        register(&ctx, "Original Owner", &email, PASSWORD).await,
        StatusCode::CREATED
    );

    // A second registration inside the cooldown is throttled like a resend.
    assert_eq!(
        register(&ctx, "Someone Else", &email, other_password).await,
        StatusCode::TOO_MANY_REQUESTS
    );

    // Past the cooldown it only sends a fresh code.
    ctx.plant_known_code(&email).await;
    assert_eq!(
        register(&ctx, "Someone Else", &email, other_password).await,
        StatusCode::CREATED
    );

    ctx.plant_known_code(&email).await;
    let verify = ctx
        .customer
        .post(ctx.store_api("/api/auth/verify-otp"))
        .json(&json!({ "email": email, "code": KNOWN_CODE }))
        .send()
        .await
        .expect("verify request");
    assert_eq!(verify.status(), StatusCode::OK);
    let user: Value = verify.json().await.expect("user json");
    assert_eq!(user["name"], "Original Owner");

    assert_eq!(login(&ctx, &email, other_password).await, StatusCode::UNAUTHORIZED);
    assert_eq!(login(&ctx, &email, PASSWORD).await, StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront, SMTP catcher and database"]
async fn test_code_locks_after_five_wrong_attempts() {
    let ctx = TestContext::new().await;
    let email = unique_email("locked");
    assert_eq!(ctx.register_customer(&email).await, StatusCode::CREATED);

    for code in ["000000", "111111", "222222", "333333", "444444"] {
        let resp = ctx
            .customer
            .post(ctx.store_api("/api/auth/verify-otp"))
            .json(&json!({ "email": email, "code": code }))
            .send()
            .await
            .expect("verify request");
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "{code}");
    }

    let right = ctx
        .customer
        .post(ctx.store_api("/api/auth/verify-otp"))
        .json(&json!({ "email": email, "code": KNOWN_CODE }))
        .send()
        .await
        .expect("verify request");
    assert_eq!(right.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let verified: Option<chrono::DateTime<chrono::Utc>> =
        sqlx::query_scalar("SELECT email_verified_at FROM users WHERE email = $1")
            .bind(&email)
            .fetch_one(&ctx.pool)
            .await
            .expect("user row");
    assert!(verified.is_none());
    assert_eq!(login(&ctx, &email, PASSWORD).await, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running storefront, SMTP catcher and database"]
async fn test_verified_email_cannot_register_again() {
    let ctx = TestContext::new().await;
    let email = ctx.verified_customer().await;
    assert_eq!(ctx.register_customer(&email).await, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_account_routes_require_session() {
    let ctx = TestContext::new().await;
    for path in ["/api/cart", "/api/orders", "/api/notifications", "/api/chat"] {
        let resp = ctx
            .customer
            .get(ctx.store_api(path))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{path}");
    }
}
