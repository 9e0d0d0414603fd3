//! Shared fixtures for the Bloom Bouquet end-to-end tests.
//!
//! # Running Tests
//!
//! The tests talk to running servers over HTTP and seed or inspect rows
//! directly through the database:
//!
//! ```bash
//! bb-cli migrate
//! cargo run -p bloom-bouquet-admin &
//! cargo run -p bloom-bouquet-storefront &   # with SMTP pointed at a local catcher
//! cargo test -p bloom-bouquet-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `DATABASE_URL` - the shared shop database
//! - `ADMIN_BASE_URL` - default `http://localhost:3001`
//! - `STOREFRONT_BASE_URL` - default `http://localhost:3000`
//!
//! Every fixture uses a fresh UUID in emails and names, so tests can run
//! concurrently against one database.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use chrono::{Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

use bloom_bouquet_admin::services::AuthService as AdminAuth;
use bloom_bouquet_core::{AdminRole, Email, OtpCode, OtpState};
use bloom_bouquet_storefront::db::OtpRepository;
use bloom_bouquet_storefront::services::auth::hash_code;

/// Password used for every fixture account.
pub const PASSWORD: &str = "kembang-sepatu-2026";

/// Code planted in place of the emailed one.
pub const KNOWN_CODE: &str = "246810";

/// Base URLs, a database pool, and two cookie-keeping clients.
pub struct TestContext {
    pub admin_url: String,
    pub storefront_url: String,
    pub pool: PgPool,
    /// Carries the admin session cookie.
    pub admin: Client,
    /// Carries the customer session cookie.
    pub customer: Client,
}

fn cookie_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Cookie client that claims its own client address, so each test gets a
/// separate bucket in the storefront's per-IP auth limiter.
fn customer_client() -> Client {
    let [a, b, c, ..] = Uuid::new_v4().into_bytes();
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-real-ip",
        HeaderValue::from_str(&format!("10.{a}.{b}.{c}")).expect("valid header value"),
    );
    Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique, lowercase email for one test.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@test.bloombouquet.id", Uuid::new_v4().simple())
}

impl TestContext {
    pub async fn new() -> Self {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = bloom_bouquet_admin::db::create_pool(&SecretString::from(database_url))
            .await
            .expect("Failed to connect to database");

        Self {
            admin_url: std::env::var("ADMIN_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            storefront_url: std::env::var("STOREFRONT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            pool,
            admin: cookie_client(),
            customer: customer_client(),
        }
    }

    #[must_use]
    pub fn admin_api(&self, path: &str) -> String {
        format!("{}{path}", self.admin_url)
    }

    #[must_use]
    pub fn store_api(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// Create an admin straight in the database and log the admin client in.
    /// Returns the admin's id.
    pub async fn login_admin(&self, role: AdminRole) -> i64 {
        let email = unique_email("admin");
        let admin = AdminAuth::new(&self.pool)
            .create_admin(&email, "Test Admin", role, PASSWORD)
            .await
            .expect("Failed to create admin");

        let resp = self
            .admin
            .post(self.admin_api("/auth/login"))
            .json(&json!({ "email": email, "password": PASSWORD }))
            .send()
            .await
            .expect("admin login request");
        assert_eq!(resp.status(), StatusCode::OK);
        i64::from(admin.id.as_i32())
    }

    /// Register a customer through the API. The emailed code is replaced by
    /// [`KNOWN_CODE`] so the test can verify without reading mail.
    pub async fn register_customer(&self, email: &str) -> StatusCode {
        let resp = self
            .customer
            .post(self.store_api("/api/auth/register"))
            .json(&json!({
                "name": "Test Customer",
                "email": email,
                "phone": "0812 0000 0000",
                "password": PASSWORD,
                "password_confirmation": PASSWORD,
            }))
            .send()
            .await
            .expect("register request");
        let status = resp.status();
        if status == StatusCode::CREATED {
            self.plant_known_code(email).await;
        }
        status
    }

    /// Overwrite the pending code for `email` with [`KNOWN_CODE`].
    pub async fn plant_known_code(&self, email: &str) {
        let email = Email::parse(email).expect("valid email");
        let code = OtpCode::parse(KNOWN_CODE).expect("valid code");
        // Backdated so a follow-up resend is not blocked by the cooldown.
        let issued = Utc::now() - Duration::seconds(90);
        let mut state = OtpState::issue(hash_code(&code), issued);
        state.expires_at = Utc::now() + Duration::minutes(5);
        OtpRepository::new(&self.pool)
            .store(&email, &state)
            .await
            .expect("store known code");
    }

    /// Register, verify and leave the customer client logged in.
    pub async fn verified_customer(&self) -> String {
        let email = unique_email("customer");
        assert_eq!(self.register_customer(&email).await, StatusCode::CREATED);

        let resp = self
            .customer
            .post(self.store_api("/api/auth/verify-otp"))
            .json(&json!({ "email": email, "code": KNOWN_CODE }))
            .send()
            .await
            .expect("verify request");
        assert_eq!(resp.status(), StatusCode::OK);
        email
    }

    /// Create an active product (in a fresh category) through the admin API.
    pub async fn create_product(&self, name: &str, price: &str, stock: i32) -> Value {
        let category = self
            .admin
            .post(self.admin_api("/api/categories"))
            .json(&json!({ "name": format!("Category {}", Uuid::new_v4().simple()) }))
            .send()
            .await
            .expect("create category request");
        assert_eq!(category.status(), StatusCode::CREATED);
        let category: Value = category.json().await.expect("category json");

        let resp = self
            .admin
            .post(self.admin_api("/api/products"))
            .json(&json!({
                "category_id": category["id"],
                "name": name,
                "price": price,
                "stock": stock,
            }))
            .send()
            .await
            .expect("create product request");
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.expect("product json")
    }

    /// Current stock of a product, read from the database.
    pub async fn stock_of(&self, product_id: i64) -> i32 {
        sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
            .bind(i32::try_from(product_id).expect("id fits i32"))
            .fetch_one(&self.pool)
            .await
            .expect("stock query")
    }
}
