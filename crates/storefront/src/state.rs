//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::{CatalogCache, EmailService};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    mailer: EmailService,
    catalog: CatalogCache,
}

impl AppState {
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool, mailer: EmailService) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                mailer,
                catalog: CatalogCache::new(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// SMTP sender for verification codes.
    #[must_use]
    pub fn mailer(&self) -> &EmailService {
        &self.inner.mailer
    }

    /// Cached categories and carousel slides.
    #[must_use]
    pub fn catalog(&self) -> &CatalogCache {
        &self.inner.catalog
    }
}
