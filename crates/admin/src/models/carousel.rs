//! Home page carousel slides.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bloom_bouquet_core::CarouselId;

use crate::error::FieldErrors;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Carousel {
    pub id: CarouselId,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload for a slide.
#[derive(Debug, Clone, Deserialize)]
pub struct CarouselInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl CarouselInput {
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.title.trim().is_empty() {
            errors.add("title", "The title field is required.");
        }
        if let Some(link) = self.link.as_deref()
            && !link.is_empty()
            && !(link.starts_with('/') || link.starts_with("http://") || link.starts_with("https://"))
        {
            errors.add("link", "The link must be a path or an http(s) URL.");
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, link: Option<&str>) -> CarouselInput {
        CarouselInput {
            title: title.to_string(),
            description: None,
            link: link.map(str::to_string),
            sort_order: 0,
            is_active: true,
        }
    }

    #[test]
    fn test_validate_title_required() {
        assert!(input("", None).validate().get("title").is_some());
        assert!(input("Valentine", None).validate().is_empty());
    }

    #[test]
    fn test_validate_link_shape() {
        assert!(input("Sale", Some("/products/rose")).validate().is_empty());
        assert!(input("Sale", Some("https://bloombouquet.id/promo")).validate().is_empty());
        assert!(input("Sale", Some("javascript:alert(1)")).validate().get("link").is_some());
    }
}
