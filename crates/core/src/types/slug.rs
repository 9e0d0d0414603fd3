//! URL slugs for products and categories.
//!
//! A slug is derived from a name: lowercase ASCII letters and digits joined by
//! single hyphens. When the derived slug is already taken, a numeric suffix is
//! appended (`mawar-merah`, `mawar-merah-1`, `mawar-merah-2`, ...).

use core::fmt;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Maximum slug length. Longer names are cut at a hyphen boundary.
pub const MAX_SLUG_LENGTH: usize = 180;

/// A validated URL slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derive a slug from a display name.
    ///
    /// Returns `None` when the name has no letters or digits at all.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let slug = slugify(name);
        (!slug.is_empty()).then_some(Self(slug))
    }

    /// Derive a slug from a name, using `fallback` for names that slugify to
    /// nothing (e.g. `"!!!"`).
    #[must_use]
    pub fn from_name_or(name: &str, fallback: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| Self(slugify(fallback)))
    }

    /// Pick the first of `base`, `base-1`, `base-2`, ... for which `is_taken`
    /// returns false.
    #[must_use]
    pub fn unique_by(base: &Self, mut is_taken: impl FnMut(&str) -> bool) -> Self {
        if !is_taken(&base.0) {
            return base.clone();
        }

        let mut counter: u32 = 1;
        loop {
            let candidate = format!("{}-{counter}", base.0);
            if !is_taken(&candidate) {
                return Self(candidate);
            }
            counter += 1;
        }
    }

    /// [`Slug::unique_by`] against a set of existing slugs.
    #[must_use]
    pub fn unique_among(base: &Self, taken: &HashSet<String>) -> Self {
        Self::unique_by(base, |candidate| taken.contains(candidate))
    }

    /// The slug text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Turn arbitrary text into slug form.
///
/// Common Latin accented letters are folded to ASCII; every other run of
/// non-alphanumeric characters becomes a single `-`.
///
/// ```
/// use bloom_bouquet_core::slugify;
///
/// assert_eq!(slugify("Buket Mawar Merah (Large)"), "buket-mawar-merah-large");
/// assert_eq!(slugify("  Crème Brûlée  "), "creme-brulee");
/// assert_eq!(slugify("***"), "");
/// ```
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        let folded = fold_ascii(ch);
        match folded {
            Some(c) if c.is_ascii_alphanumeric() => {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(c);
            }
            _ => pending_hyphen = true,
        }
    }

    if out.len() > MAX_SLUG_LENGTH {
        out.truncate(MAX_SLUG_LENGTH);
        if let Some(idx) = out.rfind('-') {
            out.truncate(idx);
        }
    }

    out
}

fn fold_ascii(ch: char) -> Option<char> {
    if ch.is_ascii() {
        return Some(ch);
    }
    let folded = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("Hand  Bouquet -- Pink & White"), "hand-bouquet-pink-white");
        assert_eq!(slugify("--Tulip--"), "tulip");
    }

    #[test]
    fn test_slugify_keeps_digits() {
        assert_eq!(slugify("12 Roses 2026"), "12-roses-2026");
    }

    #[test]
    fn test_slugify_folds_accents() {
        assert_eq!(slugify("Café Éclair"), "cafe-eclair");
    }

    #[test]
    fn test_slugify_drops_unknown_scripts() {
        assert_eq!(slugify("花 Bouquet"), "bouquet");
    }

    #[test]
    fn test_slugify_truncates_at_boundary() {
        let long = "bunga ".repeat(60);
        let slug = slugify(&long);
        assert!(slug.len() <= MAX_SLUG_LENGTH);
        assert!(!slug.ends_with('-'));
        assert!(slug.starts_with("bunga-bunga"));
    }

    #[test]
    fn test_from_name_or_fallback() {
        assert_eq!(Slug::from_name_or("!!!", "product").as_str(), "product");
        assert_eq!(Slug::from_name_or("Lily", "product").as_str(), "lily");
        assert!(Slug::from_name("   ").is_none());
    }

    #[test]
    fn test_unique_keeps_free_base() {
        let base = Slug::from_name_or("Sunflower", "product");
        let taken = HashSet::new();
        assert_eq!(Slug::unique_among(&base, &taken).as_str(), "sunflower");
    }

    #[test]
    fn test_unique_increments_suffix() {
        let base = Slug::from_name_or("Sunflower", "product");
        let mut taken: HashSet<String> = HashSet::new();
        taken.insert("sunflower".to_owned());
        assert_eq!(Slug::unique_among(&base, &taken).as_str(), "sunflower-1");

        taken.insert("sunflower-1".to_owned());
        taken.insert("sunflower-2".to_owned());
        assert_eq!(Slug::unique_among(&base, &taken).as_str(), "sunflower-3");
    }

    #[test]
    fn test_unique_ignores_unrelated_prefixes() {
        let base = Slug::from_name_or("Rose", "product");
        let mut taken: HashSet<String> = HashSet::new();
        taken.insert("rose-gold".to_owned());
        assert_eq!(Slug::unique_among(&base, &taken).as_str(), "rose");
    }
}
