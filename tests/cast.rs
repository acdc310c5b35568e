// Invariants over the static cast table.
// These tests are native-friendly and avoid wasm/browser APIs.

use std::collections::HashSet;

use buddy_fx::{CAST, portrait_url, slugify};

#[test]
fn cast_names_are_unique_and_traits_present() {
    let mut seen = HashSet::new();
    assert!(CAST.len() >= 15, "cast should cover at least 15 characters");
    for c in CAST {
        assert!(seen.insert(c.name), "duplicate character '{}'", c.name);
        assert!(!c.traits.is_empty(), "'{}' has no traits", c.name);
        assert!(!c.why_match.is_empty(), "'{}' has no match line", c.name);
        for t in c.traits {
            assert!(t.chars().all(|ch| ch.is_ascii_lowercase()), "trait '{}' of '{}' is not a plain lowercase word", t, c.name);
        }
    }
}

#[test]
fn slugs_are_url_safe_and_collision_free() {
    let mut seen = HashSet::new();
    for c in CAST {
        let slug = slugify(c.name);
        assert!(!slug.is_empty(), "empty slug for '{}'", c.name);
        assert!(
            slug.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-'),
            "slug '{}' for '{}' has unsafe characters",
            slug,
            c.name
        );
        assert!(!slug.starts_with('-') && !slug.ends_with('-') && !slug.contains("--"), "slug '{}' has stray hyphens", slug);
        assert!(seen.insert(slug.clone()), "slug '{}' collides for '{}'", slug, c.name);
        // Slugging a slug is a fixed point.
        assert_eq!(slugify(&slug), slug);
    }
}

#[test]
fn every_cast_member_has_a_png_portrait_path() {
    for c in CAST {
        let url = portrait_url(c.name);
        assert!(url.starts_with("images/") && url.ends_with(".png"), "bad portrait url '{}' for '{}'", url, c.name);
    }
}
