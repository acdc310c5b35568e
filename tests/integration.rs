// Integration tests (native) for the `buddy-fx` crate.
// These tests avoid wasm-specific functionality and exercise pure Rust logic so
// they can run under `cargo test` on the host.

use buddy_fx::{BurstOptions, StickerLayout, StickerSpec, best_match, slugify, sticker_filename};

#[test]
fn slug_examples() {
    assert_eq!(slugify("Tabitha (Dorcas)"), "tabitha");
    assert_eq!(slugify("Noah"), "noah");
}

#[test]
fn sticker_filename_follows_convention() {
    assert_eq!(sticker_filename("David"), "sticker_david.png");
    assert_eq!(sticker_filename("Tabitha (Dorcas)"), "sticker_tabitha.png");
}

#[test]
fn celebration_options_parse_like_the_page_sends_them() {
    let o = BurstOptions::from_json(r#"{"durationMs":1200,"particleCount":150}"#).unwrap();
    assert_eq!(o.duration_ms, 1200.0);
    assert_eq!(o.particle_count, 150);
    assert_eq!(o.scalar, 1.0);
}

#[test]
fn malformed_options_are_rejected() {
    assert!(BurstOptions::from_json(r#"{"particleCount":"lots"}"#).is_err());
}

#[test]
fn fractional_and_negative_counts_are_accepted() {
    assert_eq!(BurstOptions::from_json(r#"{"particleCount":12.5}"#).unwrap().particle_count, 13);
    assert_eq!(BurstOptions::from_json(r#"{"particleCount":-3}"#).unwrap().particle_count, 0);
}

#[test]
fn sticker_spec_uses_override_portrait() {
    let spec = StickerSpec::from_json(r#"{"name":"Paul","traits":["brave"]}"#).unwrap();
    assert_eq!(spec.portrait_url(), "images/saul-paul.png");
    assert_eq!(spec.traits_line(), "brave");
}

#[test]
fn sticker_text_sits_below_center() {
    let l = StickerLayout::new(1024);
    assert!(l.name_baseline() > l.cy);
    assert!(l.traits_baseline() > l.name_baseline());
}

#[test]
fn best_match_picks_highest_overlap() {
    let m = best_match(&["adventurous", "resilient", "teacher"]).unwrap();
    assert_eq!(m.name, "Paul");
}
