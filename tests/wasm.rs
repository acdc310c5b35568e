//! Browser tests using wasm_bindgen_test
//!
//! Run with: wasm-pack test --headless --chrome

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use buddy_fx::StickerSpec;
use buddy_fx::burst::overlay::WindowHost;
use buddy_fx::FxError;
use buddy_fx::burst::{BurstHost, BurstOptions, BurstSurface, Frame, advance, start_burst};
use buddy_fx::sticker::canvas::{build, to_data_url};
use rand::SeedableRng;
use rand::rngs::StdRng;
use web_sys::window;

fn overlay_count() -> u32 {
    window()
        .and_then(|w| w.document())
        .and_then(|d| d.query_selector_all("canvas").ok())
        .map(|l| l.length())
        .unwrap_or(0)
}

#[wasm_bindgen_test]
async fn sticker_is_1024_square_without_portrait() {
    let spec = StickerSpec {
        char_image_url: Some("does-not-exist/missing.png".into()),
        ..StickerSpec::new("David", &["brave", "creative", "faithful", "joyful", "protective"])
    };
    let canvas = build(&spec, None, None).await.expect("build should survive a missing portrait");
    assert_eq!(canvas.width(), 1024);
    assert_eq!(canvas.height(), 1024);
    assert!(!canvas.is_connected(), "sticker canvas must stay off-screen");
    let url = to_data_url(&canvas).unwrap();
    assert!(url.starts_with("data:image/png"));
}

#[wasm_bindgen_test]
async fn identical_inputs_give_identical_pixels() {
    let spec = StickerSpec {
        char_image_url: Some("does-not-exist/missing.png".into()),
        ..StickerSpec::new("Noah", &["faithful", "patient"])
    };
    let a = build(&spec, None, None).await.unwrap();
    let b = build(&spec, None, None).await.unwrap();
    assert_eq!(to_data_url(&a).unwrap(), to_data_url(&b).unwrap());
}

#[wasm_bindgen_test]
fn burst_overlay_mounts_and_tears_down() {
    let host = WindowHost::new().unwrap();
    if host.prefers_reduced_motion() {
        return;
    }
    let before = overlay_count();
    let opts = BurstOptions { particle_count: 12, duration_ms: 50.0, ..Default::default() };
    let mut session = start_burst(&host, &opts, &mut StdRng::seed_from_u64(1)).unwrap().unwrap();
    assert_eq!(session.particles().len(), 12);
    assert_eq!(overlay_count(), before + 1);
    assert!(session.surface().is_attached());

    let start = host.now();
    assert_eq!(session.tick(start + 10.0).unwrap(), Frame::Continue);
    assert_eq!(session.tick(start + 1_000.0).unwrap(), Frame::Finished);
    assert_eq!(overlay_count(), before);
    assert!(!session.surface().is_attached());
}

#[wasm_bindgen_test]
fn refused_frame_removes_overlay() {
    let host = WindowHost::new().unwrap();
    if host.prefers_reduced_motion() {
        return;
    }
    let before = overlay_count();
    let mut session = start_burst(&host, &BurstOptions::default(), &mut StdRng::seed_from_u64(2)).unwrap().unwrap();
    assert_eq!(overlay_count(), before + 1);

    let frame = advance(&mut session, host.now() + 16.0, || Err(FxError::Js("frame refused".into())));
    assert_eq!(frame, Frame::Finished);
    assert_eq!(overlay_count(), before);
}
