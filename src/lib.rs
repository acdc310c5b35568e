//! Bible Buddy effects crate.
//!
//! Two canvas features for the quiz page, exported to JS through
//! wasm-bindgen:
//! - `fireConfetti(options?)`: a self-removing confetti overlay (see [`burst`]).
//! - `buildSticker(spec, charImageEl?, kidImage?)`: a 1024x1024 circular
//!   sticker canvas ready for download or print (see [`sticker`]).
//!
//! Cast data and the asset naming rules shared by both live in [`cast`].

use wasm_bindgen::prelude::*;
use web_sys::{Blob, HtmlCanvasElement, HtmlImageElement};

pub mod burst;
pub mod cast;
pub mod error;
pub mod sticker;

pub use burst::{BurstOptions, BurstSession, Particle};
pub use cast::{CAST, CelebrationGate, Character, best_match, portrait_url, slugify, sticker_filename};
pub use error::{FxError, FxResult};
pub use sticker::{StickerLayout, StickerSpec};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// `JSON.stringify` a JS options object; `undefined`/`null` become `None`.
fn js_to_json(value: &JsValue) -> FxResult<Option<String>> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    let json = js_sys::JSON::stringify(value)?;
    Ok(json.as_string())
}

// -----------------------------------------------------------------------------
// Confetti
// -----------------------------------------------------------------------------

#[wasm_bindgen(js_name = fireConfetti)]
pub fn fire_confetti(options: JsValue) -> Result<(), JsValue> {
    let options = match js_to_json(&options)? {
        Some(json) => BurstOptions::from_json(&json)?,
        None => BurstOptions::default(),
    };
    burst::overlay::fire(&options)?;
    Ok(())
}

/// Throttled celebration for a fresh match: one burst per cooldown window.
#[wasm_bindgen]
pub struct Celebrations {
    gate: CelebrationGate,
}

#[wasm_bindgen]
impl Celebrations {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { gate: CelebrationGate::new() }
    }

    /// Fire the match burst unless one ran within the cooldown. Returns
    /// whether the gate opened.
    pub fn celebrate(&mut self, now_ms: f64) -> Result<bool, JsValue> {
        if !self.gate.try_celebrate(now_ms) {
            return Ok(false);
        }
        let options = BurstOptions { duration_ms: 1200.0, particle_count: 150, ..Default::default() };
        burst::overlay::fire(&options)?;
        Ok(true)
    }
}

impl Default for Celebrations {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// Stickers
// -----------------------------------------------------------------------------

#[wasm_bindgen(js_name = buildSticker)]
pub async fn build_sticker(
    spec: JsValue,
    char_image_el: Option<HtmlImageElement>,
    kid_image: Option<HtmlImageElement>,
) -> Result<HtmlCanvasElement, JsValue> {
    let json = js_to_json(&spec)?.ok_or_else(|| JsValue::from_str("sticker spec required"))?;
    let spec = StickerSpec::from_json(&json)?;
    let canvas = sticker::canvas::build(&spec, char_image_el.as_ref(), kid_image.as_ref()).await?;
    Ok(canvas)
}

#[wasm_bindgen(js_name = stickerDataUrl)]
pub fn sticker_data_url(canvas: &HtmlCanvasElement) -> Result<String, JsValue> {
    Ok(sticker::canvas::to_data_url(canvas)?)
}

#[wasm_bindgen(js_name = stickerBlob)]
pub async fn sticker_blob(canvas: HtmlCanvasElement) -> Result<Blob, JsValue> {
    Ok(sticker::canvas::to_png_blob(&canvas).await?)
}

#[wasm_bindgen(js_name = stickerFilename)]
pub fn sticker_filename_js(name: &str) -> String {
    sticker_filename(name)
}

#[wasm_bindgen(js_name = portraitUrl)]
pub fn portrait_url_js(name: &str) -> String {
    portrait_url(name)
}

/// Name of the best-matching character for the given trait answers.
#[wasm_bindgen(js_name = bestMatch)]
pub fn best_match_js(answers: Vec<String>) -> Option<String> {
    best_match(answers.as_slice()).map(|c| c.name.to_string())
}
