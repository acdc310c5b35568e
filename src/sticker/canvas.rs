//! Browser binding for the compositor: an off-screen `<canvas>` 2D context,
//! `HTMLImageElement` portraits and PNG export.

use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, window};

use super::{ImageHandle, ImageLoader, Painter, STICKER_SIZE, StickerSpec, compose};
use crate::error::{FxError, FxResult};

const PNG: &str = "image/png";

impl ImageHandle for HtmlImageElement {
    fn width(&self) -> f64 {
        f64::from(self.natural_width())
    }

    fn height(&self) -> f64 {
        f64::from(self.natural_height())
    }

    fn is_ready(&self) -> bool {
        self.complete() && self.natural_width() > 0
    }
}

/// [`Painter`] over a canvas 2D context.
pub struct CanvasPainter {
    ctx: CanvasRenderingContext2d,
}

impl CanvasPainter {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl Painter for CanvasPainter {
    type Image = HtmlImageElement;

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn circle_path(&mut self, cx: f64, cy: f64, r: f64) -> FxResult<()> {
        self.ctx.begin_path();
        self.ctx.arc(cx, cy, r, 0.0, TAU)?;
        self.ctx.close_path();
        Ok(())
    }

    fn clip(&mut self) {
        self.ctx.clip();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn fill_radial_gradient(
        &mut self,
        (cx, cy): (f64, f64),
        r0: f64,
        r1: f64,
        stops: &[(f64, &str)],
        (x, y, w, h): (f64, f64, f64, f64),
    ) -> FxResult<()> {
        let grad = self.ctx.create_radial_gradient(cx, cy, r0, cx, cy, r1)?;
        for (offset, color) in stops {
            grad.add_color_stop(*offset as f32, color)?;
        }
        self.ctx.set_fill_style_canvas_gradient(&grad);
        self.ctx.fill_rect(x, y, w, h);
        Ok(())
    }

    fn draw_image(&mut self, img: &HtmlImageElement, x: f64, y: f64, w: f64, h: f64) -> FxResult<()> {
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(img, x, y, w, h)?;
        Ok(())
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }

    fn set_line_width(&mut self, w: f64) {
        self.ctx.set_line_width(w);
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }

    fn set_shadow(&mut self, color: &str, blur: f64) {
        self.ctx.set_shadow_color(color);
        self.ctx.set_shadow_blur(blur);
    }

    fn set_fill_style(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn set_text_align(&mut self, align: &str) {
        self.ctx.set_text_align(align);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> FxResult<()> {
        self.ctx.fill_text(text, x, y)?;
        Ok(())
    }
}

/// Loads portraits through a fresh `Image` and waits on `decode()`.
/// There is no timeout; a stalled request stalls the build.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserImageLoader;

impl ImageLoader for BrowserImageLoader {
    type Image = HtmlImageElement;

    async fn load(&self, url: &str) -> FxResult<HtmlImageElement> {
        let img = HtmlImageElement::new()?;
        img.set_src(url);
        JsFuture::from(img.decode())
            .await
            .map_err(|_| FxError::ImageLoad { url: url.to_string() })?;
        Ok(img)
    }
}

/// Build the sticker on a new off-screen canvas.
pub async fn build(
    spec: &StickerSpec,
    char_image: Option<&HtmlImageElement>,
    kid_image: Option<&HtmlImageElement>,
) -> FxResult<HtmlCanvasElement> {
    let doc = window()
        .ok_or(FxError::NoWindow)?
        .document()
        .ok_or(FxError::NoDocument)?;
    let canvas = doc
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(JsValue::from)?;
    canvas.set_width(STICKER_SIZE);
    canvas.set_height(STICKER_SIZE);
    let ctx = canvas
        .get_context("2d")?
        .ok_or(FxError::NoContext)?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| FxError::NoContext)?;

    let mut painter = CanvasPainter::new(ctx);
    compose(&mut painter, &BrowserImageLoader, spec, char_image, kid_image).await?;
    Ok(canvas)
}

/// PNG data URL, for print previews.
pub fn to_data_url(canvas: &HtmlCanvasElement) -> FxResult<String> {
    Ok(canvas.to_data_url_with_type(PNG)?)
}

/// PNG blob, for saving to disk.
pub async fn to_png_blob(canvas: &HtmlCanvasElement) -> FxResult<Blob> {
    let canvas = canvas.clone();
    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        let on_blob = Closure::once_into_js(move |blob: JsValue| {
            let _ = resolve.call1(&JsValue::NULL, &blob);
        });
        if let Err(err) = canvas.to_blob_with_type(on_blob.unchecked_ref(), PNG) {
            let _ = reject.call1(&JsValue::NULL, &err);
        }
    });
    JsFuture::from(promise)
        .await?
        .dyn_into::<Blob>()
        .map_err(|_| FxError::Js("canvas produced no blob".into()))
}
