//! Circular sticker compositor.
//!
//! [`compose`] lays out the design on anything implementing [`Painter`]; the
//! browser binding in [`canvas`] wraps a 2D context and awaits portrait
//! loads through [`ImageLoader`]. Canvas save/restore pairs are held by
//! [`SavedState`] guards so no clip or alpha change outlives its step, even
//! when a draw call fails halfway.

pub mod canvas;

use std::ops::{Deref, DerefMut};

use serde::Deserialize;

use crate::cast::portrait_url;
use crate::error::FxResult;

// --- Layout constants ----------------------------------------------------------

/// Edge of the square output canvas, in pixels.
pub const STICKER_SIZE: u32 = 1024;
/// Clip radius as a fraction of the canvas edge.
pub const CLIP_RADIUS_RATIO: f64 = 0.46;
/// Portrait must fit in a square of this many clip radii.
pub const PORTRAIT_FIT: f64 = 1.6;
/// Portrait top sits this fraction of its height above center.
pub const PORTRAIT_ANCHOR: f64 = 0.65;
pub const PORTRAIT_ALPHA: f64 = 0.98;
pub const INSET_RADIUS_RATIO: f64 = 0.28;
pub const INSET_OFFSET_RATIO: f64 = 0.42;
pub const MAX_TRAITS: usize = 4;
pub const TRAIT_SEPARATOR: &str = " \u{2022} ";

const GRADIENT_STOPS: [(f64, &str); 2] = [(0.0, "#fff"), (1.0, "#f2f2f2")];
const RING_COLOR: &str = "#222";
const INSET_RING_COLOR: &str = "#fff";
const INSET_SHADOW: &str = "rgba(0,0,0,0.2)";
const INSET_SHADOW_BLUR: f64 = 10.0;
const TEXT_COLOR: &str = "#111";
pub const NAME_FONT: &str = "bold 56px ui-sans-serif, system-ui, -apple-system, Segoe UI, Roboto";
pub const TRAITS_FONT: &str = "28px ui-sans-serif, system-ui";

// --- Inputs ----------------------------------------------------------------------

/// What goes on the sticker. Image handles are passed alongside, not in here,
/// so `StickerSpec` stays plain data.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StickerSpec {
    pub name: String,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub char_image_url: Option<String>,
}

impl StickerSpec {
    pub fn new(name: impl Into<String>, traits: &[&str]) -> Self {
        Self {
            name: name.into(),
            traits: traits.iter().map(|t| (*t).to_string()).collect(),
            char_image_url: None,
        }
    }

    pub fn from_json(json: &str) -> FxResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Explicit URL when given, otherwise the cast override or slug path.
    pub fn portrait_url(&self) -> String {
        match self.char_image_url.as_deref() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => portrait_url(&self.name),
        }
    }

    /// First [`MAX_TRAITS`] traits joined for the subtitle line.
    pub fn traits_line(&self) -> String {
        self.traits
            .iter()
            .take(MAX_TRAITS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(TRAIT_SEPARATOR)
    }
}

// --- Drawing seams -----------------------------------------------------------------

pub trait ImageHandle {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    /// Fully decoded with a non-zero natural size.
    fn is_ready(&self) -> bool;
}

/// The subset of a 2D canvas context the compositor uses.
pub trait Painter {
    type Image: ImageHandle;

    fn save(&mut self);
    fn restore(&mut self);
    /// Replace the current path with a full circle.
    fn circle_path(&mut self, cx: f64, cy: f64, r: f64) -> FxResult<()>;
    fn clip(&mut self);
    fn stroke(&mut self);
    /// Fill `rect` (x, y, w, h) with a radial gradient between two circles
    /// sharing `center`.
    fn fill_radial_gradient(
        &mut self,
        center: (f64, f64),
        r0: f64,
        r1: f64,
        stops: &[(f64, &str)],
        rect: (f64, f64, f64, f64),
    ) -> FxResult<()>;
    fn draw_image(&mut self, img: &Self::Image, x: f64, y: f64, w: f64, h: f64) -> FxResult<()>;
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_line_width(&mut self, w: f64);
    fn set_stroke_style(&mut self, color: &str);
    fn set_shadow(&mut self, color: &str, blur: f64);
    fn set_fill_style(&mut self, color: &str);
    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: &str);
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> FxResult<()>;
}

/// Saves the painter state on creation and restores it on drop.
pub struct SavedState<'a, P: Painter + ?Sized> {
    painter: &'a mut P,
}

impl<'a, P: Painter + ?Sized> SavedState<'a, P> {
    pub fn new(painter: &'a mut P) -> Self {
        painter.save();
        Self { painter }
    }
}

impl<P: Painter + ?Sized> Deref for SavedState<'_, P> {
    type Target = P;
    fn deref(&self) -> &P {
        &*self.painter
    }
}

impl<P: Painter + ?Sized> DerefMut for SavedState<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        &mut *self.painter
    }
}

impl<P: Painter + ?Sized> Drop for SavedState<'_, P> {
    fn drop(&mut self) {
        self.painter.restore();
    }
}

/// Async portrait source.
#[allow(async_fn_in_trait)]
pub trait ImageLoader {
    type Image: ImageHandle;

    async fn load(&self, url: &str) -> FxResult<Self::Image>;
}

// --- Layout ---------------------------------------------------------------------------

/// Geometry of a sticker of a given edge length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StickerLayout {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

impl StickerLayout {
    pub fn new(size: u32) -> Self {
        let s = f64::from(size);
        Self { cx: s / 2.0, cy: s / 2.0, radius: s * CLIP_RADIUS_RATIO }
    }

    pub fn ring_width(&self) -> f64 {
        (self.radius * 0.03).max(6.0)
    }

    /// Aspect-preserving fit of an `iw` x `ih` portrait, centered
    /// horizontally and lifted above the midpoint. None for degenerate sizes.
    pub fn portrait_rect(&self, iw: f64, ih: f64) -> Option<(f64, f64, f64, f64)> {
        if !(iw > 0.0 && ih > 0.0) {
            return None;
        }
        let fit = self.radius * PORTRAIT_FIT;
        let scale = (fit / iw).min(fit / ih);
        let (w, h) = (iw * scale, ih * scale);
        Some((self.cx - w / 2.0, self.cy - h * PORTRAIT_ANCHOR, w, h))
    }

    /// Center and radius of the user-photo inset.
    pub fn inset(&self) -> (f64, f64, f64) {
        let off = self.radius * INSET_OFFSET_RATIO;
        (self.cx + off, self.cy + off, self.radius * INSET_RADIUS_RATIO)
    }

    pub fn name_baseline(&self) -> f64 {
        self.cy + self.radius * 0.18
    }

    pub fn traits_baseline(&self) -> f64 {
        self.cy + self.radius * 0.31
    }
}

// --- Compositing ------------------------------------------------------------------

/// Paint the full sticker for `spec` onto `painter`.
///
/// A ready `char_image` is used as is; otherwise the portrait is fetched from
/// [`StickerSpec::portrait_url`]. A failed fetch leaves the portrait out.
/// Failures of the painter itself are returned.
pub async fn compose<P, L>(
    painter: &mut P,
    loader: &L,
    spec: &StickerSpec,
    char_image: Option<&P::Image>,
    kid_image: Option<&P::Image>,
) -> FxResult<()>
where
    P: Painter,
    L: ImageLoader<Image = P::Image>,
{
    let layout = StickerLayout::new(STICKER_SIZE);
    let StickerLayout { cx, cy, radius: r } = layout;
    let mut with_portrait = false;

    {
        let mut clipped = SavedState::new(&mut *painter);
        clipped.circle_path(cx, cy, r)?;
        clipped.clip();
        clipped.fill_radial_gradient((cx, cy), r * 0.1, r, &GRADIENT_STOPS, (cx - r, cy - r, r * 2.0, r * 2.0))?;

        let fetched: Option<P::Image>;
        let portrait = match char_image.filter(|img| img.is_ready()) {
            Some(img) => Some(img),
            None => {
                let url = spec.portrait_url();
                fetched = match loader.load(&url).await {
                    Ok(img) => Some(img),
                    Err(err) => {
                        tracing::warn!("sticker portrait skipped: {err}");
                        None
                    }
                };
                fetched.as_ref()
            }
        };
        if let Some((img, (x, y, w, h))) = portrait.and_then(|img| Some((img, layout.portrait_rect(img.width(), img.height())?))) {
            let mut faded = SavedState::new(&mut *clipped);
            faded.set_global_alpha(PORTRAIT_ALPHA);
            faded.draw_image(img, x, y, w, h)?;
            with_portrait = true;
        }

        if let Some(kid) = kid_image {
            let (ox, oy, ir) = layout.inset();
            {
                let mut inset = SavedState::new(&mut *clipped);
                inset.circle_path(ox, oy, ir)?;
                inset.clip();
                inset.draw_image(kid, ox - ir, oy - ir, ir * 2.0, ir * 2.0)?;
            }
            let mut ring = SavedState::new(&mut *clipped);
            ring.set_line_width(layout.ring_width());
            ring.set_stroke_style(INSET_RING_COLOR);
            ring.set_shadow(INSET_SHADOW, INSET_SHADOW_BLUR);
            ring.circle_path(ox, oy, ir)?;
            ring.stroke();
        }
    }

    painter.set_line_width(layout.ring_width());
    painter.set_stroke_style(RING_COLOR);
    painter.circle_path(cx, cy, r)?;
    painter.stroke();

    painter.set_fill_style(TEXT_COLOR);
    painter.set_text_align("center");
    painter.set_font(NAME_FONT);
    painter.fill_text(&spec.name, cx, layout.name_baseline())?;
    painter.set_font(TRAITS_FONT);
    painter.fill_text(&spec.traits_line(), cx, layout.traits_baseline())?;

    tracing::debug!(name = %spec.name, with_portrait, "sticker composed");
    Ok(())
}
