//! Browser side of the burst: a fixed full-viewport canvas stacked above the
//! page, resized with the window, driven by `requestAnimationFrame`.

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window, window};

use super::{BurstHost, BurstOptions, BurstSession, BurstSurface, Frame, Particle, advance, start_burst};
use crate::error::{FxError, FxResult};

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";
const OVERLAY_STYLE: &str =
    "position:fixed; inset:0; width:100%; height:100%; pointer-events:none; z-index:2147483647;";

/// The live browser window as a [`BurstHost`].
pub struct WindowHost {
    window: Window,
}

impl WindowHost {
    pub fn new() -> FxResult<Self> {
        Ok(Self { window: window().ok_or(FxError::NoWindow)? })
    }
}

impl BurstHost for WindowHost {
    type Surface = OverlaySurface;

    fn prefers_reduced_motion(&self) -> bool {
        matches!(self.window.match_media(REDUCED_MOTION_QUERY), Ok(Some(mql)) if mql.matches())
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }

    fn now(&self) -> f64 {
        self.window.performance().map(|p| p.now()).unwrap_or(0.0)
    }

    fn create_surface(&self, dpr: f64) -> FxResult<OverlaySurface> {
        OverlaySurface::mount(&self.window, dpr)
    }
}

/// Transparent overlay canvas plus the resize listener that keeps its backing
/// store in step with its displayed size.
pub struct OverlaySurface {
    window: Window,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    on_resize: Option<Closure<dyn FnMut()>>,
}

impl OverlaySurface {
    /// The canvas joins the page only once its context exists, and any later
    /// failure takes it back out.
    fn mount(window: &Window, dpr: f64) -> FxResult<Self> {
        let doc = window.document().ok_or(FxError::NoDocument)?;
        let body = doc.body().ok_or(FxError::NoDocument)?;
        let canvas = doc
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(JsValue::from)?;
        canvas.set_attribute("style", OVERLAY_STYLE)?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or(FxError::NoContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| FxError::NoContext)?;
        body.append_child(&canvas)?;

        let mut surface = Self { window: window.clone(), canvas, ctx, on_resize: None };
        fit_backing_store(&surface.canvas, dpr);
        if let Err(err) = surface.listen_for_resize(dpr) {
            surface.teardown();
            return Err(err);
        }
        Ok(surface)
    }

    fn listen_for_resize(&mut self, dpr: f64) -> FxResult<()> {
        let resize_target = self.canvas.clone();
        let on_resize = Closure::wrap(Box::new(move || {
            fit_backing_store(&resize_target, dpr);
        }) as Box<dyn FnMut()>);
        self.window
            .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
        self.on_resize = Some(on_resize);
        Ok(())
    }
}

fn fit_backing_store(canvas: &HtmlCanvasElement, dpr: f64) {
    canvas.set_width((f64::from(canvas.client_width()) * dpr).floor() as u32);
    canvas.set_height((f64::from(canvas.client_height()) * dpr).floor() as u32);
}

impl BurstSurface for OverlaySurface {
    fn pixel_size(&self) -> (f64, f64) {
        (f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn is_attached(&self) -> bool {
        self.canvas.is_connected()
    }

    fn clear(&self) {
        let (w, h) = self.pixel_size();
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    fn draw_particle(&self, p: &Particle) -> FxResult<()> {
        self.ctx.save();
        let drawn = (|| -> Result<(), JsValue> {
            self.ctx.translate(p.x, p.y)?;
            self.ctx.rotate(p.rotation)?;
            self.ctx.set_fill_style_str(&p.fill_style());
            self.ctx.fill_rect(-p.w / 2.0, -p.h / 2.0, p.w, p.h);
            Ok(())
        })();
        self.ctx.restore();
        Ok(drawn?)
    }

    fn teardown(&mut self) {
        if let Some(cb) = self.on_resize.take() {
            let _ = self
                .window
                .remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
        }
        self.canvas.remove();
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Start a burst on the current page. Returns immediately; the animation
/// runs on animation frames and removes itself when done.
pub fn fire(options: &BurstOptions) -> FxResult<()> {
    let host = WindowHost::new()?;
    let mut rng = SmallRng::from_entropy();
    let Some(session) = start_burst(&host, options, &mut rng)? else {
        return Ok(());
    };
    run_frames(host.window, session);
    Ok(())
}

/// Drive `session` from `requestAnimationFrame` until it reports finished.
/// The session lives inside the callback and is dropped with it, which also
/// covers a frame request the browser refuses.
fn run_frames(win: Window, mut session: BurstSession<OverlaySurface>) {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    let scheduler = win.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        let frame = advance(&mut session, ts, || match f.borrow().as_ref() {
            Some(cb) => scheduler.request_animation_frame(cb.as_ref().unchecked_ref()).map(drop),
            None => Ok(()),
        });
        // Releases the closure, and with it the session.
        if frame == Frame::Finished {
            let _ = f.borrow_mut().take();
        }
    }) as Box<dyn FnMut(f64)>));

    let first = g
        .borrow()
        .as_ref()
        .map(|cb| win.request_animation_frame(cb.as_ref().unchecked_ref()));
    if let Some(Err(err)) = first {
        tracing::error!("confetti could not start: {}", FxError::from(err));
        let _ = g.borrow_mut().take();
    }
}
