//! Confetti burst: a short particle animation on a throwaway overlay surface.
//!
//! The physics, spawn distribution and lifecycle live here and are driven
//! through two seams, [`BurstHost`] (environment queries and surface creation)
//! and [`BurstSurface`] (the drawing target). The browser implementation of
//! both is in [`overlay`]; tests drive the same code with in-memory fakes.
//!
//! Units follow the canvas backing store: positions and sizes are device
//! pixels, velocities are pixels per frame.

pub mod overlay;

use std::f64::consts::{PI, TAU};

use rand::{Rng, RngCore};
use serde::Deserialize;

use crate::error::{FxError, FxResult};

// --- Configuration -----------------------------------------------------------

/// Caller-tunable burst parameters. Every field is optional on the JS side;
/// absent and `null` fields both take the default.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(from = "RawBurstOptions")]
pub struct BurstOptions {
    /// Total lifetime of the animation.
    pub duration_ms: f64,
    pub particle_count: usize,
    /// Added to vertical velocity each frame (scaled by device pixel ratio).
    pub gravity: f64,
    /// Multiplies particle width/height.
    pub scalar: f64,
}

impl Default for BurstOptions {
    fn default() -> Self {
        Self { duration_ms: 1100.0, particle_count: 120, gravity: 0.25, scalar: 1.0 }
    }
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawBurstOptions {
    duration_ms: Option<f64>,
    /// JS numbers: fractional counts round up, negative ones spawn nothing.
    particle_count: Option<f64>,
    gravity: Option<f64>,
    scalar: Option<f64>,
}

impl From<RawBurstOptions> for BurstOptions {
    fn from(raw: RawBurstOptions) -> Self {
        let d = BurstOptions::default();
        Self {
            duration_ms: raw.duration_ms.unwrap_or(d.duration_ms),
            particle_count: raw.particle_count.map_or(d.particle_count, particle_count_from_js),
            gravity: raw.gravity.unwrap_or(d.gravity),
            scalar: raw.scalar.unwrap_or(d.scalar),
        }
    }
}

fn particle_count_from_js(n: f64) -> usize {
    n.max(0.0).ceil() as usize
}

impl BurstOptions {
    /// Parse from a JSON object; missing fields take their defaults.
    pub fn from_json(json: &str) -> FxResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Device pixel ratio actually used for the overlay backing store.
pub fn clamp_dpr(raw: f64) -> f64 {
    if raw.is_finite() { raw.clamp(1.0, 2.0) } else { 1.0 }
}

// --- Randomness --------------------------------------------------------------

/// Uniform source in `[0, 1)`. Anything implementing `rand::RngCore` qualifies,
/// so tests can pass a seeded `StdRng` and get repeatable trajectories.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    fn range(&mut self, min: f64, max: f64) -> f64 {
        self.next_f64() * (max - min) + min
    }
}

impl<R: RngCore + ?Sized> RandomSource for R {
    fn next_f64(&mut self) -> f64 {
        self.r#gen::<f64>()
    }
}

// --- Particles ---------------------------------------------------------------

pub const SPEED_RANGE: (f64, f64) = (3.0, 7.0);
pub const WIDTH_RANGE: (f64, f64) = (4.0, 7.0);
pub const HEIGHT_RANGE: (f64, f64) = (6.0, 10.0);
pub const SPIN_RANGE: (f64, f64) = (-0.25, 0.25);
/// Vertical spawn point as a fraction of surface height.
pub const SPAWN_HEIGHT_FRACTION: f64 = 0.2;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub w: f64,
    pub h: f64,
    /// Radians.
    pub rotation: f64,
    /// Radians per frame.
    pub spin: f64,
    /// Degrees, `[0, 360)`.
    pub hue: f64,
}

impl Particle {
    /// Draw one particle launched from `origin`. Angle is restricted to the
    /// upper half-plane so everything starts out moving up.
    pub fn spawn<R: RandomSource + ?Sized>(origin: (f64, f64), dpr: f64, scalar: f64, rng: &mut R) -> Self {
        let angle = rng.range(-PI, 0.0);
        let speed = rng.range(SPEED_RANGE.0, SPEED_RANGE.1);
        Self {
            x: origin.0,
            y: origin.1,
            vx: angle.cos() * speed * dpr,
            vy: angle.sin() * speed * dpr,
            w: rng.range(WIDTH_RANGE.0, WIDTH_RANGE.1) * scalar * dpr,
            h: rng.range(HEIGHT_RANGE.0, HEIGHT_RANGE.1) * scalar * dpr,
            rotation: rng.range(0.0, TAU),
            spin: rng.range(SPIN_RANGE.0, SPIN_RANGE.1),
            hue: rng.range(0.0, 360.0),
        }
    }

    /// Advance one frame: gravity into vy, then position and rotation.
    pub fn step(&mut self, gravity_px: f64) {
        self.vy += gravity_px;
        self.x += self.vx;
        self.y += self.vy;
        self.rotation += self.spin;
    }

    pub fn fill_style(&self) -> String {
        format!("hsl({},80%,60%)", self.hue)
    }
}

/// Spawn `count` particles at the top-center launch point of a `width` x
/// `height` surface.
pub fn spawn_particles<R: RandomSource + ?Sized>(
    count: usize,
    (width, height): (f64, f64),
    dpr: f64,
    scalar: f64,
    rng: &mut R,
) -> Vec<Particle> {
    let origin = (width / 2.0, height * SPAWN_HEIGHT_FRACTION);
    (0..count).map(|_| Particle::spawn(origin, dpr, scalar, rng)).collect()
}

// --- Host seams --------------------------------------------------------------

/// Drawing target owned by a single burst.
pub trait BurstSurface {
    /// Current backing-store size in device pixels.
    fn pixel_size(&self) -> (f64, f64);
    /// False once the surface has left the document (torn down or removed
    /// by someone else).
    fn is_attached(&self) -> bool;
    fn clear(&self);
    fn draw_particle(&self, p: &Particle) -> FxResult<()>;
    /// Unregister listeners and detach. Must tolerate an already-detached surface.
    fn teardown(&mut self);
}

/// Environment queries a burst needs at start.
pub trait BurstHost {
    type Surface: BurstSurface;

    fn prefers_reduced_motion(&self) -> bool;
    fn device_pixel_ratio(&self) -> f64;
    /// Monotonic milliseconds.
    fn now(&self) -> f64;
    fn create_surface(&self, dpr: f64) -> FxResult<Self::Surface>;
}

// --- Session -----------------------------------------------------------------

/// Result of one animation frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    /// Schedule another frame.
    Continue,
    /// Surface is gone; do not schedule again.
    Finished,
}

/// One burst from spawn to removal. Owned by the frame callback chain; never
/// reused once finished.
pub struct BurstSession<S: BurstSurface> {
    surface: S,
    particles: Vec<Particle>,
    start_ms: f64,
    duration_ms: f64,
    gravity_px: f64,
    finished: bool,
}

impl<S: BurstSurface> BurstSession<S> {
    pub fn new(surface: S, particles: Vec<Particle>, start_ms: f64, options: &BurstOptions, dpr: f64) -> Self {
        Self {
            surface,
            particles,
            start_ms,
            duration_ms: options.duration_ms,
            gravity_px: options.gravity * dpr,
            finished: false,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Fraction of the configured duration elapsed at `now`, clamped to 1.
    /// A zero or negative duration is complete immediately.
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Integrate and redraw every particle, then tear down if the duration
    /// has run out. A surface detached from outside ends the burst early.
    pub fn tick(&mut self, now: f64) -> FxResult<Frame> {
        if self.finished {
            return Ok(Frame::Finished);
        }
        if !self.surface.is_attached() {
            tracing::debug!("burst surface detached externally; stopping");
            self.finish();
            return Ok(Frame::Finished);
        }
        let progress = self.progress(now);
        self.surface.clear();
        for p in &mut self.particles {
            p.step(self.gravity_px);
            self.surface.draw_particle(p)?;
        }
        if progress < 1.0 {
            Ok(Frame::Continue)
        } else {
            self.finish();
            Ok(Frame::Finished)
        }
    }

    fn finish(&mut self) {
        if !self.finished {
            self.surface.teardown();
            self.finished = true;
            tracing::debug!(particles = self.particles.len(), "burst finished");
        }
    }
}

impl<S: BurstSurface> Drop for BurstSession<S> {
    fn drop(&mut self) {
        self.finish();
    }
}

/// One scheduled frame: tick, then ask `schedule` for the next frame if the
/// burst goes on. A failed tick or a refused frame request ends the burst
/// with the surface torn down, since nothing would ever call back.
pub fn advance<S, E>(session: &mut BurstSession<S>, now: f64, schedule: impl FnOnce() -> Result<(), E>) -> Frame
where
    S: BurstSurface,
    E: Into<FxError>,
{
    let frame = session.tick(now).unwrap_or_else(|err| {
        tracing::error!("confetti frame failed: {err}");
        Frame::Finished
    });
    if frame == Frame::Continue {
        if let Err(err) = schedule() {
            let err: FxError = err.into();
            tracing::error!("confetti frame request refused: {err}");
            session.finish();
            return Frame::Finished;
        }
        return Frame::Continue;
    }
    session.finish();
    Frame::Finished
}

/// Set up a burst: honour the reduced-motion preference, create the overlay,
/// spawn the particles. `Ok(None)` means the host declined motion.
pub fn start_burst<H, R>(host: &H, options: &BurstOptions, rng: &mut R) -> FxResult<Option<BurstSession<H::Surface>>>
where
    H: BurstHost,
    R: RandomSource + ?Sized,
{
    if host.prefers_reduced_motion() {
        tracing::debug!("reduced motion requested; skipping burst");
        return Ok(None);
    }
    let dpr = clamp_dpr(host.device_pixel_ratio());
    let surface = host.create_surface(dpr)?;
    let particles = spawn_particles(options.particle_count, surface.pixel_size(), dpr, options.scalar, rng);
    tracing::debug!(count = particles.len(), duration_ms = options.duration_ms, "burst started");
    Ok(Some(BurstSession::new(surface, particles, host.now(), options, dpr)))
}
