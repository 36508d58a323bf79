//! Render loop driver: lifecycle, host events and frame scheduling.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::accumulation::AccumulationField;
use crate::config::SnowConfig;
use crate::constants::MAX_FRAME_GAP_MS;
use crate::error::EngineError;
use crate::input::{PointerState, PointerTracker};
use crate::particle::{FrameContext, Particle, ParticleStore};
use crate::surface::Canvas;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

/// The host's "call me before the next repaint" facility.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameToken;
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Single-slot scheduler: at most one outstanding frame request, which the
/// host takes when its animation callback fires.
#[derive(Debug, Default)]
pub struct PendingFrame {
    next_id: u64,
    pending: Option<FrameToken>,
}

impl PendingFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    pub fn take(&mut self) -> Option<FrameToken> {
        self.pending.take()
    }
}

impl FrameScheduler for PendingFrame {
    fn request_frame(&mut self) -> FrameToken {
        self.next_id += 1;
        let token = FrameToken(self.next_id);
        self.pending = Some(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.pending == Some(token) {
            self.pending = None;
        }
    }
}

/// Maps host timestamps onto simulation time. After a suspension the next
/// tick only re-anchors, so time spent hidden is never replayed.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameClock {
    sim_ms: f64,
    last_host_ms: Option<f64>,
}

impl FrameClock {
    pub fn tick(&mut self, host_ms: f64) -> f64 {
        if let Some(last) = self.last_host_ms {
            self.sim_ms += (host_ms - last).clamp(0.0, MAX_FRAME_GAP_MS);
        }
        self.last_host_ms = Some(host_ms);
        self.sim_ms
    }

    pub fn suspend(&mut self) {
        self.last_host_ms = None;
    }

    pub fn now(&self) -> f64 {
        self.sim_ms
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Running,
    Paused,
    Disposed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    Resize { width: u32, height: u32 },
    PointerMove { x: f32, y: f32, time_ms: f64 },
    PointerLeave,
    Visibility(bool),
}

pub struct SnowfallEngine<C, S, R = SmallRng> {
    config: SnowConfig,
    canvas: C,
    scheduler: S,
    particles: ParticleStore<R>,
    accumulation: AccumulationField,
    pointer: PointerTracker,
    clock: FrameClock,
    state: EngineState,
    visible: bool,
    scheduled: Option<FrameToken>,
    frames: u64,
}

impl<C: Canvas, S: FrameScheduler> SnowfallEngine<C, S, SmallRng> {
    /// `canvas` is `None` when the host could not obtain a drawing context.
    pub fn new(config: SnowConfig, canvas: Option<C>, scheduler: S) -> Result<Self, EngineError> {
        let rng = SmallRng::seed_from_u64(config.seed);
        Self::with_rng(config, canvas, scheduler, rng)
    }
}

impl<C: Canvas, S: FrameScheduler, R: Rng> SnowfallEngine<C, S, R> {
    pub fn with_rng(
        config: SnowConfig,
        canvas: Option<C>,
        scheduler: S,
        rng: R,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let canvas = canvas.ok_or(EngineError::SurfaceUnavailable)?;
        let accumulation =
            AccumulationField::new(0.0, config.segment_width, config.max_accumulation);
        let particles = ParticleStore::new(rng, config.turbulence_radius);

        let mut engine = Self {
            config,
            canvas,
            scheduler,
            particles,
            accumulation,
            pointer: PointerTracker::new(),
            clock: FrameClock::default(),
            state: EngineState::Uninitialized,
            visible: true,
            scheduled: None,
            frames: 0,
        };
        info!(
            "Snowfall engine created with {} particles",
            engine.config.particle_count
        );

        let (width, height) = (engine.canvas.width(), engine.canvas.height());
        if width > 0 && height > 0 {
            engine.resize(width, height);
        }
        Ok(engine)
    }

    pub fn handle_event(&mut self, event: HostEvent) {
        if self.state == EngineState::Disposed {
            trace!("Ignoring {:?} after dispose", event);
            return;
        }
        match event {
            HostEvent::Resize { width, height } => self.resize(width, height),
            HostEvent::PointerMove { x, y, time_ms } => self.pointer.on_move(x, y, time_ms),
            HostEvent::PointerLeave => self.pointer.on_leave(),
            HostEvent::Visibility(visible) => self.set_visible(visible),
        }
    }

    /// Any resize discards particles and the pile and starts over at the new size.
    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.resize(width, height);
        self.particles
            .initialize(width as f32, height as f32, self.config.particle_count);
        self.accumulation.reset(width as f32);

        if width == 0 || height == 0 {
            debug!("Surface resized to zero area, frames are no-ops until the next resize");
            return;
        }
        debug!("Surface resized to {}x{}", width, height);

        if self.state == EngineState::Uninitialized {
            if self.visible {
                self.state = EngineState::Running;
                self.schedule();
            } else {
                self.state = EngineState::Paused;
            }
            info!("Snowfall started at {}x{}", width, height);
        }
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        match (self.state, visible) {
            (EngineState::Running, false) => {
                self.cancel_scheduled();
                self.clock.suspend();
                self.state = EngineState::Paused;
                debug!("Snowfall paused");
            }
            (EngineState::Paused, true) => {
                self.state = EngineState::Running;
                self.schedule();
                debug!("Snowfall resumed");
            }
            _ => {}
        }
    }

    fn schedule(&mut self) {
        if self.scheduled.is_none() {
            self.scheduled = Some(self.scheduler.request_frame());
        }
    }

    fn cancel_scheduled(&mut self) {
        if let Some(token) = self.scheduled.take() {
            self.scheduler.cancel_frame(token);
        }
    }

    /// Runs one frame for a callback the host fired. Returns false for stale
    /// tokens or when the engine is not running.
    pub fn on_frame(&mut self, token: FrameToken, host_ms: f64) -> bool {
        if self.state != EngineState::Running || self.scheduled != Some(token) {
            trace!("Dropping stale frame {:?}", token);
            return false;
        }
        self.scheduled = None;
        self.render_frame(host_ms);
        self.schedule();
        true
    }

    fn render_frame(&mut self, host_ms: f64) {
        let time = self.clock.tick(host_ms);
        let (width, height) = (self.canvas.width(), self.canvas.height());
        if width == 0 || height == 0 {
            return;
        }

        self.pointer.decay();
        self.canvas.clear();
        let ctx = FrameContext {
            time,
            width: width as f32,
            height: height as f32,
            pointer: self.pointer.state(),
        };
        let report = self.particles.step(&ctx, &mut self.accumulation);
        self.particles.render(&mut self.canvas, time);
        self.accumulation.render(&mut self.canvas);
        self.frames += 1;
        trace!(
            "Frame {} at {:.1}ms: {} landed, {} deposited, {} drifted",
            self.frames,
            time,
            report.landed,
            report.deposited,
            report.drifted
        );
    }

    /// Cancels the pending frame and stops reacting to host events. Safe to
    /// call any number of times.
    pub fn dispose(&mut self) {
        if self.state == EngineState::Disposed {
            return;
        }
        self.cancel_scheduled();
        self.state = EngineState::Disposed;
        info!("Snowfall disposed after {} frames", self.frames);
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &SnowConfig {
        &self.config
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        self.particles.particles()
    }

    pub fn accumulation(&self) -> &AccumulationField {
        &self.accumulation
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer.state()
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn sim_time(&self) -> f64 {
        self.clock.now()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl<C: Canvas, R: Rng> SnowfallEngine<C, PendingFrame, R> {
    /// Fires the outstanding frame request, if any.
    pub fn pump(&mut self, host_ms: f64) -> bool {
        match self.scheduler.take() {
            Some(token) => self.on_frame(token, host_ms),
            None => false,
        }
    }
}
