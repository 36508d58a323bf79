//! Snowfall engine for the landing page background.
//!
//! The engine itself is plain Rust ([`SnowfallEngine`]); the `snow_*`
//! functions below are the flat C ABI the page's JavaScript glue calls into
//! after loading the `wasm32-unknown-unknown` build. The glue forwards
//! resize, pointer and visibility events, calls [`snow_frame`] from
//! `requestAnimationFrame` for as long as it returns 1 (restarting the loop
//! when [`snow_resize`] or [`snow_visibility`] return 1), and blits the RGBA
//! buffer behind [`snow_pixels_ptr`] into the canvas.

use std::cell::RefCell;
use std::thread_local;

pub mod accumulation;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod input;
pub mod particle;
pub mod surface;

pub use accumulation::AccumulationField;
pub use config::SnowConfig;
pub use engine::{
    EngineState, FrameClock, FrameScheduler, FrameToken, HostEvent, PendingFrame, SnowfallEngine,
};
pub use error::EngineError;
pub use input::{PointerState, PointerTracker};
pub use particle::{FrameContext, Particle, ParticleStore, StepReport, Wind};
pub use surface::{Canvas, ColorStop, LinearGradient, Path, PathCommand, PixelCanvas};

type HostedEngine = SnowfallEngine<PixelCanvas, PendingFrame>;

thread_local! {
    static SIMULATION: RefCell<Option<HostedEngine>> = const { RefCell::new(None) };
}

fn with_simulation<F, R>(default: R, f: F) -> R
where
    F: FnOnce(&mut HostedEngine) -> R,
{
    SIMULATION.with(|cell| {
        let mut borrow = cell.borrow_mut();
        match borrow.as_mut() {
            Some(sim) => f(sim),
            None => default,
        }
    })
}

/// Creates the engine, replacing any previous instance. Returns 0 on success,
/// -1 when the configuration is rejected.
#[no_mangle]
pub extern "C" fn snow_init(width: u32, height: u32, particle_count: u32, seed: u32) -> i32 {
    let config = SnowConfig::default()
        .with_particle_count(particle_count as usize)
        .with_seed(u64::from(seed));
    let canvas = PixelCanvas::new(width, height);
    match SnowfallEngine::new(config, Some(canvas), PendingFrame::new()) {
        Ok(engine) => {
            SIMULATION.with(|cell| {
                if let Some(mut previous) = cell.borrow_mut().replace(engine) {
                    previous.dispose();
                }
            });
            0
        }
        Err(err) => {
            tracing::error!("Snowfall init failed: {}", err);
            -1
        }
    }
}

fn frame_pending(sim: &HostedEngine) -> u32 {
    u32::from(sim.scheduler().pending().is_some())
}

/// Returns 1 when a frame is pending, so the host knows to (re)start its
/// animation-frame loop after the first sizing.
#[no_mangle]
pub extern "C" fn snow_resize(width: u32, height: u32) -> u32 {
    with_simulation(0, |sim| {
        sim.handle_event(HostEvent::Resize { width, height });
        frame_pending(sim)
    })
}

#[no_mangle]
pub extern "C" fn snow_pointer_move(x: f32, y: f32, time_ms: f64) {
    with_simulation((), |sim| {
        sim.handle_event(HostEvent::PointerMove { x, y, time_ms })
    });
}

#[no_mangle]
pub extern "C" fn snow_pointer_leave() {
    with_simulation((), |sim| sim.handle_event(HostEvent::PointerLeave));
}

/// Same return contract as [`snow_resize`]; 1 after a resume.
#[no_mangle]
pub extern "C" fn snow_visibility(visible: u32) -> u32 {
    with_simulation(0, |sim| {
        sim.handle_event(HostEvent::Visibility(visible != 0));
        frame_pending(sim)
    })
}

/// Runs the pending frame. Returns 1 when the host should request another
/// animation frame.
#[no_mangle]
pub extern "C" fn snow_frame(time_ms: f64) -> u32 {
    with_simulation(0, |sim| {
        sim.pump(time_ms);
        frame_pending(sim)
    })
}

#[no_mangle]
pub extern "C" fn snow_pixels_ptr() -> *const u8 {
    with_simulation(std::ptr::null(), |sim| sim.canvas().pixels().as_ptr())
}

#[no_mangle]
pub extern "C" fn snow_pixels_len() -> u32 {
    with_simulation(0, |sim| sim.canvas().pixels().len() as u32)
}

#[no_mangle]
pub extern "C" fn snow_pile_bins() -> u32 {
    with_simulation(0, |sim| sim.accumulation().len() as u32)
}

#[no_mangle]
pub extern "C" fn snow_pile_ptr() -> *const f32 {
    with_simulation(std::ptr::null(), |sim| {
        sim.accumulation().heights().as_ptr()
    })
}

#[no_mangle]
pub extern "C" fn snow_particle_count() -> u32 {
    with_simulation(0, |sim| sim.particle_count() as u32)
}

/// Tears the engine down. Further calls into the module are no-ops until the
/// next [`snow_init`].
#[no_mangle]
pub extern "C" fn snow_dispose() {
    SIMULATION.with(|cell| {
        if let Some(mut sim) = cell.borrow_mut().take() {
            sim.dispose();
        }
    });
}
