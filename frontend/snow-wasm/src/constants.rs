//! Snowfall tuning constants
//!
//! Everything here is fixed at build time. The handful of knobs a host may
//! want to change live in [`crate::config::SnowConfig`].

use std::f32::consts::TAU;

// Defaults for SnowConfig
pub const DEFAULT_PARTICLE_COUNT: usize = 250;
pub const DEFAULT_MAX_ACCUMULATION: f32 = 90.0;
pub const DEFAULT_SEGMENT_WIDTH: f32 = 3.0;
pub const DEFAULT_TURBULENCE_RADIUS: f32 = 120.0;
pub const DEFAULT_SEED: u64 = 0x5EED_5EED;

// Particle sampling
pub const MIN_SIZE: f32 = 1.0;
pub const SIZE_RANGE: f32 = 5.0;
pub const BASE_SPEED_MIN: f32 = 0.5;
pub const INITIAL_SPEED_MIN: f32 = 0.3;
pub const SPEED_RANGE: f32 = 1.5;
pub const MIN_OPACITY: f32 = 0.3;
pub const OPACITY_RANGE: f32 = 0.5;
pub const WOBBLE_SPEED_MIN: f32 = 0.02;
pub const WOBBLE_SPEED_RANGE: f32 = 0.02;
pub const WOBBLE_PHASE_RANGE: f32 = TAU;
pub const WOBBLE_AMPLITUDE: f32 = 0.5;

// Recycling bounds
pub const RESPAWN_Y: f32 = -10.0;
pub const HORIZONTAL_MARGIN: f32 = 50.0;

// Wind
pub const WIND_FREQUENCY: f32 = 0.0003;
pub const WIND_AMPLITUDE: f32 = 0.5;
pub const WIND_BIAS: f32 = 0.3;
pub const GUST_FREQUENCY: f32 = 0.001;
pub const GUST_WEIGHT: f32 = 0.3;

// Speed relaxation and random bursts
pub const SPEED_EASING: f32 = 0.02;
pub const BURST_PROBABILITY: f64 = 0.001;
pub const BURST_MIN: f32 = 1.5;

// Pointer turbulence
pub const TURBULENCE_STRENGTH: f32 = 0.8;
pub const SWIRL_WEIGHT: f32 = 0.3;
pub const DRAG_WEIGHT: f32 = 0.2;
pub const TURBULENCE_DECAY: f32 = 0.96;
pub const TURBULENCE_VERTICAL_SCALE: f32 = 0.5;

// Pointer tracking
pub const POINTER_FRAME_MS: f32 = 16.0;
pub const POINTER_DECAY: f32 = 0.95;
pub const POINTER_OFFSCREEN: f32 = -1000.0;
pub const POINTER_MIN_DT_MS: f64 = 1.0;

// Accumulation
pub const DEPOSIT_SCALE: f32 = 0.8;
pub const DEPOSIT_SPREAD: i64 = 2;
pub const DEPOSIT_FALLOFF: f32 = 0.3;

// Rendering
pub const TWINKLE_FREQUENCY: f32 = 0.002;
pub const TWINKLE_BASE: f32 = 0.7;
pub const TWINKLE_AMPLITUDE: f32 = 0.3;
pub const FLAKE_MID_STOP: f32 = 0.4;
pub const FLAKE_MID_ALPHA: f32 = 0.6;
pub const PILE_TOP_RGBA: [f32; 4] = [1.0, 1.0, 1.0, 0.9];
pub const PILE_MID_RGBA: [f32; 4] = [240.0 / 255.0, 245.0 / 255.0, 1.0, 0.85];
pub const PILE_BASE_RGBA: [f32; 4] = [220.0 / 255.0, 230.0 / 255.0, 245.0 / 255.0, 0.8];
pub const PILE_MID_STOP: f32 = 0.3;
pub const CURVE_SUBDIVISIONS: usize = 4;

// Frame clock
pub const MAX_FRAME_GAP_MS: f64 = 100.0;
