//! Particle store and per-frame snowflake physics.

use rand::Rng;

use crate::accumulation::AccumulationField;
use crate::constants::*;
use crate::input::PointerState;
use crate::surface::{Canvas, ColorStop};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    /// 0 is far away, values near 1 sit right in front of the viewer.
    pub depth: f32,
    pub size: f32,
    pub base_speed: f32,
    pub speed: f32,
    pub opacity: f32,
    pub wobble_phase: f32,
    pub wobble_speed: f32,
    pub tx: f32,
    pub ty: f32,
    /// How many times this slot has been recycled.
    pub generation: u32,
    respawned: bool,
}

impl Particle {
    fn sample<R: Rng>(rng: &mut R, x: f32, y: f32) -> Self {
        let depth: f32 = rng.gen();
        Self {
            x,
            y,
            depth,
            size: MIN_SIZE + depth * SIZE_RANGE,
            base_speed: BASE_SPEED_MIN + depth * SPEED_RANGE,
            speed: INITIAL_SPEED_MIN + depth * SPEED_RANGE,
            opacity: MIN_OPACITY + depth * OPACITY_RANGE,
            wobble_phase: rng.gen::<f32>() * WOBBLE_PHASE_RANGE,
            wobble_speed: WOBBLE_SPEED_MIN + rng.gen::<f32>() * WOBBLE_SPEED_RANGE,
            tx: 0.0,
            ty: 0.0,
            generation: 0,
            respawned: false,
        }
    }

    /// Whether the slot was recycled during the last step. Such particles are
    /// not drawn until the next frame.
    pub fn respawned(&self) -> bool {
        self.respawned
    }

    pub fn alpha(&self, time: f64) -> f32 {
        let twinkle = (time * f64::from(TWINKLE_FREQUENCY) + f64::from(self.wobble_phase)).sin();
        self.opacity * (TWINKLE_BASE + twinkle as f32 * TWINKLE_AMPLITUDE)
    }

    /// Adds swirl and drag from a nearby pointer, then decays the
    /// accumulated turbulence whether or not the pointer was close.
    pub fn apply_turbulence(&mut self, pointer: &PointerState, radius: f32) {
        let dx = self.x - pointer.x;
        let dy = self.y - pointer.y;
        let distance = (dx * dx + dy * dy).sqrt();
        if let Some(force) = turbulence_force(distance, radius) {
            let speed = pointer.speed();
            // Unit vector perpendicular to pointer -> particle.
            let (px, py) = (-dy / distance, dx / distance);
            self.tx += px * speed * force * SWIRL_WEIGHT + pointer.vx * force * DRAG_WEIGHT;
            self.ty += py * speed * force * SWIRL_WEIGHT + pointer.vy * force * DRAG_WEIGHT;
        }
        self.tx *= TURBULENCE_DECAY;
        self.ty *= TURBULENCE_DECAY;
    }
}

pub fn turbulence_force(distance: f32, radius: f32) -> Option<f32> {
    if distance > 0.0 && distance < radius {
        Some((1.0 - distance / radius) * TURBULENCE_STRENGTH)
    } else {
        None
    }
}

/// Global wind shared by every particle for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wind {
    pub drift: f32,
    pub gust: f32,
}

impl Wind {
    pub fn at(time: f64) -> Self {
        let drift = (time * f64::from(WIND_FREQUENCY)).sin() as f32 * WIND_AMPLITUDE + WIND_BIAS;
        let gust = (time * f64::from(GUST_FREQUENCY)).sin() as f32 * 0.5 + 0.5;
        Self { drift, gust }
    }

    /// Nearer flakes catch more wind.
    pub fn for_depth(&self, depth: f32) -> f32 {
        self.drift * (0.5 + depth * 0.5) * (1.0 + self.gust * GUST_WEIGHT)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FrameContext {
    /// Simulation time in milliseconds.
    pub time: f64,
    pub width: f32,
    pub height: f32,
    pub pointer: PointerState,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub landed: usize,
    pub deposited: usize,
    pub drifted: usize,
}

pub struct ParticleStore<R> {
    particles: Vec<Particle>,
    rng: R,
    turbulence_radius: f32,
}

impl<R: Rng> ParticleStore<R> {
    pub fn new(rng: R, turbulence_radius: f32) -> Self {
        Self {
            particles: Vec::new(),
            rng,
            turbulence_radius,
        }
    }

    pub fn initialize(&mut self, width: f32, height: f32, count: usize) {
        self.particles.clear();
        self.particles.reserve(count);
        for _ in 0..count {
            let x = self.rng.gen::<f32>() * width;
            let y = self.rng.gen::<f32>() * height;
            self.particles.push(Particle::sample(&mut self.rng, x, y));
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Advances every particle one frame, depositing landed flakes into
    /// `field` and recycling landed or drifted-away slots in place.
    pub fn step(&mut self, ctx: &FrameContext, field: &mut AccumulationField) -> StepReport {
        let mut report = StepReport::default();
        if ctx.width <= 0.0 || ctx.height <= 0.0 {
            return report;
        }
        let wind = Wind::at(ctx.time);

        for index in 0..self.particles.len() {
            let particle = &mut self.particles[index];
            particle.respawned = false;

            let wobble = (ctx.time * f64::from(particle.wobble_speed)
                + f64::from(particle.wobble_phase))
            .sin() as f32
                * WOBBLE_AMPLITUDE;
            particle.apply_turbulence(&ctx.pointer, self.turbulence_radius);

            particle.x += wind.for_depth(particle.depth) + wobble + particle.tx;
            particle.y += particle.speed + particle.ty * TURBULENCE_VERTICAL_SCALE;

            if self.rng.gen_bool(BURST_PROBABILITY) {
                particle.speed = particle.base_speed * (BURST_MIN + self.rng.gen::<f32>());
            } else {
                particle.speed += (particle.base_speed - particle.speed) * SPEED_EASING;
            }

            let (x, y, size) = (particle.x, particle.y, particle.size);
            let pile = field.height_at(x);
            if y > ctx.height - pile - size {
                if pile < field.max_height() && x > 0.0 && x < ctx.width {
                    field.deposit(x, size * DEPOSIT_SCALE);
                    report.deposited += 1;
                }
                report.landed += 1;
                // Landed flakes fall again from the column they settled in.
                self.respawn(index, x.clamp(0.0, ctx.width));
                continue;
            }

            // Flakes flung above the spawn line count as drifted away.
            if x < -HORIZONTAL_MARGIN || x > ctx.width + HORIZONTAL_MARGIN || y < RESPAWN_Y {
                report.drifted += 1;
                let fresh_x = self.rng.gen::<f32>() * ctx.width;
                self.respawn(index, fresh_x);
            }
        }
        report
    }

    fn respawn(&mut self, index: usize, x: f32) {
        let generation = self.particles[index].generation.wrapping_add(1);
        let mut particle = Particle::sample(&mut self.rng, x, RESPAWN_Y);
        particle.generation = generation;
        particle.respawned = true;
        self.particles[index] = particle;
    }

    pub fn render<C: Canvas>(&self, canvas: &mut C, time: f64) {
        for particle in self.particles.iter().filter(|p| !p.respawned) {
            let alpha = particle.alpha(time);
            let stops = [
                ColorStop::new(0.0, [1.0, 1.0, 1.0, alpha]),
                ColorStop::new(FLAKE_MID_STOP, [1.0, 1.0, 1.0, alpha * FLAKE_MID_ALPHA]),
                ColorStop::new(1.0, [1.0, 1.0, 1.0, 0.0]),
            ];
            canvas.fill_radial(particle.x, particle.y, particle.size, &stops);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixelCanvas;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn store(seed: u64) -> ParticleStore<SmallRng> {
        ParticleStore::new(SmallRng::seed_from_u64(seed), DEFAULT_TURBULENCE_RADIUS)
    }

    fn field(width: f32) -> AccumulationField {
        AccumulationField::new(width, DEFAULT_SEGMENT_WIDTH, DEFAULT_MAX_ACCUMULATION)
    }

    fn ctx(time: f64, width: f32, height: f32, pointer: PointerState) -> FrameContext {
        FrameContext {
            time,
            width,
            height,
            pointer,
        }
    }

    fn resting(x: f32, y: f32) -> Particle {
        Particle {
            x,
            y,
            depth: 0.5,
            size: 3.5,
            base_speed: 1.25,
            speed: 1.25,
            opacity: 0.55,
            wobble_phase: 0.0,
            wobble_speed: 0.03,
            tx: 0.0,
            ty: 0.0,
            generation: 0,
            respawned: false,
        }
    }

    #[test]
    fn sampled_fields_follow_depth() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..1000 {
            let p = Particle::sample(&mut rng, 0.0, 0.0);
            assert!((0.0..1.0).contains(&p.depth));
            assert!((1.0..=6.0).contains(&p.size));
            assert!((0.3..=0.8).contains(&p.opacity));
            assert!((0.5..=2.0).contains(&p.base_speed));
            assert!((0.02..=0.04).contains(&p.wobble_speed));
            assert!((p.size - (1.0 + p.depth * 5.0)).abs() < 1e-6);
        }
    }

    #[test]
    fn turbulence_force_matches_linear_falloff() {
        let force = turbulence_force(50.0, 120.0).unwrap();
        assert!((force - (1.0 - 50.0 / 120.0) * 0.8).abs() < 1e-6);
        assert!((force - 0.466_666_7).abs() < 1e-6);
        assert_eq!(turbulence_force(120.0, 120.0), None);
        assert_eq!(turbulence_force(0.0, 120.0), None);
    }

    #[test]
    fn nearby_pointer_swirls_and_drags() {
        let mut particle = resting(150.0, 100.0);
        let pointer = PointerState {
            x: 100.0,
            y: 100.0,
            vx: 10.0,
            vy: 0.0,
        };
        particle.apply_turbulence(&pointer, 120.0);

        let force = (1.0 - 50.0 / 120.0) * 0.8;
        assert!((particle.tx - 10.0 * force * 0.2 * 0.96).abs() < 1e-5);
        assert!((particle.ty - 10.0 * force * 0.3 * 0.96).abs() < 1e-5);
    }

    #[test]
    fn distant_pointer_only_decays() {
        let mut particle = resting(500.0, 100.0);
        particle.tx = 1.0;
        particle.ty = -2.0;
        let pointer = PointerState {
            x: 0.0,
            y: 0.0,
            vx: 50.0,
            vy: 50.0,
        };
        particle.apply_turbulence(&pointer, 120.0);
        assert!((particle.tx - 0.96).abs() < 1e-6);
        assert!((particle.ty + 1.92).abs() < 1e-6);
    }

    #[test]
    fn wind_is_stronger_up_close() {
        let wind = Wind::at(1234.0);
        assert!(wind.for_depth(0.9) > wind.for_depth(0.1));
        let calm = Wind::at(0.0);
        assert!((calm.drift - 0.3).abs() < 1e-6);
        assert!((calm.gust - 0.5).abs() < 1e-6);
    }

    #[test]
    fn landing_deposits_and_keeps_the_column() {
        let mut particles = store(3);
        let mut acc = field(200.0);
        particles.initialize(200.0, 100.0, 1);
        particles.particles[0] = resting(100.0, 99.0);

        let report = particles.step(&ctx(0.0, 200.0, 100.0, PointerState::OFFSCREEN), &mut acc);
        assert_eq!(report.landed, 1);
        assert_eq!(report.deposited, 1);

        let recycled = particles.particles()[0];
        assert!(recycled.respawned());
        assert_eq!(recycled.generation, 1);
        assert_eq!(recycled.y, RESPAWN_Y);
        assert!((recycled.x - 100.0).abs() < 2.0);
        assert!(acc.heights().iter().sum::<f32>() > 0.0);
    }

    #[test]
    fn drifting_off_screen_picks_a_new_column_without_depositing() {
        let mut particles = store(4);
        let mut acc = field(200.0);
        particles.initialize(200.0, 100.0, 1);
        particles.particles[0] = resting(270.0, 10.0);

        let report = particles.step(&ctx(0.0, 200.0, 100.0, PointerState::OFFSCREEN), &mut acc);
        assert_eq!(report.drifted, 1);
        assert_eq!(report.deposited, 0);

        let recycled = particles.particles()[0];
        assert!((0.0..200.0).contains(&recycled.x));
        assert_eq!(recycled.y, RESPAWN_Y);
        assert!(acc.heights().iter().all(|&h| h == 0.0));
    }

    #[test]
    fn flakes_flung_above_the_top_are_recycled() {
        let mut particles = store(8);
        let mut acc = field(200.0);
        particles.initialize(200.0, 100.0, 1);
        let mut flung = resting(80.0, -5.0);
        flung.ty = -40.0;
        particles.particles[0] = flung;

        let report = particles.step(&ctx(0.0, 200.0, 100.0, PointerState::OFFSCREEN), &mut acc);
        assert_eq!(report.drifted, 1);
        assert_eq!(report.deposited, 0);

        let recycled = particles.particles()[0];
        assert_eq!(recycled.generation, 1);
        assert_eq!(recycled.y, RESPAWN_Y);
        assert!((0.0..200.0).contains(&recycled.x));
    }

    #[test]
    fn upward_swipes_never_lift_flakes_above_the_spawn_line() {
        let (width, height) = (800.0, 600.0);
        let mut particles = store(11);
        let mut acc = field(width);
        particles.initialize(width, height, 250);

        for frame in 0..60u32 {
            let pointer = PointerState {
                x: 400.0,
                y: 560.0 - frame as f32 * 8.0,
                vx: 0.0,
                vy: -80.0,
            };
            particles.step(&ctx(f64::from(frame) * 16.0, width, height, pointer), &mut acc);
            for p in particles.particles() {
                assert!(p.y >= RESPAWN_Y, "{p:?}");
            }
        }
    }

    #[test]
    fn zero_sized_surface_is_a_no_op() {
        let mut particles = store(5);
        let mut acc = field(0.0);
        particles.initialize(100.0, 100.0, 10);
        let before = particles.particles().to_vec();
        let report = particles.step(&ctx(16.0, 0.0, 0.0, PointerState::OFFSCREEN), &mut acc);
        assert_eq!(report, StepReport::default());
        assert_eq!(particles.particles(), &before[..]);
    }

    #[test]
    fn bounds_hold_under_pointer_stirring() {
        let (width, height) = (320.0, 240.0);
        let mut particles = store(6);
        let mut acc = field(width);
        particles.initialize(width, height, 120);

        for frame in 0..3000 {
            let t = frame as f32;
            let pointer = PointerState {
                x: 160.0 + (t * 0.05).sin() * 120.0,
                y: 120.0 + (t * 0.07).cos() * 100.0,
                vx: (t * 0.11).sin() * 40.0,
                vy: (t * 0.13).cos() * 40.0,
            };
            particles.step(&ctx(f64::from(t) * 16.0, width, height, pointer), &mut acc);

            assert_eq!(particles.len(), 120);
            for p in particles.particles() {
                assert!(p.y >= RESPAWN_Y && p.y <= height + p.size);
                assert!(p.x >= -HORIZONTAL_MARGIN && p.x <= width + HORIZONTAL_MARGIN);
            }
        }
    }

    #[test]
    fn every_slot_recycles_within_ten_thousand_frames() {
        let (width, height) = (800.0, 600.0);
        let mut particles = store(7);
        let mut acc = field(width);
        particles.initialize(width, height, 50);

        for frame in 0..10_000u32 {
            let ctx = ctx(f64::from(frame) * 16.0, width, height, PointerState::OFFSCREEN);
            particles.step(&ctx, &mut acc);
        }
        assert_eq!(particles.len(), 50);
        assert!(particles.particles().iter().all(|p| p.generation > 0));
        assert!(acc.heights().iter().any(|&h| h > 0.0));
    }

    #[test]
    fn freshly_recycled_flakes_are_not_drawn() {
        let mut particles = store(8);
        particles.initialize(40.0, 40.0, 1);
        particles.particles[0] = resting(20.0, 20.0);
        particles.particles[0].respawned = true;

        let mut canvas = PixelCanvas::new(40, 40);
        particles.render(&mut canvas, 0.0);
        assert!(canvas.pixels().iter().all(|&b| b == 0));

        particles.particles[0].respawned = false;
        particles.render(&mut canvas, 0.0);
        assert!(canvas.pixel(20, 20).unwrap()[3] > 0);
    }
}
