use super::{Drive, Motion, ParticleDefaults, ParticleField, ParticleSettings, uniform};
use crate::foundation::core::{Canvas, Point, Vec2};
use crate::foundation::error::VizResult;
use crate::layers::{FrameContext, LayerInit, LayerRender};
use crate::render::painter::Surface;
use rand::Rng;
use rand_pcg::Pcg64Mcg;
use std::f64::consts::TAU;

const SPIN_DAMPING: f64 = 0.92;
const BEAT_SPIN: f64 = 0.02;

/// Particle on a circular orbit around the canvas center.
#[derive(Clone, Debug)]
pub(crate) struct Orbit {
    center: Point,
    angle: f64,
    radius: f64,
    base_speed: f64,
    direction: f64,
    spin: f64,
    pos: Point,
    vel: Vec2,
}

impl Orbit {
    fn place(&self, level: f64) -> Point {
        let r = self.radius * (1.0 + level * 0.3);
        self.center + Vec2::from_angle(self.angle) * r
    }
}

impl Motion for Orbit {
    const DEFAULTS: ParticleDefaults = ParticleDefaults {
        count: 60,
        spawn_rate: 0.1,
        size: (2.0, 6.0),
        decay: (0.97, 0.99),
        death_threshold: 0.1,
        glow: false,
        trail: false,
    };

    fn spawn(canvas: Canvas, _s: &ParticleSettings, rng: &mut Pcg64Mcg) -> Self {
        let big = canvas.orbit_radius();
        let mut orbit = Self {
            center: canvas.center(),
            angle: uniform(rng, 0.0, TAU),
            radius: uniform(rng, big * 0.2, big * 0.8),
            base_speed: uniform(rng, 0.05, 0.1),
            direction: if rng.random_bool(0.5) { 1.0 } else { -1.0 },
            spin: 0.0,
            pos: Point::ZERO,
            vel: Vec2::ZERO,
        };
        orbit.pos = orbit.place(0.0);
        orbit
    }

    fn advance(&mut self, drive: &Drive, beat: f64, _s: &ParticleSettings, rng: &mut Pcg64Mcg) {
        if beat > 0.0 {
            self.spin += uniform(rng, -1.0, 1.0) * beat * BEAT_SPIN;
        }
        let speed = self.base_speed * (0.5 + drive.level * 2.5);
        self.angle = (self.angle + speed * self.direction + self.spin) % TAU;
        self.spin *= SPIN_DAMPING;

        let next = self.place(drive.level);
        self.vel = next - self.pos;
        self.pos = next;
    }

    fn position(&self) -> Point {
        self.pos
    }

    fn velocity(&self) -> Vec2 {
        self.vel
    }

    fn radius(&self, size: f64, _life: f64, drive: &Drive) -> f64 {
        size * (1.0 + drive.level * 0.5)
    }
}

/// Particles orbiting the center; loudness speeds them up and widens the orbits.
pub struct CircularParticlesLayer {
    field: ParticleField<Orbit>,
}

impl CircularParticlesLayer {
    pub const TYPE: &'static str = "circular_particles";

    pub fn new(init: &LayerInit<'_>) -> VizResult<Self> {
        Ok(Self {
            field: ParticleField::new(init, Self::TYPE)?,
        })
    }

    /// Live particle count.
    pub fn population(&self) -> usize {
        self.field.particles.len()
    }
}

impl LayerRender for CircularParticlesLayer {
    fn layer_type(&self) -> &str {
        Self::TYPE
    }

    fn render_direct(&mut self, cx: &FrameContext<'_>, surface: &mut Surface<'_>) -> VizResult<()> {
        self.field.step(cx, surface)
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/layers/particles/circular.rs"]
mod tests;
