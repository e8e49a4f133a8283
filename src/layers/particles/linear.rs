use super::{Drive, Motion, ParticleDefaults, ParticleField, ParticleSettings, uniform};
use crate::foundation::core::{Canvas, Point, Vec2};
use crate::foundation::error::VizResult;
use crate::layers::{FrameContext, LayerInit, LayerRender};
use crate::render::painter::Surface;
use rand_pcg::Pcg64Mcg;
use std::f64::consts::TAU;

const DAMPING: f64 = 0.92;
const EDGE_MARGIN: f64 = 5.0;
const BEAT_IMPULSE: f64 = 8.0;

/// Free-flying particle that bounces off the frame edges.
#[derive(Clone, Debug)]
pub(crate) struct Drift {
    pos: Point,
    vel: Vec2,
    bounds: (f64, f64),
}

impl Drift {
    fn bounce(&mut self, strength: f64, rng: &mut Pcg64Mcg) {
        let (w, h) = self.bounds;
        if self.pos.x <= EDGE_MARGIN || self.pos.x >= w - EDGE_MARGIN {
            let kick = uniform(rng, 0.5, 2.0);
            self.vel.x = -self.vel.x * strength
                + if self.pos.x <= EDGE_MARGIN { kick } else { -kick };
            self.pos.x = self.pos.x.clamp(EDGE_MARGIN, (w - EDGE_MARGIN).max(EDGE_MARGIN));
        }
        if self.pos.y <= EDGE_MARGIN || self.pos.y >= h - EDGE_MARGIN {
            let kick = uniform(rng, 0.5, 2.0);
            self.vel.y = -self.vel.y * strength
                + if self.pos.y <= EDGE_MARGIN { kick } else { -kick };
            self.pos.y = self.pos.y.clamp(EDGE_MARGIN, (h - EDGE_MARGIN).max(EDGE_MARGIN));
        }
    }
}

impl Motion for Drift {
    const DEFAULTS: ParticleDefaults = ParticleDefaults {
        count: 150,
        spawn_rate: 0.1,
        size: (2.0, 5.0),
        decay: (0.96, 0.99),
        death_threshold: 0.05,
        glow: true,
        trail: true,
    };

    fn spawn(canvas: Canvas, s: &ParticleSettings, rng: &mut Pcg64Mcg) -> Self {
        let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
        let pos = Point::new(
            uniform(rng, EDGE_MARGIN, w - EDGE_MARGIN),
            uniform(rng, EDGE_MARGIN, h - EDGE_MARGIN),
        );
        let angle = uniform(rng, 0.0, TAU);
        let speed = uniform(rng, s.min_speed, s.min_speed * 3.0);
        Self {
            pos,
            vel: Vec2::from_angle(angle) * speed,
            bounds: (w, h),
        }
    }

    fn advance(&mut self, drive: &Drive, beat: f64, s: &ParticleSettings, rng: &mut Pcg64Mcg) {
        self.vel += drive.force * drive.level * s.force_multiplier * 0.5;
        if beat > 0.0 {
            let m = beat * BEAT_IMPULSE;
            self.vel.x += uniform(rng, -m, m) * 0.7;
            self.vel.y += uniform(rng, -m, m) * 0.7;
        }

        self.pos += self.vel;
        self.vel *= DAMPING;
        let speed = self.vel.hypot();
        if speed > s.max_speed && speed > 0.0 {
            self.vel *= s.max_speed / speed;
        }
        self.bounce(s.bounce_strength, rng);
    }

    fn position(&self) -> Point {
        self.pos
    }

    fn velocity(&self) -> Vec2 {
        self.vel
    }

    fn radius(&self, size: f64, life: f64, _drive: &Drive) -> f64 {
        size * life
    }
}

/// Particles drifting under audio-band forcing, kicked on beats, bouncing off the edges.
pub struct ParticlesLayer {
    field: ParticleField<Drift>,
}

impl ParticlesLayer {
    pub const TYPE: &'static str = "particles";

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

impl LayerRender for ParticlesLayer {
    fn layer_type(&self) -> &str {
        Self::TYPE
    }

    fn render_direct(&mut self, cx: &FrameContext<'_>, surface: &mut Surface<'_>) -> VizResult<()> {
        self.field.step(cx, surface)
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/layers/particles/linear.rs"]
mod tests;
