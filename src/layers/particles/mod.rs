//! Audio-driven particle pools shared by the linear and orbiting particle layers.
//!
//! Each frame: sample the audio drive, apply beat impulses, advance every particle, draw the
//! survivors, compact the pool, then replenish toward the target population.

pub(crate) mod circular;
pub(crate) mod linear;

use crate::audio::spectrum::{MagnitudeSpectrum, band_means};
use crate::config::Palette;
use crate::foundation::core::{Canvas, Point, Vec2};
use crate::foundation::error::VizResult;
use crate::foundation::math::rms;
use crate::layers::{FrameContext, LayerInit};
use crate::render::color::gradient;
use crate::render::painter::{Painter, Surface};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::collections::VecDeque;

const DRIVE_WINDOW_SECS: f64 = 0.02;
const DRIVE_MIN_SAMPLES: usize = 50;
const DRIVE_FFT_SAMPLES: usize = 128;
const DRIVE_HISTORY: usize = 5;
const BEAT_THRESHOLD_SECS: f64 = 0.05;
const BEAT_FORCE: f64 = 1.5;
const BEAT_LIFE_BOOST: f64 = 0.3;
const STALL_SPEED: f64 = 0.1;
const STALL_DECAY: f64 = 0.95;
const MAX_SPAWN_PER_FRAME: usize = 15;
const COLOR_CYCLE_CHANCE: f64 = 0.15;
const COLOR_CYCLE_STEP: f64 = 0.3;

/// Smoothed audio level and a unit-ish forcing direction for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Drive {
    pub(crate) level: f64,
    pub(crate) force: Vec2,
}

/// Rolling RMS and band-driven force, averaged over the last few frames.
pub(crate) struct AudioDrive {
    levels: VecDeque<f64>,
    forces: VecDeque<Vec2>,
    fft: MagnitudeSpectrum,
}

impl AudioDrive {
    pub(crate) fn new() -> Self {
        Self {
            levels: VecDeque::with_capacity(DRIVE_HISTORY + 1),
            forces: VecDeque::with_capacity(DRIVE_HISTORY + 1),
            fft: MagnitudeSpectrum::new(),
        }
    }

    pub(crate) fn sample(&mut self, cx: &FrameContext<'_>) -> VizResult<Drive> {
        let Some(segment) = cx
            .audio
            .segment(cx.time, DRIVE_WINDOW_SECS)
            .filter(|s| s.len() >= DRIVE_MIN_SAMPLES)
        else {
            return Ok(Drive::default());
        };

        push_bounded(&mut self.levels, f64::from(rms(segment)));
        let level = self.levels.iter().sum::<f64>() / self.levels.len() as f64;

        let t = cx.time;
        let fallback = Vec2::new((t * 5.0).sin(), (t * 4.0).cos());
        let mut force = if segment.len() >= DRIVE_FFT_SAMPLES {
            let mags = self.fft.magnitudes(&segment[..DRIVE_FFT_SAMPLES])?;
            match band_means(&mags) {
                Some((bass, mid, high)) => {
                    let (b, m, h) = (f64::from(bass), f64::from(mid), f64::from(high));
                    let f = Vec2::new(
                        (t * 3.0).sin() * b * 2.0 + (t * 8.0).cos() * m * 3.0 + (t * 15.0).sin() * h * 1.5,
                        (t * 4.0).cos() * b * 2.0 + (t * 7.0).sin() * m * 3.0 + (t * 12.0).cos() * h * 1.5,
                    );
                    let mag = f.hypot();
                    if mag > 0.0 { f / mag } else { f }
                }
                None => fallback,
            }
        } else {
            fallback
        };
        force *= level;

        push_bounded(&mut self.forces, force);
        let sum = self.forces.iter().fold(Vec2::ZERO, |acc, f| acc + *f);
        Ok(Drive {
            level,
            force: sum / self.forces.len() as f64,
        })
    }
}

fn push_bounded<T>(q: &mut VecDeque<T>, v: T) {
    q.push_back(v);
    while q.len() > DRIVE_HISTORY {
        q.pop_front();
    }
}

/// Per-variant defaults for options the configuration leaves out.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ParticleDefaults {
    pub(crate) count: usize,
    pub(crate) spawn_rate: f64,
    pub(crate) size: (f64, f64),
    pub(crate) decay: (f64, f64),
    pub(crate) death_threshold: f64,
    pub(crate) glow: bool,
    pub(crate) trail: bool,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ParticleOptions {
    count: Option<usize>,
    spawn_rate: Option<f64>,
    min_speed: Option<f64>,
    decay_min: Option<f64>,
    decay_max: Option<f64>,
    max_lifetime: Option<u32>,
    force_multiplier: Option<f64>,
    max_speed: Option<f64>,
    bounce_strength: Option<f64>,
    /// Also read as the layer's blend opacity.
    opacity: Option<f64>,
    use_alpha: Option<bool>,
    glow_enabled: Option<bool>,
    trail_enabled: Option<bool>,
    death_threshold: Option<f64>,
}

/// Resolved particle settings.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ParticleSettings {
    pub(crate) count: usize,
    pub(crate) spawn_rate: f64,
    pub(crate) min_speed: f64,
    pub(crate) size: (f64, f64),
    pub(crate) decay: (f64, f64),
    pub(crate) max_lifetime: u32,
    pub(crate) force_multiplier: f64,
    pub(crate) max_speed: f64,
    pub(crate) bounce_strength: f64,
    pub(crate) opacity: f64,
    pub(crate) use_alpha: bool,
    pub(crate) glow: bool,
    pub(crate) trail: bool,
    pub(crate) death_threshold: f64,
}

impl ParticleSettings {
    fn resolve(o: ParticleOptions, d: ParticleDefaults) -> Self {
        let decay_min = o.decay_min.unwrap_or(d.decay.0).clamp(0.0, 1.0);
        let decay_max = o.decay_max.unwrap_or(d.decay.1).clamp(decay_min, 1.0);
        Self {
            count: o.count.unwrap_or(d.count),
            spawn_rate: o.spawn_rate.unwrap_or(d.spawn_rate).max(0.0),
            min_speed: o.min_speed.unwrap_or(0.1).max(0.0),
            size: d.size,
            decay: (decay_min, decay_max),
            max_lifetime: o.max_lifetime.unwrap_or(300),
            force_multiplier: o.force_multiplier.unwrap_or(15.0),
            max_speed: o.max_speed.unwrap_or(12.0).max(0.0),
            bounce_strength: o.bounce_strength.unwrap_or(0.85),
            opacity: o.opacity.unwrap_or(0.8).clamp(0.0, 1.0),
            use_alpha: o.use_alpha.unwrap_or(true),
            glow: o.glow_enabled.unwrap_or(d.glow),
            trail: o.trail_enabled.unwrap_or(d.trail),
            death_threshold: o.death_threshold.unwrap_or(d.death_threshold),
        }
    }
}

/// Uniform sample from `[lo, hi)`, or `lo` when the range is empty.
pub(crate) fn uniform(rng: &mut Pcg64Mcg, lo: f64, hi: f64) -> f64 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

/// Position and velocity model of one particle variant.
pub(crate) trait Motion: Sized {
    const DEFAULTS: ParticleDefaults;

    fn spawn(canvas: Canvas, s: &ParticleSettings, rng: &mut Pcg64Mcg) -> Self;

    /// Apply forcing and beat impulse, then integrate one frame.
    fn advance(&mut self, drive: &Drive, beat: f64, s: &ParticleSettings, rng: &mut Pcg64Mcg);

    fn position(&self) -> Point;

    /// Displacement per frame.
    fn velocity(&self) -> Vec2;

    /// Drawn radius for a particle of base `size` at `life`.
    fn radius(&self, size: f64, life: f64, drive: &Drive) -> f64;
}

#[derive(Clone, Debug)]
pub(crate) struct Particle<M> {
    pub(crate) motion: M,
    pub(crate) size: f64,
    pub(crate) color_ratio: f64,
    pub(crate) life: f64,
    pub(crate) decay: f64,
    pub(crate) lifetime: u32,
}

impl<M: Motion> Particle<M> {
    fn spawn(canvas: Canvas, s: &ParticleSettings, rng: &mut Pcg64Mcg) -> Self {
        let motion = M::spawn(canvas, s, rng);
        Self {
            motion,
            size: uniform(rng, s.size.0, s.size.1),
            color_ratio: uniform(rng, 0.0, 1.0),
            life: 1.0,
            decay: uniform(rng, s.decay.0, s.decay.1).min(1.0),
            lifetime: s.max_lifetime,
        }
    }

    /// Advance one frame and report whether the particle survives.
    ///
    /// Life only grows on beat frames and never above 1.0. The particle dies when life falls to
    /// the death threshold or the lifetime counter runs out.
    pub(crate) fn update(
        &mut self,
        drive: &Drive,
        beat: f64,
        s: &ParticleSettings,
        rng: &mut Pcg64Mcg,
    ) -> bool {
        self.motion.advance(drive, beat, s, rng);
        if beat > 0.0 {
            self.life = (self.life + BEAT_LIFE_BOOST).min(1.0);
        }
        self.life *= self.decay;
        let v = self.motion.velocity();
        if v.x.abs() < STALL_SPEED && v.y.abs() < STALL_SPEED && self.life > 0.3 {
            self.life *= STALL_DECAY;
        }
        self.lifetime = self.lifetime.saturating_sub(1);
        self.lifetime > 0 && self.life > s.death_threshold
    }

    fn draw(&self, p: &mut Painter, palette: &Palette, s: &ParticleSettings, drive: &Drive) {
        let base = gradient(palette.primary, palette.secondary, self.color_ratio as f32);
        let alpha = if s.use_alpha {
            self.life * s.opacity
        } else {
            s.opacity
        };
        let pos = self.motion.position();
        let r = self.motion.radius(self.size, self.life, drive).trunc().max(1.0);
        p.fill_circle(pos, r, base.scaled(alpha as f32));

        if s.glow && r > 2.0 {
            p.stroke_circle(pos, r + 1.0, base.scaled((self.life * 0.4) as f32), 1.0);
        }
        if s.trail {
            let v = self.motion.velocity();
            let speed = v.hypot();
            if speed > 2.0 && self.life > 0.3 {
                let tail = pos - v / speed.max(0.1) * 5.0;
                let width = (r / 2.0).trunc().max(1.0);
                p.line(pos, tail, base.scaled((self.life * 0.6) as f32), width);
            }
        }
    }
}

/// A particle pool with its random stream and audio drive.
pub(crate) struct ParticleField<M> {
    pub(crate) settings: ParticleSettings,
    pub(crate) particles: Vec<Particle<M>>,
    canvas: Canvas,
    palette: Palette,
    drive: AudioDrive,
    rng: Pcg64Mcg,
}

impl<M: Motion> ParticleField<M> {
    pub(crate) fn new(init: &LayerInit<'_>, layer_type: &str) -> VizResult<Self> {
        let opts: ParticleOptions = init.parse_options(layer_type)?;
        let settings = ParticleSettings::resolve(opts, M::DEFAULTS);
        let mut rng = Pcg64Mcg::seed_from_u64(init.seed);
        let particles = (0..settings.count)
            .map(|_| Particle::spawn(init.canvas, &settings, &mut rng))
            .collect();
        Ok(Self {
            settings,
            particles,
            canvas: init.canvas,
            palette: init.palette,
            drive: AudioDrive::new(),
            rng,
        })
    }

    pub(crate) fn step(&mut self, cx: &FrameContext<'_>, surface: &mut Surface<'_>) -> VizResult<()> {
        let drive = self.drive.sample(cx)?;
        let beat = if cx.audio.is_beat_at_time(cx.time, BEAT_THRESHOLD_SECS) {
            BEAT_FORCE
        } else {
            0.0
        };

        let s = self.settings;
        let alive: Vec<bool> = self
            .particles
            .iter_mut()
            .map(|p| p.update(&drive, beat, &s, &mut self.rng))
            .collect();

        if alive.iter().any(|&a| a) {
            let (particles, palette) = (&self.particles, &self.palette);
            surface.paint(|painter| {
                for (p, _) in particles.iter().zip(&alive).filter(|(_, a)| **a) {
                    p.draw(painter, palette, &s, &drive);
                }
            })?;
        }

        let mut flags = alive.into_iter();
        self.particles.retain(|_| flags.next().unwrap_or(false));

        self.replenish(drive.level);

        if beat > 0.0 {
            for p in &mut self.particles {
                if self.rng.random::<f64>() < COLOR_CYCLE_CHANCE {
                    p.color_ratio = (p.color_ratio + COLOR_CYCLE_STEP) % 1.0;
                }
            }
        }
        Ok(())
    }

    fn replenish(&mut self, level: f64) {
        let n = spawn_count(
            self.particles.len(),
            self.settings.count,
            level,
            self.settings.spawn_rate,
        );
        for _ in 0..n {
            let p = Particle::spawn(self.canvas, &self.settings, &mut self.rng);
            self.particles.push(p);
        }
    }
}

/// Particles to add this frame: the deficit scaled by an audio-level boost and the spawn rate,
/// capped per frame.
pub(crate) fn spawn_count(current: usize, target: usize, level: f64, spawn_rate: f64) -> usize {
    if current >= target {
        return 0;
    }
    let needed = (target - current) as f64;
    let boost = 1.0 + (level * 10.0).min(5.0);
    let n = (needed * boost * spawn_rate).floor();
    if n.is_finite() && n > 0.0 {
        (n as usize).min(MAX_SPAWN_PER_FRAME)
    } else {
        0
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/layers/particles/mod.rs"]
mod tests;
