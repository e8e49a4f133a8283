use super::linear::Drift;
use super::*;
use crate::audio::source::AudioSource;
use crate::layers::testing::{canvas, init, silence, sine};
use crate::render::frame::Frame;
use serde_json::json;

fn drift_settings() -> ParticleSettings {
    ParticleSettings::resolve(ParticleOptions::default(), Drift::DEFAULTS)
}

fn step_once(field: &mut ParticleField<Drift>, audio: &dyn AudioSource, time: f64) {
    let mut frame = Frame::new(field.canvas);
    let mut painter = Painter::new(field.canvas).unwrap();
    let cx = FrameContext { time, audio };
    field
        .step(&cx, &mut Surface::new(&mut frame, &mut painter))
        .unwrap();
}

fn drive_at(drive: &mut AudioDrive, audio: &dyn AudioSource, time: f64) -> Drive {
    drive.sample(&FrameContext { time, audio }).unwrap()
}

#[test]
fn life_never_grows_without_a_beat_and_death_is_exact() {
    let s = drift_settings();
    let mut rng = Pcg64Mcg::seed_from_u64(3);
    let mut p = Particle::<Drift>::spawn(canvas(200, 200), &s, &mut rng);
    let drive = Drive::default();
    let mut prev = p.life;
    let mut steps = 0;
    loop {
        let alive = p.update(&drive, 0.0, &s, &mut rng);
        steps += 1;
        assert!(p.life <= prev);
        prev = p.life;
        assert_eq!(alive, p.lifetime > 0 && p.life > s.death_threshold);
        if !alive {
            break;
        }
    }
    assert!(steps <= s.max_lifetime as usize);
}

#[test]
fn lifetime_counter_kills_even_at_full_life() {
    let s = drift_settings();
    let mut rng = Pcg64Mcg::seed_from_u64(9);
    let mut p = Particle::<Drift>::spawn(canvas(200, 200), &s, &mut rng);
    p.decay = 1.0;
    p.lifetime = 2;
    assert!(p.update(&Drive::default(), 0.0, &s, &mut rng));
    assert!(!p.update(&Drive::default(), 0.0, &s, &mut rng));
    assert_eq!(p.lifetime, 0);
    assert!(p.life > s.death_threshold);
}

#[test]
fn beat_boost_is_capped_at_one() {
    let s = drift_settings();
    let mut rng = Pcg64Mcg::seed_from_u64(11);
    let mut p = Particle::<Drift>::spawn(canvas(200, 200), &s, &mut rng);
    p.life = 0.9;
    p.decay = 1.0;
    p.update(&Drive::default(), BEAT_FORCE, &s, &mut rng);
    assert!(p.life <= 1.0);
    assert!(p.life >= STALL_DECAY - 1e-9);
}

#[test]
fn spawn_count_scales_with_deficit_level_and_rate() {
    assert_eq!(spawn_count(150, 150, 1.0, 1.0), 0);
    assert_eq!(spawn_count(200, 150, 1.0, 1.0), 0);
    assert_eq!(spawn_count(0, 150, 0.0, 0.1), 15);
    assert_eq!(spawn_count(140, 150, 0.0, 0.1), 1);
    assert_eq!(spawn_count(0, 10, 0.5, 1.0), MAX_SPAWN_PER_FRAME);
    assert_eq!(spawn_count(0, 150, 1.0, 0.0), 0);
}

#[test]
fn settings_use_variant_defaults_and_order_decay_bounds() {
    let s = drift_settings();
    assert_eq!(s.count, 150);
    assert_eq!(s.size, (2.0, 5.0));
    assert!(s.glow && s.trail);

    let o = ParticleOptions {
        decay_min: Some(0.99),
        decay_max: Some(0.5),
        count: Some(3),
        ..ParticleOptions::default()
    };
    let s = ParticleSettings::resolve(o, Drift::DEFAULTS);
    assert_eq!(s.count, 3);
    assert_eq!(s.decay, (0.99, 0.99));
}

#[test]
fn silent_audio_drives_nothing() {
    let audio = silence(1.0);
    let mut drive = AudioDrive::new();
    let d = drive_at(&mut drive, &audio, 0.5);
    assert_eq!(d.level, 0.0);
    assert_eq!(d.force, Vec2::ZERO);
}

#[test]
fn tone_raises_level_and_missing_audio_resets_to_zero() {
    let audio = sine(22050, 1.0, 440.0, 0.5);
    let mut drive = AudioDrive::new();
    let d = drive_at(&mut drive, &audio, 0.5);
    assert!(d.level > 0.3 && d.level < 0.4, "level {}", d.level);
    assert!(d.force.hypot() > 0.0);

    let d = drive_at(&mut drive, &audio, 5.0);
    assert_eq!(d, Drive::default());
}

#[test]
fn beat_frame_kicks_velocities_and_cycles_some_colors() {
    let audio = silence(1.0).with_beats([0.5]);
    let c = canvas(400, 400);
    let opts = json!({ "count": 100, "spawn_rate": 0.0, "decay_min": 1.0, "decay_max": 1.0 });
    let mut quiet = ParticleField::<Drift>::new(&init(c, &opts), "particles").unwrap();
    let mut beat = ParticleField::<Drift>::new(&init(c, &opts), "particles").unwrap();
    let spawned: Vec<f64> = beat.particles.iter().map(|p| p.color_ratio).collect();

    step_once(&mut quiet, &audio, 0.2);
    step_once(&mut beat, &audio, 0.5);
    assert_eq!(quiet.particles.len(), 100);
    assert_eq!(beat.particles.len(), 100);

    let mean_speed = |f: &ParticleField<Drift>| {
        f.particles
            .iter()
            .map(|p| p.motion.velocity().hypot())
            .sum::<f64>()
            / f.particles.len() as f64
    };
    assert!(mean_speed(&quiet) < 1.0, "quiet {}", mean_speed(&quiet));
    assert!(mean_speed(&beat) > 2.0, "beat {}", mean_speed(&beat));

    assert!(
        quiet
            .particles
            .iter()
            .zip(&spawned)
            .all(|(p, &r)| p.color_ratio == r)
    );
    let mut cycled = 0;
    for (p, &r) in beat.particles.iter().zip(&spawned) {
        if p.color_ratio != r {
            assert_eq!(p.color_ratio, (r + COLOR_CYCLE_STEP) % 1.0);
            cycled += 1;
        }
    }
    assert!(cycled > 0 && cycled < 100, "cycled {cycled}");
}
