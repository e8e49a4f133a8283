use super::*;
use crate::layers::testing::{canvas, init, lit_pixels, render_at, silence, sine};
use crate::render::frame::Frame;
use crate::render::painter::{Painter, Surface};
use serde_json::json;

#[test]
fn ring_samples_normalize_by_peak() {
    let seg = [0.0f32, 0.5, -0.25, 0.1];
    let out = ring_samples(&seg, 8).unwrap();
    assert_eq!(out.len(), 8);
    assert_eq!(out[2], 1.0);
    assert_eq!(out[4], -0.5);
    assert!(ring_samples(&[0.0; 300], 8).is_none());
}

#[test]
fn all_styles_draw_around_the_center() {
    let audio = sine(8000, 2.0, 110.0, 0.6);
    for style in ["mirror", "filled", "bars"] {
        let c = canvas(90, 90);
        let opts = json!({ "style": style, "points": 90 });
        let mut layer = CircularWaveformLayer::new(&init(c, &opts)).unwrap();
        let mut frame = Frame::new(c);
        render_at(&mut layer, &audio, 1.0, &mut frame).unwrap();
        assert!(lit_pixels(&frame) > 0, "style {style}");
        // Corners stay outside every ring.
        assert_eq!(frame.pixel(0, 0).map(|p| p.to_array()), Some([0, 0, 0]));
    }
}

#[test]
fn negative_bars_point_inward() {
    let c = canvas(90, 90);
    let layer = CircularWaveformLayer::new(&init(c, &json!({ "style": "bars" }))).unwrap();
    let mut frame = Frame::new(c);
    let mut painter = Painter::new(c).unwrap();
    Surface::new(&mut frame, &mut painter)
        .paint(|p| layer.draw(p, &[-1.0; 4], 0.5))
        .unwrap();
    // Radius 30 around (45, 45): the bar at angle 0 runs from x = 65 in toward x = 45.
    assert_ne!(frame.pixel(55, 45).map(|p| p.to_array()), Some([0, 0, 0]));
    assert_eq!(frame.pixel(75, 45).map(|p| p.to_array()), Some([0, 0, 0]));
    assert_eq!(frame.pixel(85, 45).map(|p| p.to_array()), Some([0, 0, 0]));
}

#[test]
fn silence_and_short_windows_are_no_ops() {
    let c = canvas(40, 40);
    let opts = json!({});
    let mut layer = CircularWaveformLayer::new(&init(c, &opts)).unwrap();
    let mut frame = Frame::new(c);
    render_at(&mut layer, &silence(1.0), 0.5, &mut frame).unwrap();
    let short = json!({ "window_duration": 0.001 });
    let mut layer = CircularWaveformLayer::new(&init(c, &short)).unwrap();
    render_at(&mut layer, &sine(8000, 1.0, 100.0, 0.5), 0.5, &mut frame).unwrap();
    assert_eq!(lit_pixels(&frame), 0);
}
