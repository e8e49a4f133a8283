use super::*;

#[test]
fn frame_range_rejects_reversed_bounds() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert_eq!(r.len_frames(), 3);
    assert!(FrameRange::new(FrameIndex(3), FrameIndex(3)).unwrap().is_empty());
}

#[test]
fn fps_time_conversions() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());

    let fps = Fps::new(10, 1).unwrap();
    assert_eq!(fps.frame_time_secs(FrameIndex(0)), 0.0);
    assert!((fps.frame_time_secs(FrameIndex(15)) - 1.5).abs() < 1e-12);
    assert_eq!(fps.secs_to_frames_floor(2.0), 20);
    assert_eq!(fps.secs_to_frames_floor(2.09), 20);
    assert_eq!(fps.secs_to_frames_floor(-1.0), 0);
}

#[test]
fn canvas_geometry_uses_integer_halving() {
    let c = Canvas {
        width: 321,
        height: 240,
    };
    assert_eq!(c.center(), Point::new(160.0, 120.0));
    assert_eq!(c.orbit_radius(), 80.0);
    assert_eq!(c.pixel_count(), 321 * 240);
}

#[test]
fn rgb8_serializes_as_triple() {
    let c: Rgb8 = serde_json::from_str("[10, 20, 30]").unwrap();
    assert_eq!(c, Rgb8::new(10, 20, 30));
    assert_eq!(serde_json::to_string(&c).unwrap(), "[10,20,30]");
    assert!(serde_json::from_str::<Rgb8>("[10, 20]").is_err());
    assert!(serde_json::from_str::<Rgb8>("[10, 20, 300]").is_err());
}

#[test]
fn rgb8_scaled_clamps_factor() {
    let c = Rgb8::new(200, 100, 50);
    assert_eq!(c.scaled(1.0), c);
    assert_eq!(c.scaled(0.0), Rgb8::BLACK);
    assert_eq!(c.scaled(2.0), c);
    assert_eq!(c.scaled(0.5), Rgb8::new(100, 50, 25));
}
