use super::*;

#[test]
fn fnv1a64_known_vectors() {
    let mut h = Fnv1a64::new_default();
    h.write_bytes(b"");
    assert_eq!(h.finish(), Fnv1a64::OFFSET_BASIS);

    let mut h = Fnv1a64::new_default();
    h.write_bytes(b"a");
    assert_eq!(h.finish(), 0xaf63_dc4c_8601_ec8c);
}

#[test]
fn layer_seed_depends_on_every_input() {
    let base = layer_seed(7, 1, "particles");
    assert_eq!(base, layer_seed(7, 1, "particles"));
    assert_ne!(base, layer_seed(8, 1, "particles"));
    assert_ne!(base, layer_seed(7, 2, "particles"));
    assert_ne!(base, layer_seed(7, 1, "effects"));
}

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(255, 0), 0);
    assert_eq!(mul_div255_u16(100, 128), 50);
}

#[test]
fn to_channel_saturates() {
    assert_eq!(to_channel(-3.0), 0);
    assert_eq!(to_channel(254.6), 255);
    assert_eq!(to_channel(999.0), 255);
    assert_eq!(to_channel(f32::NAN), 0);
}

#[test]
fn summary_statistics() {
    assert_eq!(mean(&[]), 0.0);
    assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    assert_eq!(mean_abs(&[-1.0, 1.0, -2.0, 2.0]), 1.5);
    assert!((rms(&[3.0, -4.0, 3.0, -4.0]) - 12.5f32.sqrt()).abs() < 1e-6);
    assert_eq!(rms(&[]), 0.0);
}
