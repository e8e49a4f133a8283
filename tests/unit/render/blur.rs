use super::*;
use crate::foundation::core::{Canvas, Rgb8};

#[test]
fn radius_zero_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6];
    assert_eq!(blur_rgb8(&src, 1, 2, 0, 1.0).unwrap(), src);
}

#[test]
fn constant_image_is_unchanged() {
    let f = Frame::filled(
        Canvas {
            width: 7,
            height: 5,
        },
        Rgb8::new(10, 20, 30),
    );
    assert_eq!(gaussian_blur(&f, 5).unwrap(), f);
}

#[test]
fn single_pixel_energy_spreads_and_is_conserved() {
    let (w, h) = (9u32, 9u32);
    let mut src = vec![0u8; (w * h * 3) as usize];
    let center = ((4 * w + 4) * 3) as usize;
    src[center] = 255;

    let out = blur_rgb8(&src, w, h, 2, 1.2).unwrap();
    let lit = out.chunks_exact(3).filter(|px| px[0] != 0).count();
    assert!(lit > 1);
    let sum: i32 = out.chunks_exact(3).map(|px| i32::from(px[0])).sum();
    assert!((sum - 255).abs() <= 12, "{sum}");
    assert!(out.chunks_exact(3).all(|px| px[1] == 0 && px[2] == 0));
}

#[test]
fn kernel_sizes_for_amounts() {
    assert_eq!(kernel_for_amount(0.0), 3);
    assert_eq!(kernel_for_amount(0.4), 3);
    assert_eq!(kernel_for_amount(2.0), 5);
    assert_eq!(kernel_for_amount(2.5), 7);
    assert_eq!(kernel_for_amount(10.0), 21);
    assert_eq!(kernel_for_amount(3.0e9), u32::MAX);
    assert_eq!(kernel_for_amount(f32::INFINITY), u32::MAX);
}

#[test]
fn oversized_kernel_blurs_within_frame_bounds() {
    let c = Canvas {
        width: 5,
        height: 3,
    };
    let flat = Frame::filled(c, Rgb8::new(40, 80, 120));
    assert_eq!(gaussian_blur(&flat, u32::MAX).unwrap(), flat);

    let mut spot = Frame::new(c);
    spot.set_pixel(0, 0, Rgb8::new(255, 255, 255));
    let out = gaussian_blur(&spot, u32::MAX).unwrap();
    assert!(out.pixel(4, 2).unwrap().r > 0);
}

#[test]
fn small_kernel_is_passthrough_and_size_is_checked() {
    let f = Frame::new(Canvas {
        width: 3,
        height: 3,
    });
    assert_eq!(gaussian_blur(&f, 1).unwrap(), f);
    assert!(blur_rgb8(&[0u8; 5], 2, 1, 1, 1.0).is_err());
}
