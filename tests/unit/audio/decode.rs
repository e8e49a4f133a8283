use super::*;

#[test]
fn f32le_bytes_decode_in_order() {
    let mut bytes = Vec::new();
    for v in [0.5f32, -1.0, 0.25] {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    assert_eq!(f32le_to_samples(&bytes).unwrap(), vec![0.5, -1.0, 0.25]);
    assert!(f32le_to_samples(&bytes[..5]).is_err());
}

#[test]
fn missing_file_is_a_validation_error() {
    let err = decode_audio_mono(Path::new("/definitely/not/here.wav"), 22050).unwrap_err();
    assert!(matches!(err, VizError::Validation(_)));
    assert!(decode_audio_mono(Path::new("."), 0).is_err());
}
