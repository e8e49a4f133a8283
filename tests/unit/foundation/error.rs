use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        VizError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(VizError::config("x").to_string().contains("config error:"));
    assert!(
        VizError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(
        VizError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn unknown_layer_lists_available_names() {
    let err = VizError::UnknownLayer {
        name: "lasers".to_string(),
        available: vec!["background".to_string(), "particles".to_string()],
    };
    let msg = err.to_string();
    assert!(msg.contains("'lasers'"));
    assert!(msg.contains("background, particles"));
    assert!(err.is_config_error());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = VizError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert!(!err.is_config_error());
}

#[test]
fn serde_json_errors_convert() {
    let parse = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
    let err: VizError = parse.into();
    assert!(matches!(err, VizError::Serde(_)));
}
