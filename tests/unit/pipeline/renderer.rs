use super::*;
use crate::foundation::core::Rgb8;
use crate::layers::testing::{silence, sine};
use serde_json::{Value, json};

fn config(pipeline: Value) -> Config {
    let doc = json!({
        "video": { "width": 64, "height": 48, "fps": 10 },
        "visualization": { "colors": {
            "primary": [255, 0, 0], "secondary": [0, 0, 255], "background": [10, 20, 30]
        } },
        "pipeline": pipeline,
        "seed": 5
    });
    Config::from_json_str(&doc.to_string()).unwrap()
}

#[test]
fn empty_pipeline_renders_black() {
    let cfg = config(json!({ "order": [] }));
    let mut p = Pipeline::assemble(&cfg, &LayerRegistry::with_builtin()).unwrap();
    assert!(p.is_empty());
    let f = p.render_frame(0.0, &silence(1.0)).unwrap();
    assert!(f.is_uniform(Rgb8::BLACK));
    assert_eq!(f.canvas(), p.canvas());
}

#[test]
fn solid_background_fills_every_frame() {
    let cfg = config(json!({
        "order": ["background"],
        "background": { "style": "solid" }
    }));
    let mut p = Pipeline::assemble(&cfg, &LayerRegistry::with_builtin()).unwrap();
    let audio = silence(1.0);
    for i in 0..5 {
        let f = p.render_frame(f64::from(i) * 0.1, &audio).unwrap();
        assert!(f.is_uniform(Rgb8::new(10, 20, 30)));
    }
}

#[test]
fn unknown_layer_fails_assembly_with_available_names() {
    let cfg = config(json!({ "order": ["background", "lasers"], "background": { "style": "solid" } }));
    let err = Pipeline::assemble(&cfg, &LayerRegistry::with_builtin())
        .err()
        .unwrap();
    let msg = err.to_string();
    assert!(msg.contains("lasers"), "{msg}");
    assert!(msg.contains("particles"), "{msg}");
}

#[test]
fn missing_options_block_is_a_config_error() {
    let cfg = config(json!({ "order": ["waveform"] }));
    let err = Pipeline::assemble(&cfg, &LayerRegistry::with_builtin())
        .err()
        .unwrap();
    assert!(matches!(err, VizError::Config(_)), "{err}");
}

#[test]
fn layer_info_follows_configured_order() {
    let cfg = config(json!({
        "order": ["background", "waveform", "effects"],
        "background": { "style": "gradient" },
        "waveform": { "style": "simple", "blend_mode": "add", "opacity": 0.5 },
        "effects": { "effects": ["vignette"] }
    }));
    let p = Pipeline::assemble(&cfg, &LayerRegistry::with_builtin()).unwrap();
    let info = p.layer_info();
    assert_eq!(p.len(), 3);
    let types: Vec<_> = info.iter().map(|i| i.layer_type.as_str()).collect();
    assert_eq!(types, ["background", "waveform", "effects"]);
    assert_eq!(info[1].blend_mode, "add");
    assert_eq!(info[2].index, 2);
}

#[test]
fn identical_inputs_render_identical_frames() {
    let pipeline = json!({
        "order": ["background", "particles", "spectrum"],
        "background": { "style": "animated" },
        "particles": { "count": 30 },
        "spectrum": { "style": "bars", "bins": 16 }
    });
    let audio = sine(22050, 1.0, 440.0, 0.6).with_beats([0.2, 0.5]);
    let reg = LayerRegistry::with_builtin();
    let mut a = Pipeline::assemble(&config(pipeline.clone()), &reg).unwrap();
    let mut b = Pipeline::assemble(&config(pipeline), &reg).unwrap();
    for i in 0..8 {
        let t = f64::from(i) * 0.1;
        assert_eq!(a.render_frame(t, &audio).unwrap(), b.render_frame(t, &audio).unwrap());
    }
}
