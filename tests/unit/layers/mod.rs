use super::*;
use crate::foundation::core::Rgb8;
use crate::layers::testing::{canvas, silence};
use serde_json::json;

/// Paints its color over the whole surface.
struct Fill(Rgb8);

impl LayerRender for Fill {
    fn layer_type(&self) -> &str {
        "fill"
    }

    fn render_direct(&mut self, _cx: &FrameContext<'_>, surface: &mut Surface<'_>) -> VizResult<()> {
        surface.frame.fill(self.0);
        Ok(())
    }
}

fn fill_layer(color: Rgb8, options: serde_json::Value) -> Layer {
    Layer::new(LayerKind::External(Box::new(Fill(color))), &options).unwrap()
}

fn run(layer: &mut Layer, frame: &mut Frame) {
    let audio = silence(1.0);
    let cx = FrameContext {
        time: 0.25,
        audio: &audio,
    };
    let mut painter = Painter::new(frame.canvas()).unwrap();
    layer.render(&cx, frame, &mut painter).unwrap();
}

#[test]
fn common_options_default_and_clamp() {
    let l = fill_layer(Rgb8::WHITE, json!({}));
    assert_eq!(l.opacity(), 1.0);
    assert_eq!(l.blend_mode(), BlendMode::Overwrite);
    assert_eq!(l.layer_type(), "fill");

    assert_eq!(fill_layer(Rgb8::WHITE, json!({ "opacity": 3.0 })).opacity(), 1.0);
    assert_eq!(fill_layer(Rgb8::WHITE, json!({ "opacity": -1.0 })).opacity(), 0.0);
}

#[test]
fn unknown_blend_mode_falls_back_to_overwrite() {
    let l = fill_layer(Rgb8::WHITE, json!({ "blend_mode": "dodge", "opacity": 0.5 }));
    assert_eq!(l.blend_mode(), BlendMode::Overwrite);
}

#[test]
fn malformed_common_options_are_config_errors() {
    let err = Layer::new(
        LayerKind::External(Box::new(Fill(Rgb8::WHITE))),
        &json!({ "opacity": "half" }),
    )
    .err()
    .unwrap();
    assert!(err.is_config_error());
}

#[test]
fn translucent_layer_blends_its_isolated_canvas() {
    let c = canvas(6, 4);
    let mut layer = fill_layer(
        Rgb8::new(200, 0, 0),
        json!({ "blend_mode": "normal", "opacity": 0.5 }),
    );
    for _ in 0..2 {
        let mut frame = Frame::filled(c, Rgb8::new(100, 100, 100));
        run(&mut layer, &mut frame);
        assert!(frame.is_uniform(Rgb8::new(150, 50, 50)));
    }
}

#[test]
fn near_opaque_layer_paints_directly() {
    let c = canvas(5, 5);
    let mut layer = fill_layer(
        Rgb8::new(1, 2, 3),
        json!({ "blend_mode": "add", "opacity": 0.995 }),
    );
    let mut frame = Frame::filled(c, Rgb8::new(100, 100, 100));
    run(&mut layer, &mut frame);
    assert!(frame.is_uniform(Rgb8::new(1, 2, 3)));
}

#[test]
fn add_blend_scales_foreground() {
    let c = canvas(3, 3);
    let mut layer = fill_layer(
        Rgb8::new(100, 200, 40),
        json!({ "blend_mode": "add", "opacity": 0.5 }),
    );
    let mut frame = Frame::filled(c, Rgb8::new(10, 200, 0));
    run(&mut layer, &mut frame);
    assert!(frame.is_uniform(Rgb8::new(60, 255, 20)));
}
