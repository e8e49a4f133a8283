use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Rgb8;
use crate::layers::testing::silence;
use crate::layers::{FrameContext, LayerKind, LayerRender};
use crate::render::painter::Surface;
use serde_json::json;
use std::sync::Mutex;

/// Records frame times and raises the cancel flag after `stop_after` frames.
struct Probe {
    times: Arc<Mutex<Vec<f64>>>,
    cancel: Option<(Arc<AtomicBool>, usize)>,
}

impl LayerRender for Probe {
    fn layer_type(&self) -> &str {
        "probe"
    }

    fn render_direct(&mut self, cx: &FrameContext<'_>, surface: &mut Surface<'_>) -> VizResult<()> {
        let mut times = self.times.lock().unwrap();
        times.push(cx.time);
        if let Some((flag, n)) = &self.cancel
            && times.len() >= *n
        {
            flag.store(true, Ordering::Relaxed);
        }
        surface.frame.fill(Rgb8::new(times.len() as u8, 0, 0));
        Ok(())
    }
}

fn config() -> Config {
    let doc = json!({
        "video": { "width": 16, "height": 8, "fps": 4 },
        "visualization": { "colors": { "primary": [255, 255, 255], "secondary": [0, 0, 0] } },
        "pipeline": { "order": ["probe"], "probe": {} }
    });
    Config::from_json_str(&doc.to_string()).unwrap()
}

fn session(times: Arc<Mutex<Vec<f64>>>, stop_after: Option<usize>) -> RenderSession {
    let flag = Arc::new(AtomicBool::new(false));
    let cancel = stop_after.map(|n| (Arc::clone(&flag), n));
    let mut s = RenderSession::from_config(
        &config(),
        &probe_registry(times, cancel),
        RenderSessionOpts::default(),
    )
    .unwrap();
    s.cancel = flag;
    s
}

fn probe_registry(
    times: Arc<Mutex<Vec<f64>>>,
    cancel: Option<(Arc<AtomicBool>, usize)>,
) -> LayerRegistry {
    let mut r = LayerRegistry::new();
    r.register("probe", move |_| {
        Ok(LayerKind::External(Box::new(Probe {
            times: Arc::clone(&times),
            cancel: cancel.clone(),
        })))
    });
    r
}

#[test]
fn full_range_floors_duration_times_fps() {
    let s = session(Arc::default(), None);
    let r = s.full_range(2.6).unwrap();
    assert_eq!((r.start.0, r.end.0), (0, 10));
    assert!(s.full_range(f64::NAN).is_err());
    assert!(s.full_range(0.1).unwrap().is_empty());
}

#[test]
fn range_frames_arrive_in_order_at_index_over_fps() {
    let times = Arc::new(Mutex::new(Vec::new()));
    let mut s = session(Arc::clone(&times), None);
    let mut sink = InMemorySink::new();
    let range = FrameRange::new(FrameIndex(2), FrameIndex(8)).unwrap();
    let stats = s.render_range(range, &silence(3.0), &mut sink).unwrap();

    assert_eq!(stats.frames_total, 6);
    assert_eq!(stats.frames_rendered, 6);
    assert!(!stats.cancelled);
    assert!(sink.is_ended());
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (16, 8));
    assert_eq!(cfg.fps, Fps::new(4, 1).unwrap());

    let idxs: Vec<u64> = sink.frames.iter().map(|(i, _)| i.0).collect();
    assert_eq!(idxs, vec![2, 3, 4, 5, 6, 7]);
    let expected: Vec<f64> = (2..8).map(|i| f64::from(i) / 4.0).collect();
    assert_eq!(*times.lock().unwrap(), expected);
    // Layer state carried across frames.
    assert_eq!(sink.frames[5].1.pixel(0, 0), Some(Rgb8::new(6, 0, 0)));
}

#[test]
fn cancel_stops_between_frames_and_still_finalizes() {
    let times = Arc::new(Mutex::new(Vec::new()));
    let mut s = session(Arc::clone(&times), Some(3));
    let mut sink = InMemorySink::new();
    let range = FrameRange::new(FrameIndex(0), FrameIndex(10)).unwrap();
    let stats = s.render_range(range, &silence(3.0), &mut sink).unwrap();

    assert!(stats.cancelled);
    assert_eq!(stats.frames_rendered, 3);
    assert_eq!(sink.frames.len(), 3);
    assert!(sink.is_ended());
}

#[test]
fn empty_range_is_rejected() {
    let mut s = session(Arc::default(), None);
    let mut sink = InMemorySink::new();
    let range = FrameRange::new(FrameIndex(3), FrameIndex(3)).unwrap();
    assert!(s.render_range(range, &silence(1.0), &mut sink).is_err());
    assert!(sink.config().is_none());
}
