use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use backdrop::{
    BackgroundKind, ClientRect, DeviceClass, DrawOp, Point, PointerBus, Recorder, Size, Stage,
    Tuning,
};

/// Settings for a headless run
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub kind: BackgroundKind,
    pub size: Size,
    pub class: DeviceClass,
    pub frames: u32,
    pub fps: f32,
    pub seed: u64,
    /// Pointer samples in surface coordinates, one per frame, round-robin
    pub pointers: Vec<Point>,
    pub tuning: Tuning,
}

/// The last frame of a headless run
#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    pub kind: BackgroundKind,
    pub width: f32,
    pub height: f32,
    pub class: DeviceClass,
    pub frames: u32,
    pub population: usize,
    pub ops: Vec<DrawOp>,
}

/// Run a background for `options.frames` frames and keep the last one
pub fn run(options: &RenderOptions) -> Trace {
    let stage = Rc::new(RefCell::new(Stage::new(
        options.kind.build(&options.tuning, options.seed),
    )));
    stage.borrow_mut().resize(options.size, options.class);

    // The surface sits at the document origin, so client and local coordinates agree
    let rect = ClientRect::from_size(options.size);
    let mut bus = PointerBus::new();
    let subscription = {
        let stage = Rc::clone(&stage);
        bus.subscribe(move |client| stage.borrow_mut().global_pointer_move(client, &rect))
    };

    let frame_ms = 1000.0 / f64::from(options.fps);
    let mut recorder = Recorder::new();
    for frame in 0..options.frames {
        if !options.pointers.is_empty() {
            let sample = options.pointers[frame as usize % options.pointers.len()];
            bus.dispatch(sample);
        }
        stage
            .borrow_mut()
            .frame(f64::from(frame) * frame_ms, &mut recorder);
    }
    bus.unsubscribe(subscription);

    let stage = stage.borrow();
    let viewport = stage.viewport();
    Trace {
        kind: options.kind,
        width: viewport.size().width,
        height: viewport.size().height,
        class: viewport.class(),
        frames: options.frames,
        population: stage.background().population(),
        ops: recorder.into_ops(),
    }
}

/// Parse an `x,y` pointer sample
pub fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{s}'"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("invalid x '{x}': {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("invalid y '{y}': {e}"))?;
    Ok(Point::new(x, y))
}
