//! Mounting a background on a canvas
//!
//! A mount wires window resize, pointer input and the animation frame loop
//! to a [`Stage`]. Everything it registers is released by
//! [`MountHandle::destroy`] or when the handle is dropped.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use backdrop::{
    BackdropError, BackgroundKind, DeviceClass, Point, Stage, SubscriptionId, Tuning,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlCanvasElement, MouseEvent, TouchEvent, Window};

use crate::canvas2d::Canvas2dSurface;
use crate::{is_touch_capable, pointer_bus};

struct Mounted {
    stage: Stage,
    surface: Canvas2dSurface,
}

type Shared = Rc<RefCell<Mounted>>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Everything a mount registered with the browser
///
/// Dropping it unregisters all of it, so an early return from [`mount`]
/// leaves nothing behind either.
struct Registrations {
    state: Shared,
    window: Window,
    canvas: HtmlCanvasElement,
    resize: Closure<dyn FnMut()>,
    canvas_listeners: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
    subscription: Option<SubscriptionId>,
    frame: FrameCallback,
    frame_id: Rc<Cell<Option<i32>>>,
}

impl Drop for Registrations {
    fn drop(&mut self) {
        self.window
            .remove_event_listener_with_callback("resize", self.resize.as_ref().unchecked_ref())
            .ok();

        for (event, listener) in &self.canvas_listeners {
            self.canvas
                .remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
                .ok();
        }

        if let Some(subscription) = self.subscription.take() {
            pointer_bus::unsubscribe(subscription);
        }

        if let Some(id) = self.frame_id.take() {
            self.window.cancel_animation_frame(id).ok();
        }
        // The frame closure holds a handle to its own slot; emptying it breaks the cycle
        self.frame.borrow_mut().take();
    }
}

/// A mounted background
#[wasm_bindgen]
pub struct MountHandle {
    kind: BackgroundKind,
    registrations: Option<Registrations>,
}

#[wasm_bindgen]
impl MountHandle {
    /// Name of the mounted background
    #[wasm_bindgen(getter)]
    pub fn kind(&self) -> String {
        self.kind.name().to_string()
    }

    /// Stop the frame loop and remove every listener; safe to call twice
    pub fn destroy(&mut self) {
        self.registrations.take();
    }

    /// Pause while off-screen, resume when visible again
    pub fn set_visible(&self, visible: bool) {
        if let Some(registrations) = &self.registrations {
            registrations.state.borrow_mut().stage.set_visible(visible);
        }
    }

    #[wasm_bindgen(getter)]
    pub fn mounted(&self) -> bool {
        self.registrations.is_some()
    }
}

/// Mount a background (`particles`, `orbits`, `rings` or a section name) on `canvas`
///
/// `tuning_json` overrides the default tuning; a malformed document is an error.
#[wasm_bindgen]
pub fn mount(
    canvas: HtmlCanvasElement,
    kind: &str,
    tuning_json: Option<String>,
) -> Result<MountHandle, JsValue> {
    let kind: BackgroundKind = kind.parse().map_err(to_js)?;
    let tuning = parse_tuning(tuning_json.as_deref()).map_err(to_js)?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window not available"))?;

    let seed = seed_from_unit(js_sys::Math::random());
    let state: Shared = Rc::new(RefCell::new(Mounted {
        stage: Stage::new(kind.build(&tuning, seed)),
        surface: Canvas2dSurface::new(canvas.clone()),
    }));
    let touch = is_touch_capable();

    // Initial layout, then again on every window resize
    relayout(&state, &window, touch);
    let resize = {
        let state = Rc::clone(&state);
        let window = window.clone();
        Closure::wrap(Box::new(move || relayout(&state, &window, touch)) as Box<dyn FnMut()>)
    };
    let mut registrations = Registrations {
        state: Rc::clone(&state),
        window: window.clone(),
        canvas: canvas.clone(),
        resize,
        canvas_listeners: Vec::new(),
        subscription: None,
        frame: Rc::new(RefCell::new(None)),
        frame_id: Rc::new(Cell::new(None)),
    };
    window.add_event_listener_with_callback(
        "resize",
        registrations.resize.as_ref().unchecked_ref(),
    )?;

    if kind == BackgroundKind::Particles {
        for (event, listener) in [
            ("mousemove", surface_mouse_listener(&state)),
            ("touchmove", touch_listener(&state)),
        ] {
            canvas.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())?;
            registrations.canvas_listeners.push((event, listener));
        }
    }

    registrations.subscription = Some({
        let state = Rc::clone(&state);
        pointer_bus::subscribe(move |client| {
            let mut mounted = state.borrow_mut();
            let rect = mounted.surface.client_rect();
            mounted.stage.global_pointer_move(client, &rect);
        })?
    });

    start_frames(&state, &window, &registrations.frame, &registrations.frame_id)?;

    Ok(MountHandle {
        kind,
        registrations: Some(registrations),
    })
}

/// Refit the canvas and regenerate the background if its size or class changed
fn relayout(state: &Shared, window: &Window, touch: bool) {
    let mut mounted = state.borrow_mut();
    // A detached canvas has no container to measure; try again on the next resize
    let Some(size) = mounted.surface.fit_to_parent() else {
        return;
    };
    let width = window
        .inner_width()
        .ok()
        .and_then(|w| w.as_f64())
        .unwrap_or(f64::from(size.width)) as f32;
    let class = DeviceClass::classify(width, touch, mounted.stage.kind().touch_policy());
    mounted.stage.resize(size, class);
}

fn surface_mouse_listener(state: &Shared) -> Closure<dyn FnMut(Event)> {
    let state = Rc::clone(state);
    Closure::wrap(Box::new(move |event: Event| {
        let Some(event) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let client = Point::new(event.client_x() as f32, event.client_y() as f32);
        let mut mounted = state.borrow_mut();
        let rect = mounted.surface.client_rect();
        mounted.stage.surface_pointer_move(client, &rect);
    }) as Box<dyn FnMut(Event)>)
}

fn touch_listener(state: &Shared) -> Closure<dyn FnMut(Event)> {
    let state = Rc::clone(state);
    Closure::wrap(Box::new(move |event: Event| {
        let Some(event) = event.dyn_ref::<TouchEvent>() else {
            return;
        };
        let list = event.touches();
        let touches: Vec<Point> = (0..list.length())
            .filter_map(|i| list.get(i))
            .map(|t| Point::new(t.client_x() as f32, t.client_y() as f32))
            .collect();
        let mut mounted = state.borrow_mut();
        let rect = mounted.surface.client_rect();
        mounted.stage.touch_move(&touches, &rect);
    }) as Box<dyn FnMut(Event)>)
}

/// Start the requestAnimationFrame loop
///
/// The callback lives in a shared slot so it can schedule itself again.
fn start_frames(
    state: &Shared,
    window: &Window,
    slot: &FrameCallback,
    frame_id: &Rc<Cell<Option<i32>>>,
) -> Result<(), JsValue> {
    let callback = {
        let slot = Rc::clone(slot);
        let frame_id = Rc::clone(frame_id);
        let state = Rc::clone(state);
        let window = window.clone();
        Closure::wrap(Box::new(move |now: f64| {
            {
                let mut mounted = state.borrow_mut();
                let Mounted { stage, surface } = &mut *mounted;
                stage.frame(now, surface);
            }
            if let Some(callback) = slot.borrow().as_ref() {
                frame_id.set(
                    window
                        .request_animation_frame(callback.as_ref().unchecked_ref())
                        .ok(),
                );
            }
        }) as Box<dyn FnMut(f64)>)
    };

    let id = window.request_animation_frame(callback.as_ref().unchecked_ref())?;
    frame_id.set(Some(id));
    *slot.borrow_mut() = Some(callback);
    Ok(())
}

fn parse_tuning(json: Option<&str>) -> Result<Tuning, BackdropError> {
    match json {
        Some(json) if !json.trim().is_empty() => Tuning::from_json_str(json),
        _ => Ok(Tuning::default()),
    }
}

/// Map a `Math.random()` draw onto the full seed range
fn seed_from_unit(unit: f64) -> u64 {
    (unit.clamp(0.0, 1.0) * u64::MAX as f64) as u64
}

fn to_js(error: BackdropError) -> JsValue {
    JsValue::from_str(&error.to_string())
}
