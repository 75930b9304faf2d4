//! Document-wide pointer subscription
//!
//! All mounted backgrounds share one `mousemove` listener on the document.
//! It is installed with the first subscriber and removed with the last.

use std::cell::RefCell;

use backdrop::{Point, PointerBus, SubscriptionId};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, MouseEvent};

#[derive(Default)]
struct GlobalPointer {
    bus: PointerBus,
    listener: Option<Closure<dyn FnMut(MouseEvent)>>,
}

thread_local! {
    static GLOBAL: RefCell<GlobalPointer> = RefCell::new(GlobalPointer::default());
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("document not available"))
}

/// Receive every document pointer move, in client coordinates
pub fn subscribe(listener: impl FnMut(Point) + 'static) -> Result<SubscriptionId, JsValue> {
    GLOBAL.with(|global| {
        let mut global = global.borrow_mut();
        if global.listener.is_none() {
            let closure = Closure::wrap(Box::new(|event: MouseEvent| {
                let client = Point::new(event.client_x() as f32, event.client_y() as f32);
                GLOBAL.with(|global| global.borrow_mut().bus.dispatch(client));
            }) as Box<dyn FnMut(MouseEvent)>);
            document()?
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
            global.listener = Some(closure);
        }
        Ok(global.bus.subscribe(listener))
    })
}

/// Drop a subscription; the document listener goes with the last one
pub fn unsubscribe(id: SubscriptionId) {
    GLOBAL.with(|global| {
        let mut global = global.borrow_mut();
        global.bus.unsubscribe(id);
        if global.bus.is_empty() {
            if let Some(closure) = global.listener.take() {
                if let Ok(document) = document() {
                    document
                        .remove_event_listener_with_callback(
                            "mousemove",
                            closure.as_ref().unchecked_ref(),
                        )
                        .ok();
                }
            }
        }
    });
}

#[cfg(all(test, target_arch = "wasm32"))]
pub(crate) fn subscriber_count() -> usize {
    GLOBAL.with(|global| global.borrow().bus.len())
}

#[cfg(all(test, target_arch = "wasm32"))]
pub(crate) fn is_listening() -> bool {
    GLOBAL.with(|global| global.borrow().listener.is_some())
}
