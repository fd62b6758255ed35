//! Phone/desktop layout tracking tied to the lifetime of a JS object
//!
//! The listener is registered when the subscription is created and removed
//! when it is dropped (or `free()`d from JS), so an unmounted view leaves
//! nothing behind on `window`.

use std::cell::Cell;
use std::rc::Rc;

use highlight_engine::display::is_mobile_width;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

/// New layout after a resize, `None` when it did not change
pub fn layout_change(was_mobile: bool, width_px: f64) -> Option<bool> {
    let now_mobile = is_mobile_width(width_px);
    (now_mobile != was_mobile).then_some(now_mobile)
}

fn window_width(window: &Window) -> Result<f64, JsValue> {
    window
        .inner_width()?
        .as_f64()
        .ok_or_else(|| JsValue::from_str("window.innerWidth is not a number"))
}

#[wasm_bindgen]
pub struct ViewportSubscription {
    window: Window,
    on_resize: Closure<dyn FnMut()>,
    is_mobile: Rc<Cell<bool>>,
}

#[wasm_bindgen]
impl ViewportSubscription {
    /// Call `callback(isMobile)` whenever the layout flips between phone
    /// and desktop.
    #[wasm_bindgen(constructor)]
    pub fn new(callback: js_sys::Function) -> Result<ViewportSubscription, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let is_mobile = Rc::new(Cell::new(is_mobile_width(window_width(&window)?)));

        let state = Rc::clone(&is_mobile);
        let resize_window = window.clone();
        let on_resize = Closure::<dyn FnMut()>::new(move || {
            let Ok(width) = window_width(&resize_window) else {
                return;
            };
            if let Some(now_mobile) = layout_change(state.get(), width) {
                state.set(now_mobile);
                let _ = callback.call1(&JsValue::NULL, &JsValue::from_bool(now_mobile));
            }
        });

        window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;

        Ok(Self {
            window,
            on_resize,
            is_mobile,
        })
    }

    #[wasm_bindgen(getter, js_name = isMobile)]
    pub fn is_mobile(&self) -> bool {
        self.is_mobile.get()
    }
}

impl Drop for ViewportSubscription {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref());
    }
}
