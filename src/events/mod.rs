mod pointer;

pub use pointer::{wire_input_handlers, DragState, InputWiring};

use crate::{dom, overlay};
use std::cell::RefCell;
use std::rc::Rc;
use viewer_core::{SceneController, ViewerConfig};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Keep the canvas backing store and the controller's viewport in step with the window.
pub fn wire_resize(canvas: &web::HtmlCanvasElement, controller: Rc<RefCell<SceneController>>) {
    dom::sync_canvas_backing_size(canvas);
    let canvas_resize = canvas.clone();
    let closure = Closure::wrap(Box::new(move || {
        dom::sync_canvas_backing_size(&canvas_resize);
        let size = dom::viewport_size();
        controller.borrow_mut().on_resize(size.x, size.y);
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

pub fn wire_popup_close(
    document: &web::Document,
    cfg: Rc<ViewerConfig>,
    controller: Rc<RefCell<SceneController>>,
) {
    let doc = document.clone();
    let close_id = cfg.popup_close_id.clone();
    dom::add_click_listener(document, &close_id, move || {
        controller.borrow_mut().close_popup();
        overlay::hide(&doc, &cfg);
    });
}
