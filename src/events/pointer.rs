use crate::{dom, overlay};
use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;
use viewer_core::{SceneController, ViewerConfig};
use wasm_bindgen::JsCast;
use web_sys as web;

#[derive(Clone, Copy, Debug, Default)]
pub struct DragState {
    pub active: bool,
    pub pointer_id: i32,
    pub last: Vec2,
}

#[derive(Clone)]
pub struct InputWiring {
    pub canvas: web::HtmlCanvasElement,
    pub document: web::Document,
    pub cfg: Rc<ViewerConfig>,
    pub controller: Rc<RefCell<SceneController>>,
    pub drag_state: Rc<RefCell<DragState>>,
}

pub fn wire_input_handlers(w: InputWiring) {
    wire_pointermove(&w);
    wire_pointerdown(&w);
    wire_pointerup(&w);
    wire_click(&w);
    wire_wheel(&w);
}

#[inline]
fn client_pos(ev: &web::MouseEvent) -> Vec2 {
    Vec2::new(ev.client_x() as f32, ev.client_y() as f32)
}

fn wire_pointermove(w: &InputWiring) {
    let w = w.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let pos = client_pos(&ev);

        {
            let mut ds = w.drag_state.borrow_mut();
            if ds.active && ds.pointer_id == ev.pointer_id() {
                let delta = pos - ds.last;
                ds.last = pos;
                let mut c = w.controller.borrow_mut();
                let height = c.viewport().y;
                c.orbit_mut().rotate_pixels(delta.x, delta.y, height);
            }
        }

        let cursor = w.controller.borrow().pointer_move(pos);
        dom::set_body_cursor(&w.document, cursor.as_css());
    }) as Box<dyn FnMut(_)>);

    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

fn wire_pointerdown(w: &InputWiring) {
    let w = w.clone();
    let canvas_for_listener = w.canvas.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        if ev.button() != 0 {
            return;
        }
        *w.drag_state.borrow_mut() = DragState {
            active: true,
            pointer_id: ev.pointer_id(),
            last: client_pos(&ev),
        };
        _ = w.canvas.set_pointer_capture(ev.pointer_id());
    }) as Box<dyn FnMut(_)>);
    _ = canvas_for_listener
        .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointerup(w: &InputWiring) {
    let w = w.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let mut ds = w.drag_state.borrow_mut();
        if ds.active && ds.pointer_id == ev.pointer_id() {
            ds.active = false;
            _ = w.canvas.release_pointer_capture(ev.pointer_id());
        }
    }) as Box<dyn FnMut(_)>);

    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
        _ = wnd
            .add_event_listener_with_callback("pointercancel", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

fn wire_click(w: &InputWiring) {
    let w = w.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::MouseEvent| {
        let target = ev.target().and_then(|t| t.dyn_into::<web::Node>().ok());
        if overlay::contains(&w.document, &w.cfg, target.as_ref()) {
            return;
        }

        let hit = w.controller.borrow_mut().click(client_pos(&ev));
        if let Some(hit) = hit {
            log::info!("Clicked on sign object: {}", hit.name);
            let c = w.controller.borrow();
            if let Some(text) = c.popup().text() {
                overlay::show(&w.document, &w.cfg, text);
            }
        }
    }) as Box<dyn FnMut(_)>);

    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

fn wire_wheel(w: &InputWiring) {
    let w = w.clone();
    let canvas_for_listener = w.canvas.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::WheelEvent| {
        w.controller
            .borrow_mut()
            .orbit_mut()
            .dolly(ev.delta_y() as f32);
        ev.prevent_default();
    }) as Box<dyn FnMut(_)>);
    _ = canvas_for_listener
        .add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
    closure.forget();
}
