use crate::render;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use viewer_core::SceneController;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

// Tab switches and debugger pauses produce huge gaps; the animator snaps
// anyway, but orbit damping should not see a multi-second step.
const MAX_FRAME_DT: f32 = 0.1;

pub struct FrameContext {
    pub controller: Rc<RefCell<SceneController>>,
    pub gpu: Rc<RefCell<Option<render::GpuState>>>,
    pub canvas: web::HtmlCanvasElement,
    pub last_instant: Instant,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt_sec = (now - self.last_instant).as_secs_f32().min(MAX_FRAME_DT);
        self.last_instant = now;

        let (camera, model_root) = {
            let mut controller = self.controller.borrow_mut();
            controller.advance_frame(dt_sec);
            (*controller.camera(), controller.model_root_transform())
        };

        let mut gpu = self.gpu.borrow_mut();
        let Some(g) = gpu.as_mut() else {
            return;
        };
        g.resize_if_needed(self.canvas.width(), self.canvas.height());
        match g.render(&camera, model_root) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Timeout) => log::warn!("[gpu] surface timeout; skipping frame"),
            Err(e) => log::error!("[gpu] render error: {:?}", e),
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx.borrow_mut().frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
