#![cfg(target_arch = "wasm32")]
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use viewer_core::{SceneController, ViewerConfig};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod dom;
mod events;
mod frame;
mod loader;
mod overlay;
mod render;

/// `data-model-base` / `data-model-file` on the canvas point the viewer at another asset.
fn read_config(canvas: &web::HtmlCanvasElement) -> ViewerConfig {
    ViewerConfig::default().with_model_overrides(
        canvas.get_attribute("data-model-base"),
        canvas.get_attribute("data-model-file"),
    )
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("sign-viewer starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas_id = ViewerConfig::default().canvas_id;
    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(&canvas_id)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", canvas_id))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    let cfg = Rc::new(read_config(&canvas));

    overlay::install(&document, &cfg)?;

    let controller = Rc::new(RefCell::new(SceneController::new(dom::viewport_size())));

    events::wire_resize(&canvas, controller.clone());
    events::wire_popup_close(&document, cfg.clone(), controller.clone());
    events::wire_input_handlers(events::InputWiring {
        canvas: canvas.clone(),
        document: document.clone(),
        cfg: cfg.clone(),
        controller: controller.clone(),
        drag_state: Rc::new(RefCell::new(events::DragState::default())),
    });

    let gpu = Rc::new(RefCell::new(render::init_gpu(&canvas).await));

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        controller: controller.clone(),
        gpu: gpu.clone(),
        canvas: canvas.clone(),
        last_instant: Instant::now(),
    }));
    frame::start_loop(frame_ctx);

    match loader::load_model(&cfg).await {
        Ok(scene) => {
            if let Some(g) = gpu.borrow_mut().as_mut() {
                g.upload_model(&scene);
            }
            let mut c = controller.borrow_mut();
            let registry = c.on_model_loaded(scene);
            log::info!("[scene] {} pick targets", registry.len());
            overlay::hide_progress(&document, &cfg);
        }
        Err(e) => {
            // progress indicator stays up; the page keeps an empty scene
            log::error!("model load failed: {:?}", e);
            controller.borrow_mut().on_model_failed();
        }
    }

    Ok(())
}
