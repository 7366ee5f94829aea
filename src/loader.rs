use anyhow::Context;
use viewer_core::{BufferSource, ModelFile, SceneGraph, ViewerConfig};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn js_err(e: wasm_bindgen::JsValue) -> anyhow::Error {
    anyhow::anyhow!("{:?}", e)
}

async fn fetch_ok(url: &str) -> anyhow::Result<web::Response> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let resp: web::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(js_err)?
        .dyn_into()
        .map_err(js_err)?;
    if !resp.ok() {
        anyhow::bail!("GET {} -> HTTP {}", url, resp.status());
    }
    Ok(resp)
}

async fn fetch_bytes(url: &str) -> anyhow::Result<Vec<u8>> {
    let resp = fetch_ok(url).await?;
    let buf = JsFuture::from(resp.array_buffer().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

/// Fetch the model file (`.gltf` or `.glb`) and every external buffer it
/// references, then build the scene graph. Progress is reported per buffer.
pub async fn load_model(cfg: &ViewerConfig) -> anyhow::Result<SceneGraph> {
    let url = cfg.model_url();
    let bytes = fetch_bytes(&url).await.context("fetching model file")?;
    let mut file = ModelFile::from_bytes(&bytes).with_context(|| format!("parsing {}", url))?;
    let sources = file.document.buffer_sources()?;

    let total = file.document.total_buffer_bytes().max(1);
    let mut loaded = 0usize;
    let mut buffers = Vec::with_capacity(sources.len());
    for (index, source) in sources.into_iter().enumerate() {
        let data = match source {
            BufferSource::External(uri) => fetch_bytes(&cfg.resolve(&uri))
                .await
                .with_context(|| format!("fetching buffer {}", uri))?,
            BufferSource::Embedded(data) => data,
            BufferSource::BinaryChunk => file.take_binary_chunk(index)?,
        };
        let declared = file.document.buffers.get(index).map_or(0, |b| b.byte_length);
        loaded = loaded.saturating_add(declared);
        log::info!("loading {:.0}%", loaded as f64 / total as f64 * 100.0);
        buffers.push(data);
    }
    if buffers.is_empty() {
        log::info!("loading 100%");
    }

    let scene = file.document.build_scene(&buffers).context("building scene")?;
    Ok(scene)
}
