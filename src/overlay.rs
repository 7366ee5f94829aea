use viewer_core::{popup_markup, popup_stylesheet, ViewerConfig};
use web_sys as web;

/// Create the (hidden) popup and its stylesheet. Safe to call once per page.
pub fn install(document: &web::Document, cfg: &ViewerConfig) -> anyhow::Result<()> {
    let js = |e| anyhow::anyhow!("{:?}", e);
    if document.get_element_by_id(&cfg.popup_id).is_some() {
        return Ok(());
    }
    let popup = document.create_element("div").map_err(js)?;
    popup.set_id(&cfg.popup_id);
    popup.set_inner_html(&popup_markup(cfg));
    let body = document
        .body()
        .ok_or_else(|| anyhow::anyhow!("no document body"))?;
    body.append_child(&popup).map_err(js)?;

    let style = document.create_element("style").map_err(js)?;
    style.set_inner_html(&popup_stylesheet(cfg));
    let head = document
        .head()
        .ok_or_else(|| anyhow::anyhow!("no document head"))?;
    head.append_child(&style).map_err(js)?;
    Ok(())
}

#[inline]
pub fn show(document: &web::Document, cfg: &ViewerConfig, text: &str) {
    if let Some(el) = document.get_element_by_id(&cfg.popup_id) {
        if let Ok(Some(p)) = el.query_selector("p") {
            p.set_text_content(Some(text));
        }
        _ = el.set_attribute("style", "display:flex");
    }
}

#[inline]
pub fn hide(document: &web::Document, cfg: &ViewerConfig) {
    if let Some(el) = document.get_element_by_id(&cfg.popup_id) {
        _ = el.set_attribute("style", "display:none");
    }
}

/// Whether `target` sits inside the popup (clicks there are not picks).
pub fn contains(document: &web::Document, cfg: &ViewerConfig, target: Option<&web::Node>) -> bool {
    match (document.get_element_by_id(&cfg.popup_id), target) {
        (Some(el), Some(node)) => el.contains(Some(node)),
        _ => false,
    }
}

pub fn hide_progress(document: &web::Document, cfg: &ViewerConfig) {
    if let Some(el) = document.get_element_by_id(&cfg.progress_id) {
        _ = el.set_attribute("style", "display:none");
    }
}
