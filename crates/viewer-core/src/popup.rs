//! Markup and stylesheet for the sign popup, keyed on the configured element ids.

use crate::constants::{POPUP_INITIAL_TEXT, POPUP_TITLE};
use crate::ViewerConfig;

// `$overlay` and `$close` are replaced with the configured ids.
const POPUP_CSS_TEMPLATE: &str = r#"
  #$overlay {
    display: none;
    position: fixed;
    top: 0; left: 0;
    width: 100vw; height: 100vh;
    background: rgba(0, 0, 0, 0.7);
    justify-content: center;
    align-items: center;
    z-index: 9999;
  }
  .popup-content {
    background: #ffffff;
    padding: 20px 30px;
    border-radius: 12px;
    text-align: center;
    max-width: 400px;
    width: 90%;
    height: auto;
    box-shadow: 0 0 30px rgba(0,0,0,0.4);
    position: relative;
  }
  .popup-content h2 {
    margin-top: 0;
    font-size: 1.5rem;
  }
  .popup-content p {
    margin-bottom: 20px;
    font-size: 1rem;
  }
  #$close {
    position: absolute;
    top: 10px; right: 15px;
    cursor: pointer;
    font-size: 24px;
    font-weight: bold;
  }

  @media (max-width: 480px) {
    .popup-content {
      padding: 15px 20px;
      width: 80%;
    }
    .popup-content h2 {
      font-size: 1.25rem;
    }
    .popup-content p {
      font-size: 0.95rem;
    }
    #$close {
      font-size: 22px;
      top: 8px;
      right: 12px;
    }
  }
"#;

/// Stylesheet for the overlay whose selectors follow `cfg.popup_id` and `cfg.popup_close_id`.
pub fn popup_stylesheet(cfg: &ViewerConfig) -> String {
    POPUP_CSS_TEMPLATE
        .replace("$overlay", &cfg.popup_id)
        .replace("$close", &cfg.popup_close_id)
}

/// Inner HTML of the overlay element.
pub fn popup_markup(cfg: &ViewerConfig) -> String {
    format!(
        r#"<div class="popup-content"><span id="{}">&times;</span><h2>{}</h2><p>{}</p></div>"#,
        cfg.popup_close_id, POPUP_TITLE, POPUP_INITIAL_TEXT
    )
}
