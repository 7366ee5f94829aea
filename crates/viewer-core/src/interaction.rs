use crate::constants::POPUP_PLACEHOLDER_TEXT;
use crate::picking::PickHit;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Popup {
    #[default]
    Hidden,
    Shown(String),
}

impl Popup {
    pub fn is_shown(&self) -> bool {
        matches!(self, Popup::Shown(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Popup::Shown(t) => Some(t),
            Popup::Hidden => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorStyle {
    Pointer,
    Default,
}

impl CursorStyle {
    pub fn as_css(self) -> &'static str {
        match self {
            CursorStyle::Pointer => "pointer",
            CursorStyle::Default => "default",
        }
    }
}

/// Popup visibility driven by pick results and the close control.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
    popup: Popup,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn popup(&self) -> &Popup {
        &self.popup
    }

    /// Hovering never changes popup state, only the cursor.
    pub fn pointer_move(&self, hit: Option<&PickHit>) -> CursorStyle {
        if hit.is_some() {
            CursorStyle::Pointer
        } else {
            CursorStyle::Default
        }
    }

    /// Show the popup when the click landed on a target. Returns whether it did.
    ///
    /// The text is the same for every target.
    pub fn click(&mut self, hit: Option<&PickHit>) -> bool {
        let Some(hit) = hit else {
            return false;
        };
        log::debug!("[click] popup for {}", hit.name);
        self.popup = Popup::Shown(POPUP_PLACEHOLDER_TEXT.to_string());
        true
    }

    pub fn close(&mut self) {
        self.popup = Popup::Hidden;
    }
}
