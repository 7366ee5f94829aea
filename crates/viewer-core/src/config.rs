/// Run-time settings read by the web front-end.
///
/// Element ids refer to `index.html`; the popup ids are created by the
/// front-end itself when it installs the overlay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewerConfig {
    pub canvas_id: String,
    pub progress_id: String,
    pub popup_id: String,
    pub popup_close_id: String,
    pub model_base: String,
    pub model_file: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            canvas_id: "app-canvas".to_string(),
            progress_id: "progress-container".to_string(),
            popup_id: "popup-overlay".to_string(),
            popup_close_id: "close-popup".to_string(),
            model_base: "public/fwog/".to_string(),
            model_file: "lowpolytree.gltf".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Apply optional overrides; `None` or blank values keep the current setting.
    pub fn with_model_overrides(mut self, base: Option<String>, file: Option<String>) -> Self {
        if let Some(base) = base.filter(|b| !b.trim().is_empty()) {
            self.model_base = base;
        }
        if let Some(file) = file.filter(|f| !f.trim().is_empty()) {
            self.model_file = file;
        }
        self
    }

    /// URL of the model document.
    pub fn model_url(&self) -> String {
        self.resolve(&self.model_file)
    }

    /// Resolve a URI found inside the model document against the model base path.
    pub fn resolve(&self, uri: &str) -> String {
        if self.model_base.is_empty() || self.model_base.ends_with('/') {
            format!("{}{}", self.model_base, uri)
        } else {
            format!("{}/{}", self.model_base, uri)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_url_matches_public_asset() {
        assert_eq!(
            ViewerConfig::default().model_url(),
            "public/fwog/lowpolytree.gltf"
        );
    }

    #[test]
    fn overrides_ignore_blank_values() {
        let cfg = ViewerConfig::default()
            .with_model_overrides(Some("assets".into()), Some("  ".into()));
        assert_eq!(cfg.model_base, "assets");
        assert_eq!(cfg.model_file, "lowpolytree.gltf");
        assert_eq!(cfg.resolve("scene.bin"), "assets/scene.bin");
    }
}
