pub mod animator;
pub mod camera;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod gltf;
pub mod interaction;
pub mod picking;
pub mod popup;
pub mod ray;
pub mod registry;
pub mod resize;
pub mod scene;

pub use animator::ScaleAnimator;
pub use camera::{pointer_to_ndc, OrbitControls, PerspectiveCamera};
pub use config::ViewerConfig;
pub use controller::{LoadState, SceneController};
pub use error::LoadError;
pub use gltf::{BufferSource, GltfDocument, ModelFile};
pub use interaction::{CursorStyle, InteractionController, Popup};
pub use picking::{resolve, PickHit};
pub use popup::{popup_markup, popup_stylesheet};
pub use registry::PickTargetRegistry;
pub use resize::compute_target_scale;
pub use scene::{Aabb, MeshData, MeshId, NodeId, Primitive, SceneGraph, SceneNode};
