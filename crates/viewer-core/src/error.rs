use thiserror::Error;

/// Reasons a model document could not be turned into a scene.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid glTF json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{kind} index {index} out of range")]
    MissingReference { kind: &'static str, index: usize },
    #[error("buffer {index} has {actual} bytes, expected at least {expected}")]
    ShortBuffer {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("buffer {index} has no uri and the file carries no binary chunk")]
    MissingBinaryChunk { index: usize },
    #[error("buffer {index}: bad data uri ({reason})")]
    DataUri { index: usize, reason: String },
    #[error("invalid GLB container: {0}")]
    Glb(&'static str),
    #[error("accessor {index}: unsupported {what}")]
    UnsupportedAccessor { index: usize, what: String },
    #[error("mesh {mesh} primitive {primitive} has no POSITION attribute")]
    MissingPositions { mesh: usize, primitive: usize },
    #[error("accessor {index} reads past the end of buffer view {view}")]
    AccessorOutOfBounds { index: usize, view: usize },
}
