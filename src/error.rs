use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine is not ready: the candidate index has not been built")]
    NotReady,

    #[error("engine is already initialized")]
    AlreadyInitialized,

    #[error("unsupported grid size {size} (expected 3 or 4)")]
    UnsupportedGridSize { size: usize },

    #[error("unable to generate a {size}x{size} grid with the required intersections")]
    InfeasibleGrid { size: usize },

    #[error("unable to fill a board of {cells} cells")]
    InfeasibleBoard { cells: usize },

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("snapshot store error: {0}")]
    Snapshot(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn malformed(message: impl Into<String>) -> Self {
        EngineError::MalformedRequest(message.into())
    }

    /// Stable machine-readable code, used by the worker protocols.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::NotReady => "not_ready",
            EngineError::AlreadyInitialized => "already_initialized",
            EngineError::UnsupportedGridSize { .. } => "unsupported_grid_size",
            EngineError::InfeasibleGrid { .. } => "infeasible_grid",
            EngineError::InfeasibleBoard { .. } => "infeasible_board",
            EngineError::MalformedRequest(_) => "malformed_request",
            EngineError::Snapshot(_) => "snapshot",
            EngineError::Json(_) => "json",
            EngineError::Io(_) => "io",
        }
    }
}
