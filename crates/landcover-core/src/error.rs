use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("invalid geometry: polygon has {0} vertices, at least 3 required")]
    InvalidGeometry(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("no drawing in progress")]
    NotDrawing,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("invalid date {input:?}: {reason}")]
    Invalid { input: String, reason: String },
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error(transparent)]
    Date(#[from] DateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
