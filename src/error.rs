use thiserror::Error;

use crate::component::BuildState;

/// Top-level error type for the mcgeom CSG kernel.
#[derive(Debug, Error)]
pub enum McgeomError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Component(#[from] ComponentError),
}

/// Errors related to primitive surface construction.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to region expressions and their templates.
#[derive(Debug, Error)]
pub enum RegionError {
    #[error("malformed region expression: {0}")]
    Malformed(String),

    #[error("union with an empty region would be universally true")]
    EmptyUnion,

    #[error("unknown placeholder '{0}' in composite template")]
    UnknownPlaceholder(String),
}

/// Errors related to the surface and cell registries.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown surface handle {0}")]
    UnknownHandle(i64),

    #[error("unknown cell id {0}")]
    UnknownCell(i64),

    #[error("block size must be positive, got {0}")]
    InvalidBlockSize(i64),

    #[error("index space exhausted reserving {requested} ids")]
    AllocationExhausted { requested: i64 },

    #[error("index block [{base}, {end}) exhausted")]
    BlockExhausted { base: i64, end: i64 },

    #[error("component has no recorded exterior")]
    MissingExterior,

    #[error("an exterior region must contain at least one literal")]
    EmptyExterior,
}

/// Errors related to attachment frames and their link points.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("link point index {index} out of range (frame has {len})")]
    LinkIndexOutOfRange { index: usize, len: usize },
}

/// Errors related to component bookkeeping and build ordering.
#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("component not found in store")]
    UnknownComponent,

    #[error("component '{component}': expected state {expected}, found {actual}")]
    OutOfOrder {
        component: String,
        expected: BuildState,
        actual: BuildState,
    },

    #[error("component '{component}' lacks the '{capability}' capability")]
    MissingCapability {
        component: String,
        capability: &'static str,
    },
}

/// Convenience type alias for results using [`McgeomError`].
pub type Result<T> = std::result::Result<T, McgeomError>;
