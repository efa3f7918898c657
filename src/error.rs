use thiserror::Error;

use crate::component::ElementType;

/// Top-level error type for mesh component selection.
#[derive(Debug, Error)]
pub enum MeshselError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

/// Errors caused by the shape of the input selection.
///
/// Each one names a precondition the user must fix; none is retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("nothing selected")]
    NothingSelected,

    #[error("nothing under the cursor")]
    NothingPreselected,

    #[error("invalid selection, expected {expected} components but found {found}")]
    InvalidSelectionCount { expected: usize, found: usize },

    #[error("cannot infer a component type to work on, switch the selection mask to components")]
    AmbiguousGranularity,

    #[error("invalid selection, select a mesh face")]
    NoValidSeed,

    #[error("selection order tracking is disabled")]
    OrderTrackingDisabled,

    #[error("cannot combine components from different meshes")]
    MeshMismatch,

    #[error("cannot combine {found} components with {expected} components")]
    Incompatible {
        expected: ElementType,
        found: ElementType,
    },
}

/// Errors reported by mesh topology queries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("invalid element type: {0}")]
    InvalidElementType(String),

    #[error("no path found between the selected components")]
    NoPathFound,

    #[error("mesh not found")]
    MeshNotFound,

    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
}

/// Errors related to scalar parameters such as tolerances.
#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Convenience type alias for results using [`MeshselError`].
pub type Result<T> = std::result::Result<T, MeshselError>;
