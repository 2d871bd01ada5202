use thiserror::Error;

/// Error type for invalid operations.
///
/// Every failure is raised at the point of violation and propagated uncaught;
/// there is no retry or recovery path anywhere in the crate. Proceeding with
/// misaligned grids would produce physically meaningless results, so the
/// diagnostics carry enough context (field names, dimension lists, coordinate
/// ranges) for the caller to locate the offending inputs without re-reading
/// the raw data.
#[derive(Error, Debug)]
pub enum SlcError {
    #[error("{0}")]
    Error(String),
    #[error("{field} requires dimensions {required:?} but has dimensions {actual:?}")]
    MissingDimension {
        field: String,
        required: Vec<String>,
        actual: Vec<String>,
    },
    #[error("{a} and {b} have different dimensions: {a_dims:?} and {b_dims:?}")]
    DimensionSetMismatch {
        a: String,
        b: String,
        a_dims: Vec<String>,
        b_dims: Vec<String>,
    },
    #[error("{a} and {b} have different shapes: {a_shape:?} and {b_shape:?}")]
    ShapeMismatch {
        a: String,
        b: String,
        a_shape: Vec<usize>,
        b_shape: Vec<usize>,
    },
    #[error("{a} and {b} do not align along axis {axis}. {a}: {a_min} to {a_max}. {b}: {b_min} to {b_max}")]
    CoordinateMismatch {
        axis: String,
        a: String,
        a_min: f64,
        a_max: f64,
        b: String,
        b_min: f64,
        b_max: f64,
    },
    #[error("mismatched number of thickness ({thickness}) and bed elevation ({bed_elevation}) files")]
    CountMismatch {
        thickness: usize,
        bed_elevation: usize,
    },
    #[error("variable '{name}' not found in dataset")]
    VariableNotFound { name: String },
    #[error("alias '{alias}' is claimed by both '{first}' and '{second}'")]
    AmbiguousAlias {
        alias: String,
        first: String,
        second: String,
    },
    #[error("basin mask '{field}' contains non-integral value {value}")]
    NonIntegralMask { field: String, value: f64 },
}

/// Convenience type for `Result<T, SlcError>`.
pub type SlcResult<T> = Result<T, SlcError>;
