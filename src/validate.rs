//! Compatibility checks between gridded fields
//!
//! Fields routinely arrive with different resolutions, projections or
//! coordinate grids. Combining two such fields element-by-element would be
//! silently wrong, so [`check_alignment`] must run before any arithmetic that
//! pairs two fields. [`check_dims`] guards operations that require particular
//! axes to be present.

use crate::errors::{SlcError, SlcResult};
use crate::field::GriddedField;
use ndarray::Array1;

/// Fail unless `required` is a subset of the field's axes.
pub fn check_dims(field: &GriddedField, required: &[&str]) -> SlcResult<()> {
    if required.iter().all(|dim| field.has_dim(dim)) {
        return Ok(());
    }
    Err(SlcError::MissingDimension {
        field: field.name().to_string(),
        required: required.iter().map(|d| d.to_string()).collect(),
        actual: field.dims().to_vec(),
    })
}

/// Fail unless two fields agree in axes, shape and coordinate values.
///
/// Coordinate comparison is exact elementwise equality, not approximate: two
/// grids that differ by a rounding error did not come from the same geometry
/// and must not be combined. The coordinate diagnostic reports the min/max
/// range of each field along the offending axis.
pub fn check_alignment(a: &GriddedField, b: &GriddedField) -> SlcResult<()> {
    if a.dims() != b.dims() {
        return Err(SlcError::DimensionSetMismatch {
            a: a.name().to_string(),
            b: b.name().to_string(),
            a_dims: a.dims().to_vec(),
            b_dims: b.dims().to_vec(),
        });
    }

    if a.shape() != b.shape() {
        return Err(SlcError::ShapeMismatch {
            a: a.name().to_string(),
            b: b.name().to_string(),
            a_shape: a.shape().to_vec(),
            b_shape: b.shape().to_vec(),
        });
    }

    for dim in a.dims() {
        let ca = a.coord(dim).expect("axis present in own dims");
        let cb = b.coord(dim).expect("axis present after dims check");
        if ca != cb {
            let (a_min, a_max) = coord_range(ca);
            let (b_min, b_max) = coord_range(cb);
            return Err(SlcError::CoordinateMismatch {
                axis: dim.clone(),
                a: a.name().to_string(),
                a_min,
                a_max,
                b: b.name().to_string(),
                b_min,
                b_max,
            });
        }
    }

    Ok(())
}

fn coord_range(coord: &Array1<f64>) -> (f64, f64) {
    let min = coord.iter().copied().fold(f64::INFINITY, f64::min);
    let max = coord.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}
