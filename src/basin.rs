//! Per-basin aggregation
//!
//! A basin mask is an integer-valued `{x, y}` grid whose distinct values
//! partition the domain into drainage basins. [`timeseries_by_basin`] reduces
//! a spatial SLC field to one time series per basin; the sorted distinct mask
//! values become the `basin` coordinate of the output, with no external basin
//! registry consulted.

use crate::errors::{SlcError, SlcResult};
use crate::field::GriddedField;
use crate::validate::{check_alignment, check_dims};
use log::debug;
use ndarray::{Array1, Array2, Axis, Zip};
use std::collections::BTreeSet;

/// An integer basin mask over `{x, y}`.
#[derive(Debug, Clone, PartialEq)]
pub struct BasinMask {
    field: GriddedField,
    ids: Vec<i64>,
}

impl BasinMask {
    /// Wrap a gridded field as a basin mask.
    ///
    /// Fails if the field lacks `x`/`y` axes or contains a non-integral
    /// value; a mask that does not hold whole basin identifiers is a broken
    /// input, not something to truncate quietly.
    pub fn new(field: GriddedField) -> SlcResult<Self> {
        check_dims(&field, &["x", "y"])?;
        let mut ids = BTreeSet::new();
        for &v in field.values() {
            if v.fract() != 0.0 {
                return Err(SlcError::NonIntegralMask {
                    field: field.name().to_string(),
                    value: v,
                });
            }
            ids.insert(v as i64);
        }
        let ids: Vec<i64> = ids.into_iter().collect();
        debug!("basin mask '{}' has basins {:?}", field.name(), ids);
        Ok(Self { field, ids })
    }

    pub fn field(&self) -> &GriddedField {
        &self.field
    }

    /// Distinct basin identifiers, ascending.
    pub fn basin_ids(&self) -> &[i64] {
        &self.ids
    }
}

/// Reduce a `{x, y, time}` field to one time series per basin.
///
/// For each basin identifier, cells outside the basin are excluded and the
/// rest are summed over the spatial axes at every time step. The output is a
/// `{time, basin}` field whose `basin` coordinates are the mask's distinct
/// values in ascending order.
pub fn timeseries_by_basin(field: &GriddedField, mask: &BasinMask) -> SlcResult<GriddedField> {
    check_dims(mask.field(), &["x", "y"])?;
    check_dims(field, &["x", "y", "time"])?;
    check_alignment(&field.index_axis("time", 0), mask.field())?;

    let time_axis = field.dim_index("time").expect("time present after check_dims");
    let time = field.coord("time").expect("time present after check_dims").clone();
    let ids = mask.basin_ids();

    let mut out = Array2::<f64>::zeros((time.len(), ids.len()));
    for t in 0..time.len() {
        let slice = field.values().index_axis(Axis(time_axis), t);
        for (b, &id) in ids.iter().enumerate() {
            let id = id as f64;
            let mut total = 0.0;
            Zip::from(&slice)
                .and(mask.field().values())
                .for_each(|&v, &m| {
                    if m == id {
                        total += v;
                    }
                });
            out[[t, b]] = total;
        }
    }

    let basin_coords: Array1<f64> = ids.iter().map(|&id| id as f64).collect();
    Ok(GriddedField::new(
        field.name(),
        &["time", "basin"],
        vec![time, basin_coords],
        out.into_dyn(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;
    use ndarray::{Array, Array1, Array3};

    fn coords(n: usize) -> Array1<f64> {
        Array::from_iter((0..n).map(|i| i as f64 * 1000.0))
    }

    /// 4x4 mask: left half basin 1, right half basin 2.
    fn half_mask() -> BasinMask {
        let mut values = Array::from_elem((4, 4), 1.0);
        for j in 0..4 {
            for i in 2..4 {
                values[[j, i]] = 2.0;
            }
        }
        BasinMask::new(GriddedField::new(
            "basin",
            &["y", "x"],
            vec![coords(4), coords(4)],
            values.into_dyn(),
        ))
        .unwrap()
    }

    fn synthetic_field() -> GriddedField {
        // value = t * 100 + j * 10 + i, easy to sum by hand
        let mut values = Array3::<f64>::zeros((2, 4, 4));
        for t in 0..2 {
            for j in 0..4 {
                for i in 0..4 {
                    values[[t, j, i]] = (t * 100 + j * 10 + i) as f64;
                }
            }
        }
        GriddedField::new(
            "slc",
            &["time", "y", "x"],
            vec![Array::from_iter([0.0, 1.0]), coords(4), coords(4)],
            values.into_dyn(),
        )
    }

    #[test]
    fn two_basin_half_grid_sums() {
        let ts = timeseries_by_basin(&synthetic_field(), &half_mask()).unwrap();
        assert_eq!(ts.dims(), &["time".to_string(), "basin".to_string()]);
        assert_eq!(ts.coord("basin").unwrap(), &Array::from_iter([1.0, 2.0]));

        // left half at t=0: sum over i in {0,1}, j in 0..4 of j*10 + i
        let left: f64 = (0..4).flat_map(|j| (0..2).map(move |i| (j * 10 + i) as f64)).sum();
        let right: f64 = (0..4).flat_map(|j| (2..4).map(move |i| (j * 10 + i) as f64)).sum();
        assert_eq!(ts.values()[[0, 0]], left);
        assert_eq!(ts.values()[[0, 1]], right);
        // t=1 adds 100 per cell, 8 cells per half
        assert_eq!(ts.values()[[1, 0]], left + 800.0);
        assert_eq!(ts.values()[[1, 1]], right + 800.0);
    }

    #[test]
    fn basin_partition_is_complete() {
        let field = synthetic_field();
        let per_basin = timeseries_by_basin(&field, &half_mask()).unwrap();
        let whole = field.sum_over(&["x", "y"]);
        for t in 0..2 {
            let split: f64 = (0..2).map(|b| per_basin.values()[[t, b]]).sum();
            assert!(is_close!(split, whole.values()[[t]]));
        }
    }

    #[test]
    fn mask_ids_sorted_ascending() {
        let mut values = Array::from_elem((4, 4), 7.0);
        values[[0, 0]] = 0.0;
        values[[3, 3]] = 3.0;
        let mask = BasinMask::new(GriddedField::new(
            "basin",
            &["y", "x"],
            vec![coords(4), coords(4)],
            values.into_dyn(),
        ))
        .unwrap();
        assert_eq!(mask.basin_ids(), &[0, 3, 7]);
    }

    #[test]
    fn non_integral_mask_rejected() {
        let mut values = Array::from_elem((4, 4), 1.0);
        values[[1, 1]] = 1.5;
        let err = BasinMask::new(GriddedField::new(
            "basin",
            &["y", "x"],
            vec![coords(4), coords(4)],
            values.into_dyn(),
        ))
        .unwrap_err();
        assert!(matches!(err, SlcError::NonIntegralMask { .. }));
    }

    #[test]
    fn misaligned_mask_rejected() {
        let mask = BasinMask::new(GriddedField::new(
            "basin",
            &["y", "x"],
            vec![coords(4), Array::from_iter((0..4).map(|i| i as f64 * 2000.0))],
            Array::from_elem((4, 4), 1.0).into_dyn(),
        ))
        .unwrap();
        let err = timeseries_by_basin(&synthetic_field(), &mask).unwrap_err();
        assert!(matches!(err, SlcError::CoordinateMismatch { .. }));
    }

    #[test]
    fn field_without_time_rejected() {
        let field = synthetic_field().index_axis("time", 0);
        let err = timeseries_by_basin(&field, &half_mask()).unwrap_err();
        assert!(matches!(err, SlcError::MissingDimension { .. }));
    }
}
