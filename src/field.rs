//! Labeled n-dimensional grids
//!
//! [`GriddedField`] is the in-memory value type flowing through the whole
//! pipeline: an [`ArrayD<f64>`] of values together with named axes and one
//! coordinate array per axis. Axis names are drawn from `x`, `y`, `time`,
//! `basin` and `run`.
//!
//! The constructor enforces that the value shape and the coordinate lengths
//! agree, so downstream code can index by axis name without re-checking.
//! Compatibility *between* fields is a separate concern, handled by
//! [`crate::validate::check_alignment`] before any two fields are combined.

use crate::errors::{SlcError, SlcResult};
use crate::validate::check_alignment;
use ndarray::{Array1, Array2, ArrayD, ArrayViewD, Axis, Ix2, IxDyn};
use serde::{Deserialize, Serialize};

/// A labeled multi-dimensional numeric array over named axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GriddedField {
    name: String,
    dims: Vec<String>,
    coords: Vec<Array1<f64>>,
    values: ArrayD<f64>,
}

impl GriddedField {
    /// Create a new field from named axes, coordinates and values.
    ///
    /// # Panics
    ///
    /// Panics if the number of axis names, coordinate arrays and value
    /// dimensions disagree, if any coordinate length does not match the value
    /// shape along its axis, or if an axis name is repeated.
    pub fn new(name: &str, dims: &[&str], coords: Vec<Array1<f64>>, values: ArrayD<f64>) -> Self {
        assert_eq!(
            dims.len(),
            coords.len(),
            "{}: {} axis names but {} coordinate arrays",
            name,
            dims.len(),
            coords.len()
        );
        assert_eq!(
            dims.len(),
            values.ndim(),
            "{}: {} axis names but values have {} dimensions",
            name,
            dims.len(),
            values.ndim()
        );
        for (i, coord) in coords.iter().enumerate() {
            assert_eq!(
                coord.len(),
                values.shape()[i],
                "{}: axis {} has {} coordinates but {} values",
                name,
                dims[i],
                coord.len(),
                values.shape()[i]
            );
        }
        for (i, dim) in dims.iter().enumerate() {
            assert!(!dims[..i].contains(dim), "{}: duplicate axis {}", name, dim);
        }
        Self {
            name: name.to_string(),
            dims: dims.iter().map(|d| d.to_string()).collect(),
            coords,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Rename an axis, leaving the field untouched if the axis is absent.
    pub fn rename_dim(&mut self, from: &str, to: &str) {
        if let Some(i) = self.dim_index(from) {
            self.dims[i] = to.to_string();
        }
    }

    /// Axis names in storage order.
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    pub fn has_dim(&self, dim: &str) -> bool {
        self.dims.iter().any(|d| d == dim)
    }

    pub fn dim_index(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    /// Coordinate values along a named axis.
    pub fn coord(&self, dim: &str) -> Option<&Array1<f64>> {
        self.dim_index(dim).map(|i| &self.coords[i])
    }

    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    /// A copy with every NaN value replaced by `fill`.
    pub fn filled_nan(&self, fill: f64) -> Self {
        Self {
            name: self.name.clone(),
            dims: self.dims.clone(),
            coords: self.coords.clone(),
            values: self.values.mapv(|v| if v.is_nan() { fill } else { v }),
        }
    }

    /// Select a single index along a named axis, dropping that axis.
    ///
    /// # Panics
    ///
    /// Panics if the axis is absent or the index is out of bounds.
    pub fn index_axis(&self, dim: &str, index: usize) -> Self {
        let ax = self
            .dim_index(dim)
            .unwrap_or_else(|| panic!("{} has no axis {}", self.name, dim));
        let mut dims = self.dims.clone();
        let mut coords = self.coords.clone();
        dims.remove(ax);
        coords.remove(ax);
        Self {
            name: self.name.clone(),
            dims,
            coords,
            values: self.values.index_axis(Axis(ax), index).to_owned(),
        }
    }

    /// A copy with axes permuted into the requested name order.
    ///
    /// # Panics
    ///
    /// Panics if `order` is not a permutation of this field's axes.
    pub fn transposed(&self, order: &[&str]) -> Self {
        assert_eq!(
            order.len(),
            self.dims.len(),
            "{}: transpose order {:?} does not cover axes {:?}",
            self.name,
            order,
            self.dims
        );
        let perm: Vec<usize> = order
            .iter()
            .map(|dim| {
                self.dim_index(dim)
                    .unwrap_or_else(|| panic!("{} has no axis {}", self.name, dim))
            })
            .collect();
        let values = self
            .values
            .clone()
            .permuted_axes(IxDyn(&perm))
            .as_standard_layout()
            .to_owned();
        Self {
            name: self.name.clone(),
            dims: order.iter().map(|d| d.to_string()).collect(),
            coords: perm.iter().map(|&i| self.coords[i].clone()).collect(),
            values,
        }
    }

    /// Sum over the named axes, dropping them from the result.
    ///
    /// # Panics
    ///
    /// Panics if any named axis is absent.
    pub fn sum_over(&self, reduce: &[&str]) -> Self {
        let mut values = self.values.clone();
        let mut dims = self.dims.clone();
        let mut coords = self.coords.clone();
        for dim in reduce {
            let ax = dims
                .iter()
                .position(|d| d == dim)
                .unwrap_or_else(|| panic!("{} has no axis {}", self.name, dim));
            values = values.sum_axis(Axis(ax));
            dims.remove(ax);
            coords.remove(ax);
        }
        Self {
            name: self.name.clone(),
            dims,
            coords,
            values,
        }
    }

    /// The values as a two-dimensional array.
    ///
    /// # Panics
    ///
    /// Panics if the field is not two-dimensional.
    pub fn to_array2(&self) -> Array2<f64> {
        self.values
            .clone()
            .into_dimensionality::<Ix2>()
            .unwrap_or_else(|_| panic!("{} is not two-dimensional", self.name))
    }
}

/// Concatenate aligned fields along a new leading axis.
///
/// All fields must align exactly (same axes, shapes and coordinates); the
/// result takes its name from the first field and carries `coords` along the
/// new axis.
pub fn concat_new_axis(
    axis: &str,
    coords: Array1<f64>,
    fields: &[GriddedField],
) -> SlcResult<GriddedField> {
    let first = fields
        .first()
        .ok_or_else(|| SlcError::Error("cannot concatenate zero fields".to_string()))?;
    assert_eq!(
        coords.len(),
        fields.len(),
        "{} coordinates for {} fields",
        coords.len(),
        fields.len()
    );
    for field in &fields[1..] {
        check_alignment(first, field)?;
    }

    let views: Vec<ArrayViewD<f64>> = fields.iter().map(|f| f.values.view()).collect();
    let values =
        ndarray::stack(Axis(0), &views).map_err(|e| SlcError::Error(e.to_string()))?;

    let mut dims = vec![axis.to_string()];
    dims.extend(first.dims.iter().cloned());
    let mut out_coords = vec![coords];
    out_coords.extend(first.coords.iter().cloned());
    Ok(GriddedField {
        name: first.name.clone(),
        dims,
        coords: out_coords,
        values,
    })
}
