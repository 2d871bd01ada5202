//! Polar stereographic geometry
//!
//! Grids arrive as planar x/y coordinates (metres) on a polar stereographic
//! projection centred near, but not necessarily exactly on, the pole. The
//! projection distorts area away from the pole, so summing `dx²` pixel areas
//! directly would bias every volume integral. [`scale_factor`] derives the
//! per-cell area scale factor `k` of Goelzer et al. (2020); the true ground
//! area of a pixel is `dx² / k²`.
//!
//! [`PolarStereographic`] is the inverse transform from plane to geodetic
//! latitude, using the WGS84 ellipsoid and a standard parallel of 71°, the
//! usual Antarctic polar stereographic setup. The transform is undefined at
//! the pole's antipode; callers are responsible for handing in coordinates
//! from the physically correct hemisphere.

use crate::errors::SlcResult;
use crate::field::GriddedField;
use crate::validate::check_dims;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// WGS84 semi-major axis (m).
pub const WGS84_A: f64 = 6_378_137.0;

/// WGS84 first eccentricity.
pub const WGS84_E: f64 = 0.081_819_190_842_621_5;

/// Latitude of true scale (degrees, positive-pole convention).
pub const STANDARD_PARALLEL: f64 = 71.0;

/// Which pole the projection plane is tangent near.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hemisphere {
    North,
    South,
}

impl Hemisphere {
    /// +1 for the north pole, -1 for the south pole.
    pub fn sign(self) -> f64 {
        match self {
            Hemisphere::North => 1.0,
            Hemisphere::South => -1.0,
        }
    }
}

/// Inverse polar stereographic transform on the WGS84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarStereographic {
    /// Semi-major axis (m)
    a: f64,
    /// First eccentricity
    e: f64,
    /// Latitude of true scale (radians, positive-pole convention)
    lat_ts: f64,
}

impl Default for PolarStereographic {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl PolarStereographic {
    pub fn wgs84() -> Self {
        Self {
            a: WGS84_A,
            e: WGS84_E,
            lat_ts: STANDARD_PARALLEL.to_radians(),
        }
    }

    /// Geodetic latitude (degrees) of a planar point, positive-pole convention.
    ///
    /// Uses the Snyder (1987) series for the inverse, which is exact at the
    /// pole: `(0, 0)` maps to 90°. Multiply by the hemisphere sign to obtain
    /// the signed latitude.
    pub fn inverse_latitude(&self, x: f64, y: f64) -> f64 {
        let e = self.e;
        let sin_ts = self.lat_ts.sin();

        let t_c = (FRAC_PI_4 - self.lat_ts / 2.0).tan()
            / ((1.0 - e * sin_ts) / (1.0 + e * sin_ts)).powf(e / 2.0);
        let m_c = self.lat_ts.cos() / (1.0 - e * e * sin_ts * sin_ts).sqrt();

        let rho = x.hypot(y);
        let t = rho * t_c / (self.a * m_c);
        let chi = FRAC_PI_2 - 2.0 * t.atan();

        let e2 = e * e;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let e8 = e6 * e2;
        let lat = chi
            + (e2 / 2.0 + 5.0 * e4 / 24.0 + e6 / 12.0 + 13.0 * e8 / 360.0) * (2.0 * chi).sin()
            + (7.0 * e4 / 48.0 + 29.0 * e6 / 240.0 + 811.0 * e8 / 11520.0) * (4.0 * chi).sin()
            + (7.0 * e6 / 120.0 + 81.0 * e8 / 1120.0) * (6.0 * chi).sin()
            + (4279.0 * e8 / 161280.0) * (8.0 * chi).sin();

        lat.to_degrees()
    }
}

/// Area scale factor `k` for a field on a polar stereographic grid.
///
/// The x/y coordinates are recentred on their means (the origin is assumed to
/// sit near the pole if not exactly on it), inverse-projected to latitude and
/// converted via `k = 2 / (1 + sin(sign · lat))`. `k` is exactly 1 at the
/// pole and positive everywhere in the correct hemisphere.
///
/// Returns a `{y, x}` field of `k` values. Fails with a dimension error if
/// the field lacks `x`/`y` axes.
pub fn scale_factor(field: &GriddedField, hemisphere: Hemisphere) -> SlcResult<GriddedField> {
    check_dims(field, &["x", "y"])?;
    let x = field.coord("x").expect("x present after check_dims");
    let y = field.coord("y").expect("y present after check_dims");

    // centre origin on the pole if not already
    let x_mean = x.mean().unwrap_or(0.0);
    let y_mean = y.mean().unwrap_or(0.0);

    let sgn = hemisphere.sign();
    let proj = PolarStereographic::wgs84();
    let mut k = Array2::<f64>::zeros((y.len(), x.len()));
    for (j, &yj) in y.iter().enumerate() {
        for (i, &xi) in x.iter().enumerate() {
            let lat = sgn * proj.inverse_latitude(xi - x_mean, yj - y_mean);
            k[[j, i]] = 2.0 / (1.0 + (sgn * lat.to_radians()).sin());
        }
    }

    Ok(GriddedField::new(
        "k",
        &["y", "x"],
        vec![y.clone(), x.clone()],
        k.into_dyn(),
    ))
}
