//! Physical constants for the sea level calculation
//!
//! The densities and ocean area are conventional values rather than universal
//! constants, so they live in an explicit configuration structure instead of
//! being buried in the computation. The defaults reproduce Goelzer et al.
//! (2020): ice 918, seawater 1028 and freshwater 1000 kg m⁻³, and the
//! Gregory et al. (2019) ocean surface area of 3.625e14 m².

use crate::errors::{SlcError, SlcResult};
use crate::projection::Hemisphere;
use serde::{Deserialize, Serialize};

/// Configuration for the SLC engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlcConfig {
    /// Density of ice (kg m⁻³)
    pub ice_density: f64,
    /// Density of seawater (kg m⁻³)
    pub ocean_density: f64,
    /// Density of freshwater (kg m⁻³)
    pub freshwater_density: f64,
    /// Surface area of the ocean (m²)
    pub ocean_area: f64,
    /// Hemisphere of the polar stereographic grid
    pub hemisphere: Hemisphere,
}

impl Default for SlcConfig {
    fn default() -> Self {
        Self {
            ice_density: 918.0,
            ocean_density: 1028.0,
            freshwater_density: 1000.0,
            ocean_area: 3.625e14,
            hemisphere: Hemisphere::South,
        }
    }
}

impl SlcConfig {
    /// Parse a configuration from TOML, defaulting any omitted field.
    pub fn from_toml_str(s: &str) -> SlcResult<Self> {
        toml::from_str(s).map_err(|e| SlcError::Error(e.to_string()))
    }
}
