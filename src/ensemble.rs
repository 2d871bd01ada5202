//! Ensemble driver
//!
//! Walks matched directories of thickness and bed elevation files, one file
//! per model run, and assembles a single sea level contribution series per
//! run. Pairing is purely by lexicographic sort order within each directory;
//! it is the caller's responsibility to name files so that the sort is
//! meaningful. Any failing run aborts the whole ensemble; no partial output
//! is produced.

use crate::basin::{timeseries_by_basin, BasinMask};
use crate::config::SlcConfig;
use crate::dataset::DatasetStore;
use crate::errors::{SlcError, SlcResult};
use crate::field::{concat_new_axis, GriddedField};
use crate::naming::NameNormalizer;
use crate::slc::compute_slc;
use log::info;
use ndarray::Array1;
use std::path::Path;

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Compute the sea level contribution of every run in an ensemble.
///
/// Lists the two directories through the store, pairs files by sort order,
/// normalizes names, extracts the `thickness` and `Z_base` variables and
/// runs the SLC engine per pair. With a basin mask the per-run series is
/// resolved by basin (`{run, time, basin}`); without one the grid is summed
/// over space (`{run, time}`). The `run` coordinate is 1-based in processed
/// order.
///
/// Fails before any computation if the directories hold different numbers of
/// files; the mask is re-loaded each iteration, matching the reference
/// behaviour.
pub fn run_ensemble<S: DatasetStore>(
    store: &S,
    thickness_dir: &Path,
    bed_elevation_dir: &Path,
    basin_mask: Option<&Path>,
    config: &SlcConfig,
) -> SlcResult<GriddedField> {
    let thickness_files = store.list(thickness_dir)?;
    let bed_files = store.list(bed_elevation_dir)?;

    if thickness_files.len() != bed_files.len() {
        return Err(SlcError::CountMismatch {
            thickness: thickness_files.len(),
            bed_elevation: bed_files.len(),
        });
    }

    let normalizer = NameNormalizer::default();
    let mut series = Vec::with_capacity(thickness_files.len());
    for (thickness_file, bed_file) in thickness_files.iter().zip(&bed_files) {
        info!(
            "{:<60} {}",
            display_name(thickness_file),
            display_name(bed_file)
        );

        let mut thickness_ds = store.open(thickness_file)?;
        normalizer.normalize(&mut thickness_ds);
        let thickness = thickness_ds.extract("thickness")?;

        let mut bed_ds = store.open(bed_file)?;
        normalizer.normalize(&mut bed_ds);
        let bed = bed_ds.extract("Z_base")?;

        let slc_grid = compute_slc(&thickness, &bed, config)?;

        let run_series = match basin_mask {
            Some(mask_path) => {
                let mut mask_ds = store.open(mask_path)?;
                normalizer.normalize(&mut mask_ds);
                let mask = BasinMask::new(mask_ds.extract("basin")?)?;
                timeseries_by_basin(&slc_grid, &mask)?
            }
            None => slc_grid.sum_over(&["x", "y"]),
        };
        series.push(run_series);
    }

    let run_labels: Array1<f64> = (1..=series.len()).map(|r| r as f64).collect();
    concat_new_axis("run", run_labels, &series)
}
