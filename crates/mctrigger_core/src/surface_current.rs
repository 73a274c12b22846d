//! Worst-case uncertainty of a mesh surface current tally.
//!
//! A current tally has one bin per (mesh cell, face crossing, energy group).
//! The scan visits every cell with `i` slowest, then every incoming-energy
//! group, then the twelve [`MeshSurface`] crossings in filter order, and
//! folds each bin into one [`Observed`] value for the watching trigger.

use crate::uncertainty::{estimate_bin, Observed};
use mctrigger_data::{MeshSurface, StructuredMesh, Tally};
use serde::{Deserialize, Serialize};

/// How the surface scan fills [`Observed::variance`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceVariancePolicy {
    /// Variance is the square of the last crossing's std dev, as the
    /// established surface-current checks report it. Differs from the
    /// running maximum used for every other tally.
    #[default]
    LatestCrossing,
    /// Variance is a running maximum, consistent with volume tallies.
    RunningMax,
}

/// Filter positions a surface current scan indexes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceLayout {
    pub mesh_filter: usize,
    pub surface_filter: usize,
    /// Position and bin count of the incoming-energy filter.
    pub energy_filter: Option<(usize, usize)>,
}

impl SurfaceLayout {
    /// `None` unless the tally has both a mesh filter and a surface filter.
    #[must_use]
    pub fn of(tally: &Tally) -> Option<Self> {
        Some(Self {
            mesh_filter: tally.mesh_filter()?.0,
            surface_filter: tally.surface_filter()?,
            energy_filter: tally.energy_in_filter(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceScan {
    pub observed: Observed,
    /// Number of bins passed to the estimator.
    pub evaluations: usize,
}

/// Scans every face-crossing bin of `mesh` for the score bin `score_bin`.
///
/// Filters other than mesh, surface and incoming energy stay at bin 0.
#[must_use]
pub fn surface_current_uncertainty(
    tally: &Tally,
    layout: SurfaceLayout,
    mesh: &StructuredMesh,
    score_bin: usize,
    policy: SurfaceVariancePolicy,
) -> SurfaceScan {
    let n = tally.n_realizations;
    let mut bins = vec![0usize; tally.filters.len()];
    let n_energy = layout.energy_filter.map_or(1, |(_, n_bins)| n_bins);
    let mut scan = SurfaceScan::default();

    for ijk in mesh.cells() {
        bins[layout.mesh_filter] = mesh.bin_index(ijk);
        for energy in 0..n_energy {
            if let Some((position, _)) = layout.energy_filter {
                bins[position] = energy;
            }
            for surface in MeshSurface::ALL {
                bins[layout.surface_filter] = surface.bin();
                let filter_index = tally.filter_index(&bins);
                let bin = estimate_bin(tally.results.get(filter_index, score_bin), n);
                scan.evaluations += 1;
                match policy {
                    SurfaceVariancePolicy::LatestCrossing => {
                        scan.observed.raise_spread(&bin);
                        scan.observed.variance = bin.variance();
                    }
                    SurfaceVariancePolicy::RunningMax => scan.observed.raise(&bin),
                }
            }
        }
    }

    tracing::trace!(
        tally = %tally.id,
        evaluations = scan.evaluations,
        std_dev = scan.observed.std_dev,
        "Surface current scan"
    );
    scan
}
