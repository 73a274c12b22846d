use super::mesh::{MeshId, StructuredMesh};
use super::tally::{ScoreKind, Tally, TallyId, TallyKind};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    FixedSource,
    /// Criticality run producing a k-effective estimate.
    Eigenvalue,
}

/// Running combined k-effective estimate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct EigenvalueState {
    pub mean: f64,
    pub std_dev: f64,
}

/// Everything the trigger engine reads after a batch: tallies, the meshes
/// they reference by [`MeshId`], and the eigenvalue estimate.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Problem {
    #[serde(default)]
    pub meshes: Vec<StructuredMesh>,
    #[serde(default)]
    pub tallies: Vec<Tally>,
    #[serde(default)]
    pub eigenvalue: Option<EigenvalueState>,
}

impl Problem {
    #[must_use]
    pub fn mesh(&self, id: MeshId) -> Option<&StructuredMesh> {
        self.meshes.get(id.0)
    }

    #[must_use]
    pub fn tally(&self, id: TallyId) -> Option<&Tally> {
        self.tallies.iter().find(|t| t.id == id)
    }

    /// Checks the structural invariants the trigger engine indexes by.
    ///
    /// # Validation Rules
    /// - Mesh ids match their position in `meshes`
    /// - Tally ids are unique
    /// - Stride has one entry per filter and every filter resolves its bins
    /// - The results grid matches the filter and score layout
    /// - Trigger score indices are in range and thresholds are positive
    /// - Surface current tallies carry a mesh filter and a surface filter
    pub fn validate(&self) -> anyhow::Result<()> {
        for (i, mesh) in self.meshes.iter().enumerate() {
            anyhow::ensure!(mesh.id.0 == i, "Mesh at position {i} has id {}", mesh.id);
            anyhow::ensure!(mesh.n_cells() > 0, "Mesh {} has no cells", mesh.id);
        }

        let mut seen = std::collections::HashSet::new();
        for tally in &self.tallies {
            let id = tally.id;
            anyhow::ensure!(seen.insert(id), "Duplicate tally id {id}");
            anyhow::ensure!(tally.n_nuclide_bins > 0, "Tally {id} has no nuclide bins");
            for score in &tally.scores {
                let inferred = ScoreKind::from_score_name(&score.name);
                if matches!(
                    inferred,
                    ScoreKind::Legendre { .. } | ScoreKind::SphericalHarmonic { .. }
                ) {
                    anyhow::ensure!(
                        score.kind == inferred,
                        "Tally {id} score '{}' is laid out as {:?}, its name implies {:?}",
                        score.name,
                        score.kind,
                        inferred
                    );
                }
            }
            anyhow::ensure!(
                tally.stride.len() == tally.filters.len(),
                "Tally {id} has {} strides for {} filters",
                tally.stride.len(),
                tally.filters.len()
            );

            let mut n_filter_bins = 1;
            let mut max_index = 0;
            for (filter, stride) in tally.filters.iter().zip(&tally.stride) {
                let n = filter
                    .n_bins(&self.meshes)
                    .ok_or_else(|| anyhow::anyhow!("Tally {id} references an unknown mesh"))?;
                anyhow::ensure!(n > 0, "Tally {id} has an empty filter");
                n_filter_bins *= n;
                max_index += (n - 1) * stride;
            }
            anyhow::ensure!(
                tally.results.is_consistent(),
                "Tally {id} results storage does not match its shape"
            );
            anyhow::ensure!(
                tally.results.n_filter_bins() == n_filter_bins,
                "Tally {id} has {} filter bins, filters describe {n_filter_bins}",
                tally.results.n_filter_bins()
            );
            anyhow::ensure!(
                max_index < n_filter_bins,
                "Tally {id} strides address bin {max_index} beyond {n_filter_bins} filter bins"
            );
            anyhow::ensure!(
                tally.results.n_score_bins() == tally.n_score_bins() * tally.n_nuclide_bins,
                "Tally {id} has {} score bins, scores describe {}",
                tally.results.n_score_bins(),
                tally.n_score_bins() * tally.n_nuclide_bins
            );

            for trigger in &tally.triggers {
                anyhow::ensure!(
                    trigger.score_index < tally.scores.len(),
                    "Tally {id} trigger watches score {} of {}",
                    trigger.score_index,
                    tally.scores.len()
                );
                anyhow::ensure!(
                    trigger.threshold.is_finite() && trigger.threshold > 0.0,
                    "Tally {id} trigger threshold must be positive"
                );
            }

            if tally.kind == TallyKind::SurfaceCurrent {
                anyhow::ensure!(
                    tally.mesh_filter().is_some(),
                    "Surface current tally {id} needs a mesh filter"
                );
                anyhow::ensure!(
                    tally.surface_filter().is_some(),
                    "Surface current tally {id} needs a surface filter"
                );
            }
        }
        Ok(())
    }
}
