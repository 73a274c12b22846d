use super::mesh::{MeshId, MeshSurface, StructuredMesh};
use super::trigger::Trigger;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User-facing tally identifier.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TallyId(pub u32);

impl fmt::Display for TallyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Running sums for one (filter bin, score bin) pair.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    /// Sum of per-batch scores.
    pub sum: f64,
    /// Sum of squared per-batch scores.
    pub sum_sq: f64,
}

impl Accumulator {
    pub fn new(sum: f64, sum_sq: f64) -> Self {
        Self { sum, sum_sq }
    }

    /// Folds one batch's score into the running sums.
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.sum_sq += value * value;
    }
}

/// Dense `filter bins × score bins` grid of accumulators, filter-major.
///
/// The score axis covers every nuclide: the score bin of `(nuclide, bin)`
/// is `nuclide * n_score_bins_per_nuclide + bin`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TallyResults {
    n_filter_bins: usize,
    n_score_bins: usize,
    bins: Vec<Accumulator>,
}

impl TallyResults {
    pub fn new(n_filter_bins: usize, n_score_bins: usize) -> Self {
        Self {
            n_filter_bins,
            n_score_bins,
            bins: vec![Accumulator::default(); n_filter_bins * n_score_bins],
        }
    }

    #[must_use]
    pub fn n_filter_bins(&self) -> usize {
        self.n_filter_bins
    }

    #[must_use]
    pub fn n_score_bins(&self) -> usize {
        self.n_score_bins
    }

    /// `true` when the backing storage matches the declared shape. Only a
    /// deserialised grid can fail this.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.bins.len() == self.n_filter_bins * self.n_score_bins
    }

    /// # Panics
    /// Panics if either index is out of range.
    #[must_use]
    pub fn get(&self, filter_bin: usize, score_bin: usize) -> &Accumulator {
        assert!(score_bin < self.n_score_bins, "score bin {score_bin} out of range");
        &self.bins[filter_bin * self.n_score_bins + score_bin]
    }

    /// # Panics
    /// Panics if either index is out of range.
    pub fn get_mut(&mut self, filter_bin: usize, score_bin: usize) -> &mut Accumulator {
        assert!(score_bin < self.n_score_bins, "score bin {score_bin} out of range");
        &mut self.bins[filter_bin * self.n_score_bins + score_bin]
    }
}

/// Layout of a score in the score axis.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreKind {
    Scalar,
    /// Legendre expansion (scatter-Pn, nu-scatter-Pn): one bin per order `0..=order`.
    Legendre { order: u32 },
    /// Spherical-harmonic expansion (scatter-Yn, nu-scatter-Yn, flux-Yn,
    /// total-Yn): `2n + 1` bins for each order `n` in `0..=order`.
    SphericalHarmonic { order: u32 },
    /// Net surface current over a mesh.
    Current,
}

impl ScoreKind {
    /// Number of consecutive score bins the score occupies.
    #[must_use]
    pub fn n_bins(self) -> usize {
        match self {
            ScoreKind::Scalar | ScoreKind::Current => 1,
            ScoreKind::Legendre { order } => order as usize + 1,
            ScoreKind::SphericalHarmonic { order } => (order as usize + 1).pow(2),
        }
    }

    /// Infers the layout from a score name such as `scatter-p3` or `flux-y2`.
    #[must_use]
    pub fn from_score_name(name: &str) -> Self {
        let name = name.trim().to_ascii_lowercase();
        if name == "current" {
            return ScoreKind::Current;
        }
        let order_after = |prefix: &str| -> Option<u32> {
            name.strip_prefix(prefix).and_then(|order| order.parse().ok())
        };
        for prefix in ["scatter-p", "nu-scatter-p"] {
            if let Some(order) = order_after(prefix) {
                return ScoreKind::Legendre { order };
            }
        }
        for prefix in ["scatter-y", "nu-scatter-y", "flux-y", "total-y"] {
            if let Some(order) = order_after(prefix) {
                return ScoreKind::SphericalHarmonic { order };
            }
        }
        ScoreKind::Scalar
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Score {
    pub name: String,
    pub kind: ScoreKind,
}

impl Score {
    pub fn new<S: Into<String>>(name: S, kind: ScoreKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Builds a score whose layout is inferred from its name.
    pub fn named<S: Into<String>>(name: S) -> Self {
        let name = name.into();
        let kind = ScoreKind::from_score_name(&name);
        Self { name, kind }
    }
}

/// One axis of a tally's filter bin space.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    /// One bin per cell of the referenced mesh.
    Mesh { mesh: MeshId },
    /// One bin per [`MeshSurface`] crossing direction.
    Surface,
    /// Incoming-energy groups.
    EnergyIn { n_bins: usize },
    Generic { name: String, n_bins: usize },
}

impl Filter {
    /// Bin count of this filter, or `None` when it names an unknown mesh.
    #[must_use]
    pub fn n_bins(&self, meshes: &[StructuredMesh]) -> Option<usize> {
        match self {
            Filter::Mesh { mesh } => meshes.get(mesh.0).map(StructuredMesh::n_cells),
            Filter::Surface => Some(MeshSurface::COUNT),
            Filter::EnergyIn { n_bins } | Filter::Generic { n_bins, .. } => Some(*n_bins),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TallyKind {
    #[default]
    Volume,
    SurfaceCurrent,
}

/// A user-defined quantity with its accumulated results and triggers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Tally {
    pub id: TallyId,
    #[serde(default)]
    pub kind: TallyKind,
    pub scores: Vec<Score>,
    pub n_nuclide_bins: usize,
    pub filters: Vec<Filter>,
    /// Multiplier of each filter's bin when linearising filter coordinates.
    pub stride: Vec<usize>,
    pub n_realizations: u32,
    pub results: TallyResults,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
}

impl Tally {
    /// Creates an empty tally with row-major strides (last filter fastest)
    /// and a zeroed results grid.
    pub fn new(
        id: TallyId,
        kind: TallyKind,
        scores: Vec<Score>,
        n_nuclide_bins: usize,
        filters: Vec<Filter>,
        meshes: &[StructuredMesh],
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(n_nuclide_bins > 0, "Tally {id} needs at least one nuclide bin");
        let mut counts = Vec::with_capacity(filters.len());
        for filter in &filters {
            let n = filter
                .n_bins(meshes)
                .ok_or_else(|| anyhow::anyhow!("Tally {id} references an unknown mesh"))?;
            counts.push(n);
        }
        let mut stride = vec![1; filters.len()];
        for i in (0..filters.len().saturating_sub(1)).rev() {
            stride[i] = stride[i + 1] * counts[i + 1];
        }
        let n_filter_bins = counts.iter().product::<usize>();
        let n_score_bins: usize = scores.iter().map(|s| s.kind.n_bins()).sum();
        Ok(Self {
            id,
            kind,
            scores,
            n_nuclide_bins,
            filters,
            stride,
            n_realizations: 0,
            results: TallyResults::new(n_filter_bins, n_score_bins * n_nuclide_bins),
            triggers: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    /// Score bins of one nuclide.
    #[must_use]
    pub fn n_score_bins(&self) -> usize {
        self.scores.iter().map(|s| s.kind.n_bins()).sum()
    }

    /// First score bin (within nuclide 0) of `scores[score_index]`.
    ///
    /// # Panics
    /// Panics if `score_index` is out of range.
    #[must_use]
    pub fn score_bin_offset(&self, score_index: usize) -> usize {
        self.scores[..score_index].iter().map(|s| s.kind.n_bins()).sum()
    }

    #[must_use]
    pub fn n_filter_bins(&self) -> usize {
        self.results.n_filter_bins()
    }

    /// Linear filter bin of per-filter coordinates.
    #[must_use]
    pub fn filter_index(&self, bins: &[usize]) -> usize {
        bins.iter().zip(&self.stride).map(|(b, s)| b * s).sum()
    }

    /// Position and mesh of the first mesh filter.
    #[must_use]
    pub fn mesh_filter(&self) -> Option<(usize, MeshId)> {
        self.filters.iter().enumerate().find_map(|(i, f)| match f {
            Filter::Mesh { mesh } => Some((i, *mesh)),
            _ => None,
        })
    }

    #[must_use]
    pub fn surface_filter(&self) -> Option<usize> {
        self.filters.iter().position(|f| matches!(f, Filter::Surface))
    }

    /// Position and bin count of the incoming-energy filter.
    #[must_use]
    pub fn energy_in_filter(&self) -> Option<(usize, usize)> {
        self.filters.iter().enumerate().find_map(|(i, f)| match f {
            Filter::EnergyIn { n_bins } => Some((i, *n_bins)),
            _ => None,
        })
    }
}
