pub mod macros;

use mctrigger_lib::model::data::{
    EigenvalueState, Filter, MeshId, Problem, Score, StructuredMesh, Tally, TallyId, TallyKind,
    Trigger, TriggerMetric,
};

/// Realizations every builder tally is filled with.
pub const REALIZATIONS: u32 = 4;

/// Std dev of the mean of four batches alternating `mean ± spread`.
#[allow(dead_code)]
pub fn sd(spread: f64) -> f64 {
    spread / 3.0f64.sqrt()
}

/// Overwrites one bin with four batches alternating `mean ± spread`.
#[allow(dead_code)]
pub fn fill_bin(tally: &mut Tally, filter_bin: usize, score_bin: usize, mean: f64, spread: f64) {
    let acc = tally.results.get_mut(filter_bin, score_bin);
    *acc = Default::default();
    for value in [mean - spread, mean + spread, mean - spread, mean + spread] {
        acc.add(value);
    }
}

#[allow(dead_code)]
pub struct ProblemBuilder {
    meshes: Vec<StructuredMesh>,
    tallies: Vec<Tally>,
    eigenvalue: Option<EigenvalueState>,
}

#[allow(dead_code)]
impl ProblemBuilder {
    pub fn new() -> Self {
        Self {
            meshes: Vec::new(),
            tallies: Vec::new(),
            eigenvalue: None,
        }
    }

    pub fn with_mesh(mut self, dimension: [usize; 3]) -> Self {
        let id = MeshId(self.meshes.len());
        self.meshes.push(StructuredMesh::new(id, dimension));
        self
    }

    pub fn with_eigenvalue(mut self, mean: f64, std_dev: f64) -> Self {
        self.eigenvalue = Some(EigenvalueState { mean, std_dev });
        self
    }

    /// Adds a volume tally over `n_cells` cells with every bin at mean 1 and
    /// no spread, then lets `modifier` shape it.
    pub fn with_volume_tally<F>(mut self, id: u32, scores: &[&str], n_cells: usize, modifier: F) -> Self
    where
        F: FnOnce(&mut Tally),
    {
        let mut tally = Tally::new(
            TallyId(id),
            TallyKind::Volume,
            scores.iter().map(|s| Score::named(*s)).collect(),
            1,
            vec![Filter::Generic {
                name: "cell".into(),
                n_bins: n_cells,
            }],
            &self.meshes,
        )
        .expect("volume tally");
        quiet(&mut tally);
        modifier(&mut tally);
        self.tallies.push(tally);
        self
    }

    /// Adds a surface current tally on mesh `mesh` with an optional
    /// incoming-energy filter.
    pub fn with_current_tally<F>(
        mut self,
        id: u32,
        mesh: usize,
        energy_bins: Option<usize>,
        modifier: F,
    ) -> Self
    where
        F: FnOnce(&mut Tally),
    {
        let mut filters = vec![Filter::Mesh { mesh: MeshId(mesh) }];
        if let Some(n_bins) = energy_bins {
            filters.push(Filter::EnergyIn { n_bins });
        }
        filters.push(Filter::Surface);
        let mut tally = Tally::new(
            TallyId(id),
            TallyKind::SurfaceCurrent,
            vec![Score::named("current")],
            1,
            filters,
            &self.meshes,
        )
        .expect("current tally");
        quiet(&mut tally);
        modifier(&mut tally);
        self.tallies.push(tally);
        self
    }

    pub fn build(self) -> Problem {
        let problem = Problem {
            meshes: self.meshes,
            tallies: self.tallies,
            eigenvalue: self.eigenvalue,
        };
        problem.validate().expect("builder produced an invalid problem");
        problem
    }
}

#[allow(dead_code)]
pub fn trigger(metric: TriggerMetric, threshold: f64, score_index: usize) -> Trigger {
    Trigger::new(metric, threshold, score_index)
}

fn quiet(tally: &mut Tally) {
    tally.n_realizations = REALIZATIONS;
    for f in 0..tally.n_filter_bins() {
        for s in 0..tally.results.n_score_bins() {
            fill_bin(tally, f, s, 1.0, 0.0);
        }
    }
}
