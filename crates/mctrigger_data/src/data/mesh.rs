use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a mesh inside [`crate::Problem::meshes`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MeshId(pub usize);

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A regular 3D grid of `nx × ny × nz` cells.
///
/// Cells are addressed by zero-based `[i, j, k]` coordinates and linearised
/// with `x` varying slowest, matching the layout the mesh filter uses for its
/// bins.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StructuredMesh {
    pub id: MeshId,
    pub dimension: [usize; 3],
}

impl StructuredMesh {
    pub fn new(id: MeshId, dimension: [usize; 3]) -> Self {
        Self { id, dimension }
    }

    /// Total number of cells, which is also the number of mesh filter bins.
    #[must_use]
    pub fn n_cells(&self) -> usize {
        self.dimension.iter().product()
    }

    /// Maps cell coordinates to the linear mesh bin.
    ///
    /// # Panics
    /// Debug builds assert that `ijk` lies inside the grid.
    #[must_use]
    pub fn bin_index(&self, ijk: [usize; 3]) -> usize {
        let [nx, ny, nz] = self.dimension;
        debug_assert!(ijk[0] < nx && ijk[1] < ny && ijk[2] < nz, "cell {ijk:?} outside mesh");
        (ijk[0] * ny + ijk[1]) * nz + ijk[2]
    }

    /// Iterates every cell coordinate with `i` slowest and `k` fastest.
    pub fn cells(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let [nx, ny, nz] = self.dimension;
        (0..nx).flat_map(move |i| (0..ny).flat_map(move |j| (0..nz).map(move |k| [i, j, k])))
    }
}

/// Direction of a particle crossing one face of a mesh cell.
///
/// The discriminant is the bin of the surface filter.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MeshSurface {
    OutLeft = 0,
    InLeft = 1,
    OutRight = 2,
    InRight = 3,
    OutBack = 4,
    InBack = 5,
    OutFront = 6,
    InFront = 7,
    OutBottom = 8,
    InBottom = 9,
    OutTop = 10,
    InTop = 11,
}

impl MeshSurface {
    /// Number of surface filter bins: six faces, two directions each.
    pub const COUNT: usize = 12;

    /// Every crossing in surface filter bin order (left/right, back/front,
    /// bottom/top; outgoing before incoming).
    pub const ALL: [MeshSurface; Self::COUNT] = [
        MeshSurface::OutLeft,
        MeshSurface::InLeft,
        MeshSurface::OutRight,
        MeshSurface::InRight,
        MeshSurface::OutBack,
        MeshSurface::InBack,
        MeshSurface::OutFront,
        MeshSurface::InFront,
        MeshSurface::OutBottom,
        MeshSurface::InBottom,
        MeshSurface::OutTop,
        MeshSurface::InTop,
    ];

    #[must_use]
    pub fn bin(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn is_incoming(self) -> bool {
        self.bin() % 2 == 1
    }
}
