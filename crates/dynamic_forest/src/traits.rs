//! Trait-based API for dynamic forest operations.
//!
//! Vertices are `usize` handles in `0..len()`. Every forest is rooted: each tree has a
//! represented root that only changes through `evert` (or operations documented to reroot).

pub trait DynamicForest: Sized {
    type Key: Copy;

    fn new(values: &[Self::Key]) -> Self;
    fn len(&self) -> usize;
    #[inline(always)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create an isolated vertex and return its handle.
    fn add_vertex(&mut self, key: Self::Key) -> usize;

    /// Make `child` (rerooted at itself) a child of `parent` if they are in different trees.
    ///
    /// Returns `false` if they are already connected.
    fn link(&mut self, child: usize, parent: usize) -> bool;

    /// Cut edge `(u, v)` if it exists. The rooting of both halves is kept.
    ///
    /// Returns `false` if there is no such edge.
    fn cut(&mut self, u: usize, v: usize) -> bool;

    fn connected(&mut self, u: usize, v: usize) -> bool;
}

pub trait VertexOps: DynamicForest {
    type Act: Copy;

    fn vertex_get(&mut self, v: usize) -> Self::Key;
    fn vertex_set(&mut self, v: usize, key: Self::Key);
    fn vertex_apply(&mut self, v: usize, act: Self::Act);
}

pub trait PathOps: DynamicForest {
    type Agg: Copy;
    type Act: Copy;

    fn evert(&mut self, v: usize);
    fn find_root(&mut self, v: usize) -> usize;

    /// Fold the `u -> v` path. Reroots the tree at `u`.
    fn path_fold(&mut self, u: usize, v: usize) -> Option<Self::Agg>;
    /// Apply to every vertex of the `u - v` path. Reroots the tree at `u`.
    fn path_apply(&mut self, u: usize, v: usize, act: Self::Act) -> bool;

    fn path_len(&mut self, u: usize, v: usize) -> Option<usize>;
    fn path_kth(&mut self, u: usize, v: usize, k: usize) -> Option<usize>;
}

/// Queries relative to the current root, none of which change it.
pub trait RootedOps: PathOps {
    fn parent(&mut self, v: usize) -> Option<usize>;
    fn depth(&mut self, v: usize) -> usize;
    fn lca(&mut self, u: usize, v: usize) -> Option<usize>;
    fn dist(&mut self, u: usize, v: usize) -> Option<usize>;

    /// Ancestor `k` steps above `v`, clamped to the root.
    fn la(&mut self, v: usize, k: usize) -> usize;

    /// Fold of the `root -> v` path.
    fn query_path(&mut self, v: usize) -> Self::Agg;
    /// Apply to every vertex of the `root - v` path.
    fn update_path(&mut self, v: usize, act: <Self as PathOps>::Act);
}

pub trait ComponentOps: DynamicForest {
    type Agg: Copy;
    type Act: Copy;

    fn component_fold(&mut self, v: usize) -> Self::Agg;
    fn component_apply(&mut self, v: usize, act: Self::Act);
    fn component_size(&mut self, v: usize) -> usize;
}

pub trait SubtreeOps: DynamicForest {
    type Agg: Copy;
    type Act: Copy;

    /// Fold the subtree of `v` under the current rooting.
    fn query_subtree(&mut self, v: usize) -> Self::Agg;

    /// Apply to the subtree of `v` under the current rooting.
    fn update_subtree(&mut self, v: usize, act: Self::Act);

    fn subtree_size(&mut self, v: usize) -> usize;

    /// Fold the subtree on the `child` side of the edge `(child, parent)`.
    fn subtree_fold(&mut self, child: usize, parent: usize) -> Self::Agg;

    /// Apply to the subtree on the `child` side of the edge `(child, parent)`.
    fn subtree_apply(&mut self, child: usize, parent: usize, act: Self::Act);
}
