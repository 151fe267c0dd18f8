use crate::policy::{LazyMapMonoid, VertexSumAdd};
use crate::splay::{Id, SplayForest, id};
use crate::traits::{DynamicForest, PathOps, RootedOps, VertexOps};

#[derive(Clone, Copy, Debug)]
struct Node<P: LazyMapMonoid> {
    ch: [Id; 2],
    p: Id,
    rev: bool,

    key: P::Key,
    agg: P::Agg,
    agg_rev: P::Agg,
    sz: u32,

    lazy: P::Act,
    lazy_pending: bool,
}

impl<P: LazyMapMonoid> Node<P> {
    fn new(key: P::Key) -> Self {
        let agg = P::agg_from_key(&key);
        Self {
            ch: [Id::NIL, Id::NIL],
            p: Id::NIL,
            rev: false,
            key,
            agg,
            agg_rev: agg,
            sz: 1,
            lazy: P::act_unit(),
            lazy_pending: false,
        }
    }
}

/// Link-Cut Tree (splay-based) with path aggregation.
///
/// Generic over a `LazyMapMonoid` policy. Every tree keeps a represented root; `query_path` and
/// `update_path` act on the `root -> v` path, `evert` changes the root.
pub struct LinkCutTree<P: LazyMapMonoid = VertexSumAdd> {
    nodes: Vec<Node<P>>,
    stack: Vec<Id>,
}

impl<P: LazyMapMonoid> LinkCutTree<P> {
    pub fn new(values: &[P::Key]) -> Self {
        let mut tree = Self::with_capacity(values.len());
        for &v in values {
            tree.add_vertex(v);
        }
        tree
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(n),
            stack: Vec::with_capacity(n),
        }
    }

    /// Create an isolated vertex holding `key` and return its handle.
    pub fn add_vertex(&mut self, key: P::Key) -> usize {
        debug_assert!(self.nodes.len() < u32::MAX as usize);
        self.nodes.push(Node::new(key));
        self.nodes.len() - 1
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline(always)]
    fn node(&self, x: Id) -> &Node<P> {
        debug_assert!(!x.is_nil());
        debug_assert!(x.idx() < self.nodes.len());
        if cfg!(debug_assertions) {
            &self.nodes[x.idx()]
        } else {
            // SAFETY: `Id` values are only created from valid indices and `NIL` is checked.
            unsafe { self.nodes.get_unchecked(x.idx()) }
        }
    }

    #[inline(always)]
    fn node_mut(&mut self, x: Id) -> &mut Node<P> {
        debug_assert!(!x.is_nil());
        debug_assert!(x.idx() < self.nodes.len());
        if cfg!(debug_assertions) {
            &mut self.nodes[x.idx()]
        } else {
            // SAFETY: `Id` values are only created from valid indices and `NIL` is checked.
            unsafe { self.nodes.get_unchecked_mut(x.idx()) }
        }
    }

    #[inline(always)]
    fn agg(&self, x: Id) -> P::Agg {
        if x.is_nil() {
            P::agg_unit()
        } else {
            self.node(x).agg
        }
    }

    #[inline(always)]
    fn agg_rev(&self, x: Id) -> P::Agg {
        if x.is_nil() {
            P::agg_unit()
        } else {
            self.node(x).agg_rev
        }
    }

    fn apply_act(&mut self, x: Id, act: P::Act) {
        if x.is_nil() {
            return;
        }
        let sz = self.node(x).sz as usize;
        let nx = self.node_mut(x);
        nx.key = P::act_apply_key(&nx.key, &act);
        let new_agg = P::act_apply_agg(&nx.agg, &act, sz);
        nx.agg = new_agg;
        if P::REVERSAL_INVARIANT {
            nx.agg_rev = new_agg;
        } else {
            nx.agg_rev = P::act_apply_agg(&nx.agg_rev, &act, sz);
        }
        if nx.lazy_pending {
            nx.lazy = P::act_compose(&act, &nx.lazy);
        } else {
            nx.lazy = act;
            nx.lazy_pending = true;
        }
    }

    /// Make the `root -> v` path preferred.
    ///
    /// Returns the vertex where the walk joined the previously exposed root path; exposing `u`
    /// and then `v` returns their LCA.
    pub fn expose(&mut self, v: usize) -> usize {
        debug_assert!(v < self.len());
        self.access(id(v)).idx()
    }

    /// Make `v` the root of its tree.
    pub fn evert(&mut self, v: usize) {
        debug_assert!(v < self.len());
        SplayForest::evert(self, id(v));
    }

    pub fn find_root(&mut self, v: usize) -> usize {
        debug_assert!(v < self.len());
        SplayForest::find_root(self, id(v)).idx()
    }

    /// Whether `u` and `v` are in the same tree. Does not change any root.
    pub fn connected(&mut self, u: usize, v: usize) -> bool {
        debug_assert!(u < self.len() && v < self.len());
        SplayForest::connected(self, id(u), id(v))
    }

    pub fn parent(&mut self, v: usize) -> Option<usize> {
        debug_assert!(v < self.len());
        let p = SplayForest::parent(self, id(v));
        (!p.is_nil()).then(|| p.idx())
    }

    /// Attach the tree of `child`, rerooted at `child`, below `parent`.
    ///
    /// `child` and `parent` must be in different trees; otherwise the forest is corrupted.
    pub fn link_unchecked(&mut self, child: usize, parent: usize) {
        debug_assert!(child < self.len() && parent < self.len());
        SplayForest::link_unchecked(self, id(child), id(parent));
    }

    /// Attach the tree of `child`, rerooted at `child`, below `parent`.
    ///
    /// Returns `false` and leaves the forest untouched if they are already connected.
    pub fn link(&mut self, child: usize, parent: usize) -> bool {
        debug_assert!(child < self.len() && parent < self.len());
        if self.connected(child, parent) {
            return false;
        }
        self.link_unchecked(child, parent);
        true
    }

    /// Remove the edge between `v` and its parent. Returns `false` if `v` is a root.
    pub fn cut_from_parent(&mut self, v: usize) -> bool {
        debug_assert!(v < self.len());
        SplayForest::cut_from_parent(self, id(v))
    }

    pub fn cut(&mut self, u: usize, v: usize) -> bool {
        debug_assert!(u < self.len() && v < self.len());
        if u == v {
            return false;
        }
        if self.parent(u) == Some(v) {
            return self.cut_from_parent(u);
        }
        if self.parent(v) == Some(u) {
            return self.cut_from_parent(v);
        }
        false
    }

    /// Number of edges between `v` and its root.
    pub fn depth(&mut self, v: usize) -> usize {
        debug_assert!(v < self.len());
        SplayForest::depth(self, id(v))
    }

    pub fn lca(&mut self, u: usize, v: usize) -> Option<usize> {
        debug_assert!(u < self.len() && v < self.len());
        if !self.connected(u, v) {
            return None;
        }
        Some(SplayForest::lca(self, id(u), id(v)).idx())
    }

    pub fn dist(&mut self, u: usize, v: usize) -> Option<usize> {
        let w = self.lca(u, v)?;
        let dw = self.depth(w);
        Some(self.depth(u) + self.depth(v) - 2 * dw)
    }

    /// Ancestor `k` steps above `v`; the root if `k >= depth(v)`.
    pub fn la(&mut self, v: usize, k: usize) -> usize {
        debug_assert!(v < self.len());
        SplayForest::la(self, id(v), k).idx()
    }

    pub fn vertex_get(&mut self, v: usize) -> P::Key {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        self.push(x);
        self.node(x).key
    }

    pub fn vertex_set(&mut self, v: usize, key: P::Key) {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        self.push(x);
        self.node_mut(x).key = key;
        self.pull(x);
    }

    pub fn vertex_apply(&mut self, v: usize, act: P::Act) {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        self.push(x);
        let key = self.node(x).key;
        self.node_mut(x).key = P::act_apply_key(&key, &act);
        self.pull(x);
    }

    /// Fold of the `root -> v` path, in path order.
    pub fn query_path(&mut self, v: usize) -> P::Agg {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        self.node(x).agg
    }

    /// Apply `act` to every vertex on the `root - v` path.
    pub fn update_path(&mut self, v: usize, act: P::Act) {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        self.apply_act(x, act);
    }

    /// First vertex `w` on the `root -> v` path with `pred(fold(root ..= w))`.
    ///
    /// `pred` must be monotone along the path: once true, true for every longer prefix.
    pub fn bisect_from_root<F>(&mut self, v: usize, mut pred: F) -> Option<usize>
    where
        F: FnMut(&P::Agg) -> bool,
    {
        debug_assert!(v < self.len());
        let mut x = id(v);
        self.access(x);
        let mut acc = P::agg_unit();
        loop {
            self.push(x);
            let [l, r] = self.node(x).ch;
            if !l.is_nil() {
                let with_left = P::agg_concat(&acc, &self.node(l).agg);
                if pred(&with_left) {
                    x = l;
                    continue;
                }
                acc = with_left;
            }
            acc = P::agg_merge(&acc, &self.node(x).key, &P::agg_unit());
            if pred(&acc) {
                self.splay(x);
                return Some(x.idx());
            }
            if r.is_nil() {
                self.splay(x);
                return None;
            }
            x = r;
        }
    }

    /// Fold of the `u -> v` path. Reroots the tree at `u`.
    pub fn path_fold(&mut self, u: usize, v: usize) -> Option<P::Agg> {
        debug_assert!(u < self.len() && v < self.len());
        if u == v {
            self.evert(u);
            let key = self.vertex_get(u);
            return Some(P::agg_from_key(&key));
        }
        let u_id = id(u);
        let v_id = id(v);
        self.evert(u);
        self.access(v_id);
        if self.node(u_id).p.is_nil() {
            return None;
        }
        Some(self.node(v_id).agg)
    }

    /// Apply `act` to every vertex of the `u - v` path. Reroots the tree at `u`.
    pub fn path_apply(&mut self, u: usize, v: usize, act: P::Act) -> bool {
        debug_assert!(u < self.len() && v < self.len());
        if u == v {
            self.evert(u);
            self.vertex_apply(u, act);
            return true;
        }
        let u_id = id(u);
        let v_id = id(v);
        self.evert(u);
        self.access(v_id);
        if self.node(u_id).p.is_nil() {
            return false;
        }
        self.apply_act(v_id, act);
        true
    }

    /// Number of vertices on the `u - v` path. Reroots the tree at `u`.
    pub fn path_len(&mut self, u: usize, v: usize) -> Option<usize> {
        debug_assert!(u < self.len() && v < self.len());
        if u == v {
            self.evert(u);
            return Some(1);
        }
        let u_id = id(u);
        let v_id = id(v);
        self.evert(u);
        self.access(v_id);
        if self.node(u_id).p.is_nil() {
            return None;
        }
        Some(self.node(v_id).sz as usize)
    }

    /// `k`-th vertex (0-indexed from `u`) of the `u - v` path. Does not change any root.
    pub fn path_kth(&mut self, u: usize, v: usize, k: usize) -> Option<usize> {
        let w = self.lca(u, v)?;
        let dw = self.depth(w);
        let du = self.depth(u) - dw;
        let dv = self.depth(v) - dw;
        if k <= du {
            Some(self.la(u, k))
        } else if k <= du + dv {
            Some(self.la(v, du + dv - k))
        } else {
            None
        }
    }
}

impl<P: LazyMapMonoid> SplayForest for LinkCutTree<P> {
    #[inline(always)]
    fn ch(&self, x: Id) -> [Id; 2] {
        self.node(x).ch
    }

    #[inline(always)]
    fn ch_mut(&mut self, x: Id) -> &mut [Id; 2] {
        &mut self.node_mut(x).ch
    }

    #[inline(always)]
    fn par(&self, x: Id) -> Id {
        self.node(x).p
    }

    #[inline(always)]
    fn set_par(&mut self, x: Id, p: Id) {
        self.node_mut(x).p = p;
    }

    #[inline(always)]
    fn sz(&self, x: Id) -> u32 {
        if x.is_nil() { 0 } else { self.node(x).sz }
    }

    #[inline(always)]
    fn stack(&mut self) -> &mut Vec<Id> {
        &mut self.stack
    }

    fn push(&mut self, x: Id) {
        if x.is_nil() {
            return;
        }

        let (rev, lazy_pending, lazy, l, r) = {
            let nx = self.node(x);
            (nx.rev, nx.lazy_pending, nx.lazy, nx.ch[0], nx.ch[1])
        };

        if rev {
            self.apply_rev(l);
            self.apply_rev(r);
            self.node_mut(x).rev = false;
        }

        if lazy_pending {
            self.apply_act(l, lazy);
            self.apply_act(r, lazy);
            let nx = self.node_mut(x);
            nx.lazy = P::act_unit();
            nx.lazy_pending = false;
        }
    }

    fn pull(&mut self, x: Id) {
        if x.is_nil() {
            return;
        }
        let (l, r, key) = {
            let nx = self.node(x);
            (nx.ch[0], nx.ch[1], nx.key)
        };
        let sz = 1_u32.wrapping_add(self.sz(l)).wrapping_add(self.sz(r));
        let agg = P::agg_merge(&self.agg(l), &key, &self.agg(r));
        let agg_rev = if P::REVERSAL_INVARIANT {
            agg
        } else {
            P::agg_merge(&self.agg_rev(r), &key, &self.agg_rev(l))
        };
        let nx = self.node_mut(x);
        nx.sz = sz;
        nx.agg = agg;
        nx.agg_rev = agg_rev;
    }

    fn apply_rev(&mut self, x: Id) {
        if x.is_nil() {
            return;
        }
        let nx = self.node_mut(x);
        nx.ch.swap(0, 1);
        if !P::REVERSAL_INVARIANT {
            std::mem::swap(&mut nx.agg, &mut nx.agg_rev);
        }
        nx.rev ^= true;
    }

    fn access(&mut self, x: Id) -> Id {
        let mut last = Id::NIL;
        let mut y = x;
        while !y.is_nil() {
            self.splay(y);
            self.node_mut(y).ch[1] = last;
            if !last.is_nil() {
                self.node_mut(last).p = y;
            }
            self.pull(y);
            last = y;
            y = self.node(y).p;
        }
        self.splay(x);
        last
    }
}

impl LinkCutTree<VertexSumAdd> {
    pub fn vertex_add(&mut self, v: usize, delta: i64) {
        self.vertex_apply(v, delta);
    }

    pub fn path_sum(&mut self, u: usize, v: usize) -> Option<i64> {
        self.path_fold(u, v)
    }
}

impl<P: LazyMapMonoid> DynamicForest for LinkCutTree<P> {
    type Key = P::Key;

    fn new(values: &[Self::Key]) -> Self {
        Self::new(values)
    }

    fn len(&self) -> usize {
        self.len()
    }

    fn add_vertex(&mut self, key: Self::Key) -> usize {
        self.add_vertex(key)
    }

    fn link(&mut self, child: usize, parent: usize) -> bool {
        self.link(child, parent)
    }

    fn cut(&mut self, u: usize, v: usize) -> bool {
        self.cut(u, v)
    }

    fn connected(&mut self, u: usize, v: usize) -> bool {
        self.connected(u, v)
    }
}

impl<P: LazyMapMonoid> VertexOps for LinkCutTree<P> {
    type Act = P::Act;

    fn vertex_get(&mut self, v: usize) -> Self::Key {
        self.vertex_get(v)
    }

    fn vertex_set(&mut self, v: usize, key: Self::Key) {
        self.vertex_set(v, key)
    }

    fn vertex_apply(&mut self, v: usize, act: Self::Act) {
        self.vertex_apply(v, act)
    }
}

impl<P: LazyMapMonoid> PathOps for LinkCutTree<P> {
    type Agg = P::Agg;
    type Act = P::Act;

    fn evert(&mut self, v: usize) {
        self.evert(v)
    }

    fn find_root(&mut self, v: usize) -> usize {
        self.find_root(v)
    }

    fn path_fold(&mut self, u: usize, v: usize) -> Option<Self::Agg> {
        self.path_fold(u, v)
    }

    fn path_apply(&mut self, u: usize, v: usize, act: Self::Act) -> bool {
        self.path_apply(u, v, act)
    }

    fn path_len(&mut self, u: usize, v: usize) -> Option<usize> {
        self.path_len(u, v)
    }

    fn path_kth(&mut self, u: usize, v: usize, k: usize) -> Option<usize> {
        self.path_kth(u, v, k)
    }
}

impl<P: LazyMapMonoid> RootedOps for LinkCutTree<P> {
    fn parent(&mut self, v: usize) -> Option<usize> {
        self.parent(v)
    }

    fn depth(&mut self, v: usize) -> usize {
        self.depth(v)
    }

    fn lca(&mut self, u: usize, v: usize) -> Option<usize> {
        self.lca(u, v)
    }

    fn dist(&mut self, u: usize, v: usize) -> Option<usize> {
        self.dist(u, v)
    }

    fn la(&mut self, v: usize, k: usize) -> usize {
        self.la(v, k)
    }

    fn query_path(&mut self, v: usize) -> Self::Agg {
        self.query_path(v)
    }

    fn update_path(&mut self, v: usize, act: Self::Act) {
        self.update_path(v, act)
    }
}
