use std::marker::PhantomData;

use crate::policy::{CommutativeMonoid, VertexSumAdd};
use crate::splay::{Id, SplayForest, id};
use crate::traits::{ComponentOps, DynamicForest, PathOps, RootedOps, SubtreeOps, VertexOps};

#[derive(Clone, Copy, Debug)]
struct Node<P: CommutativeMonoid> {
    // Preferred-path splay tree. For an auxiliary root, `p` is the path-parent.
    ch: [Id; 2],
    p: Id,
    sz: u32,

    // Light splay tree of this vertex: one entry per auxiliary root hanging below it.
    light: Id,

    // Position of this node in its path-parent's light tree. Only meaningful while the node is
    // an auxiliary root with a path-parent; the light tree root has `lp == NIL`.
    lch: [Id; 2],
    lp: Id,

    key: P::Key,

    // Fold of `key` over the splay subtree.
    agg: P::Agg,

    // Fold of every light tree hanging from a vertex of the splay subtree, with its size.
    vir: P::Agg,
    vir_sz: u32,

    // Fold of the light subtree rooted here: both light children plus everything represented by
    // this node's own auxiliary tree (`agg + vir`).
    light_agg: P::Agg,
    light_sz: u32,

    // Pending action on the keys of the splay subtree (children only, `key`/`agg` are current).
    lazy_key: P::Act,
    // Pending action on the light trees hanging from the splay subtree (`vir` is current).
    lazy_vir: P::Act,
    // Pending action on the light children (`light_agg` is current).
    lazy_light: P::Act,

    rev: bool,
    lazy_key_pending: bool,
    lazy_vir_pending: bool,
    lazy_light_pending: bool,
}

impl<P: CommutativeMonoid> Node<P> {
    fn new(key: P::Key) -> Self {
        Self {
            ch: [Id::NIL, Id::NIL],
            p: Id::NIL,
            sz: 1,
            light: Id::NIL,
            lch: [Id::NIL, Id::NIL],
            lp: Id::NIL,
            key,
            agg: P::agg_from_key(&key),
            vir: P::agg_unit(),
            vir_sz: 0,
            light_agg: P::agg_unit(),
            light_sz: 0,
            lazy_key: P::act_unit(),
            lazy_vir: P::act_unit(),
            lazy_light: P::act_unit(),
            rev: false,
            lazy_key_pending: false,
            lazy_vir_pending: false,
            lazy_light_pending: false,
        }
    }
}

/// Link-Cut Tree (splay-based) that additionally supports subtree and component aggregates.
///
/// Every vertex owns a second splay tree holding its light children (the auxiliary trees that
/// hang below it). `access` moves one light child at a time in and out of these trees, so
/// `query_subtree`/`update_subtree` stay `O(log n)` amortized under arbitrary relinking.
///
/// Light children are folded in no particular order, hence the `CommutativeMonoid` bound.
pub struct LinkCutTreeSubtree<P: CommutativeMonoid = VertexSumAdd> {
    nodes: Vec<Node<P>>,
    stack: Vec<Id>,
    _marker: PhantomData<fn() -> P>,
}

impl<P: CommutativeMonoid> LinkCutTreeSubtree<P> {
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
            _marker: PhantomData,
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
    fn vir(&self, x: Id) -> (P::Agg, u32) {
        if x.is_nil() {
            (P::agg_unit(), 0)
        } else {
            let nx = self.node(x);
            (nx.vir, nx.vir_sz)
        }
    }

    /// Fold and size of everything represented by the splay subtree of `x`.
    #[inline(always)]
    fn all(&self, x: Id) -> (P::Agg, u32) {
        if x.is_nil() {
            (P::agg_unit(), 0)
        } else {
            let nx = self.node(x);
            (P::agg_concat(&nx.agg, &nx.vir), nx.sz.wrapping_add(nx.vir_sz))
        }
    }

    #[inline(always)]
    fn light_agg(&self, x: Id) -> (P::Agg, u32) {
        if x.is_nil() {
            (P::agg_unit(), 0)
        } else {
            let nx = self.node(x);
            (nx.light_agg, nx.light_sz)
        }
    }

    fn apply_key(&mut self, x: Id, act: P::Act) {
        if x.is_nil() {
            return;
        }
        let nx = self.node_mut(x);
        nx.key = P::act_apply_key(&nx.key, &act);
        nx.agg = P::act_apply_agg(&nx.agg, &act, nx.sz as usize);
        if nx.lazy_key_pending {
            nx.lazy_key = P::act_compose(&act, &nx.lazy_key);
        } else {
            nx.lazy_key = act;
            nx.lazy_key_pending = true;
        }
    }

    fn apply_vir(&mut self, x: Id, act: P::Act) {
        if x.is_nil() {
            return;
        }
        let nx = self.node_mut(x);
        nx.vir = P::act_apply_agg(&nx.vir, &act, nx.vir_sz as usize);
        if nx.lazy_vir_pending {
            nx.lazy_vir = P::act_compose(&act, &nx.lazy_vir);
        } else {
            nx.lazy_vir = act;
            nx.lazy_vir_pending = true;
        }
    }

    /// Apply `act` to the whole light subtree rooted at `x`.
    fn apply_light(&mut self, x: Id, act: P::Act) {
        if x.is_nil() {
            return;
        }
        self.apply_key(x, act);
        self.apply_vir(x, act);
        let nx = self.node_mut(x);
        nx.light_agg = P::act_apply_agg(&nx.light_agg, &act, nx.light_sz as usize);
        if nx.lazy_light_pending {
            nx.lazy_light = P::act_compose(&act, &nx.lazy_light);
        } else {
            nx.lazy_light = act;
            nx.lazy_light_pending = true;
        }
    }

    fn push_light(&mut self, x: Id) {
        if x.is_nil() {
            return;
        }
        let nx = self.node(x);
        if !nx.lazy_light_pending {
            return;
        }
        let (act, [l, r]) = (nx.lazy_light, nx.lch);
        self.apply_light(l, act);
        self.apply_light(r, act);
        let nx = self.node_mut(x);
        nx.lazy_light = P::act_unit();
        nx.lazy_light_pending = false;
    }

    fn pull_light(&mut self, x: Id) {
        let [l, r] = self.node(x).lch;
        let (l_agg, l_sz) = self.light_agg(l);
        let (r_agg, r_sz) = self.light_agg(r);
        let (x_agg, x_sz) = self.all(x);
        let nx = self.node_mut(x);
        nx.light_agg = P::agg_concat(&P::agg_concat(&l_agg, &x_agg), &r_agg);
        nx.light_sz = l_sz.wrapping_add(x_sz).wrapping_add(r_sz);
    }

    fn light_rotate(&mut self, x: Id) {
        let p = self.node(x).lp;
        let g = self.node(p).lp;
        self.push_light(p);
        self.push_light(x);

        let dir = usize::from(self.node(p).lch[1] == x);
        let b = self.node(x).lch[dir ^ 1];

        if g.is_nil() {
            let owner = self.node(p).p;
            self.node_mut(owner).light = x;
        } else {
            let gl = &mut self.node_mut(g).lch;
            if gl[0] == p {
                gl[0] = x;
            } else {
                gl[1] = x;
            }
        }
        self.node_mut(x).lp = g;

        self.node_mut(x).lch[dir ^ 1] = p;
        self.node_mut(p).lp = x;

        self.node_mut(p).lch[dir] = b;
        if !b.is_nil() {
            self.node_mut(b).lp = p;
        }

        self.pull_light(p);
        self.pull_light(x);
    }

    /// Splay `x` to the root of the light tree it belongs to.
    fn light_splay(&mut self, x: Id) {
        while !self.node(x).lp.is_nil() {
            let p = self.node(x).lp;
            let g = self.node(p).lp;
            if !g.is_nil() {
                let zigzig = (self.node(g).lch[0] == p) == (self.node(p).lch[0] == x);
                if zigzig {
                    self.light_rotate(p);
                } else {
                    self.light_rotate(x);
                }
            }
            self.light_rotate(x);
        }
    }

    /// Join two detached light trees of the same owner; every key of `a` goes left of `b`.
    fn light_join(&mut self, a: Id, b: Id) -> Id {
        if a.is_nil() {
            if !b.is_nil() {
                self.node_mut(b).lp = Id::NIL;
            }
            return b;
        }
        self.node_mut(a).lp = Id::NIL;
        if b.is_nil() {
            return a;
        }
        self.node_mut(b).lp = Id::NIL;

        let mut m = a;
        self.push_light(m);
        while !self.node(m).lch[1].is_nil() {
            m = self.node(m).lch[1];
            self.push_light(m);
        }
        self.light_splay(m);
        self.node_mut(m).lch[1] = b;
        self.node_mut(b).lp = m;
        self.pull_light(m);
        m
    }

    /// Park `c` (an auxiliary root whose path-parent is `x`) in the light tree of `x`.
    fn light_insert(&mut self, x: Id, c: Id) {
        let r = self.node(x).light;
        {
            let nc = self.node_mut(c);
            nc.lch = [r, Id::NIL];
            nc.lp = Id::NIL;
        }
        if !r.is_nil() {
            self.node_mut(r).lp = c;
        }
        self.node_mut(x).light = c;
        self.pull_light(c);
    }

    /// Remove `c`, the root of the light tree of `x`.
    fn light_erase_root(&mut self, x: Id, c: Id) {
        debug_assert_eq!(self.node(x).light, c);
        self.push_light(c);
        let [l, r] = std::mem::replace(&mut self.node_mut(c).lch, [Id::NIL, Id::NIL]);
        let root = self.light_join(l, r);
        self.node_mut(x).light = root;
    }

    /// Put `c` in place of `old`, the root of the light tree of `x`, keeping the tree's shape.
    fn light_swap_root(&mut self, x: Id, old: Id, c: Id) {
        debug_assert_eq!(self.node(x).light, old);
        self.push_light(old);
        let [l, r] = std::mem::replace(&mut self.node_mut(old).lch, [Id::NIL, Id::NIL]);
        {
            let nc = self.node_mut(c);
            nc.lch = [l, r];
            nc.lp = Id::NIL;
        }
        if !l.is_nil() {
            self.node_mut(l).lp = c;
        }
        if !r.is_nil() {
            self.node_mut(r).lp = c;
        }
        self.node_mut(x).light = c;
        self.pull_light(c);
    }

    /// Push every pending tag on the way from the top of the structure down to `x`, crossing
    /// both splay and light trees.
    fn push_chain(&mut self, x: Id) {
        let mut stack = std::mem::take(&mut self.stack);
        stack.clear();
        let mut y = x;
        stack.push(y);
        loop {
            let p = self.node(y).p;
            if p.is_nil() {
                break;
            }
            y = if !self.is_aux_root(y) {
                p
            } else {
                let lp = self.node(y).lp;
                if lp.is_nil() { p } else { lp }
            };
            stack.push(y);
        }
        for &v in stack.iter().rev() {
            self.push_light(v);
            self.push(v);
        }
        self.stack = stack;
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
        self.node(x).key
    }

    pub fn vertex_set(&mut self, v: usize, key: P::Key) {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        self.node_mut(x).key = key;
        self.pull(x);
    }

    pub fn vertex_apply(&mut self, v: usize, act: P::Act) {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        let key = self.node(x).key;
        self.node_mut(x).key = P::act_apply_key(&key, &act);
        self.pull(x);
    }

    /// Fold of the `root -> v` path.
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
        self.apply_key(x, act);
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
        self.apply_key(v_id, act);
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

    // With `x` splayed to the root of its auxiliary tree, the subtree of `x` is `x` itself, its
    // light children and the deeper part of its preferred path (the right splay child). The left
    // splay child holds the ancestors and must stay out of it.
    fn subtree_at_aux_root(&self, x: Id) -> (P::Agg, u32) {
        let nx = self.node(x);
        let (light, light_sz) = self.light_agg(nx.light);
        let (below, below_sz) = self.all(nx.ch[1]);
        let agg = P::agg_merge(&P::agg_unit(), &nx.key, &P::agg_concat(&light, &below));
        (agg, 1_u32.wrapping_add(light_sz).wrapping_add(below_sz))
    }

    fn apply_subtree_at_aux_root(&mut self, x: Id, act: P::Act) {
        let (light, below) = {
            let nx = self.node(x);
            (nx.light, nx.ch[1])
        };
        let key = self.node(x).key;
        self.node_mut(x).key = P::act_apply_key(&key, &act);
        self.apply_light(light, act);
        self.apply_key(below, act);
        self.apply_vir(below, act);
        self.pull(x);
    }

    /// Fold of the subtree of `v` under the current rooting.
    pub fn query_subtree(&mut self, v: usize) -> P::Agg {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        self.subtree_at_aux_root(x).0
    }

    /// Apply `act` to every vertex in the subtree of `v` under the current rooting.
    pub fn update_subtree(&mut self, v: usize, act: P::Act) {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        self.apply_subtree_at_aux_root(x, act);
    }

    pub fn subtree_size(&mut self, v: usize) -> usize {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        self.subtree_at_aux_root(x).1 as usize
    }

    /// Reroot at `parent` and check that `(child, parent)` is an edge.
    fn orient_edge(&mut self, child: usize, parent: usize) {
        debug_assert!(child < self.len() && parent < self.len());
        debug_assert_ne!(child, parent);
        self.evert(parent);
        debug_assert_eq!(
            self.parent(child),
            Some(parent),
            "subtree operations require an existing edge",
        );
    }

    pub fn subtree_fold(&mut self, child: usize, parent: usize) -> P::Agg {
        self.orient_edge(child, parent);
        self.query_subtree(child)
    }

    pub fn subtree_apply(&mut self, child: usize, parent: usize, act: P::Act) {
        self.orient_edge(child, parent);
        self.update_subtree(child, act);
    }

    pub fn component_fold(&mut self, v: usize) -> P::Agg {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        self.all(x).0
    }

    pub fn component_apply(&mut self, v: usize, act: P::Act) {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        self.apply_key(x, act);
        self.apply_vir(x, act);
    }

    pub fn component_size(&mut self, v: usize) -> usize {
        debug_assert!(v < self.len());
        let x = id(v);
        self.access(x);
        self.all(x).1 as usize
    }
}

impl<P: CommutativeMonoid> SplayForest for LinkCutTreeSubtree<P> {
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
        let (rev, key_pending, lazy_key, vir_pending, lazy_vir, [l, r], light) = {
            let nx = self.node(x);
            (
                nx.rev,
                nx.lazy_key_pending,
                nx.lazy_key,
                nx.lazy_vir_pending,
                nx.lazy_vir,
                nx.ch,
                nx.light,
            )
        };

        if rev {
            self.apply_rev(l);
            self.apply_rev(r);
            self.node_mut(x).rev = false;
        }

        if key_pending {
            self.apply_key(l, lazy_key);
            self.apply_key(r, lazy_key);
            let nx = self.node_mut(x);
            nx.lazy_key = P::act_unit();
            nx.lazy_key_pending = false;
        }

        if vir_pending {
            self.apply_vir(l, lazy_vir);
            self.apply_vir(r, lazy_vir);
            self.apply_light(light, lazy_vir);
            let nx = self.node_mut(x);
            nx.lazy_vir = P::act_unit();
            nx.lazy_vir_pending = false;
        }
    }

    fn pull(&mut self, x: Id) {
        if x.is_nil() {
            return;
        }
        let ([l, r], key, light) = {
            let nx = self.node(x);
            (nx.ch, nx.key, nx.light)
        };
        let sz = 1_u32.wrapping_add(self.sz(l)).wrapping_add(self.sz(r));
        let agg = P::agg_merge(&self.agg(l), &key, &self.agg(r));

        let (l_vir, l_vir_sz) = self.vir(l);
        let (r_vir, r_vir_sz) = self.vir(r);
        let (light_agg, light_sz) = self.light_agg(light);
        let vir = P::agg_concat(&P::agg_concat(&l_vir, &light_agg), &r_vir);
        let vir_sz = l_vir_sz.wrapping_add(light_sz).wrapping_add(r_vir_sz);

        let nx = self.node_mut(x);
        nx.sz = sz;
        nx.agg = agg;
        nx.vir = vir;
        nx.vir_sz = vir_sz;
    }

    fn apply_rev(&mut self, x: Id) {
        if x.is_nil() {
            return;
        }
        let nx = self.node_mut(x);
        nx.ch.swap(0, 1);
        nx.rev ^= true;
    }

    fn replace_aux_root(&mut self, old: Id, new: Id) {
        self.push_light(old);
        let (lch, lp, light_agg, light_sz) = {
            let no = self.node_mut(old);
            let lch = std::mem::replace(&mut no.lch, [Id::NIL, Id::NIL]);
            let lp = std::mem::replace(&mut no.lp, Id::NIL);
            (lch, lp, no.light_agg, no.light_sz)
        };
        {
            let nn = self.node_mut(new);
            nn.lch = lch;
            nn.lp = lp;
            nn.light_agg = light_agg;
            nn.light_sz = light_sz;
        }
        for c in lch {
            if !c.is_nil() {
                self.node_mut(c).lp = new;
            }
        }
        if lp.is_nil() {
            let owner = self.node(new).p;
            self.node_mut(owner).light = new;
        } else {
            let pl = &mut self.node_mut(lp).lch;
            if pl[0] == old {
                pl[0] = new;
            } else {
                pl[1] = new;
            }
        }
    }

    fn access(&mut self, x: Id) -> Id {
        self.push_chain(x);
        let mut last = Id::NIL;
        let mut y = x;
        while !y.is_nil() {
            self.splay(y);

            // `last` is the root of the light tree of `y`; swap it with the preferred child.
            let old = self.node(y).ch[1];
            match (old.is_nil(), last.is_nil()) {
                (true, true) => {}
                (false, true) => self.light_insert(y, old),
                (true, false) => self.light_erase_root(y, last),
                (false, false) => self.light_swap_root(y, last, old),
            }
            self.node_mut(y).ch[1] = last;
            self.pull(y);

            let next = self.node(y).p;
            if !next.is_nil() {
                self.light_splay(y);
            }
            last = y;
            y = next;
        }
        self.splay(x);
        last
    }
}

impl LinkCutTreeSubtree<VertexSumAdd> {
    pub fn vertex_add(&mut self, v: usize, delta: i64) {
        self.vertex_apply(v, delta);
    }

    pub fn path_sum(&mut self, u: usize, v: usize) -> Option<i64> {
        self.path_fold(u, v)
    }

    pub fn subtree_sum(&mut self, v: usize) -> i64 {
        self.query_subtree(v)
    }

    pub fn component_sum(&mut self, v: usize) -> i64 {
        self.component_fold(v)
    }
}

impl<P: CommutativeMonoid> DynamicForest for LinkCutTreeSubtree<P> {
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

impl<P: CommutativeMonoid> VertexOps for LinkCutTreeSubtree<P> {
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

impl<P: CommutativeMonoid> PathOps for LinkCutTreeSubtree<P> {
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

impl<P: CommutativeMonoid> RootedOps for LinkCutTreeSubtree<P> {
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

    fn update_path(&mut self, v: usize, act: <Self as PathOps>::Act) {
        self.update_path(v, act)
    }
}

impl<P: CommutativeMonoid> ComponentOps for LinkCutTreeSubtree<P> {
    type Agg = P::Agg;
    type Act = P::Act;

    fn component_fold(&mut self, v: usize) -> Self::Agg {
        self.component_fold(v)
    }

    fn component_apply(&mut self, v: usize, act: Self::Act) {
        self.component_apply(v, act)
    }

    fn component_size(&mut self, v: usize) -> usize {
        self.component_size(v)
    }
}

impl<P: CommutativeMonoid> SubtreeOps for LinkCutTreeSubtree<P> {
    type Agg = P::Agg;
    type Act = P::Act;

    fn query_subtree(&mut self, v: usize) -> Self::Agg {
        self.query_subtree(v)
    }

    fn update_subtree(&mut self, v: usize, act: Self::Act) {
        self.update_subtree(v, act)
    }

    fn subtree_size(&mut self, v: usize) -> usize {
        self.subtree_size(v)
    }

    fn subtree_fold(&mut self, child: usize, parent: usize) -> Self::Agg {
        self.subtree_fold(child, parent)
    }

    fn subtree_apply(&mut self, child: usize, parent: usize, act: Self::Act) {
        self.subtree_apply(child, parent, act)
    }
}
