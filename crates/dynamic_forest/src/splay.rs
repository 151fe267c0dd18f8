//! Splay machinery shared by the link-cut tree variants.
//!
//! Each variant stores its nodes in an arena and implements [`SplayForest`]: node access, lazy
//! propagation (`push`), aggregate maintenance (`pull`) and `access`. Rotations, splaying and the
//! structural forest operations that never read aggregates are provided on top of that.

#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Id(u32);

impl Id {
    pub(crate) const NIL: Self = Self(u32::MAX);

    #[inline(always)]
    pub(crate) fn is_nil(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline(always)]
    pub(crate) fn idx(self) -> usize {
        self.0 as usize
    }
}

#[inline(always)]
pub(crate) fn id(v: usize) -> Id {
    debug_assert!(v < u32::MAX as usize);
    Id(v as u32)
}

/// Forest of auxiliary splay trees, one per preferred path.
///
/// `ch` orders a preferred path from the root side (left) to the leaf side (right). The parent
/// pointer of an auxiliary root is the path-parent: the vertex the top of the path hangs from.
pub(crate) trait SplayForest {
    fn ch(&self, x: Id) -> [Id; 2];
    fn ch_mut(&mut self, x: Id) -> &mut [Id; 2];
    fn par(&self, x: Id) -> Id;
    fn set_par(&mut self, x: Id, p: Id);

    /// Number of vertices in the splay subtree of `x` (`0` for `NIL`).
    fn sz(&self, x: Id) -> u32;

    fn stack(&mut self) -> &mut Vec<Id>;

    /// Propagate pending tags of `x` to its children.
    fn push(&mut self, x: Id);

    /// Recompute the aggregates of `x` from its children.
    fn pull(&mut self, x: Id);

    /// Reverse the path represented by the splay subtree of `x`.
    fn apply_rev(&mut self, x: Id);

    /// `new` has just replaced `old` as the root of an auxiliary tree whose path-parent is
    /// `par(new)`.
    #[inline(always)]
    fn replace_aux_root(&mut self, _old: Id, _new: Id) {}

    /// Make the `root -> x` path preferred and splay `x` to the root of its auxiliary tree.
    ///
    /// Returns the last vertex splayed while walking up, i.e. the vertex where the walk joined
    /// the previously preferred root path.
    fn access(&mut self, x: Id) -> Id;

    #[inline(always)]
    fn is_aux_root(&self, x: Id) -> bool {
        let p = self.par(x);
        if p.is_nil() {
            return true;
        }
        let c = self.ch(p);
        c[0] != x && c[1] != x
    }

    fn rotate(&mut self, x: Id) {
        let p = self.par(x);
        let g = self.par(p);
        let p_is_aux_root = self.is_aux_root(p);
        self.push(p);
        self.push(x);

        let dir = usize::from(self.ch(p)[1] == x);
        let b = self.ch(x)[dir ^ 1];

        if !p_is_aux_root {
            let gc = self.ch_mut(g);
            if gc[0] == p {
                gc[0] = x;
            } else if gc[1] == p {
                gc[1] = x;
            }
        }
        self.set_par(x, g);

        self.ch_mut(x)[dir ^ 1] = p;
        self.set_par(p, x);

        self.ch_mut(p)[dir] = b;
        if !b.is_nil() {
            self.set_par(b, p);
        }

        if p_is_aux_root && !g.is_nil() {
            self.replace_aux_root(p, x);
        }

        self.pull(p);
        self.pull(x);
    }

    fn push_path(&mut self, x: Id) {
        let mut stack = std::mem::take(self.stack());
        stack.clear();
        let mut y = x;
        stack.push(y);
        while !self.is_aux_root(y) {
            y = self.par(y);
            stack.push(y);
        }
        for &v in stack.iter().rev() {
            self.push(v);
        }
        *self.stack() = stack;
    }

    fn splay(&mut self, x: Id) {
        self.push_path(x);

        while !self.is_aux_root(x) {
            let p = self.par(x);
            let g = self.par(p);
            if !self.is_aux_root(p) {
                let zigzig = (self.ch(g)[0] == p) == (self.ch(p)[0] == x);
                if zigzig {
                    self.rotate(p);
                } else {
                    self.rotate(x);
                }
            }
            self.rotate(x);
        }
    }

    fn evert(&mut self, x: Id) {
        self.access(x);
        self.apply_rev(x);
        self.push(x);
    }

    fn find_root(&mut self, x: Id) -> Id {
        self.access(x);
        let mut y = x;
        self.push(y);
        while !self.ch(y)[0].is_nil() {
            y = self.ch(y)[0];
            self.push(y);
        }
        self.splay(y);
        y
    }

    fn connected(&mut self, u: Id, v: Id) -> bool {
        u == v || self.find_root(u) == self.find_root(v)
    }

    fn parent(&mut self, x: Id) -> Id {
        self.access(x);
        let mut y = self.ch(x)[0];
        if y.is_nil() {
            return Id::NIL;
        }
        self.push(y);
        while !self.ch(y)[1].is_nil() {
            y = self.ch(y)[1];
            self.push(y);
        }
        self.splay(y);
        y
    }

    /// Requires `child` and `parent` to be in different trees.
    fn link_unchecked(&mut self, child: Id, parent: Id) {
        self.evert(child);
        self.access(parent);
        debug_assert!(self.ch(parent)[1].is_nil());
        self.ch_mut(parent)[1] = child;
        self.set_par(child, parent);
        self.pull(parent);
    }

    fn cut_from_parent(&mut self, x: Id) -> bool {
        self.access(x);
        let l = self.ch(x)[0];
        if l.is_nil() {
            return false;
        }
        self.ch_mut(x)[0] = Id::NIL;
        self.set_par(l, Id::NIL);
        self.pull(x);
        true
    }

    fn depth(&mut self, x: Id) -> usize {
        self.access(x);
        self.sz(self.ch(x)[0]) as usize
    }

    /// Requires `u` and `v` to be connected.
    fn lca(&mut self, u: Id, v: Id) -> Id {
        self.access(u);
        self.access(v)
    }

    fn la(&mut self, x: Id, k: usize) -> Id {
        let d = self.depth(x);
        let target = d.saturating_sub(k);
        self.kth_in_aux(x, target)
    }

    /// `k`-th vertex (0-indexed, in path order) of the auxiliary tree rooted at `root`.
    fn kth_in_aux(&mut self, root: Id, mut k: usize) -> Id {
        debug_assert!(k < self.sz(root) as usize);
        let mut x = root;
        loop {
            self.push(x);
            let l = self.ch(x)[0];
            let lsz = self.sz(l) as usize;
            if k < lsz {
                x = l;
                continue;
            }
            if k == lsz {
                self.splay(x);
                return x;
            }
            k -= lsz + 1;
            x = self.ch(x)[1];
        }
    }
}
