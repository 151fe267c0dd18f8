use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const SIZES: [usize; 4] = [1_024, 4_096, 16_384, 65_536];
pub const OPS_PER_SIZE: usize = 5_000;
pub const VALUE_RANGE: std::ops::RangeInclusive<i64> = -1_000_000_000..=1_000_000_000;
pub const DELTA_RANGE: std::ops::RangeInclusive<i64> = -1_000..=1_000;

const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

fn mix_seed(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn rng_for(kind: u64, size: usize) -> StdRng {
    let seed = 0xF0_2E57
        ^ (kind.wrapping_mul(SEED_MIX))
        ^ (size as u64).wrapping_mul(SEED_MIX.rotate_left(17));
    StdRng::seed_from_u64(mix_seed(seed))
}

fn generate_values(rng: &mut impl Rng, n: usize) -> Vec<i64> {
    (0..n).map(|_| rng.random_range(VALUE_RANGE)).collect()
}

/// `(child, parent)` pairs of a random recursive tree rooted at `0`.
fn generate_random_tree_edges(rng: &mut impl Rng, n: usize) -> Vec<(usize, usize)> {
    (1..n).map(|i| (i, rng.random_range(0..i))).collect()
}

#[derive(Clone, Copy, Debug)]
pub enum ConnOp {
    Link { child: usize, parent: usize },
    Cut { u: usize, v: usize },
    Connected { u: usize, v: usize },
}

/// Replace one tree edge by another edge between the two halves.
#[derive(Clone, Copy, Debug)]
pub struct EdgeSwap {
    pub cut_u: usize,
    pub cut_v: usize,
    pub child: usize,
    pub parent: usize,
}

#[derive(Clone, Copy, Debug)]
pub enum PathOp {
    UpdatePath { v: usize, delta: i64 },
    QueryPath { v: usize },
    Evert { v: usize },
    Swap(EdgeSwap),
}

#[derive(Clone, Copy, Debug)]
pub enum RootedOp {
    Lca { u: usize, v: usize },
    La { v: usize, k: usize },
    Depth { v: usize },
    Swap(EdgeSwap),
}

#[derive(Clone, Copy, Debug)]
pub enum SubtreeOp {
    UpdateSubtree { v: usize, delta: i64 },
    QuerySubtree { v: usize },
    Evert { v: usize },
    Swap(EdgeSwap),
}

#[derive(Clone, Debug)]
pub struct Case<Op> {
    pub values: Vec<i64>,
    pub edges: Vec<(usize, usize)>,
    pub ops: Vec<Op>,
}

/// Unrooted forest with component lists, used to keep every generated operation valid.
struct ForestState {
    n: usize,
    adj: Vec<Vec<usize>>,
    comp_id: Vec<usize>,
    comps: Vec<Vec<usize>>,
    edges: Vec<(usize, usize)>,
    mark: Vec<u32>,
    mark_gen: u32,
    comp_cnt: usize,
}

impl ForestState {
    fn new(n: usize) -> Self {
        Self {
            n,
            adj: vec![Vec::new(); n],
            comp_id: (0..n).collect(),
            comps: (0..n).map(|i| vec![i]).collect(),
            edges: Vec::new(),
            mark: vec![0; n],
            mark_gen: 1,
            comp_cnt: n,
        }
    }

    fn with_random_tree(rng: &mut impl Rng, n: usize) -> Self {
        let mut state = Self::new(n);
        for (child, parent) in generate_random_tree_edges(rng, n) {
            state.link(child, parent);
        }
        state
    }

    fn remove_adj_one(vec: &mut Vec<usize>, x: usize) {
        if let Some(pos) = vec.iter().position(|&y| y == x) {
            vec.swap_remove(pos);
        } else {
            debug_assert!(false, "edge not found in adjacency");
        }
    }

    fn link(&mut self, u: usize, v: usize) {
        debug_assert!(self.comp_id[u] != self.comp_id[v]);
        self.adj[u].push(v);
        self.adj[v].push(u);
        self.edges.push((u, v));
        let mut a = self.comp_id[u];
        let mut b = self.comp_id[v];
        if self.comps[a].len() < self.comps[b].len() {
            std::mem::swap(&mut a, &mut b);
        }
        let moved = std::mem::take(&mut self.comps[b]);
        for x in moved {
            self.comp_id[x] = a;
            self.comps[a].push(x);
        }
        self.comp_cnt -= 1;
    }

    fn mark_component(&mut self, start: usize) -> u32 {
        let tag = self.mark_gen;
        self.mark_gen = self.mark_gen.wrapping_add(1);
        let mut q = VecDeque::new();
        q.push_back(start);
        self.mark[start] = tag;
        while let Some(v) = q.pop_front() {
            for &to in &self.adj[v] {
                if self.mark[to] != tag {
                    self.mark[to] = tag;
                    q.push_back(to);
                }
            }
        }
        tag
    }

    fn cut_by_index(&mut self, idx: usize) -> (usize, usize) {
        let (u, v) = self.edges.swap_remove(idx);
        let old = self.comp_id[u];
        Self::remove_adj_one(&mut self.adj[u], v);
        Self::remove_adj_one(&mut self.adj[v], u);

        let tag = self.mark_component(u);
        let (a, b): (Vec<_>, Vec<_>) = std::mem::take(&mut self.comps[old])
            .into_iter()
            .partition(|&x| self.mark[x] == tag);
        debug_assert!(!a.is_empty() && !b.is_empty());

        self.comps[old] = a;
        let new_id = self.comps.len();
        for &x in &b {
            self.comp_id[x] = new_id;
        }
        self.comps.push(b);
        self.comp_cnt += 1;

        (u, v)
    }

    fn random_vertex_in_comp(&self, rng: &mut impl Rng, comp: usize) -> usize {
        let list = &self.comps[comp];
        list[rng.random_range(0..list.len())]
    }

    fn pick_two_components(&self, rng: &mut impl Rng) -> Option<(usize, usize)> {
        if self.comp_cnt <= 1 {
            return None;
        }
        let ca = self.comp_id[rng.random_range(0..self.n)];
        for _ in 0..100 {
            let cb = self.comp_id[rng.random_range(0..self.n)];
            if ca != cb {
                return Some((ca, cb));
            }
        }
        (0..self.n)
            .map(|b| self.comp_id[b])
            .find(|&cb| cb != ca)
            .map(|cb| (ca, cb))
    }

    fn random_edge_swap(&mut self, rng: &mut impl Rng) -> EdgeSwap {
        let idx = rng.random_range(0..self.edges.len());
        let (cut_u, cut_v) = self.cut_by_index(idx);
        let child = self.random_vertex_in_comp(rng, self.comp_id[cut_u]);
        let parent = self.random_vertex_in_comp(rng, self.comp_id[cut_v]);
        self.link(child, parent);
        EdgeSwap {
            cut_u,
            cut_v,
            child,
            parent,
        }
    }
}

pub fn generate_connectivity_case(n: usize) -> Case<ConnOp> {
    let mut rng = rng_for(1, n);
    let values = vec![0_i64; n];
    let mut state = ForestState::with_random_tree(&mut rng, n);
    for _ in 0..n / 4 {
        let idx = rng.random_range(0..state.edges.len());
        state.cut_by_index(idx);
    }
    let edges = state.edges.clone();

    let mut ops = Vec::with_capacity(OPS_PER_SIZE);
    for _ in 0..OPS_PER_SIZE {
        let roll = rng.random_range(0..100_u32);
        let u = rng.random_range(0..n);
        let v = rng.random_range(0..n);
        if roll < 50 {
            ops.push(ConnOp::Connected { u, v });
        } else if roll < 75 {
            match state.pick_two_components(&mut rng) {
                Some((ca, cb)) => {
                    let child = state.random_vertex_in_comp(&mut rng, ca);
                    let parent = state.random_vertex_in_comp(&mut rng, cb);
                    state.link(child, parent);
                    ops.push(ConnOp::Link { child, parent });
                }
                None => ops.push(ConnOp::Connected { u, v }),
            }
        } else if state.edges.is_empty() {
            ops.push(ConnOp::Connected { u, v });
        } else {
            let idx = rng.random_range(0..state.edges.len());
            let (u, v) = state.cut_by_index(idx);
            ops.push(ConnOp::Cut { u, v });
        }
    }

    Case { values, edges, ops }
}

pub fn generate_path_case(n: usize) -> Case<PathOp> {
    let mut rng = rng_for(2, n);
    let values = generate_values(&mut rng, n);
    let mut state = ForestState::with_random_tree(&mut rng, n);
    let edges = state.edges.clone();

    let mut ops = Vec::with_capacity(OPS_PER_SIZE);
    for _ in 0..OPS_PER_SIZE {
        let roll = rng.random_range(0..100_u32);
        let v = rng.random_range(0..n);
        let op = if roll < 30 {
            let delta = rng.random_range(DELTA_RANGE);
            PathOp::UpdatePath { v, delta }
        } else if roll < 70 {
            PathOp::QueryPath { v }
        } else if roll < 80 {
            PathOp::Evert { v }
        } else {
            PathOp::Swap(state.random_edge_swap(&mut rng))
        };
        ops.push(op);
    }

    Case { values, edges, ops }
}

pub fn generate_rooted_case(n: usize) -> Case<RootedOp> {
    let mut rng = rng_for(3, n);
    let values = vec![0_i64; n];
    let mut state = ForestState::with_random_tree(&mut rng, n);
    let edges = state.edges.clone();

    let mut ops = Vec::with_capacity(OPS_PER_SIZE);
    for _ in 0..OPS_PER_SIZE {
        let roll = rng.random_range(0..100_u32);
        let u = rng.random_range(0..n);
        let v = rng.random_range(0..n);
        let op = if roll < 40 {
            RootedOp::Lca { u, v }
        } else if roll < 70 {
            let k = rng.random_range(0..n);
            RootedOp::La { v, k }
        } else if roll < 85 {
            RootedOp::Depth { v }
        } else {
            RootedOp::Swap(state.random_edge_swap(&mut rng))
        };
        ops.push(op);
    }

    Case { values, edges, ops }
}

pub fn generate_subtree_case(n: usize) -> Case<SubtreeOp> {
    let mut rng = rng_for(4, n);
    let values = generate_values(&mut rng, n);
    let mut state = ForestState::with_random_tree(&mut rng, n);
    let edges = state.edges.clone();

    let mut ops = Vec::with_capacity(OPS_PER_SIZE);
    for _ in 0..OPS_PER_SIZE {
        let roll = rng.random_range(0..100_u32);
        let v = rng.random_range(0..n);
        let op = if roll < 30 {
            let delta = rng.random_range(DELTA_RANGE);
            SubtreeOp::UpdateSubtree { v, delta }
        } else if roll < 60 {
            SubtreeOp::QuerySubtree { v }
        } else if roll < 70 {
            SubtreeOp::Evert { v }
        } else {
            SubtreeOp::Swap(state.random_edge_swap(&mut rng))
        };
        ops.push(op);
    }

    Case { values, edges, ops }
}
