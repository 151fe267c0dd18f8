use std::hint::black_box;
use std::time::{Duration, Instant};

use bench::apply_runtime_config_for_size;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use dynamic_forest::policy::VertexSumAdd;
use dynamic_forest::{
    DynamicForest, LinkCutTree, LinkCutTreeSubtree, PathOps, RootedOps, SubtreeOps,
};

mod common;

use common::{Case, ConnOp, EdgeSwap, PathOp, RootedOp, SubtreeOp};

/// Time `run` over a fresh forest built from `case`; construction is not measured.
fn time_case<F, Op, R>(iters: u64, case: &Case<Op>, mut run: R) -> Duration
where
    F: DynamicForest<Key = i64>,
    R: FnMut(&mut F, &[Op]),
{
    let mut total = Duration::ZERO;
    for _ in 0..iters {
        let mut forest = F::new(&case.values);
        for &(child, parent) in &case.edges {
            forest.link(child, parent);
        }
        let start = Instant::now();
        run(&mut forest, &case.ops);
        black_box(forest.len());
        total += start.elapsed();
    }
    total
}

fn swap_edge<F: DynamicForest>(forest: &mut F, swap: EdgeSwap) {
    forest.cut(swap.cut_u, swap.cut_v);
    forest.link(swap.child, swap.parent);
}

fn run_connectivity<F: DynamicForest>(forest: &mut F, ops: &[ConnOp]) {
    for op in ops {
        match *op {
            ConnOp::Link { child, parent } => {
                let _ = forest.link(child, parent);
            }
            ConnOp::Cut { u, v } => {
                let _ = forest.cut(u, v);
            }
            ConnOp::Connected { u, v } => {
                black_box(forest.connected(u, v));
            }
        }
    }
}

fn run_path<F>(forest: &mut F, ops: &[PathOp])
where
    F: RootedOps + PathOps<Act = i64>,
{
    for op in ops {
        match *op {
            PathOp::UpdatePath { v, delta } => forest.update_path(v, delta),
            PathOp::QueryPath { v } => {
                black_box(forest.query_path(v));
            }
            PathOp::Evert { v } => forest.evert(v),
            PathOp::Swap(swap) => swap_edge(forest, swap),
        }
    }
}

fn run_rooted<F: RootedOps>(forest: &mut F, ops: &[RootedOp]) {
    for op in ops {
        match *op {
            RootedOp::Lca { u, v } => {
                black_box(forest.lca(u, v));
            }
            RootedOp::La { v, k } => {
                black_box(forest.la(v, k));
            }
            RootedOp::Depth { v } => {
                black_box(forest.depth(v));
            }
            RootedOp::Swap(swap) => swap_edge(forest, swap),
        }
    }
}

fn run_subtree<F>(forest: &mut F, ops: &[SubtreeOp])
where
    F: SubtreeOps<Act = i64> + PathOps,
{
    for op in ops {
        match *op {
            SubtreeOp::UpdateSubtree { v, delta } => forest.update_subtree(v, delta),
            SubtreeOp::QuerySubtree { v } => {
                black_box(forest.query_subtree(v));
            }
            SubtreeOp::Evert { v } => forest.evert(v),
            SubtreeOp::Swap(swap) => swap_edge(forest, swap),
        }
    }
}

fn bench_connectivity(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_forest/connectivity");

    for &size in &common::SIZES {
        apply_runtime_config_for_size(&mut group, size);
        let case = common::generate_connectivity_case(size);

        group.bench_function(BenchmarkId::new("lct", size), |bencher| {
            bencher.iter_custom(|iters| {
                time_case::<LinkCutTree<VertexSumAdd>, _, _>(iters, &case, run_connectivity)
            })
        });
        group.bench_function(BenchmarkId::new("lct_subtree", size), |bencher| {
            bencher.iter_custom(|iters| {
                time_case::<LinkCutTreeSubtree<VertexSumAdd>, _, _>(iters, &case, run_connectivity)
            })
        });
    }

    group.finish();
}

fn bench_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_forest/path");

    for &size in &common::SIZES {
        apply_runtime_config_for_size(&mut group, size);
        let case = common::generate_path_case(size);

        group.bench_function(BenchmarkId::new("lct", size), |bencher| {
            bencher.iter_custom(|iters| {
                time_case::<LinkCutTree<VertexSumAdd>, _, _>(iters, &case, run_path)
            })
        });
        group.bench_function(BenchmarkId::new("lct_subtree", size), |bencher| {
            bencher.iter_custom(|iters| {
                time_case::<LinkCutTreeSubtree<VertexSumAdd>, _, _>(iters, &case, run_path)
            })
        });
    }

    group.finish();
}

fn bench_rooted(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_forest/rooted");

    for &size in &common::SIZES {
        apply_runtime_config_for_size(&mut group, size);
        let case = common::generate_rooted_case(size);

        group.bench_function(BenchmarkId::new("lct", size), |bencher| {
            bencher.iter_custom(|iters| {
                time_case::<LinkCutTree<VertexSumAdd>, _, _>(iters, &case, run_rooted)
            })
        });
    }

    group.finish();
}

fn bench_subtree(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_forest/subtree");

    for &size in &common::SIZES {
        apply_runtime_config_for_size(&mut group, size);
        let case = common::generate_subtree_case(size);

        group.bench_function(BenchmarkId::new("lct_subtree", size), |bencher| {
            bencher.iter_custom(|iters| {
                time_case::<LinkCutTreeSubtree<VertexSumAdd>, _, _>(iters, &case, run_subtree)
            })
        });
    }

    group.finish();
}

fn bench(c: &mut Criterion) {
    bench_connectivity(c);
    bench_path(c);
    bench_rooted(c);
    bench_subtree(c);
}

criterion_group!(benches, bench);
criterion_main!(benches);
