//! Criterion benchmarks for exploration and routing.
//!
//! Run with:
//!   cargo bench
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use micromouse::prelude::*;

/// A single corridor that snakes up and down every column. The far end is the goal.
fn serpentine(side: u32) -> GridMaze {
    let start = Pose::new(Coords::new(0, 0), AbsoluteDirection::North);
    let goal_y = if side % 2 == 0 { 0 } else { side - 1 };
    let mut maze = GridMaze::new(
        format!("serpentine-{side}"),
        side,
        side,
        start,
        Coords::new(side - 1, goal_y),
    )
    .unwrap();
    for x in 0..side - 1 {
        let gap = if x % 2 == 0 { side - 1 } else { 0 };
        for y in (0..side).filter(|y| *y != gap) {
            maze.set_wall(Coords::new(x, y), AbsoluteDirection::East)
                .unwrap();
        }
    }
    maze
}

/// Columns joined along the top and bottom rows and through scattered gaps,
/// so the fill has to settle competing arrivals.
fn with_loops(side: u32) -> GridMaze {
    let start = Pose::new(Coords::new(0, 0), AbsoluteDirection::North);
    let mut maze = GridMaze::new(
        format!("loops-{side}"),
        side,
        side,
        start,
        Coords::new(side - 1, side - 1),
    )
    .unwrap();
    for x in 0..side - 1 {
        for y in (1..side - 1).filter(|y| (x + y) % 3 != 0) {
            maze.set_wall(Coords::new(x, y), AbsoluteDirection::East)
                .unwrap();
        }
    }
    maze
}

fn explored(maze: GridMaze) -> Mouse<GridMaze> {
    let mut mouse = Mouse::new(maze, MouseConfig::instant()).unwrap();
    mouse.solve(&mut NoPacer::default()).unwrap();
    mouse
}

fn bench_explore(c: &mut Criterion) {
    let mut group = c.benchmark_group("explore");

    for side in [8u32, 16, 32].iter() {
        group.throughput(Throughput::Elements((*side * *side) as u64));
        group.bench_with_input(BenchmarkId::new("serpentine", side), side, |b, &side| {
            b.iter(|| {
                let mouse = explored(serpentine(side));
                black_box(mouse.stats().moves)
            });
        });
    }

    group.finish();
}

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan");

    for side in [8u32, 16].iter() {
        let far = *side as i32 - 1;
        for mode in [CostMode::Distance, CostMode::Time] {
            let id = format!("{}_{}", mode.as_str(), side);
            group.bench_function(BenchmarkId::new("serpentine", &id), |b| {
                let mut mouse = explored(serpentine(*side));
                b.iter(|| black_box(mouse.plan_route(far, 0, mode).unwrap().cost()));
            });
            group.bench_function(BenchmarkId::new("loops", &id), |b| {
                let mut mouse = explored(with_loops(*side));
                b.iter(|| black_box(mouse.plan_route(far, far, mode).unwrap().cost()));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_explore, bench_plan);
criterion_main!(benches);
