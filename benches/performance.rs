// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geomesh_geodesic::{HeatGeodesicSolver, MeshGraph};
use nalgebra::Point3;

/// A regular `n x n` grid of unit quads, each split into two triangles.
fn grid_mesh(n: usize) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut positions = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            positions.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }
    let mut faces = Vec::with_capacity(2 * (n - 1) * (n - 1));
    for j in 0..n - 1 {
        for i in 0..n - 1 {
            let a = j * n + i;
            let b = j * n + i + 1;
            let c = (j + 1) * n + i + 1;
            let d = (j + 1) * n + i;
            faces.push([a, b, c]);
            faces.push([a, c, d]);
        }
    }
    (positions, faces)
}

fn bench_mesh_graph_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh_graph_build");

    for n in [8usize, 16, 32] {
        let (positions, faces) = grid_mesh(n);
        group.bench_with_input(BenchmarkId::new("grid", n), &n, |b, _| {
            b.iter(|| MeshGraph::build_default(black_box(&positions), black_box(&faces)).unwrap());
        });
    }

    group.finish();
}

fn bench_astar_shortest_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("astar_shortest_path");

    for n in [8usize, 16, 32] {
        let (positions, faces) = grid_mesh(n);
        let graph = MeshGraph::build_default(&positions, &faces).unwrap();
        let last = graph.vertex_count() - 1;
        group.bench_with_input(BenchmarkId::new("grid", n), &n, |b, _| {
            b.iter(|| graph.shortest_path(black_box(0), black_box(last)));
        });
    }

    group.finish();
}

fn bench_heat_solver_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("heat_solver_assemble");

    for n in [8usize, 16, 32] {
        let (positions, faces) = grid_mesh(n);
        group.bench_with_input(BenchmarkId::new("grid", n), &n, |b, _| {
            b.iter(|| {
                HeatGeodesicSolver::new(black_box(&positions), black_box(&faces), 1.0).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_heat_solver_compute_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("heat_solver_compute_distance");

    for n in [8usize, 16, 32] {
        let (positions, faces) = grid_mesh(n);
        let solver = HeatGeodesicSolver::new(&positions, &faces, 1.0).unwrap();
        group.bench_with_input(BenchmarkId::new("grid", n), &n, |b, _| {
            b.iter(|| solver.compute_distance(black_box(&[0])).unwrap());
        });
    }

    group.finish();
}

fn bench_smooth_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("smooth_path");

    let n = 32;
    let (positions, faces) = grid_mesh(n);
    let graph = MeshGraph::build_default(&positions, &faces).unwrap();
    let last = graph.vertex_count() - 1;

    group.bench_function("grid_32_corner_to_corner", |b| {
        b.iter(|| graph.smooth_path(black_box(0), black_box(last), black_box(8)).unwrap());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_mesh_graph_build,
    bench_astar_shortest_path,
    bench_heat_solver_assemble,
    bench_heat_solver_compute_distance,
    bench_smooth_path
);
criterion_main!(benches);
