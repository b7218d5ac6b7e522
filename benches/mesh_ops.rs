//! Benchmarks for projection and mirroring.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meshcast::algo::partition::PartitionGrid;
use meshcast::algo::project::{ProjectOptions, ProjectionTarget, View};
use meshcast::prelude::*;
use nalgebra::{Point2, Point3};

/// An `n` x `n` grid of unit quads in the xy plane, with UVs spanning [0, 1].
fn create_grid_mesh(n: usize, z: f64) -> HalfEdgeMesh {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, z));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    let uvs: Vec<Point2<f64>> = vertices.iter().map(|p| p.xy() / n as f64).collect();
    build_from_triangles(&vertices, &faces)
        .unwrap()
        .with_uv_layer(UvLayer::from_vertex_uvs(&uvs, &faces))
}

fn bench_partition_grid(c: &mut Criterion) {
    let mesh = create_grid_mesh(100, 0.0);

    c.bench_function("partition_build_100x100", |b| {
        b.iter(|| PartitionGrid::from_mesh_uv(&mesh, 4.0, 1e-5).unwrap());
    });

    let grid = PartitionGrid::from_mesh_uv(&mesh, 4.0, 1e-5).unwrap();
    let samples: Vec<Point2<f64>> = (0..1000)
        .map(|i| {
            let t = i as f64 / 1000.0;
            Point2::new(t, (t * 7.3).fract())
        })
        .collect();

    c.bench_function("partition_query_containing", |b| {
        b.iter(|| {
            samples
                .iter()
                .filter(|uv| grid.query_containing(black_box(*uv)).is_some())
                .count()
        });
    });

    c.bench_function("partition_query_closest_outside", |b| {
        b.iter(|| {
            samples
                .iter()
                .map(|uv| Point2::new(uv.x + 1.5, uv.y))
                .filter(|uv| grid.query_closest(black_box(uv)).is_some())
                .count()
        });
    });
}

fn bench_projection(c: &mut Criterion) {
    let target = PlacedMesh::new(MeshId(0), create_grid_mesh(50, 0.0), Placement::identity());
    let target = ProjectionTarget::new(&target, View::top_down(), ProjectOptions::default()).unwrap();
    let source = PlacedMesh::new(
        MeshId(1),
        create_grid_mesh(40, 0.0),
        Placement::at(Point3::new(5.0, 5.0, 2.0)),
    );

    c.bench_function("project_prepare", |b| {
        b.iter(|| target.prepare(black_box(&source)).unwrap());
    });

    let prepared = target.prepare(&source).unwrap();
    c.bench_function("project_vertices_parallel", |b| {
        b.iter(|| target.project_prepared(&prepared, target.options()).unwrap());
    });

    let sequential = target.options().clone().sequential();
    c.bench_function("project_vertices_sequential", |b| {
        b.iter(|| target.project_prepared(&prepared, &sequential).unwrap());
    });
}

fn bench_mirroring(c: &mut Criterion) {
    let mirror = PlacedMesh::new(MeshId(0), create_grid_mesh(30, 0.0), Placement::identity());
    let sources = vec![PlacedMesh::new(
        MeshId(1),
        create_grid_mesh(25, 0.0),
        Placement::at(Point3::new(2.0, 2.0, 1.0)),
    )];
    let reporter = Reporter::none();

    c.bench_function("mirror_propagate", |b| {
        let options = MirrorOptions::default();
        b.iter(|| mirror_meshes(&mirror, &sources, &options, &reporter).unwrap());
    });

    c.bench_function("mirror_intersect_closest", |b| {
        let options = MirrorOptions::default().with_intersect_closest(true);
        b.iter(|| mirror_meshes(&mirror, &sources, &options, &reporter).unwrap());
    });
}

criterion_group!(benches, bench_partition_grid, bench_projection, bench_mirroring);
criterion_main!(benches);
