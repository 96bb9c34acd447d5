use criterion::{criterion_group, criterion_main, Criterion};
use demgrid::synthetic;
use viewshed::{RayTracer, TerrainCandidate, VisibilityRequest};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn full_circle_trace(c: &mut Criterion) {
    let grid = synthetic::conical_hill(201, 201, 10.0, 100.0, 200.0);
    let summit = {
        let center = grid.cell_center(100, 100);
        TerrainCandidate {
            row: 100,
            col: 100,
            x: center.x,
            y: center.y,
            elevation_m: f64::from(grid.get(100, 100)),
            prominence_m: 0.0,
        }
    };

    let mut group = c.benchmark_group("trace_candidate");

    for rays in [72usize, 144] {
        let request = VisibilityRequest::builder()
            .rays_full_circle(rays)
            .obstruction_height(0.0)
            .max_visibility(5_000.0)
            .azimuth_tolerance(180.0)
            .build()
            .unwrap();
        group.bench_with_input(
            format!("{rays}_rays"),
            &(&grid, request, summit),
            |b, (grid, request, summit)| {
                b.iter(|| {
                    let mut tracer = RayTracer::new(grid, request);
                    tracer.trace_candidate(summit)
                });
            },
        );
    }
}

criterion_group!(benches, full_circle_trace);
criterion_main!(benches);
