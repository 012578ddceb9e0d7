use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mems_physics::explorer::{sweep, Metric, ParameterGrid};
use mems_physics::geometry::DeviceGeometry;
use mems_physics::sensitivity::Parameter;
use mems_physics::simulation::DeviceConfig;
use mems_physics::sweep::linspace;

fn base_config() -> DeviceConfig {
    DeviceConfig::new(
        DeviceGeometry::new(4.0e-6, 200.0e-6, 2.0e-6, 2.0e-6).with_proof_mass(
            200.0e-6, 200.0e-6, 10.0e-6,
        ),
    )
}

fn bench_design_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("design_sweep");
    let base = base_config();

    for n in [4_usize, 8, 16] {
        let grid = ParameterGrid::new()
            .axis(Parameter::BeamWidth, linspace(2.0e-6, 8.0e-6, n))
            .axis(Parameter::BeamLength, linspace(100.0e-6, 400.0e-6, n))
            .axis(Parameter::Gap, linspace(1.0e-6, 4.0e-6, 4));
        group.bench_function(BenchmarkId::new("width_length_gap", grid.len()), |b| {
            b.iter(|| {
                let _ = sweep(&base, &grid, &Metric::SUMMARY);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_design_sweep);
criterion_main!(benches);
