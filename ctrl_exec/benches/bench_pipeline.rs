//! # Control Pipeline Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use comms_if::msg::{AdcTrajectory, Header, PathPoint, TrajectoryPoint};
use ctrl_lib::{
    adapter::BridgeAdapter,
    anchor::build_anchor_points,
    interface::ControllerInterface,
    params::CtrlParams,
    replay::{frame_to_input, ReplaySource},
    smoother::{DiscretePointsSmoother, TrajectorySmoother},
};
use util::module::State;

fn pipeline_benchmark(c: &mut Criterion) {
    let params: CtrlParams =
        util::params::load_str(include_str!("../../params/ctrl.toml")).unwrap();

    // ---- Smoother on a long wavy trajectory ----

    let raw = AdcTrajectory {
        header: Header::new(0.0),
        trajectory_point: (0..200)
            .map(|i| TrajectoryPoint {
                path_point: PathPoint::new(i as f64 * 0.5, (i as f64 * 0.3).sin()),
                v_ms: 2.0,
                ..Default::default()
            })
            .collect(),
    };
    let anchors = build_anchor_points(
        &raw,
        params.smoother.max_lateral_boundary_bound,
        params.smoother.longitudinal_boundary_bound,
    )
    .unwrap();
    let mut smoother = DiscretePointsSmoother::new(params.smoother.clone());

    c.bench_function("DiscretePointsSmoother::smooth", |b| {
        b.iter(|| smoother.smooth(&anchors, &raw).unwrap())
    });

    // ---- Full cycle ----

    let mut ctrl_if = ControllerInterface::new(BridgeAdapter);
    ctrl_if.init(params.clone()).unwrap();

    let frame = ReplaySource::synthetic(1, 10.0, params.cycle_period_s, 0.3)
        .next_frame()
        .unwrap();

    c.bench_function("ControllerInterface::proc", |b| {
        b.iter(|| ctrl_if.proc(&frame_to_input(frame.clone())).unwrap())
    });
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
