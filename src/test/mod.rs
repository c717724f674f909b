mod trace;

use crate::backend::{BackendSimulator, BackendSimulatorOptions};

/// 内部时钟从 0 开始、种子固定的仿真器。
pub(crate) fn internal_sim(max_concurrency: usize) -> BackendSimulator {
    BackendSimulator::new(BackendSimulatorOptions {
        max_concurrency,
        internal_clock: Some(0.0),
        seed: Some(7),
        ..BackendSimulatorOptions::default()
    })
    .expect("valid options")
}

pub(crate) fn total(sim: &BackendSimulator) -> usize {
    sim.num_queued() + sim.num_running() + sim.num_failed() + sim.num_completed()
}
