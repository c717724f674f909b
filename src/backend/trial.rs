//! 仿真 trial 记录

use serde::{Deserialize, Serialize};
use std::fmt;

/// trial 标识符（通常是上层实验系统中的 trial index）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrialIndex(pub u64);

impl fmt::Display for TrialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 仿真器跟踪的一个 trial。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimTrial {
    pub trial_index: TrialIndex,
    /// 仿真运行时长（秒，已按 `time_scaling` 缩放）
    pub sim_runtime: f64,
    /// 进入 running 的时刻
    #[serde(default)]
    pub sim_start_time: Option<f64>,
    /// 进入 queued（或直接进入 running）的时刻
    #[serde(default)]
    pub sim_queued_time: Option<f64>,
}

impl SimTrial {
    pub fn new(trial_index: TrialIndex, sim_runtime: f64) -> Self {
        Self {
            trial_index,
            sim_runtime,
            sim_start_time: None,
            sim_queued_time: None,
        }
    }

    pub fn with_start_time(mut self, t: f64) -> Self {
        self.sim_start_time = Some(t);
        self
    }

    pub fn with_queued_time(mut self, t: f64) -> Self {
        self.sim_queued_time = Some(t);
        self
    }

    /// 完成时刻 `sim_start_time + sim_runtime`；尚未开始时为 `None`。
    pub fn deadline(&self) -> Option<f64> {
        self.sim_start_time.map(|start| start + self.sim_runtime)
    }
}

impl fmt::Display for SimTrial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SimTrial(trial_index={}, sim_runtime={}, sim_start_time={:?}, sim_queued_time={:?})",
            self.trial_index, self.sim_runtime, self.sim_start_time, self.sim_queued_time
        )
    }
}
