//! 仿真器快照
//!
//! 快照是值类型：生成与恢复时都会复制全部记录，不与活动仿真器共享任何数据。

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::options::BackendSimulatorOptions;
use super::trial::SimTrial;

/// BackendSimulator 的完整状态。
///
/// `options.internal_clock` 记录的是生成快照时的内部时钟读数。
/// `rng` 是失败抽样生成器的状态，恢复后继续产生相同的抽样序列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSimulatorState {
    pub options: BackendSimulatorOptions,
    pub verbose_logging: bool,
    pub rng: ChaCha8Rng,
    pub queued: Vec<SimTrial>,
    pub running: Vec<SimTrial>,
    pub failed: Vec<SimTrial>,
    pub completed: Vec<SimTrial>,
}

impl BackendSimulatorState {
    pub fn num_trials(&self) -> usize {
        self.queued.len() + self.running.len() + self.failed.len() + self.completed.len()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}
