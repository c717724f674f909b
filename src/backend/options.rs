//! 仿真器配置

use serde::{Deserialize, Serialize};

use super::error::SimError;

/// BackendSimulator 的配置。
///
/// - `max_concurrency`：同时运行的 trial 上限
/// - `time_scaling`：运行时长缩放因子，仿真时长为 `runtime / time_scaling`
/// - `failure_rate`：每次提交独立失败的概率（提交即失败）
/// - `internal_clock`：内部时钟初值；`None` 表示使用墙钟
/// - `use_update_as_start_time`：晋升时以 update 时刻（而非前一个 trial 的完成时刻）作为开始时间
/// - `seed`：失败抽样所用随机数生成器的种子
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSimulatorOptions {
    pub max_concurrency: usize,
    pub time_scaling: f64,
    pub failure_rate: f64,
    pub internal_clock: Option<f64>,
    pub use_update_as_start_time: bool,
    pub seed: Option<u64>,
}

impl Default for BackendSimulatorOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 1,
            time_scaling: 1.0,
            failure_rate: 0.0,
            internal_clock: None,
            use_update_as_start_time: false,
            seed: None,
        }
    }
}

impl BackendSimulatorOptions {
    /// 校验配置；不做任何截断。
    pub fn validate(&self) -> Result<(), SimError> {
        if self.max_concurrency < 1 {
            return Err(SimError::InvalidMaxConcurrency(self.max_concurrency));
        }
        if !(self.time_scaling.is_finite() && self.time_scaling > 0.0) {
            return Err(SimError::InvalidTimeScaling(self.time_scaling));
        }
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(SimError::InvalidFailureRate(self.failure_rate));
        }
        if let Some(t) = self.internal_clock {
            if !t.is_finite() {
                return Err(SimError::InvalidInternalClock(t));
            }
        }
        Ok(())
    }
}
