//! 仿真器错误类型

use super::partition::Partition;
use super::trial::TrialIndex;

/// 构造或提交 trial 时可能出现的错误。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// 并发上限必须至少为 1。
    #[error("max_concurrency must be >= 1, got {0}")]
    InvalidMaxConcurrency(usize),
    /// 时间缩放因子必须为正的有限数。
    #[error("time_scaling must be a positive finite number, got {0}")]
    InvalidTimeScaling(f64),
    /// 失败率必须位于 [0, 1]。
    #[error("failure_rate must be within [0, 1], got {0}")]
    InvalidFailureRate(f64),
    /// 内部时钟初值必须是有限数。
    #[error("internal_clock must be finite, got {0}")]
    InvalidInternalClock(f64),
    /// 同一个 trial index 已经存在于某个分区。
    #[error("trial {trial_index} is already {partition}")]
    DuplicateTrial {
        trial_index: TrialIndex,
        partition: Partition,
    },
    /// 运行时长为负或不是有限数。
    #[error("trial {trial_index} has invalid runtime {runtime}")]
    InvalidRuntime { trial_index: TrialIndex, runtime: f64 },
    /// running 分区中的记录缺少开始时间。
    #[error("running trial {trial_index} has no start time")]
    MissingStartTime { trial_index: TrialIndex },
}
