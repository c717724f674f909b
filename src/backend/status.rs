//! 状态视图与外部 trial 状态映射

use serde::{Deserialize, Serialize};

use super::partition::Partition;
use super::trial::TrialIndex;

/// 仿真器当前状态（按需计算，不持久化）。
///
/// `time_remaining` 与 `running` 按位置对齐；出现负数说明该调用 `update()` 了。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimStatus {
    pub queued: Vec<TrialIndex>,
    pub running: Vec<TrialIndex>,
    pub failed: Vec<TrialIndex>,
    pub time_remaining: Vec<f64>,
    pub completed: Vec<TrialIndex>,
}

/// 外部实验管理系统的 trial 状态枚举。
///
/// 仿真器不拥有这个枚举，只需要把自己的四个分区映射到它的取值上。
pub trait JobStatus: Sized {
    /// 已提交但尚未运行（对应 queued 分区）
    fn staged() -> Self;
    fn running() -> Self;
    fn completed() -> Self;
    fn failed() -> Self;

    fn from_partition(partition: Partition) -> Self {
        match partition {
            Partition::Queued => Self::staged(),
            Partition::Running => Self::running(),
            Partition::Completed => Self::completed(),
            Partition::Failed => Self::failed(),
        }
    }
}

/// 一个现成的 [`JobStatus`] 实现，供 CLI 和测试使用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialStatus {
    Staged,
    Running,
    Completed,
    Failed,
}

impl JobStatus for TrialStatus {
    fn staged() -> Self {
        TrialStatus::Staged
    }

    fn running() -> Self {
        TrialStatus::Running
    }

    fn completed() -> Self {
        TrialStatus::Completed
    }

    fn failed() -> Self {
        TrialStatus::Failed
    }
}
