//! 有界并发执行后端的仿真
//!
//! trial 被提交后立即失败、直接运行，或在 FIFO 队列中等待空闲槽位；
//! 调用方通过 `update()` 推进仿真，通过 `status()`/`lookup()` 查询，
//! 通过 `state()`/`from_state()` 做快照与恢复。

mod error;
mod options;
mod partition;
mod plan;
mod simulator;
mod state;
mod status;
mod trial;

pub use error::SimError;
pub use options::BackendSimulatorOptions;
pub use partition::{Partition, Partitions};
pub use plan::{PlannedTrial, TrialPlan};
pub use simulator::{BackendSimulator, UpdateSummary};
pub use state::BackendSimulatorState;
pub use status::{JobStatus, SimStatus, TrialStatus};
pub use trial::{SimTrial, TrialIndex};
