//! 分区存储
//!
//! 四个互不相交的 trial 集合：queued（FIFO）、running、failed、completed。

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use super::trial::{SimTrial, TrialIndex};

/// trial 所在的分区
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Queued,
    Running,
    Failed,
    Completed,
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Partition::Queued => "queued",
            Partition::Running => "running",
            Partition::Failed => "failed",
            Partition::Completed => "completed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partitions {
    pub(crate) queued: VecDeque<SimTrial>,
    pub(crate) running: Vec<SimTrial>,
    pub(crate) failed: Vec<SimTrial>,
    pub(crate) completed: Vec<SimTrial>,
}

impl Partitions {
    pub fn new(
        queued: Vec<SimTrial>,
        running: Vec<SimTrial>,
        failed: Vec<SimTrial>,
        completed: Vec<SimTrial>,
    ) -> Self {
        Self {
            queued: queued.into(),
            running,
            failed,
            completed,
        }
    }

    pub fn queued(&self) -> impl ExactSizeIterator<Item = &SimTrial> {
        self.queued.iter()
    }

    pub fn running(&self) -> &[SimTrial] {
        &self.running
    }

    pub fn failed(&self) -> &[SimTrial] {
        &self.failed
    }

    pub fn completed(&self) -> &[SimTrial] {
        &self.completed
    }

    pub fn len(&self) -> usize {
        self.queued.len() + self.running.len() + self.failed.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 查找 trial 所在分区：按 queued、running、completed、failed 的顺序，首个命中为准。
    pub fn locate(&self, trial_index: TrialIndex) -> Option<Partition> {
        let matches = |t: &SimTrial| t.trial_index == trial_index;
        if self.queued.iter().any(matches) {
            Some(Partition::Queued)
        } else if self.running.iter().any(matches) {
            Some(Partition::Running)
        } else if self.completed.iter().any(matches) {
            Some(Partition::Completed)
        } else if self.failed.iter().any(matches) {
            Some(Partition::Failed)
        } else {
            None
        }
    }

    /// 把截止时间严格早于 `now` 的 running trial 移到 completed（保持剩余 running 的相对顺序）。
    ///
    /// 返回本轮新完成 trial 的截止时间，顺序与完成顺序一致。
    pub(crate) fn complete_overdue(&mut self, now: f64) -> Vec<f64> {
        let mut deadlines = Vec::new();
        let running = std::mem::take(&mut self.running);
        for trial in running {
            let deadline = trial
                .deadline()
                .expect("running trial must have a start time");
            if deadline < now {
                deadlines.push(deadline);
                self.completed.push(trial);
            } else {
                self.running.push(trial);
            }
        }
        deadlines
    }
}
