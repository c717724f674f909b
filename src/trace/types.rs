use serde::{Deserialize, Serialize};

use crate::backend::TrialIndex;

/// 迁移事件类型
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEventKind {
    /// 提交后直接进入 running
    Started { sim_runtime: f64 },
    /// 提交时没有空闲槽位，进入队尾
    Queued { sim_runtime: f64, queue_len: usize },
    /// 提交时即失败
    Failed,
    /// 从 queued 晋升到 running；`start` 可能早于观测时刻
    Promoted { start: f64, waited: Option<f64> },
    /// running 完成
    Completed { start: f64, deadline: f64 },
}

/// 一条迁移事件
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// 观测到该迁移时的时钟读数
    pub t: f64,
    pub trial_index: TrialIndex,
    #[serde(flatten)]
    pub kind: TraceEventKind,
}

/// 一个简单的事件收集器（存内存，仿真结束写 JSON 文件）
#[derive(Debug, Default, Clone)]
pub struct TraceLogger {
    pub events: Vec<TraceEvent>,
}

impl TraceLogger {
    pub fn push(&mut self, ev: TraceEvent) {
        self.events.push(ev);
    }

    /// 某个 trial 的全部事件（按记录顺序）
    pub fn for_trial(&self, trial_index: TrialIndex) -> impl Iterator<Item = &TraceEvent> {
        self.events
            .iter()
            .filter(move |e| e.trial_index == trial_index)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.events)
    }
}
