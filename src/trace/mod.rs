//! trial 状态迁移记录（用于离线分析）
//!
//! 用结构化 JSON 事件记录每个 trial 的提交、排队、失败、晋升与完成，
//! 而不是解析 `update()` 打印的诊断文本。

mod types;

pub use types::{TraceEvent, TraceEventKind, TraceLogger};
