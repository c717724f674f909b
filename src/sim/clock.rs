//! 仿真时钟
//!
//! 时钟要么读取外部墙钟，要么使用由 `update()` 推进的内部计数器。

use std::time::{SystemTime, UNIX_EPOCH};

/// 当前墙钟时间（秒，UNIX epoch 起）。
pub fn wall_time_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// 单调时间源。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clock {
    /// 外部墙钟
    Wall,
    /// 内部计数器：每次 `advance()` 加 1
    Internal(f64),
}

impl Clock {
    /// 由可选的初始值构造：`Some` 表示使用内部时钟。
    pub fn from_initial(internal: Option<f64>) -> Self {
        match internal {
            Some(t) => Clock::Internal(t),
            None => Clock::Wall,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Clock::Internal(_))
    }

    /// 当前时间读数
    pub fn time(&self) -> f64 {
        match *self {
            Clock::Wall => wall_time_secs(),
            Clock::Internal(t) => t,
        }
    }

    /// 推进内部时钟一个单位；墙钟不受影响。
    ///
    /// 推进按调用次数计，而不是按经过的真实时间。
    pub fn advance(&mut self) {
        if let Clock::Internal(t) = self {
            *t += 1.0;
        }
    }

    /// 内部时钟的当前值（墙钟返回 `None`），用于快照。
    pub fn internal(&self) -> Option<f64> {
        match *self {
            Clock::Wall => None,
            Clock::Internal(t) => Some(t),
        }
    }
}
