//! 仿真核心模块
//!
//! 此模块包含后端仿真器共用的时间源。

mod clock;

pub use clock::{Clock, wall_time_secs};
