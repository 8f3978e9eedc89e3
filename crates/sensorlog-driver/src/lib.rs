//! 驱动层模块
//!
//! 本模块把 SensorLog 的 TCP 数据流变成逐帧交付的姿态样本，包括：
//! - 连接状态机（非阻塞连接、有界重试、放弃与释放）
//! - 记录解码（字段校验、弧度 → 角度）
//! - 观测快照（每次 tick 返回）
//! - 配置加载（TOML）
//!
//! 整个驱动是单线程、由外部 tick 驱动的：没有后台线程，所有 socket 操作都在
//! [`Tracker::tick()`] 内同步完成。
//!
//! # Example
//!
//! ```no_run
//! use sensorlog_driver::{LatestOrientation, TrackerBuilder};
//!
//! let mut tracker = TrackerBuilder::new().host("192.168.1.2").build().unwrap();
//! let mut target = LatestOrientation::new();
//!
//! tracker.enable();
//! loop {
//!     let report = tracker.tick(&mut target);
//!     if report.snapshot.state.is_failed() {
//!         break;
//!     }
//!     // 每帧渲染……
//! }
//! ```

mod builder;
pub mod config;
pub mod connection;
pub mod decoder;
mod error;
pub mod metrics;
pub mod state;
pub mod target;
mod tracker;

pub use builder::TrackerBuilder;
pub use config::{
    DEFAULT_HOST, DEFAULT_PORT, FramingMode, MAX_READ_BUFFER_SIZE, RetryPolicy, TrackerConfig,
};
pub use connection::{Advance, ConnectionManager};
pub use decoder::{DecodeOutcome, RecordDecoder};
pub use error::DriverError;
pub use metrics::{DecoderStats, TrackerSnapshot};
pub use state::{ConnectionState, FailureReason};
pub use target::{LatestOrientation, OrientationTarget};
pub use tracker::{TickOutcome, TickReport, Tracker};

pub use sensorlog_link::{Endpoint, LinkError, SensorLink, TcpLink};
pub use sensorlog_protocol::{Deg, Euler, OrientationSample, Rad};
