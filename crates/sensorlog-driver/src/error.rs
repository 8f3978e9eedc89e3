//! 驱动层错误类型定义

use sensorlog_link::LinkError;
use std::path::PathBuf;
use thiserror::Error;

/// 驱动层错误类型
///
/// 只出现在构建/配置阶段；`Tracker::tick()` 本身不返回错误，
/// 每次 tick 内的失败都在发生处处理并体现在 `TickOutcome` 中。
#[derive(Error, Debug)]
pub enum DriverError {
    /// 链路错误（如创建轮询器失败）
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// 配置值非法
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// 配置文件读取失败
    #[error("Failed to read config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 配置文件解析失败
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// 配置序列化失败
    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}
