//! Tracker 配置
//!
//! 所有字段都有默认值，TOML 中只需写出要覆盖的项：
//!
//! ```toml
//! host = "192.168.1.2"
//! port = 49482
//! poll_timeout_ms = 200
//! max_retries = 1000
//! retry_log_interval = 250
//! read_buffer_size = 1024
//! read_timeout_ms = 1000   # 0 = 阻塞读
//! framing = "single_read"  # 或 "line_buffered"
//! ```

use crate::error::DriverError;
use sensorlog_link::Endpoint;
use sensorlog_protocol::DEFAULT_READ_BUFFER_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// SensorLog App 默认的服务端地址
pub const DEFAULT_HOST: &str = "192.168.1.2";

/// SensorLog App 默认的监听端口
pub const DEFAULT_PORT: u16 = 49482;

/// 读缓冲区上限（1 MiB）
pub const MAX_READ_BUFFER_SIZE: usize = 1024 * 1024;

/// 读取数据的分帧方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FramingMode {
    /// 一次读取 = 一条记录（默认）
    ///
    /// 依赖服务端固定 31 Hz 发送，读取几乎总是恰好拿到一行。
    /// 跨行或半行的读取会因字段数不符被丢弃。
    #[default]
    SingleRead,

    /// 内部按 `\n` 重组行
    ///
    /// 半行会保留到下一次读取；一次读取包含多行时只交付最新的一条。
    LineBuffered,
}

/// 连接阶段的重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 每次 tick 等待写就绪的最长时间
    pub poll_timeout: Duration,
    /// 失败轮询次数达到该值后放弃
    pub max_retries: u32,
    /// 每失败多少次输出一条诊断日志
    pub log_interval: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(200),
            max_retries: 1000,
            log_interval: 250,
        }
    }
}

impl RetryPolicy {
    /// 第 `retries` 次失败后是否输出诊断日志；`log_interval` 为 0 时从不输出
    pub fn should_log_retry(&self, retries: u32) -> bool {
        retries.checked_rem(self.log_interval) == Some(0)
    }
}

/// Tracker 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// 服务端 IPv4 地址
    pub host: String,
    /// 服务端端口
    pub port: u16,
    /// 连接阶段单次轮询超时（毫秒）
    pub poll_timeout_ms: u64,
    /// 最大失败轮询次数
    pub max_retries: u32,
    /// 重试日志间隔（次）
    pub retry_log_interval: u32,
    /// 读缓冲区大小（字节）
    pub read_buffer_size: usize,
    /// 连接后单次读取的超时（毫秒），0 表示阻塞读
    pub read_timeout_ms: u64,
    /// 分帧方式
    pub framing: FramingMode,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            poll_timeout_ms: policy.poll_timeout.as_millis() as u64,
            max_retries: policy.max_retries,
            retry_log_interval: policy.log_interval,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            read_timeout_ms: 1000,
            framing: FramingMode::default(),
        }
    }
}

impl TrackerConfig {
    /// 服务端地址
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }

    /// 重试策略
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            poll_timeout: Duration::from_millis(self.poll_timeout_ms),
            max_retries: self.max_retries,
            log_interval: self.retry_log_interval,
        }
    }

    /// 读超时（`None` 表示阻塞读）
    pub fn read_timeout(&self) -> Option<Duration> {
        match self.read_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// 校验配置
    ///
    /// # Errors
    /// - `DriverError::InvalidConfig`: host 不是 IPv4 字面量，某个计数/大小为 0，
    ///   或读缓冲区超过 [`MAX_READ_BUFFER_SIZE`]
    pub fn validate(&self) -> Result<(), DriverError> {
        self.endpoint()
            .socket_addr()
            .map_err(|e| DriverError::InvalidConfig(e.to_string()))?;

        if self.max_retries == 0 {
            return Err(DriverError::InvalidConfig(
                "max_retries must be greater than 0".to_string(),
            ));
        }
        if self.retry_log_interval == 0 {
            return Err(DriverError::InvalidConfig(
                "retry_log_interval must be greater than 0".to_string(),
            ));
        }
        if self.read_buffer_size == 0 || self.read_buffer_size > MAX_READ_BUFFER_SIZE {
            return Err(DriverError::InvalidConfig(format!(
                "read_buffer_size must be in 1..={}, got {}",
                MAX_READ_BUFFER_SIZE, self.read_buffer_size
            )));
        }
        Ok(())
    }

    /// 从 TOML 文本解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, DriverError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载并校验
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DriverError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DriverError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// 序列化为 TOML 文本
    pub fn to_toml_string(&self) -> Result<String, DriverError> {
        Ok(toml::to_string(self)?)
    }
}
