//! Builder 模式实现
//!
//! 提供链式构造 `Tracker` 实例的便捷方式。

use crate::config::{FramingMode, TrackerConfig};
use crate::error::DriverError;
use crate::tracker::Tracker;
use sensorlog_link::{Endpoint, SensorLink, TcpLink};
use std::time::Duration;

/// Tracker Builder（链式构造）
///
/// 未设置的项使用 [`TrackerConfig::default()`] 的值。
///
/// # Example
///
/// ```no_run
/// use sensorlog_driver::{FramingMode, TrackerBuilder};
///
/// // 使用默认配置（192.168.1.2:49482）
/// let tracker = TrackerBuilder::new().build().unwrap();
///
/// // 自定义地址与分帧方式
/// let tracker = TrackerBuilder::new()
///     .host("10.0.0.7")
///     .port(49482)
///     .framing(FramingMode::LineBuffered)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct TrackerBuilder {
    config: TrackerConfig,
}

impl TrackerBuilder {
    /// 创建新的 Builder
    pub fn new() -> Self {
        Self::default()
    }

    /// 整体替换配置（例如从 TOML 文件加载的配置）
    pub fn config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    /// 服务端 IPv4 地址（默认 `192.168.1.2`）
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// 服务端端口（默认 49482）
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn endpoint(self, endpoint: &Endpoint) -> Self {
        self.host(endpoint.host()).port(endpoint.port())
    }

    /// 连接阶段单次轮询超时（默认 200ms）
    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.config.poll_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// 放弃前允许的失败轮询次数（默认 1000）
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    pub fn retry_log_interval(mut self, interval: u32) -> Self {
        self.config.retry_log_interval = interval;
        self
    }

    /// 读缓冲区大小（默认 1024 字节）
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    /// 连接后单次读取的超时，`None` 表示阻塞读（默认 1s）
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.read_timeout_ms = timeout.map_or(0, |t| (t.as_millis() as u64).max(1));
        self
    }

    pub fn framing(mut self, framing: FramingMode) -> Self {
        self.config.framing = framing;
        self
    }

    /// 当前累积的配置
    pub fn as_config(&self) -> &TrackerConfig {
        &self.config
    }

    /// 构建基于 TCP 的 Tracker（初始为 Disabled，不做任何 socket 操作）
    ///
    /// # Errors
    /// - `DriverError::InvalidConfig`: 配置校验失败
    /// - `DriverError::Link`: 创建系统轮询器失败
    pub fn build(self) -> Result<Tracker<TcpLink>, DriverError> {
        self.config.validate()?;
        let link = TcpLink::new()?;
        Tracker::new(link, &self.config)
    }

    /// 使用自定义链路构建（测试或其它传输）
    pub fn build_with_link<L: SensorLink>(self, link: L) -> Result<Tracker<L>, DriverError> {
        Tracker::new(link, &self.config)
    }
}
