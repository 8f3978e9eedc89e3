//! # SensorLog Link Layer
//!
//! 传输层抽象，提供统一的"非阻塞连接 + 就绪轮询 + 读取"接口。
//!
//! - [`TcpLink`]: 基于 mio 的真实 TCP 实现
//! - [`mock::MockLink`]: 可编排结果的模拟实现（`mock` feature）
//!
//! 上层（driver）只依赖 [`SensorLink`] trait，连接状态机本身不接触 socket。

use std::fmt;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;
use thiserror::Error;

pub mod tcp;

pub use tcp::TcpLink;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

/// 链路层统一错误类型
#[derive(Error, Debug)]
pub enum LinkError {
    /// 底层 IO 错误（socket 创建、注册、轮询、读取失败）
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    /// 连接调用同步失败（对端尚未监听、网络暂不可达等，可以重试）
    #[error("Connect did not complete: {0}")]
    Connect(io::Error),

    /// 地址配置错误（致命，重试没有意义）
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// 读取超时（非致命）
    #[error("Read timeout")]
    Timeout,

    /// 链路未打开或连接尚未建立
    #[error("Not connected")]
    NotConnected,
}

impl LinkError {
    /// 判断是否为致命错误
    ///
    /// 致命错误表示继续重试没有意义（地址配置错误、socket 层异常），
    /// 连接阶段遇到时组件应直接停止。
    ///
    /// # 返回
    /// - `true`：致命错误
    /// - `false`：暂时性错误（可以重试或跳过本次）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LinkError::Io(_) | LinkError::InvalidEndpoint(_) | LinkError::NotConnected
        )
    }
}

/// 服务端地址
///
/// 由外部配置提供，会话期间不可变。`host` 必须是 IPv4 字面量。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// 解析为 socket 地址
    ///
    /// # Errors
    /// - `LinkError::InvalidEndpoint`: host 不是合法的 IPv4 字面量
    pub fn socket_addr(&self) -> Result<SocketAddr, LinkError> {
        let ip: Ipv4Addr = self.host.trim().parse().map_err(|e| {
            LinkError::InvalidEndpoint(format!("{:?} is not an IPv4 address: {}", self.host, e))
        })?;
        Ok(SocketAddr::V4(SocketAddrV4::new(ip, self.port)))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// 一次连接轮询的结果
#[derive(Debug)]
pub enum ConnectProgress {
    /// 超时内未完成，连接仍在进行中
    Pending,
    /// 已可写，连接建立
    Established,
    /// 连接尝试失败（如对端拒绝）；链路已丢弃该 socket，需要重新发起连接
    Refused(io::Error),
}

/// 传输链路 Trait
///
/// 语义：
/// - `begin_connect()`: 发起非阻塞连接，立即返回
/// - `poll_connect()`: 等待写就绪，最多阻塞 `timeout`
/// - `read()`: 连接建立后读取一次可用字节，最多阻塞读超时（`None` 表示一直等待）
/// - `close()`: 无条件释放 socket，可重复调用
pub trait SensorLink {
    /// 发起非阻塞连接（会先关闭已有的 socket）
    fn begin_connect(&mut self, endpoint: &Endpoint) -> Result<(), LinkError>;

    /// 等待连接完成
    fn poll_connect(&mut self, timeout: Duration) -> Result<ConnectProgress, LinkError>;

    /// 设置读超时（`None` 表示阻塞读）
    fn set_read_timeout(&mut self, _timeout: Option<Duration>) {}

    /// 读取一次可用数据，返回字节数（0 表示对端已关闭）
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError>;

    /// 关闭 socket
    fn close(&mut self);

    /// 是否持有 socket（连接中或已连接）
    fn is_open(&self) -> bool;
}

impl<L: SensorLink + ?Sized> SensorLink for Box<L> {
    fn begin_connect(&mut self, endpoint: &Endpoint) -> Result<(), LinkError> {
        (**self).begin_connect(endpoint)
    }

    fn poll_connect(&mut self, timeout: Duration) -> Result<ConnectProgress, LinkError> {
        (**self).poll_connect(timeout)
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        (**self).set_read_timeout(timeout)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        (**self).read(buf)
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}
