//! 连接状态定义
//!
//! ```text
//!             enable()                 poll: 写就绪
//! Disabled ───────────▶ Connecting ─────────────────▶ Connected
//!    ▲                    │    ▲ │                        │
//!    │ disable()          │    └─┘ poll 未就绪/被拒绝       │
//!    │                    │        retries += 1           │
//!    │                    ▼                               │
//!    └──────────────── Failed ◀───────────────────────────┘
//!        disable()     (重试耗尽 / 致命错误)    header 读取出错
//! ```
//!
//! `Failed` 与 `Disabled` 都是终止态：tick 不再做任何 socket 操作，
//! 只有再次 `enable()` 才会重新开始。

use std::fmt;

/// 放弃连接的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// 失败轮询次数达到上限
    RetriesExhausted { attempts: u32 },
    /// 致命错误（地址非法、轮询异常等）
    Fatal(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::RetriesExhausted { attempts } => {
                write!(f, "connection did not complete after {} tries", attempts)
            },
            FailureReason::Fatal(message) => write!(f, "fatal error: {}", message),
        }
    }
}

/// 连接状态（只有 `ConnectionManager` 能修改）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disabled,
    Connecting,
    Connected,
    Failed { reason: FailureReason },
}

impl ConnectionState {
    /// 是否处于活动状态（tick 会产生 socket 操作）
    pub fn is_active(&self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Connected)
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ConnectionState::Failed { .. })
    }

    /// 状态名（用于日志与观测）
    pub fn name(&self) -> &'static str {
        match self {
            ConnectionState::Disabled => "disabled",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Failed { reason } => write!(f, "failed ({})", reason),
            other => f.write_str(other.name()),
        }
    }
}
