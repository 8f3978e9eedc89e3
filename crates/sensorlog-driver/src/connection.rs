//! 连接管理
//!
//! `ConnectionManager` 负责 socket 生命周期：发起非阻塞连接、每次 tick 有界轮询、
//! 重试计数与放弃、断开与释放。它从不读取数据，连接建立后由 `RecordDecoder` 接手。

use crate::config::RetryPolicy;
use crate::state::{ConnectionState, FailureReason};
use sensorlog_link::{ConnectProgress, Endpoint, LinkError, SensorLink};
use tracing::{debug, info, trace, warn};

/// 一次 `poll_or_advance()` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Disabled / Failed：没有任何 socket 操作
    Inactive,
    /// 仍在连接中（本次轮询未完成）
    Pending { retries: u32 },
    /// 本次轮询检测到写就绪，已进入 Connected
    Established,
    /// 本次进入 Failed
    Failed(FailureReason),
    /// 已连接，调用方应交给解码器
    Ready,
}

/// 连接状态机
pub struct ConnectionManager<L: SensorLink> {
    link: L,
    endpoint: Endpoint,
    policy: RetryPolicy,
    state: ConnectionState,
    retries: u32,
}

impl<L: SensorLink> ConnectionManager<L> {
    /// 创建连接管理器（初始为 Disabled，不做任何 socket 操作）
    pub fn new(link: L, endpoint: Endpoint, policy: RetryPolicy) -> Self {
        Self {
            link,
            endpoint,
            policy,
            state: ConnectionState::Disabled,
            retries: 0,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// 本次会话中失败轮询的次数（enable 时清零，不递减）
    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub(crate) fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// 开始连接（Disabled/Failed → Connecting）
    ///
    /// 重试计数清零并立即发起一次非阻塞连接。连接调用同步失败属于正常情况，
    /// 状态保持 Connecting，后续 tick 继续尝试；只有致命错误（如地址非法）会直接进入 Failed。
    /// 已经处于 Connecting/Connected 时不做任何事。
    pub fn enable(&mut self) {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => {
                debug!(endpoint = %self.endpoint, state = self.state.name(), "enable ignored, already active");
                return;
            },
            ConnectionState::Disabled | ConnectionState::Failed { .. } => {},
        }

        self.retries = 0;
        self.state = ConnectionState::Connecting;

        if let Err(e) = self.link.begin_connect(&self.endpoint) {
            if e.is_fatal() {
                warn!(endpoint = %self.endpoint, error = %e, "Connect raised a fatal error, disabling");
                self.fail(FailureReason::Fatal(e.to_string()));
            } else {
                debug!(
                    endpoint = %self.endpoint,
                    error = %e,
                    "Connect to {} did not complete. (This is normal.)",
                    self.endpoint
                );
            }
        }
    }

    /// 关闭 socket 并进入 Disabled（无条件）
    pub fn disable(&mut self) {
        self.link.close();
        self.state = ConnectionState::Disabled;
        warn!(endpoint = %self.endpoint, "Connection to {} has been disabled.", self.endpoint);
    }

    /// 推进状态机（每次 tick 最多调用一次）
    ///
    /// - Connecting：最多一次写就绪轮询，阻塞不超过 `poll_timeout`
    /// - Connected：不做操作，返回 `Advance::Ready`
    /// - Disabled/Failed：不做操作
    pub fn poll_or_advance(&mut self) -> Advance {
        match self.state {
            ConnectionState::Disabled | ConnectionState::Failed { .. } => Advance::Inactive,
            ConnectionState::Connected => Advance::Ready,
            ConnectionState::Connecting => self.advance_connecting(),
        }
    }

    fn advance_connecting(&mut self) -> Advance {
        // 上一次尝试被拒绝或同步失败：重新发起连接
        if !self.link.is_open() {
            match self.link.begin_connect(&self.endpoint) {
                Ok(()) => {},
                Err(e) if e.is_fatal() => return self.fatal(e),
                Err(e) => {
                    trace!(endpoint = %self.endpoint, error = %e, "reconnect did not complete");
                    return self.record_failed_poll();
                },
            }
        }

        match self.link.poll_connect(self.policy.poll_timeout) {
            Ok(ConnectProgress::Established) => {
                self.state = ConnectionState::Connected;
                info!(
                    endpoint = %self.endpoint,
                    retries = self.retries,
                    "Connected to {}.",
                    self.endpoint
                );
                Advance::Established
            },
            Ok(ConnectProgress::Pending) => self.record_failed_poll(),
            Ok(ConnectProgress::Refused(err)) => {
                trace!(endpoint = %self.endpoint, error = %err, "connect refused");
                self.record_failed_poll()
            },
            Err(e) => self.fatal(e),
        }
    }

    fn record_failed_poll(&mut self) -> Advance {
        self.retries += 1;

        if self.policy.should_log_retry(self.retries) {
            info!(
                endpoint = %self.endpoint,
                retries = self.retries,
                "Connection to {} did not complete after {} tries.",
                self.endpoint,
                self.retries
            );
        }

        if self.retries >= self.policy.max_retries {
            warn!(
                endpoint = %self.endpoint,
                retries = self.retries,
                "Giving up on connection to {}",
                self.endpoint
            );
            return self.fail(FailureReason::RetriesExhausted {
                attempts: self.retries,
            });
        }

        Advance::Pending {
            retries: self.retries,
        }
    }

    fn fatal(&mut self, error: LinkError) -> Advance {
        warn!(endpoint = %self.endpoint, error = %error, "{} exception raised.", error);
        self.fail(FailureReason::Fatal(error.to_string()))
    }

    /// 进入 Failed 并释放 socket
    pub(crate) fn fail(&mut self, reason: FailureReason) -> Advance {
        self.link.close();
        self.state = ConnectionState::Failed {
            reason: reason.clone(),
        };
        Advance::Failed(reason)
    }
}

impl<L: SensorLink> Drop for ConnectionManager<L> {
    fn drop(&mut self) {
        self.link.close();
    }
}
