//! Tracker：对外的 enable / tick / disable 接口
//!
//! 每次 tick 只做一件事：
//!
//! - Connecting：一次有界轮询（不超过 `poll_timeout`）
//! - 刚连上：读一次并丢弃表头，本次 tick 不交付样本
//! - Connected：读一次、解码、最多交付一个样本
//! - Disabled / Failed：什么都不做
//!
//! 所有错误都在 tick 内部处理，调用方只通过 [`TickReport`] 和目标是否被更新来感知结果。

use crate::config::TrackerConfig;
use crate::connection::{Advance, ConnectionManager};
use crate::decoder::{DecodeOutcome, RecordDecoder};
use crate::error::DriverError;
use crate::metrics::TrackerSnapshot;
use crate::state::{ConnectionState, FailureReason};
use crate::target::OrientationTarget;
use sensorlog_link::{Endpoint, SensorLink};
use sensorlog_protocol::OrientationSample;
use tracing::warn;

/// 单次 tick 的结果
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Disabled / Failed，没有任何操作
    Inactive,
    /// 仍在连接中
    Connecting { retries: u32 },
    /// 本次 tick 建立了连接（表头已丢弃）
    Connected,
    /// 本次 tick 进入 Failed
    Failed(FailureReason),
    /// 已连接，读取并解码了一次
    Decoded(DecodeOutcome),
}

/// 单次 tick 的报告：结果 + tick 结束时的快照
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub outcome: TickOutcome,
    pub snapshot: TrackerSnapshot,
}

impl TickReport {
    /// 本次 tick 交付的样本（如果有）
    pub fn sample(&self) -> Option<OrientationSample> {
        match &self.outcome {
            TickOutcome::Decoded(outcome) => outcome.sample(),
            _ => None,
        }
    }
}

/// 姿态跟踪器
pub struct Tracker<L: SensorLink> {
    connection: ConnectionManager<L>,
    decoder: RecordDecoder,
    ticks: u64,
}

impl<L: SensorLink> Tracker<L> {
    /// 用给定链路创建 Tracker（初始为 Disabled）
    ///
    /// # Errors
    /// - `DriverError::InvalidConfig`: 配置校验失败
    pub fn new(mut link: L, config: &TrackerConfig) -> Result<Self, DriverError> {
        config.validate()?;
        link.set_read_timeout(config.read_timeout());

        Ok(Self {
            connection: ConnectionManager::new(link, config.endpoint(), config.retry_policy()),
            decoder: RecordDecoder::new(config.read_buffer_size, config.framing),
            ticks: 0,
        })
    }

    pub fn state(&self) -> &ConnectionState {
        self.connection.state()
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.connection.endpoint()
    }

    /// 开始连接
    ///
    /// 已经在连接或已连接时不做任何事；从 Disabled/Failed 调用会清零重试计数。
    pub fn enable(&mut self) {
        if !self.connection.state().is_active() {
            self.decoder.reset();
        }
        self.connection.enable();
    }

    /// 关闭 socket，之后的 tick 不再有任何效果
    pub fn disable(&mut self) {
        self.connection.disable();
    }

    /// 推进一次
    ///
    /// 解码出样本时调用 `target.set_orientation()`，否则目标保持原值。
    pub fn tick<T: OrientationTarget + ?Sized>(&mut self, target: &mut T) -> TickReport {
        self.ticks += 1;

        let outcome = match self.connection.poll_or_advance() {
            Advance::Inactive => TickOutcome::Inactive,
            Advance::Pending { retries } => TickOutcome::Connecting { retries },
            Advance::Failed(reason) => TickOutcome::Failed(reason),
            Advance::Established => self.on_established(),
            Advance::Ready => {
                let outcome = self.decoder.decode_tick(self.connection.link_mut());
                if let DecodeOutcome::Sample(sample) = outcome {
                    target.set_orientation(sample);
                }
                TickOutcome::Decoded(outcome)
            },
        };

        TickReport {
            outcome,
            snapshot: self.snapshot(),
        }
    }

    fn on_established(&mut self) -> TickOutcome {
        match self.decoder.discard_header(self.connection.link_mut()) {
            Ok(()) => TickOutcome::Connected,
            Err(e) => {
                warn!(
                    endpoint = %self.connection.endpoint(),
                    error = %e,
                    "Unable to read header from {}",
                    self.connection.endpoint()
                );
                match self.connection.fail(FailureReason::Fatal(e.to_string())) {
                    Advance::Failed(reason) => TickOutcome::Failed(reason),
                    _ => TickOutcome::Inactive,
                }
            },
        }
    }

    /// 当前快照
    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            state: self.connection.state().clone(),
            retry_count: self.connection.retries(),
            ticks: self.ticks,
            decoder: self.decoder.stats().clone(),
            framer_overflows: self.decoder.framer_overflows(),
        }
    }
}
