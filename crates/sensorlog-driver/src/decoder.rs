//! 记录解码
//!
//! `RecordDecoder` 把一次读取的字节变成 0 或 1 个姿态样本：
//!
//! 1. 读一次（固定大小缓冲区，默认 1024 字节）；失败则记录日志并结束本次 tick
//! 2. 按 ASCII/UTF-8 解码为文本
//! 3. 按 `,` 切分，记录字段数
//! 4. 字段数 ≠ 24：静默跳过
//! 5. 解析字段 3/4/5（弧度）；解析失败记录日志（带原始行）并结束本次 tick
//! 6. 转换为角度并交付
//!
//! 任何失败都只影响当前 tick，不会重试，也不会拆除连接。

use crate::config::{FramingMode, MAX_READ_BUFFER_SIZE};
use crate::metrics::DecoderStats;
use sensorlog_link::{LinkError, SensorLink};
use sensorlog_protocol::{Decoded, LineFramer, OrientationSample, decode_line};
use tracing::{debug, trace, warn};

/// 单次解码结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodeOutcome {
    /// 产出一个样本
    Sample(OrientationSample),
    /// 字段数不符，静默跳过
    Skipped { fields: usize },
    /// 姿态字段解析失败（已记录日志）
    ParseFailed,
    /// 读取失败（已记录日志）
    ReadFailed,
    /// 没有完整的行（仅 LineBuffered）
    Incomplete,
}

impl DecodeOutcome {
    pub fn sample(&self) -> Option<OrientationSample> {
        match self {
            DecodeOutcome::Sample(sample) => Some(*sample),
            _ => None,
        }
    }
}

/// 记录解码器
#[derive(Debug)]
pub struct RecordDecoder {
    buffer: Vec<u8>,
    mode: FramingMode,
    framer: LineFramer,
    header_pending: bool,
    stats: DecoderStats,
}

impl RecordDecoder {
    /// 创建解码器，缓冲区大小限制在 `1..=MAX_READ_BUFFER_SIZE`
    pub fn new(buffer_size: usize, mode: FramingMode) -> Self {
        let buffer_size = buffer_size.clamp(1, MAX_READ_BUFFER_SIZE);
        Self {
            buffer: vec![0u8; buffer_size],
            mode,
            framer: LineFramer::new(buffer_size.saturating_mul(4)),
            header_pending: false,
            stats: DecoderStats::default(),
        }
    }

    pub fn mode(&self) -> FramingMode {
        self.mode
    }

    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    pub fn framer_overflows(&self) -> u64 {
        self.framer.overflows()
    }

    /// 新会话开始：丢弃残留的半行
    pub fn reset(&mut self) {
        self.framer.reset();
        self.header_pending = false;
    }

    /// 连接刚建立时读一次并丢弃（可能的表头）
    ///
    /// 读超时不算错误：服务端还没发数据，也就没有可丢弃的内容。
    /// LineBuffered 模式下此时第一行可能还不完整，标记为待丢弃，等它完整后再扔掉。
    ///
    /// # Errors
    /// 除超时以外的读取错误原样返回，由调用方决定如何处理。
    pub fn discard_header<L: SensorLink>(&mut self, link: &mut L) -> Result<(), LinkError> {
        self.reset();

        let n = match link.read(&mut self.buffer) {
            Ok(n) => n,
            Err(LinkError::Timeout) => {
                debug!("no header received before read timeout");
                self.header_pending = self.mode == FramingMode::LineBuffered;
                return Ok(());
            },
            Err(e) => return Err(e),
        };
        self.stats.last_read_bytes = n;
        self.stats.bytes_received_total += n as u64;

        match self.mode {
            FramingMode::SingleRead => {
                trace!(bytes = n, "discarded header read");
            },
            FramingMode::LineBuffered => {
                let lines = self.framer.push(&self.buffer[..n]);
                // 与表头一起到达的完整行已经过时，一并丢弃；残留的半行保留
                self.header_pending = lines.is_empty();
                trace!(bytes = n, lines = lines.len(), "discarded header read");
            },
        }
        Ok(())
    }

    /// 读一次并解码
    pub fn decode_tick<L: SensorLink>(&mut self, link: &mut L) -> DecodeOutcome {
        let n = match link.read(&mut self.buffer) {
            Ok(n) => n,
            Err(e) => {
                self.stats.read_failures += 1;
                warn!(error = %e, "Unable to read from sensor stream.");
                return DecodeOutcome::ReadFailed;
            },
        };
        self.stats.frames_read += 1;
        self.stats.last_read_bytes = n;
        self.stats.bytes_received_total += n as u64;

        match self.mode {
            FramingMode::SingleRead => {
                let line = String::from_utf8_lossy(&self.buffer[..n]).into_owned();
                self.decode_one(line)
            },
            FramingMode::LineBuffered => {
                let mut lines = self.framer.push(&self.buffer[..n]);
                if self.header_pending && !lines.is_empty() {
                    lines.remove(0);
                    self.header_pending = false;
                }
                self.decode_many(lines)
            },
        }
    }

    fn decode_one(&mut self, line: String) -> DecodeOutcome {
        let outcome = match decode_line(&line) {
            Ok(Decoded::Sample { sample, fields }) => {
                self.stats.fields_in_record = fields;
                self.stats.samples_emitted += 1;
                DecodeOutcome::Sample(sample)
            },
            Ok(Decoded::Skipped { fields }) => {
                self.stats.fields_in_record = fields;
                self.stats.records_skipped += 1;
                trace!(fields, "skipping record with unexpected field count");
                DecodeOutcome::Skipped { fields }
            },
            Err(e) => {
                self.stats.fields_in_record = sensorlog_protocol::RECORD_FIELD_COUNT;
                self.stats.parse_failures += 1;
                warn!(line = ?line, error = %e, "Unable to parse tracker input line.");
                DecodeOutcome::ParseFailed
            },
        };
        self.stats.last_line = line;
        outcome
    }

    /// 解码一次读取得到的多行，只保留最新的样本
    fn decode_many(&mut self, lines: Vec<String>) -> DecodeOutcome {
        let mut latest: Option<OrientationSample> = None;
        let mut last_outcome = DecodeOutcome::Incomplete;

        for line in lines {
            let outcome = self.decode_one(line);
            if let DecodeOutcome::Sample(sample) = outcome {
                if latest.replace(sample).is_some() {
                    self.stats.lines_superseded += 1;
                }
            }
            last_outcome = outcome;
        }

        match latest {
            Some(sample) => DecodeOutcome::Sample(sample),
            None => last_outcome,
        }
    }
}
