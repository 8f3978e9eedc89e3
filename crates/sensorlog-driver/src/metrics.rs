//! 观测指标
//!
//! 调试用的计数器（帧数、字节数、最后一行、字段数……）不作为散落的可变字段暴露，
//! 而是在每次 tick 后以不可变快照的形式返回，测试可以直接对快照断言。

use crate::state::ConnectionState;

/// 解码器计数器
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// 成功的数据读取次数（不含 header 丢弃读取）
    pub frames_read: u64,
    /// 最近一次读取的字节数
    pub last_read_bytes: usize,
    /// 累计接收字节数
    pub bytes_received_total: u64,
    /// 最近一条被解码行的字段数
    pub fields_in_record: usize,
    /// 最近一条被解码的行
    pub last_line: String,
    /// 交付给消费者的样本数
    pub samples_emitted: u64,
    /// 因字段数不符被跳过的行数
    pub records_skipped: u64,
    /// 姿态字段解析失败的行数
    pub parse_failures: u64,
    /// 读取失败次数（含读超时）
    pub read_failures: u64,
    /// 同一次读取中被更新样本取代的完整记录数（仅 LineBuffered）
    pub lines_superseded: u64,
}

/// Tracker 快照（不可变）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSnapshot {
    /// 当前连接状态
    pub state: ConnectionState,
    /// 本次会话的失败轮询次数
    pub retry_count: u32,
    /// 累计 tick 次数
    pub ticks: u64,
    /// 解码器计数器
    pub decoder: DecoderStats,
    /// 行缓冲溢出次数（仅 LineBuffered）
    pub framer_overflows: u64,
}

impl TrackerSnapshot {
    /// 最近一条行的字段数
    pub fn fields_in_record(&self) -> usize {
        self.decoder.fields_in_record
    }

    /// 样本产出率（样本数 / 数据读取次数）
    ///
    /// 返回 0.0 到 1.0 之间的值（LineBuffered 模式下一次读取可能含多行，可能超过 1.0）。
    /// 如果还没有读取，返回 0.0。
    pub fn sample_yield(&self) -> f64 {
        if self.decoder.frames_read == 0 {
            return 0.0;
        }
        self.decoder.samples_emitted as f64 / self.decoder.frames_read as f64
    }
}
