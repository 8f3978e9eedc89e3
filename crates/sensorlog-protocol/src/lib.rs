//! # SensorLog Protocol
//!
//! SensorLog socket 输出格式的解析（无 IO 依赖）
//!
//! ## 模块
//!
//! - `constants`: 协议常量（字段数、姿态字段下标、缓冲区大小）
//! - `record`: 行切分、记录校验、姿态解码
//! - `framing`: 字节流按行重组
//! - `units`: 弧度/角度 NewType
//!
//! ## 线上格式
//!
//! 服务端（iPhone 上的 SensorLog App，DM 记录模式，逗号分隔，无填充）以约 31 Hz
//! 连续发送文本行。每行 24 个字段，字段 3/4/5 为姿态（弧度）。连接建立后的第一行
//! 可能是表头。

pub mod constants;
pub mod framing;
pub mod record;
pub mod units;

// 重新导出常用类型
pub use constants::*;
pub use framing::LineFramer;
pub use record::{Decoded, Euler, OrientationSample, Record, decode_line, encode_record};
pub use units::{Deg, Rad};

use std::num::ParseFloatError;
use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Invalid field count: expected {expected}, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    #[error("Invalid number in field {index}: {value:?}")]
    InvalidNumber {
        index: usize,
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::FieldCount {
            expected: 24,
            actual: 2,
        };
        assert_eq!(err.to_string(), "Invalid field count: expected 24, got 2");

        let source = "nan?".parse::<f64>().unwrap_err();
        let err = ProtocolError::InvalidNumber {
            index: 3,
            value: "nan?".to_string(),
            source,
        };
        let msg = err.to_string();
        assert!(msg.contains("field 3") && msg.contains("nan?"), "{}", msg);
    }
}
