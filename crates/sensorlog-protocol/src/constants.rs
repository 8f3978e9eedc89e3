//! 协议常量定义
//!
//! 集中定义 SensorLog socket 输出格式相关的常量，避免在代码中散落"魔法数"。

use std::ops::Range;

/// 一条完整记录的字段数
///
/// SensorLog 在 DM（Device Motion）记录模式下每行固定输出 24 个字段，
/// 字段数不等于该值的行（表头、被截断的行、多行粘连）一律不产生样本。
pub const RECORD_FIELD_COUNT: usize = 24;

/// 字段分隔符（CSV，无填充）
pub const FIELD_DELIMITER: char = ',';

/// 行结束符
pub const LINE_TERMINATOR: u8 = b'\n';

/// 姿态分量（弧度）所在的字段下标：x = 3, y = 4, z = 5
pub const ORIENTATION_FIELDS: Range<usize> = 3..6;

/// 默认读缓冲区大小（字节）
///
/// 31 Hz 发送频率下一行 DM 记录远小于该值。
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;
