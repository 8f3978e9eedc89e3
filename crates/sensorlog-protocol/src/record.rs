//! 记录解析
//!
//! 一行 SensorLog 输出按 `,` 切分为字段序列（[`Record`]），字段数恰好为
//! [`RECORD_FIELD_COUNT`] 时，第 3/4/5 个字段是以弧度表示的姿态分量。
//!
//! # 解析流程
//!
//! ```text
//! &str ──split(',')──▶ Record ──field_count == 24?──▶ Euler<Rad> ──to_deg()──▶ OrientationSample
//!                                 │ 否
//!                                 ▼
//!                           Decoded::Skipped（静默丢弃）
//! ```

use crate::constants::{FIELD_DELIMITER, ORIENTATION_FIELDS, RECORD_FIELD_COUNT};
use crate::units::{Deg, Rad};
use crate::ProtocolError;

/// 三轴欧拉角
///
/// 分量顺序与线上字段顺序一致（x = 字段 3，y = 字段 4，z = 字段 5），
/// 不做任何坐标系重排。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Euler<A> {
    pub x: A,
    pub y: A,
    pub z: A,
}

impl<A> Euler<A> {
    pub const fn new(x: A, y: A, z: A) -> Self {
        Self { x, y, z }
    }
}

impl Euler<Rad> {
    /// 逐分量转换为角度
    pub fn to_deg(self) -> Euler<Deg> {
        Euler {
            x: self.x.to_deg(),
            y: self.y.to_deg(),
            z: self.z.to_deg(),
        }
    }
}

impl Euler<Deg> {
    /// 以 `[x, y, z]` 形式取出原始角度值
    pub fn to_array(self) -> [f64; 3] {
        [self.x.0, self.y.0, self.z.0]
    }
}

/// 交付给消费者的姿态样本（角度）
pub type OrientationSample = Euler<Deg>;

/// 一行文本切分后的字段序列
///
/// 借用原始行，不做拷贝；只在一次解码内有效。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'a> {
    fields: Vec<&'a str>,
}

impl<'a> Record<'a> {
    /// 按 `,` 切分一行文本
    ///
    /// 不做任何修剪：行尾的 `\r\n` 留在最后一个字段里，不影响姿态字段。
    /// 空字符串切分结果为 1 个空字段。
    pub fn split(line: &'a str) -> Self {
        Self {
            fields: line.split(FIELD_DELIMITER).collect(),
        }
    }

    /// 字段数
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// 是否是一条完整的 DM 记录（字段数恰好为 24）
    pub fn is_complete(&self) -> bool {
        self.fields.len() == RECORD_FIELD_COUNT
    }

    /// 解析姿态分量（弧度）
    ///
    /// # Errors
    /// - `ProtocolError::FieldCount`: 字段数不是 24
    /// - `ProtocolError::InvalidNumber`: 姿态字段不是合法浮点数
    pub fn orientation(&self) -> Result<Euler<Rad>, ProtocolError> {
        if !self.is_complete() {
            return Err(ProtocolError::FieldCount {
                expected: RECORD_FIELD_COUNT,
                actual: self.fields.len(),
            });
        }

        let [x, y, z] = [
            ORIENTATION_FIELDS.start,
            ORIENTATION_FIELDS.start + 1,
            ORIENTATION_FIELDS.start + 2,
        ]
        .map(|index| self.parse_radians(index));

        Ok(Euler::new(x?, y?, z?))
    }

    fn parse_radians(&self, index: usize) -> Result<Rad, ProtocolError> {
        let raw = self.fields[index];
        raw.trim()
            .parse::<f64>()
            .map(Rad)
            .map_err(|source| ProtocolError::InvalidNumber {
                index,
                value: raw.to_string(),
                source,
            })
    }
}

/// 单行解码结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decoded {
    /// 完整记录，产出一个样本
    Sample {
        sample: OrientationSample,
        fields: usize,
    },
    /// 字段数不符，静默跳过
    Skipped { fields: usize },
}

impl Decoded {
    /// 该行的字段数（用于观测）
    pub fn fields(&self) -> usize {
        match self {
            Decoded::Sample { fields, .. } | Decoded::Skipped { fields } => *fields,
        }
    }

    /// 取出样本（如果有）
    pub fn sample(&self) -> Option<OrientationSample> {
        match self {
            Decoded::Sample { sample, .. } => Some(*sample),
            Decoded::Skipped { .. } => None,
        }
    }
}

/// 解码一行文本
///
/// - 字段数 ≠ 24：返回 `Ok(Decoded::Skipped)`，从不报错
/// - 字段数 = 24 且姿态字段可解析：返回角度样本
/// - 字段数 = 24 但姿态字段非法：返回 `Err(ProtocolError::InvalidNumber)`
///
/// # 示例
///
/// ```rust
/// use sensorlog_protocol::{decode_line, Decoded};
///
/// let decoded = decode_line("x,y").unwrap();
/// assert_eq!(decoded, Decoded::Skipped { fields: 2 });
/// ```
pub fn decode_line(line: &str) -> Result<Decoded, ProtocolError> {
    let record = Record::split(line);
    let fields = record.field_count();
    if !record.is_complete() {
        return Ok(Decoded::Skipped { fields });
    }

    let sample = record.orientation()?.to_deg();
    Ok(Decoded::Sample { sample, fields })
}

/// 构造一条 24 字段的记录行（以 `\n` 结尾）
///
/// 姿态分量写入字段 3/4/5，其余字段填 `0`。用于测试、基准和本地模拟服务端。
pub fn encode_record(orientation: Euler<Rad>) -> String {
    let mut fields = vec![String::from("0"); RECORD_FIELD_COUNT];
    fields[ORIENTATION_FIELDS.start] = orientation.x.0.to_string();
    fields[ORIENTATION_FIELDS.start + 1] = orientation.y.0.to_string();
    fields[ORIENTATION_FIELDS.start + 2] = orientation.z.0.to_string();

    let mut line = fields.join(",");
    line.push('\n');
    line
}
