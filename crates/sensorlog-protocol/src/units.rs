//! 强类型单位系统
//!
//! 使用 NewType 模式防止弧度与角度混用：线上数据是弧度，交付给消费者的是角度，
//! 两者只能通过 [`Rad::to_deg`] / [`Deg::to_rad`] 显式转换。
//!
//! # 示例
//!
//! ```rust
//! use sensorlog_protocol::{Deg, Rad};
//!
//! let angle = Rad(std::f64::consts::FRAC_PI_2).to_deg();
//! assert!((angle.0 - 90.0).abs() < 1e-9);
//!
//! // 类型安全：以下代码无法编译
//! // let _: Deg = Rad(1.0);
//! ```

use std::fmt;

/// 弧度（NewType）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rad(pub f64);

impl Rad {
    /// 零弧度常量
    pub const ZERO: Self = Rad(0.0);

    /// 转换为角度（`degrees = radians * 180 / π`）
    #[inline]
    pub fn to_deg(self) -> Deg {
        Deg(self.0 * (180.0 / std::f64::consts::PI))
    }
}

impl fmt::Display for Rad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} rad", self.0)
    }
}

/// 角度（NewType）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Deg(pub f64);

impl Deg {
    /// 零角度常量
    pub const ZERO: Self = Deg(0.0);

    /// 转换为弧度
    #[inline]
    pub fn to_rad(self) -> Rad {
        Rad(self.0 * (std::f64::consts::PI / 180.0))
    }
}

impl fmt::Display for Deg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}°", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rad_to_deg() {
        assert!((Rad(std::f64::consts::PI).to_deg().0 - 180.0).abs() < 1e-9);
        assert!((Rad(-std::f64::consts::FRAC_PI_4).to_deg().0 + 45.0).abs() < 1e-9);
        assert_eq!(Rad::ZERO.to_deg(), Deg::ZERO);
    }

    #[test]
    fn test_deg_to_rad() {
        let rad = Deg(90.0).to_rad();
        assert!((rad.0 - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_conversion_roundtrip() {
        let original = Rad(1.234_567);
        let back = original.to_deg().to_rad();
        assert!((original.0 - back.0).abs() < 1e-12);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Rad(1.0)), "1.0000 rad");
        assert_eq!(format!("{}", Deg(90.0)), "90.00°");
    }
}
