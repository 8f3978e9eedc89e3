//! 姿态消费者
//!
//! 解码出的姿态通过 [`OrientationTarget`] 交给宿主拥有的对象（例如场景里某个物体的变换）。
//! 没有新样本的 tick 不会调用它，目标保持上一次的值。

use sensorlog_protocol::OrientationSample;

/// 姿态消费者 Trait
pub trait OrientationTarget {
    /// 设置新的姿态（角度）
    fn set_orientation(&mut self, orientation: OrientationSample);
}

impl<F> OrientationTarget for F
where
    F: FnMut(OrientationSample),
{
    fn set_orientation(&mut self, orientation: OrientationSample) {
        self(orientation)
    }
}

/// 只保存最新姿态的目标
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatestOrientation {
    current: Option<OrientationSample>,
    updates: u64,
}

impl LatestOrientation {
    pub fn new() -> Self {
        Self::default()
    }

    /// 最新姿态（还没有样本时为 `None`）
    pub fn get(&self) -> Option<OrientationSample> {
        self.current
    }

    /// 累计更新次数
    pub fn updates(&self) -> u64 {
        self.updates
    }
}

impl OrientationTarget for LatestOrientation {
    fn set_orientation(&mut self, orientation: OrientationSample) {
        self.current = Some(orientation);
        self.updates += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorlog_protocol::{Deg, Euler};

    #[test]
    fn test_latest_orientation_keeps_last() {
        let mut target = LatestOrientation::new();
        assert_eq!(target.get(), None);

        target.set_orientation(Euler::new(Deg(1.0), Deg(2.0), Deg(3.0)));
        target.set_orientation(Euler::new(Deg(4.0), Deg(5.0), Deg(6.0)));
        assert_eq!(target.get(), Some(Euler::new(Deg(4.0), Deg(5.0), Deg(6.0))));
        assert_eq!(target.updates(), 2);
    }

    #[test]
    fn test_closure_target() {
        let mut seen = Vec::new();
        {
            let mut target = |o: OrientationSample| seen.push(o.x.0);
            target.set_orientation(Euler::new(Deg(10.0), Deg::ZERO, Deg::ZERO));
        }
        assert_eq!(seen, vec![10.0]);
    }
}
