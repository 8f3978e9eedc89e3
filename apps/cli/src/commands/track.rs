//! 跟踪命令
//!
//! 以 `--rate` 的频率调用 `tick()`，每收到一个新样本打印一行。
//! Ctrl+C 时调用 `disable()` 释放 socket 后退出；连接放弃时以非零状态退出。

use super::ConnectionArgs;
use anyhow::{Context, Result, bail};
use clap::Args;
use sensorlog_driver::{
    LatestOrientation, OrientationSample, TickOutcome, TrackerBuilder, TrackerSnapshot,
};
use serde::Serialize;
use spin_sleep::SpinSleeper;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;

/// 跟踪命令参数
#[derive(Args, Debug)]
pub struct TrackCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// tick 频率（Hz）
    #[arg(short, long, default_value_t = 60.0)]
    pub rate: f64,

    /// 运行指定次数的 tick 后退出
    #[arg(short, long)]
    pub ticks: Option<u64>,

    /// 以 JSON 行输出
    #[arg(long)]
    pub json: bool,
}

/// JSON 输出的一行
#[derive(Debug, Serialize)]
struct SampleLine<'a> {
    tick: u64,
    orientation: &'a OrientationSample,
    fields: usize,
}

impl TrackCommand {
    pub fn execute(self) -> Result<()> {
        let period = tick_period(self.rate)?;

        let config = self.connection.resolve()?;
        let mut tracker = TrackerBuilder::new()
            .config(config)
            .build()
            .context("创建 Tracker 失败")?;

        // 设置 Ctrl+C 处理
        let running = Arc::new(AtomicBool::new(true));
        let r = running.clone();
        ctrlc::set_handler(move || {
            r.store(false, Ordering::SeqCst);
        })
        .context("设置信号处理失败")?;

        println!("🔌 连接到 {} ...", tracker.endpoint());
        println!("按 Ctrl+C 停止\n");
        tracker.enable();

        let sleeper = SpinSleeper::default();
        let mut target = LatestOrientation::new();

        while running.load(Ordering::SeqCst) {
            let report = tracker.tick(&mut target);

            if let Some(sample) = report.sample() {
                self.print_sample(&sample, &report.snapshot)?;
            }
            if let TickOutcome::Failed(reason) = report.outcome {
                summarize(&report.snapshot);
                bail!("Tracker failed: {}", reason);
            }
            if self.ticks.is_some_and(|limit| report.snapshot.ticks >= limit) {
                break;
            }

            sleeper.sleep(period);
        }

        tracker.disable();
        summarize(&tracker.snapshot());
        Ok(())
    }

    fn print_sample(&self, sample: &OrientationSample, snapshot: &TrackerSnapshot) -> Result<()> {
        if self.json {
            let line = SampleLine {
                tick: snapshot.ticks,
                orientation: sample,
                fields: snapshot.fields_in_record(),
            };
            println!("{}", serde_json::to_string(&line)?);
        } else {
            println!(
                "[{:>6}] x={:>10} y={:>10} z={:>10}",
                snapshot.ticks,
                sample.x.to_string(),
                sample.y.to_string(),
                sample.z.to_string()
            );
        }
        Ok(())
    }
}

/// tick 频率允许的范围（Hz）
const MIN_RATE_HZ: f64 = 0.01;
const MAX_RATE_HZ: f64 = 10_000.0;

/// 由频率计算 tick 周期
fn tick_period(rate: f64) -> Result<Duration> {
    if !(MIN_RATE_HZ..=MAX_RATE_HZ).contains(&rate) {
        bail!(
            "Invalid rate: {} (must be in [{}, {}] Hz)",
            rate,
            MIN_RATE_HZ,
            MAX_RATE_HZ
        );
    }
    Duration::try_from_secs_f64(1.0 / rate).with_context(|| format!("Invalid rate: {}", rate))
}

fn summarize(snapshot: &TrackerSnapshot) {
    let decoder = &snapshot.decoder;
    info!(
        state = %snapshot.state,
        ticks = snapshot.ticks,
        retries = snapshot.retry_count,
        frames = decoder.frames_read,
        bytes = decoder.bytes_received_total,
        samples = decoder.samples_emitted,
        skipped = decoder.records_skipped,
        parse_failures = decoder.parse_failures,
        read_failures = decoder.read_failures,
        "tracking stopped"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorlog_driver::{Deg, Euler};

    #[test]
    fn test_sample_line_json() {
        let sample = Euler::new(Deg(90.0), Deg(0.0), Deg(-45.0));
        let line = SampleLine {
            tick: 7,
            orientation: &sample,
            fields: 24,
        };
        let json: serde_json::Value = serde_json::to_value(&line).unwrap();
        assert_eq!(json["tick"], 7);
        assert_eq!(json["fields"], 24);
        assert_eq!(json["orientation"]["x"], 90.0);
        assert_eq!(json["orientation"]["z"], -45.0);
    }

    #[test]
    fn test_invalid_rate_rejected() {
        let cmd = TrackCommand {
            connection: ConnectionArgs::default(),
            rate: 0.0,
            ticks: None,
            json: false,
        };
        assert!(cmd.execute().is_err());
    }

    #[test]
    fn test_tick_period_bounds() {
        assert_eq!(tick_period(50.0).unwrap(), Duration::from_millis(20));
        assert_eq!(tick_period(MIN_RATE_HZ).unwrap(), Duration::from_secs(100));
        assert!(tick_period(MAX_RATE_HZ).is_ok());

        for rate in [1e-300, 0.001, -1.0, 0.0, 10_001.0, f64::NAN, f64::INFINITY] {
            assert!(tick_period(rate).is_err(), "rate {} should be rejected", rate);
        }
    }

    #[test]
    fn test_tiny_rate_rejected_before_connecting() {
        let cmd = TrackCommand {
            connection: ConnectionArgs::default(),
            rate: 1e-300,
            ticks: None,
            json: false,
        };
        assert!(cmd.execute().is_err());
    }
}
