//! # SensorLog CLI
//!
//! 以固定频率驱动 `Tracker::tick()` 的宿主程序，用于联调 SensorLog App 与手动测试。
//!
//! ```bash
//! # 连接手机（默认 192.168.1.2:49482），60 Hz 打印姿态
//! sensorlog-cli track
//!
//! # 指定地址，输出 JSON，跑 600 帧后退出
//! sensorlog-cli track --host 10.0.0.7 --json --ticks 600
//!
//! # 查看/检查合并后的配置
//! sensorlog-cli config show
//! sensorlog-cli config check --config ./sensorlog.toml
//! ```
//!
//! 日志级别通过 `RUST_LOG` 控制，默认 `sensorlog=info`。

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{ConfigCommand, TrackCommand};

/// SensorLog CLI - 姿态跟踪命令行工具
#[derive(Parser, Debug)]
#[command(name = "sensorlog-cli")]
#[command(about = "Stream orientation samples from the SensorLog app", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 连接并持续输出姿态
    Track {
        #[command(flatten)]
        args: TrackCommand,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sensorlog=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Track { args } => args.execute(),
        Commands::Config(cmd) => cmd.execute(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_track() {
        let cli = Cli::try_parse_from([
            "sensorlog-cli",
            "track",
            "--host",
            "10.0.0.7",
            "--rate",
            "30",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Track { args } => {
                assert_eq!(args.connection.host.as_deref(), Some("10.0.0.7"));
                assert_eq!(args.rate, 30.0);
                assert!(args.json);
                assert_eq!(args.ticks, None);
            },
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_check() {
        let cli =
            Cli::try_parse_from(["sensorlog-cli", "config", "check", "--port", "5000"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigCommand::Check { .. })));
    }
}
