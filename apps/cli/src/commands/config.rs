//! 配置管理命令
//!
//! 配置按以下顺序合并（后者覆盖前者）：
//!
//! 1. 内置默认值
//! 2. 配置文件：`--config` 指定的文件；否则 `<config_dir>/sensorlog/config.toml`（存在时）
//! 3. 命令行参数 `--host` / `--port` / `--line-buffered`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use sensorlog_driver::{FramingMode, TrackerConfig};
use std::path::PathBuf;

/// 默认配置文件路径
fn default_config_file() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("sensorlog");
    path.push("config.toml");
    Some(path)
}

/// 连接参数（`track` 与 `config` 共用）
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 服务端 IPv4 地址（覆盖配置）
    #[arg(long)]
    pub host: Option<String>,

    /// 服务端端口（覆盖配置）
    #[arg(short, long)]
    pub port: Option<u16>,

    /// 使用行缓冲分帧（处理半行/多行读取）
    #[arg(long)]
    pub line_buffered: bool,
}

impl ConnectionArgs {
    /// 实际使用的配置文件（如果有）
    fn config_file(&self) -> Option<PathBuf> {
        match &self.config {
            Some(path) => Some(path.clone()),
            None => default_config_file().filter(|path| path.exists()),
        }
    }

    /// 合并默认值、配置文件与命令行参数，并校验结果
    pub fn resolve(&self) -> Result<TrackerConfig> {
        let mut config = match self.config_file() {
            Some(path) => TrackerConfig::load(&path)
                .with_context(|| format!("加载配置文件失败: {}", path.display()))?,
            None => TrackerConfig::default(),
        };

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.line_buffered {
            config.framing = FramingMode::LineBuffered;
        }

        config.validate().context("配置无效")?;
        Ok(config)
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 以 TOML 格式打印合并后的配置
    Show {
        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// 检查配置
    Check {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Show { connection } => Self::show(&connection),
            ConfigCommand::Check { connection } => Self::check(&connection),
        }
    }

    fn show(connection: &ConnectionArgs) -> Result<()> {
        let config = connection.resolve()?;
        print!("{}", config.to_toml_string()?);
        Ok(())
    }

    fn check(connection: &ConnectionArgs) -> Result<()> {
        let source = connection.config_file();
        let config = connection.resolve()?;

        match source {
            Some(path) => println!("配置文件: {}", path.display()),
            None => println!("配置文件: (未使用，采用默认值)"),
        }
        println!("  服务端: {}", config.endpoint());
        println!("  分帧: {:?}", config.framing);
        println!("  重试: {} 次 × {} ms", config.max_retries, config.poll_timeout_ms);
        println!("✅ 配置有效");
        Ok(())
    }
}
