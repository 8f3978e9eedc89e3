//! 命令定义和实现

pub mod config;
pub mod track;

pub use config::{ConfigCommand, ConnectionArgs};
pub use track::TrackCommand;
