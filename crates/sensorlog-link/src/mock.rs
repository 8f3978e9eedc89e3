//! Mock 链路
//!
//! 用于测试的可编排链路：按队列返回连接/轮询/读取结果，并统计每一类 socket 操作的次数，
//! 测试可以直接断言"每次 tick 最多轮询一次""失败后不再有任何 socket 操作"等性质。
//!
//! ```rust,ignore
//! use sensorlog_link::mock::{MockLink, PollScript};
//! use sensorlog_link::{Endpoint, SensorLink};
//! use std::time::Duration;
//!
//! let (mut link, handle) = MockLink::new();
//! handle.push_poll(PollScript::Established);
//! handle.push_read_line("a,b,c\n");
//!
//! link.begin_connect(&Endpoint::new("127.0.0.1", 49482)).unwrap();
//! link.poll_connect(Duration::from_millis(200)).unwrap();
//!
//! let mut buf = [0u8; 64];
//! assert_eq!(link.read(&mut buf).unwrap(), 6);
//! assert_eq!(handle.counters().reads, 1);
//! ```

use crate::{ConnectProgress, Endpoint, LinkError, SensorLink};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// `begin_connect()` 的编排结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginScript {
    /// 连接已发起
    Ok,
    /// 同步失败（暂时性，如对端未监听）
    Transient,
    /// 致命错误（如地址非法）
    Fatal,
}

/// `poll_connect()` 的编排结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollScript {
    Pending,
    Established,
    Refused,
    /// 轮询本身出错（致命）
    Fatal,
}

/// `read()` 的编排结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadScript {
    Data(Vec<u8>),
    Timeout,
    Error,
}

/// 各类操作的调用次数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockCounters {
    pub begin_connects: u64,
    pub polls: u64,
    pub reads: u64,
    pub closes: u64,
}

impl MockCounters {
    /// 除 `close()` 以外的 socket 操作总数
    pub fn io_operations(&self) -> u64 {
        self.begin_connects + self.polls + self.reads
    }
}

#[derive(Debug)]
struct MockState {
    begin_script: VecDeque<BeginScript>,
    poll_script: VecDeque<PollScript>,
    read_script: VecDeque<ReadScript>,
    default_poll: PollScript,
    counters: MockCounters,
    open: bool,
    established: bool,
    read_timeout: Option<Duration>,
    last_endpoint: Option<Endpoint>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            begin_script: VecDeque::new(),
            poll_script: VecDeque::new(),
            read_script: VecDeque::new(),
            default_poll: PollScript::Pending,
            counters: MockCounters::default(),
            open: false,
            established: false,
            read_timeout: None,
            last_endpoint: None,
        }
    }
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock 链路（交给被测对象）
#[derive(Debug)]
pub struct MockLink {
    state: Arc<Mutex<MockState>>,
}

/// Mock 链路的控制句柄（留在测试里编排与检查）
#[derive(Debug, Clone)]
pub struct MockLinkHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockLink {
    /// 创建链路与控制句柄
    ///
    /// 默认行为：`begin_connect` 成功，`poll_connect` 一直 Pending，`read` 超时。
    pub fn new() -> (Self, MockLinkHandle) {
        let state = Arc::new(Mutex::new(MockState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MockLinkHandle { state },
        )
    }
}

impl MockLinkHandle {
    pub fn push_begin(&self, script: BeginScript) {
        lock(&self.state).begin_script.push_back(script);
    }

    pub fn push_poll(&self, script: PollScript) {
        lock(&self.state).poll_script.push_back(script);
    }

    /// 轮询队列耗尽后的默认结果
    pub fn set_default_poll(&self, script: PollScript) {
        lock(&self.state).default_poll = script;
    }

    pub fn push_read(&self, script: ReadScript) {
        lock(&self.state).read_script.push_back(script);
    }

    pub fn push_read_line(&self, line: &str) {
        self.push_read(ReadScript::Data(line.as_bytes().to_vec()));
    }

    pub fn counters(&self) -> MockCounters {
        lock(&self.state).counters
    }

    pub fn is_open(&self) -> bool {
        lock(&self.state).open
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        lock(&self.state).read_timeout
    }

    pub fn last_endpoint(&self) -> Option<Endpoint> {
        lock(&self.state).last_endpoint.clone()
    }
}

impl SensorLink for MockLink {
    fn begin_connect(&mut self, endpoint: &Endpoint) -> Result<(), LinkError> {
        let mut state = lock(&self.state);
        state.counters.begin_connects += 1;
        state.last_endpoint = Some(endpoint.clone());
        state.open = false;
        state.established = false;

        match state.begin_script.pop_front().unwrap_or(BeginScript::Ok) {
            BeginScript::Ok => {
                state.open = true;
                Ok(())
            },
            BeginScript::Transient => Err(LinkError::Connect(io::Error::from(
                io::ErrorKind::ConnectionRefused,
            ))),
            BeginScript::Fatal => Err(LinkError::InvalidEndpoint(endpoint.to_string())),
        }
    }

    fn poll_connect(&mut self, _timeout: Duration) -> Result<ConnectProgress, LinkError> {
        let mut state = lock(&self.state);
        state.counters.polls += 1;
        if !state.open {
            return Err(LinkError::NotConnected);
        }

        let default_poll = state.default_poll;
        match state.poll_script.pop_front().unwrap_or(default_poll) {
            PollScript::Pending => Ok(ConnectProgress::Pending),
            PollScript::Established => {
                state.established = true;
                Ok(ConnectProgress::Established)
            },
            PollScript::Refused => {
                state.open = false;
                Ok(ConnectProgress::Refused(io::Error::from(
                    io::ErrorKind::ConnectionRefused,
                )))
            },
            PollScript::Fatal => Err(LinkError::Io(io::Error::other("mock poll failure"))),
        }
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        lock(&self.state).read_timeout = timeout;
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        let mut state = lock(&self.state);
        state.counters.reads += 1;
        if !state.established {
            return Err(LinkError::NotConnected);
        }

        match state.read_script.pop_front() {
            Some(ReadScript::Data(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    // 超出缓冲区的部分留给下一次读取
                    state.read_script.push_front(ReadScript::Data(bytes[n..].to_vec()));
                }
                Ok(n)
            },
            Some(ReadScript::Timeout) | None => Err(LinkError::Timeout),
            Some(ReadScript::Error) => Err(LinkError::Io(io::Error::from(
                io::ErrorKind::ConnectionReset,
            ))),
        }
    }

    fn close(&mut self) {
        let mut state = lock(&self.state);
        state.counters.closes += 1;
        state.open = false;
        state.established = false;
    }

    fn is_open(&self) -> bool {
        lock(&self.state).open
    }
}
