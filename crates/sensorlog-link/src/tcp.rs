//! 基于 mio 的 TCP 链路
//!
//! - 连接：`mio::net::TcpStream::connect` 本身就是非阻塞的，写就绪表示连接完成
//! - 轮询：单 token 的 `Poll`，等待时间由调用方给出（连接阶段 200ms）
//! - 读取：先直接读，`WouldBlock` 时等待读就绪直到读超时
//!
//! mio 是边沿触发的，所以这里从不依赖"事件是否到达"来判断状态：
//! 每次等待结束后都直接查询 socket（`take_error` / `peer_addr` / `read`）。

use crate::{ConnectProgress, Endpoint, LinkError, SensorLink};
use mio::net::TcpStream;
use mio::{Events, Interest, Poll, Token};
use std::io::{self, ErrorKind, Read};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

const STREAM: Token = Token(0);

/// TCP 链路
pub struct TcpLink {
    poll: Poll,
    events: Events,
    stream: Option<TcpStream>,
    established: bool,
    read_timeout: Option<Duration>,
}

impl TcpLink {
    /// 创建链路（此时不打开 socket）
    ///
    /// # Errors
    /// - `LinkError::Io`: 创建系统轮询器失败
    pub fn new() -> Result<Self, LinkError> {
        Ok(Self {
            poll: Poll::new()?,
            events: Events::with_capacity(8),
            stream: None,
            established: false,
            read_timeout: None,
        })
    }

    /// 等待 socket 事件（最多 `timeout`），被信号中断视为无事件
    fn wait(&mut self, timeout: Option<Duration>) -> Result<(), LinkError> {
        match self.poll.poll(&mut self.events, timeout) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(()),
            Err(e) => Err(LinkError::Io(e)),
        }
    }

    /// 查询连接尝试的当前状态
    fn connect_status(stream: &TcpStream) -> io::Result<ConnectProgress> {
        if let Some(err) = stream.take_error()? {
            return Ok(ConnectProgress::Refused(err));
        }
        match stream.peer_addr() {
            Ok(_) => Ok(ConnectProgress::Established),
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(ConnectProgress::Pending),
            Err(e) => Ok(ConnectProgress::Refused(e)),
        }
    }
}

impl SensorLink for TcpLink {
    fn begin_connect(&mut self, endpoint: &Endpoint) -> Result<(), LinkError> {
        self.close();

        let addr = endpoint.socket_addr()?;
        let mut stream = TcpStream::connect(addr).map_err(LinkError::Connect)?;
        self.poll.registry().register(
            &mut stream,
            STREAM,
            Interest::READABLE | Interest::WRITABLE,
        )?;

        debug!(%endpoint, "non-blocking connect issued");
        self.stream = Some(stream);
        Ok(())
    }

    fn poll_connect(&mut self, timeout: Duration) -> Result<ConnectProgress, LinkError> {
        if self.stream.is_none() {
            return Err(LinkError::NotConnected);
        }
        if self.established {
            return Ok(ConnectProgress::Established);
        }

        self.wait(Some(timeout))?;

        let Some(stream) = self.stream.as_ref() else {
            return Err(LinkError::NotConnected);
        };
        match Self::connect_status(stream)? {
            ConnectProgress::Established => {
                self.established = true;
                Ok(ConnectProgress::Established)
            },
            ConnectProgress::Refused(err) => {
                trace!(error = %err, "connect attempt failed, dropping socket");
                self.close();
                Ok(ConnectProgress::Refused(err))
            },
            ConnectProgress::Pending => Ok(ConnectProgress::Pending),
        }
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        self.read_timeout = timeout;
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        if !self.established {
            return Err(LinkError::NotConnected);
        }

        let deadline = self.read_timeout.map(|t| Instant::now() + t);
        loop {
            let stream = self.stream.as_mut().ok_or(LinkError::NotConnected)?;
            match stream.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::WouldBlock => {},
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(LinkError::Io(e)),
            }

            let remaining = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(LinkError::Timeout);
                    }
                    Some(deadline - now)
                },
                None => None,
            };
            self.wait(remaining)?;
        }
    }

    fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            // 注销失败不影响关闭，drop 会释放 fd
            let _ = self.poll.registry().deregister(&mut stream);
            trace!("socket closed");
        }
        self.established = false;
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for TcpLink {
    fn drop(&mut self) {
        self.close();
    }
}
