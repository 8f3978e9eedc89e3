//! 按行重组字节流
//!
//! 一次 TCP 读取可能停在一条记录中间，也可能包含多条记录。
//! `LineFramer` 缓存收到的字节，每遇到 `\n` 输出一行，未结束的尾部留到下一次 `push()`。

use crate::constants::LINE_TERMINATOR;

/// 行缓冲器
///
/// 输出的行不含结束符（以及它前面的 `\r`）。按有损 UTF-8 解码，个别非法字节不会中断分帧。
#[derive(Debug)]
pub struct LineFramer {
    buffer: Vec<u8>,
    max_pending: usize,
    overflows: u64,
}

impl LineFramer {
    /// 创建行缓冲器，最多缓存 `max_pending` 个未结束的字节
    ///
    /// 超过上限仍未遇到结束符时丢弃已缓存的字节，并累加 [`overflows`](Self::overflows)。
    pub fn new(max_pending: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(max_pending.min(4096)),
            max_pending: max_pending.max(1),
            overflows: 0,
        }
    }

    /// 写入新字节，返回其中所有完整的行
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();

        for &b in bytes {
            if b == LINE_TERMINATOR {
                let mut end = self.buffer.len();
                if end > 0 && self.buffer[end - 1] == b'\r' {
                    end -= 1;
                }
                lines.push(String::from_utf8_lossy(&self.buffer[..end]).into_owned());
                self.buffer.clear();
                continue;
            }

            if self.buffer.len() >= self.max_pending {
                // 没有结束符的垃圾数据，等下一个 `\n` 重新同步
                self.buffer.clear();
                self.overflows += 1;
            }
            self.buffer.push(b);
        }

        lines
    }

    /// 未结束行已缓存的字节数
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// 因超过上限而丢弃缓存的次数
    pub fn overflows(&self) -> u64 {
        self.overflows
    }

    /// 丢弃未结束的半行
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_READ_BUFFER_SIZE * 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_simple() {
        let mut framer = LineFramer::default();
        let lines = framer.push(b"Hello\nWorld\n");
        assert_eq!(lines, vec!["Hello".to_string(), "World".to_string()]);
        assert_eq!(framer.pending_len(), 0);
    }

    #[test]
    fn test_lines_split_across_pushes() {
        let mut framer = LineFramer::default();
        assert!(framer.push(b"1,2,").is_empty());
        assert_eq!(framer.pending_len(), 4);

        let lines = framer.push(b"3\n4,");
        assert_eq!(lines, vec!["1,2,3".to_string()]);
        assert_eq!(framer.pending_len(), 2);
    }

    #[test]
    fn test_crlf_is_stripped() {
        let mut framer = LineFramer::default();
        assert_eq!(framer.push(b"Test\r\n"), vec!["Test".to_string()]);
    }

    #[test]
    fn test_empty_line() {
        let mut framer = LineFramer::default();
        assert_eq!(framer.push(b"\n"), vec![String::new()]);
    }

    #[test]
    fn test_overflow_drops_pending_bytes() {
        let mut framer = LineFramer::new(4);
        assert!(framer.push(b"abcdef").is_empty());
        assert_eq!(framer.overflows(), 1);
        assert_eq!(framer.push(b"\n"), vec!["ef".to_string()]);
    }

    #[test]
    fn test_reset() {
        let mut framer = LineFramer::default();
        framer.push(b"partial");
        framer.reset();
        assert_eq!(framer.pending_len(), 0);
        assert_eq!(framer.push(b"next\n"), vec!["next".to_string()]);
    }
}
