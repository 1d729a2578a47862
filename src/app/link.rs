//! Host link framing.
//!
//! [`HostLink`] owns the read side of the primary stream: it accumulates
//! whatever the transport delivers, hands out complete `\n`-terminated lines,
//! and serves the exact-count raw reads that `serial:<N>` relays need.
//!
//! Framing must live in one place: a relay command's payload bytes can arrive
//! in the same transport read as the command line itself, so whoever splits
//! lines also has to own the leftover bytes. Pulling raw bytes straight from
//! the port behind the framer's back would lose them.

use std::collections::VecDeque;

use super::ports::HostPort;

/// Transport read chunk size. Reads may return far less; the accumulation
/// loops tolerate any fragmentation.
const READ_CHUNK: usize = 64;

/// Sleep between empty transport reads while a relay waits for its payload,
/// so the blocking accumulation loop does not pin the core.
const RETRY_BACKOFF: std::time::Duration = std::time::Duration::from_millis(1);

/// Line framing and byte accounting over a [`HostPort`] transport.
pub struct HostLink<T: HostPort> {
    transport: T,
    pending: VecDeque<u8>,
}

impl<T: HostPort> HostLink<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            pending: VecDeque::new(),
        }
    }

    /// Pull whatever the transport has buffered right now into `pending`.
    fn fill(&mut self) -> usize {
        let mut chunk = [0u8; READ_CHUNK];
        let n = self.transport.read_bytes(&mut chunk);
        self.pending.extend(&chunk[..n]);
        n
    }

    /// Return the next complete line, if one is buffered or arrives in the
    /// current transport read. The trailing `\n` (and `\r`, for host-side
    /// tools that send CRLF) is stripped. Non-blocking apart from one
    /// transport read.
    pub fn poll_line(&mut self) -> Option<String> {
        if !self.pending.contains(&b'\n') {
            self.fill();
        }
        let pos = self.pending.iter().position(|&b| b == b'\n')?;

        let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
        line.pop(); // the newline itself
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Block until exactly `count` raw bytes are available and return them.
    ///
    /// Bytes already sitting in the frame buffer are consumed first; the
    /// remainder is accumulated from the transport, which may deliver any
    /// fragmentation including zero-byte reads. A large `count` blocks the
    /// whole loop until satisfied — that is the protocol's contract.
    pub fn read_exact(&mut self, count: usize) -> Vec<u8> {
        let mut buf = Vec::with_capacity(count);
        while buf.len() < count {
            match self.pending.pop_front() {
                Some(b) => buf.push(b),
                // Nothing buffered; poll the transport until more arrives,
                // backing off when it has nothing either.
                None => {
                    if self.fill() == 0 {
                        std::thread::sleep(RETRY_BACKOFF);
                    }
                }
            }
        }
        buf
    }

    /// Write a protocol response line.
    pub fn write_line(&mut self, line: &str) {
        self.transport.write_line(line);
    }

    /// Write unframed raw bytes (peripheral drain payloads).
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.transport.write_raw(bytes);
    }

    /// Borrow the underlying transport (tests assert on fake output here).
    pub fn transport(&self) -> &T {
        &self.transport
    }
}
