// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Input sources: where `getch` gets its bytes.
//
// `getch` is synchronous. It asks its source for bytes with a timeout, so
// it can flush a lone ESC after the escape delay and notice a resize while
// nothing is being typed. On a terminal that is `poll()` on fd 0 followed
// by one `read()`. Tests hand the screen a scripted source instead.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

/// Byte chunk read from stdin.
///
/// A single keypress is 1-6 bytes, a paste can be kilobytes. 4 KB handles
/// both without waste.
const READ_BUF_SIZE: usize = 4096;

/// What a single read attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Raw bytes, never empty.
    Bytes(Vec<u8>),
    /// Nothing arrived within the timeout.
    Timeout,
    /// A signal interrupted the wait (typically SIGWINCH).
    Interrupted,
    /// End of input: the terminal hung up or the script ran out.
    Closed,
}

/// A source of raw input bytes.
pub trait InputSource {
    /// Wait up to `timeout` for input.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails for a reason other than
    /// a signal interruption.
    fn read(&mut self, timeout: Duration) -> io::Result<ReadOutcome>;
}

// ─── StdinSource ─────────────────────────────────────────────────────────────

/// Reads the controlling terminal through fd 0.
#[derive(Debug, Default)]
pub struct StdinSource {
    buf: Vec<u8>,
}

impl StdinSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0; READ_BUF_SIZE],
        }
    }
}

/// Milliseconds for `poll()`, saturating at `i32::MAX`.
fn poll_timeout_ms(timeout: Duration) -> i32 {
    i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX)
}

#[cfg(unix)]
impl InputSource for StdinSource {
    fn read(&mut self, timeout: Duration) -> io::Result<ReadOutcome> {
        if self.buf.len() < READ_BUF_SIZE {
            self.buf.resize(READ_BUF_SIZE, 0);
        }

        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd: libc::STDIN_FILENO,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, poll_timeout_ms(timeout))
        };

        if ready < 0 {
            let err = io::Error::last_os_error();
            return if err.kind() == io::ErrorKind::Interrupted {
                Ok(ReadOutcome::Interrupted)
            } else {
                Err(err)
            };
        }
        if ready == 0 {
            return Ok(ReadOutcome::Timeout);
        }

        let n = unsafe {
            libc::read(
                libc::STDIN_FILENO,
                self.buf.as_mut_ptr().cast(),
                self.buf.len(),
            )
        };

        match usize::try_from(n) {
            Ok(0) => Ok(ReadOutcome::Closed),
            Ok(n) => Ok(ReadOutcome::Bytes(self.buf[..n].to_vec())),
            Err(_) => {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    Ok(ReadOutcome::Interrupted)
                } else {
                    Err(err)
                }
            }
        }
    }
}

/// Without `poll()` the timeout cannot be honored; reads block.
#[cfg(not(unix))]
impl InputSource for StdinSource {
    fn read(&mut self, _timeout: Duration) -> io::Result<ReadOutcome> {
        use std::io::Read;

        if self.buf.len() < READ_BUF_SIZE {
            self.buf.resize(READ_BUF_SIZE, 0);
        }
        match io::stdin().lock().read(&mut self.buf) {
            Ok(0) => Ok(ReadOutcome::Closed),
            Ok(n) => Ok(ReadOutcome::Bytes(self.buf[..n].to_vec())),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(ReadOutcome::Interrupted),
            Err(e) => Err(e),
        }
    }
}

// ─── ScriptedInput ───────────────────────────────────────────────────────────

/// Replays a fixed script of input, one step per read.
///
/// Each pushed chunk is delivered by one `read` call, so a chunk boundary is
/// a point where the parser may see an incomplete escape sequence. A pause
/// makes one read time out. Once the script is exhausted every read reports
/// [`ReadOutcome::Closed`].
///
/// ```
/// use std::time::Duration;
/// use s_term::reader::{InputSource, ReadOutcome, ScriptedInput};
///
/// let mut input = ScriptedInput::new().bytes(b"\x1b").pause().bytes(b"q");
/// let t = Duration::from_millis(1);
///
/// assert_eq!(input.read(t).unwrap(), ReadOutcome::Bytes(b"\x1b".to_vec()));
/// assert_eq!(input.read(t).unwrap(), ReadOutcome::Timeout);
/// assert_eq!(input.read(t).unwrap(), ReadOutcome::Bytes(b"q".to_vec()));
/// assert_eq!(input.read(t).unwrap(), ReadOutcome::Closed);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    steps: VecDeque<ReadOutcome>,
}

impl ScriptedInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of bytes. Empty chunks are ignored.
    #[must_use]
    pub fn bytes(mut self, data: &[u8]) -> Self {
        self.push_bytes(data);
        self
    }

    /// Append a read that times out.
    #[must_use]
    pub fn pause(mut self) -> Self {
        self.steps.push_back(ReadOutcome::Timeout);
        self
    }

    /// Append a chunk of bytes to an existing script.
    pub fn push_bytes(&mut self, data: &[u8]) {
        if !data.is_empty() {
            self.steps.push_back(ReadOutcome::Bytes(data.to_vec()));
        }
    }
}

impl InputSource for ScriptedInput {
    fn read(&mut self, _timeout: Duration) -> io::Result<ReadOutcome> {
        Ok(self.steps.pop_front().unwrap_or(ReadOutcome::Closed))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
