use std::{
    io::{self, Read, Write},
    net::{Shutdown, TcpStream},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

/// Socket view that shrinks the read and write timeouts before every call so
/// the whole exchange is over by `deadline`, however the peer paces its bytes.
pub(super) struct DeadlineStream<'a> {
    stream: &'a TcpStream,
    deadline: Option<Instant>,
}

impl<'a> DeadlineStream<'a> {
    /// `budget` counts from now. A budget too large to represent leaves the
    /// socket timeouts as they are.
    pub(super) fn new(stream: &'a TcpStream, budget: Duration) -> Self {
        Self {
            stream,
            deadline: Instant::now().checked_add(budget),
        }
    }

    fn remaining(&self) -> io::Result<Option<Duration>> {
        let Some(deadline) = self.deadline else {
            return Ok(None);
        };
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "status exchange exceeded its deadline",
            ));
        }
        Ok(Some(remaining))
    }
}

impl Read for DeadlineStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(remaining) = self.remaining()? {
            self.stream.set_read_timeout(Some(remaining))?;
        }
        let mut stream = self.stream;
        stream.read(buf)
    }
}

impl Write for DeadlineStream<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(remaining) = self.remaining()? {
            self.stream.set_write_timeout(Some(remaining))?;
        }
        let mut stream = self.stream;
        stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut stream = self.stream;
        stream.flush()
    }
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: bool,
    stream: Option<TcpStream>,
}

/// Aborts a [`SlpClient::query_cancellable`](super::SlpClient::query_cancellable)
/// from another thread by shutting its socket down, which wakes any read or
/// write blocked on it.
///
/// A handle covers one query at a time. Once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    state: Arc<Mutex<CancelState>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let mut state = self.lock();
        state.cancelled = true;
        if let Some(stream) = state.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Registers the socket of the query in flight. Fails when the handle was
    /// cancelled before the connection came up.
    pub(super) fn attach(&self, stream: &TcpStream) -> io::Result<()> {
        let mut state = self.lock();
        if state.cancelled {
            return Err(cancelled());
        }
        state.stream = Some(stream.try_clone()?);
        Ok(())
    }

    pub(super) fn detach(&self) {
        self.lock().stream = None;
    }

    fn lock(&self) -> MutexGuard<'_, CancelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(super) fn cancelled() -> io::Error {
    io::Error::new(io::ErrorKind::ConnectionAborted, "status query cancelled")
}
