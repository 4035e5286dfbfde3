//! Anonymous pipes.
//!
//! A fixed 4KB ring buffer shared between one reader end and one writer
//! end. `read`/`write` block on their own [`WaitQueue`] when the buffer
//! can't satisfy the call yet, instead of returning `EAGAIN` — the buffer's
//! spinlock is always dropped before parking, since holding it across a
//! context switch would wedge whichever task needs it next.

use crate::lib::error::{Errno, Result};
use crate::process::WaitQueue;
use alloc::collections::VecDeque;
use alloc::sync::Arc;
use spin::Mutex;

const PIPE_BUF_SIZE: usize = 4096;

pub struct PipeBuffer {
    buffer: VecDeque<u8>,
    reader_count: usize,
    writer_count: usize,
    read_waiters: WaitQueue,
    write_waiters: WaitQueue,
}

impl PipeBuffer {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(PIPE_BUF_SIZE),
            reader_count: 1,
            writer_count: 1,
            read_waiters: WaitQueue::new(),
            write_waiters: WaitQueue::new(),
        }
    }
}

enum ReadOutcome {
    Done(usize),
    Eof,
    Block,
}

enum WriteOutcome {
    Done(usize),
    BrokenPipe,
    Block,
}

/// Pipe read end.
#[derive(Clone)]
pub struct PipeReader {
    buffer: Arc<Mutex<PipeBuffer>>,
}

impl PipeReader {
    pub fn new(buffer: Arc<Mutex<PipeBuffer>>) -> Self {
        buffer.lock().reader_count += 1;
        Self { buffer }
    }

    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let outcome = {
                let mut pb = self.buffer.lock();
                if !pb.buffer.is_empty() {
                    let n = buf.len().min(pb.buffer.len());
                    for slot in buf.iter_mut().take(n) {
                        *slot = pb.buffer.pop_front().unwrap();
                    }
                    pb.write_waiters.wake_all();
                    ReadOutcome::Done(n)
                } else if pb.writer_count == 0 {
                    ReadOutcome::Eof
                } else {
                    pb.read_waiters.park();
                    ReadOutcome::Block
                }
            };
            match outcome {
                ReadOutcome::Done(n) => return Ok(n),
                ReadOutcome::Eof => return Ok(0),
                ReadOutcome::Block => {
                    crate::lib::critical::enable();
                    crate::process::scheduler::schedule();
                }
            }
        }
    }
}

impl Drop for PipeReader {
    fn drop(&mut self) {
        let mut pb = self.buffer.lock();
        pb.reader_count = pb.reader_count.saturating_sub(1);
        if pb.reader_count == 0 {
            pb.write_waiters.wake_all();
        }
    }
}

/// Pipe write end.
#[derive(Clone)]
pub struct PipeWriter {
    buffer: Arc<Mutex<PipeBuffer>>,
}

impl PipeWriter {
    pub fn new(buffer: Arc<Mutex<PipeBuffer>>) -> Self {
        buffer.lock().writer_count += 1;
        Self { buffer }
    }

    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let outcome = {
                let mut pb = self.buffer.lock();
                if pb.reader_count == 0 {
                    WriteOutcome::BrokenPipe
                } else {
                    let available = PIPE_BUF_SIZE - pb.buffer.len();
                    if available > 0 {
                        let n = buf.len().min(available);
                        pb.buffer.extend(buf[..n].iter().copied());
                        pb.read_waiters.wake_all();
                        WriteOutcome::Done(n)
                    } else {
                        pb.write_waiters.park();
                        WriteOutcome::Block
                    }
                }
            };
            match outcome {
                WriteOutcome::Done(n) => return Ok(n),
                WriteOutcome::BrokenPipe => {
                    let _ = crate::process::signal::send_signal(
                        crate::process::current_pid(),
                        crate::process::signal::Signal::SIGPIPE,
                    );
                    return Err(Errno::EPIPE);
                }
                WriteOutcome::Block => {
                    crate::lib::critical::enable();
                    crate::process::scheduler::schedule();
                }
            }
        }
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        let mut pb = self.buffer.lock();
        pb.writer_count = pb.writer_count.saturating_sub(1);
        if pb.writer_count == 0 {
            pb.read_waiters.wake_all();
        }
    }
}

/// Create a connected reader/writer pair.
pub fn create_pipe() -> (PipeReader, PipeWriter) {
    let buffer = Arc::new(Mutex::new(PipeBuffer::new()));
    let reader = PipeReader { buffer: buffer.clone() };
    let writer = PipeWriter { buffer };
    (reader, writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let (reader, writer) = create_pipe();
        assert_eq!(writer.write(b"hello").unwrap(), 5);
        let mut buf = [0u8; 5];
        assert_eq!(reader.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn read_after_writer_dropped_returns_eof() {
        let (reader, writer) = create_pipe();
        drop(writer);
        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }
}
