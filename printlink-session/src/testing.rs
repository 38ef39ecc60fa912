//! Scripted in-memory channel for session tests

use std::collections::VecDeque;
use std::io::{self, ErrorKind};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use printlink_hal::{Channel, ChannelEnd, ChannelRx, ChannelTx};

/// What the read end produces next
enum Inbound {
    Chunk(Vec<u8>),
    Fail,
}

#[derive(Default)]
struct Script {
    inbound: VecDeque<Inbound>,
    written: Vec<u8>,
    released: Vec<ChannelEnd>,
    reads: usize,
    fail_acquire: bool,
    fail_write: bool,
    fail_release: Vec<ChannelEnd>,
}

/// Test-side handle onto a [`MockChannel`]
#[derive(Clone, Default)]
pub(crate) struct MockHandle {
    script: Arc<Mutex<Script>>,
}

impl MockHandle {
    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }

    pub(crate) fn channel(&self) -> MockChannel {
        MockChannel {
            handle: self.clone(),
        }
    }

    /// Queue bytes for the read end; each call is one chunk
    pub(crate) fn push_chunk(&self, bytes: &[u8]) {
        self.lock().inbound.push_back(Inbound::Chunk(bytes.to_vec()));
    }

    /// Queue a read failure after any chunks already queued
    pub(crate) fn push_read_failure(&self) {
        self.lock().inbound.push_back(Inbound::Fail);
    }

    pub(crate) fn fail_acquire(&self) {
        self.lock().fail_acquire = true;
    }

    pub(crate) fn set_fail_write(&self, fail: bool) {
        self.lock().fail_write = fail;
    }

    pub(crate) fn fail_release(&self, end: ChannelEnd) {
        self.lock().fail_release.push(end);
    }

    pub(crate) fn written(&self) -> Vec<u8> {
        self.lock().written.clone()
    }

    /// Release calls, in order, including failed ones
    pub(crate) fn released(&self) -> Vec<ChannelEnd> {
        self.lock().released.clone()
    }

    pub(crate) fn reads(&self) -> usize {
        self.lock().reads
    }

    pub(crate) fn inbound_drained(&self) -> bool {
        self.lock().inbound.is_empty()
    }

    fn release(&self, end: ChannelEnd) -> io::Result<()> {
        let mut script = self.lock();
        script.released.push(end);
        if script.fail_release.contains(&end) {
            return Err(io::Error::new(ErrorKind::Other, format!("{end} stuck")));
        }
        Ok(())
    }
}

pub(crate) struct MockChannel {
    handle: MockHandle,
}

impl Channel for MockChannel {
    type Error = io::Error;
    type Rx = MockRx;
    type Tx = MockTx;

    fn acquire(&mut self) -> io::Result<(MockRx, MockTx)> {
        if self.handle.lock().fail_acquire {
            return Err(io::Error::new(ErrorKind::NotConnected, "device unreachable"));
        }
        Ok((
            MockRx {
                handle: self.handle.clone(),
            },
            MockTx {
                handle: self.handle.clone(),
            },
        ))
    }

    fn close(&mut self) -> io::Result<()> {
        self.handle.release(ChannelEnd::Channel)
    }
}

pub(crate) struct MockRx {
    handle: MockHandle,
}

impl ChannelRx for MockRx {
    type Error = io::Error;

    fn bytes_available(&mut self) -> io::Result<usize> {
        let mut script = self.handle.lock();
        match script.inbound.front() {
            None => Ok(0),
            Some(Inbound::Chunk(bytes)) => Ok(bytes.len()),
            Some(Inbound::Fail) => {
                script.inbound.pop_front();
                Err(io::Error::new(ErrorKind::ConnectionReset, "link dropped"))
            }
        }
    }

    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut script = self.handle.lock();
        script.reads += 1;
        let Some(Inbound::Chunk(bytes)) = script.inbound.front_mut() else {
            return Ok(0);
        };
        let n = buf.len().min(bytes.len());
        buf[..n].copy_from_slice(&bytes[..n]);
        bytes.drain(..n);
        if bytes.is_empty() {
            script.inbound.pop_front();
        }
        Ok(n)
    }

    fn close(&mut self) -> io::Result<()> {
        self.handle.release(ChannelEnd::Read)
    }
}

pub(crate) struct MockTx {
    handle: MockHandle,
}

impl ChannelTx for MockTx {
    type Error = io::Error;

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        let mut script = self.handle.lock();
        if script.fail_write {
            return Err(io::Error::new(ErrorKind::BrokenPipe, "printer offline"));
        }
        script.written.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.handle.release(ChannelEnd::Write)
    }
}

/// Poll `condition` until it holds or a generous deadline passes
pub(crate) fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}
