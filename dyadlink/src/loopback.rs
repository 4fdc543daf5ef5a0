//! In-memory loopback link.
//!
//! Two FIFO byte-frame channels wired head-to-tail so that two participants
//! on the same host can run a real blocking exchange against each other.
//! Used by the test suites and by host-side simulation of the dual-processor
//! topology; delivery is reliable and ordered, matching the hardware channel
//! contract.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::{DyadLinkError, Result};
use crate::link::{LinkPair, LinkReceiver, LinkSender};

struct ChannelState {
    frames: VecDeque<Vec<u8>>,
    sender_alive: bool,
}

/// One direction of the loopback: a frame queue plus the condvar that
/// `wait` blocks on.
struct Channel {
    state: Mutex<ChannelState>,
    ready: Condvar,
}

impl Channel {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ChannelState {
                frames: VecDeque::new(),
                sender_alive: true,
            }),
            ready: Condvar::new(),
        })
    }
}

/// Sending endpoint of one loopback direction.
pub struct LoopbackSender {
    channel: Arc<Channel>,
    initialized: bool,
}

impl LinkSender for LoopbackSender {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Err(DyadLinkError::AlreadyInitialized);
        }
        self.initialized = true;
        Ok(())
    }

    fn send(&mut self, frame: &[u8]) -> Result<()> {
        if !self.initialized {
            return Err(DyadLinkError::NotInitialized);
        }
        let mut state = self.channel.state.lock();
        state.frames.push_back(frame.to_vec());
        tracing::trace!(len = frame.len(), "loopback frame queued");
        self.channel.ready.notify_one();
        Ok(())
    }
}

impl Drop for LoopbackSender {
    fn drop(&mut self) {
        // Wake any blocked receiver so it can observe the disconnect.
        self.channel.state.lock().sender_alive = false;
        self.channel.ready.notify_all();
    }
}

/// Receiving endpoint of one loopback direction.
pub struct LoopbackReceiver {
    channel: Arc<Channel>,
    initialized: bool,
}

impl LinkReceiver for LoopbackReceiver {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Err(DyadLinkError::AlreadyInitialized);
        }
        self.initialized = true;
        Ok(())
    }

    fn wait(&mut self) -> Result<()> {
        if !self.initialized {
            return Err(DyadLinkError::NotInitialized);
        }
        let mut state = self.channel.state.lock();
        loop {
            // Pending frames are delivered even after the sender is gone.
            if !state.frames.is_empty() {
                return Ok(());
            }
            if !state.sender_alive {
                return Err(DyadLinkError::Disconnected);
            }
            self.channel.ready.wait(&mut state);
        }
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        if !self.initialized {
            return Err(DyadLinkError::NotInitialized);
        }
        let mut state = self.channel.state.lock();
        let frame = state.frames.pop_front().ok_or(DyadLinkError::Empty)?;
        if frame.len() > buf.len() {
            // Leave the frame queued; the caller may retry with a larger buffer.
            let len = frame.len();
            state.frames.push_front(frame);
            return Err(DyadLinkError::BufferTooSmall {
                frame: len,
                buffer: buf.len(),
            });
        }
        buf[..frame.len()].copy_from_slice(&frame);
        Ok(frame.len())
    }
}

/// Build both participants' link handles, cross-wired: what participant 0
/// sends, participant 1 receives, and vice versa. The tuple is indexed by
/// role: `.0` belongs to the role-0 participant, `.1` to role 1.
pub fn pair() -> (LinkPair, LinkPair) {
    let zero_to_one = Channel::new();
    let one_to_zero = Channel::new();

    let first = LinkPair::new(
        Box::new(LoopbackSender {
            channel: zero_to_one.clone(),
            initialized: false,
        }),
        Box::new(LoopbackReceiver {
            channel: one_to_zero.clone(),
            initialized: false,
        }),
    );
    let second = LinkPair::new(
        Box::new(LoopbackSender {
            channel: one_to_zero,
            initialized: false,
        }),
        Box::new(LoopbackReceiver {
            channel: zero_to_one,
            initialized: false,
        }),
    );
    (first, second)
}
