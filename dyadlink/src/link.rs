//! Link endpoint traits and the per-role handle bundle.
//!
//! A link is one physical direction of the inter-processor channel. Each
//! participant owns exactly one outbound endpoint (its sender) and one
//! inbound endpoint (its receiver); together they form a [`LinkPair`].
//! Frames are opaque byte slices — this layer knows nothing about the
//! protocol running on top of it.

use crate::error::Result;

/// The sending side of one link direction.
pub trait LinkSender: Send {
    /// Bring the underlying channel up. Returns
    /// [`DyadLinkError::AlreadyInitialized`](crate::DyadLinkError::AlreadyInitialized)
    /// if a previous boot stage already did so; callers that merely need the
    /// endpoint usable should treat that as success.
    fn init(&mut self) -> Result<()>;

    /// Transmit one complete frame. Blocks until the frame has been handed
    /// to the channel.
    fn send(&mut self, frame: &[u8]) -> Result<()>;
}

/// The receiving side of one link direction.
pub trait LinkReceiver: Send {
    /// Bring the underlying channel up. Same double-init contract as
    /// [`LinkSender::init`].
    fn init(&mut self) -> Result<()>;

    /// Block until at least one complete frame is pending.
    fn wait(&mut self) -> Result<()>;

    /// Copy the oldest pending frame into `buf`, returning its length.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// Both endpoints a single participant drives: its outbound sender and its
/// inbound receiver. Built from the platform's channel topology (which
/// physical endpoint pair belongs to which participant) and injected into
/// whatever protocol runs over the link.
pub struct LinkPair {
    pub sender: Box<dyn LinkSender>,
    pub receiver: Box<dyn LinkReceiver>,
}

impl LinkPair {
    pub fn new(sender: Box<dyn LinkSender>, receiver: Box<dyn LinkReceiver>) -> Self {
        Self { sender, receiver }
    }
}
