// DyadLink L1 — point-to-point inter-processor message link.
//
// Crate root: module declarations and public re-exports.

pub mod error;
pub mod link;
pub mod loopback;

pub use error::{DyadLinkError, Result};
pub use link::{LinkPair, LinkReceiver, LinkSender};
