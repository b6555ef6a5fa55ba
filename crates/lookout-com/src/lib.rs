//! Frame streaming over TCP.
//!
//! Every message is an 8-byte little-endian length followed by that many
//! payload bytes. The camera side runs a [`FrameServer`] that pushes frames to
//! exactly one [`FrameClient`] at a time.

pub mod client;
pub mod error;
pub mod feed;
pub mod framing;
pub mod server;

pub use client::FrameClient;
pub use error::{ComError, ErrorKind};
pub use feed::FrameFeed;
pub use framing::MessageReader;
pub use server::FrameServer;
