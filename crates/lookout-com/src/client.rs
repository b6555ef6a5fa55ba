use crate::{ComError, MessageReader};
use lookout_video::Frame;
use std::net::SocketAddr;
use tokio::net::{TcpStream, ToSocketAddrs};

/// Receiving end of a frame stream.
///
/// Holds one connection and the bytes already read from it. Reconnecting is up
/// to the owner: drop the client and connect a new one.
pub struct FrameClient {
    reader: MessageReader<TcpStream>,
    peer_addr: SocketAddr,
}

impl FrameClient {
    /// Connect to a `FrameServer`.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, ComError> {
        let stream = TcpStream::connect(addr).await?;
        Self::from_stream(stream)
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream) -> Result<Self, ComError> {
        let peer_addr = stream.peer_addr()?;
        log::info!("connected to frame server {}", peer_addr);
        Ok(Self {
            reader: MessageReader::new(stream),
            peer_addr,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Wait for the next complete frame.
    ///
    /// Returns `ComError::ConnectionClosed` when the server hangs up between
    /// frames and `ComError::Truncated` when it hangs up inside one.
    pub async fn next_frame(&mut self) -> Result<Frame, ComError> {
        self.reader.read_message().await
    }
}
