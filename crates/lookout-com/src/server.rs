use crate::{ComError, ErrorKind, framing};
use lookout_video::{CaptureError, CaptureSource};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

// backoff after a failed accept, so persistent errors don't spin the CPU
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Pushes captured frames to one consumer at a time.
///
/// While a consumer is connected no other connection is accepted; a second
/// consumer waits in the listen backlog until the first one goes away.
pub struct FrameServer {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl FrameServer {
    /// Bind a TCP listener. Nothing is accepted until `serve` runs.
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, ComError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        log::info!("frame server listening on {}", local_addr);
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Return the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the next consumer. Accept errors are logged and retried.
    pub async fn accept(&self) -> (TcpStream, SocketAddr) {
        loop {
            match self.listener.accept().await {
                Ok(accepted) => return accepted,
                Err(e) => {
                    log::warn!("accept error: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }

    /// Serve consumers one after another, forever.
    ///
    /// A consumer that disconnects, fails a write, or otherwise breaks its
    /// connection is dropped and the server goes back to accepting. Only a
    /// capture failure ends the loop; the error is returned so the caller can
    /// decide whether to reopen the source or exit.
    pub async fn serve<S: CaptureSource>(&self, source: &mut S) -> Result<Infallible, ComError> {
        loop {
            if !source.is_available() {
                return Err(CaptureError::Unavailable.into());
            }

            let (mut stream, addr) = self.accept().await;
            log::info!("consumer {} connected", addr);

            let Err(error) = Self::serve_connection(&mut stream, source).await;
            match error.kind() {
                ErrorKind::Capture => {
                    log::error!("capture failed while serving {}: {}", addr, error);
                    return Err(error);
                }
                ErrorKind::Transport | ErrorKind::Protocol => {
                    log::warn!("consumer {} dropped: {}", addr, error);
                }
            }
        }
    }

    /// Capture and send frames on one connection until either side fails.
    ///
    /// Each frame is written completely before the next one is captured, so a
    /// slow consumer slows capture down instead of piling up frames. A frame too
    /// large to send is reported as a capture error.
    pub async fn serve_connection<S: CaptureSource>(
        stream: &mut TcpStream,
        source: &mut S,
    ) -> Result<Infallible, ComError> {
        loop {
            let frame = source.capture().await?;
            log::trace!("sending frame {}", frame);
            framing::write_message(stream, &frame)
                .await
                .map_err(|e| match e {
                    // every consumer would fail the same way
                    ComError::MessageTooLarge(len) => ComError::Capture(CaptureError::Shape(
                        format!(
                            "frame {} encodes to {} bytes, limit is {}",
                            frame,
                            len,
                            framing::MAX_MESSAGE_SIZE
                        ),
                    )),
                    e => e,
                })?;
        }
    }
}
