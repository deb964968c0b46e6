//! UDP datagram source.

use std::io;
use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::net::UdpSocket;
use tracing::{info, trace};

use super::{Datagram, DatagramSource};
use crate::config::TransportConfig;
use crate::error::{BridgeError, Result};

/// Datagram source backed by a bound UDP socket
#[derive(Debug)]
pub struct UdpDatagramSource {
    socket: UdpSocket,
    allowed_sender: Option<SocketAddr>,
    max_datagram_len: usize,
}

impl UdpDatagramSource {
    /// Bind the socket described by the `[transport]` section
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the address cannot be bound
    pub async fn bind(config: &TransportConfig) -> Result<Self> {
        let socket = UdpSocket::bind(config.bind_addr)
            .await
            .map_err(|e| BridgeError::Transport(format!("Failed to bind {}: {}", config.bind_addr, e)))?;

        info!("Listening for telemetry datagrams on {}", config.bind_addr);
        if let Some(sender) = config.allowed_sender {
            info!("Accepting datagrams from {} only", sender);
        }

        Ok(Self::from_socket(socket, config.allowed_sender, config.max_datagram_len))
    }

    /// Wrap an already bound socket
    pub fn from_socket(socket: UdpSocket, allowed_sender: Option<SocketAddr>, max_datagram_len: usize) -> Self {
        Self {
            socket,
            allowed_sender,
            max_datagram_len,
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    fn accepts(&self, source: SocketAddr) -> bool {
        self.allowed_sender.map_or(true, |allowed| allowed == source)
    }
}

#[async_trait]
impl DatagramSource for UdpDatagramSource {
    async fn recv(&mut self) -> io::Result<Option<Datagram>> {
        let mut buf = BytesMut::zeroed(self.max_datagram_len);

        loop {
            let (len, source) = self.socket.recv_from(&mut buf).await?;

            if !self.accepts(source) {
                trace!("Ignoring {} byte datagram from {}", len, source);
                continue;
            }

            buf.truncate(len);
            let data: Bytes = buf.freeze();
            return Ok(Some(Datagram { source, data }));
        }
    }
}
