//! Blocking Server List Ping client.
//!
//! A query opens one TCP connection, sends a handshake announcing the status
//! state followed by an empty status request, reads back the single status
//! response packet and closes the connection again. Nothing is shared between
//! queries, so an [`SlpClient`] can be cloned into as many threads as needed.

mod address;
mod deadline;
mod error;
mod reader;
mod status;


use std::{
    io::{self, Read, Write},
    net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs},
    time::Duration,
};

use log::{debug, trace};

pub use address::{AddressError, DEFAULT_PORT, ServerAddress};
pub use deadline::CancelHandle;
pub use error::{DecodeError, QueryError, QueryErrorKind};
pub use reader::{FrameHeader, read_exact, read_frame_header, read_status_json, read_varint};
pub use status::{Description, PlayerSample, Players, StatusResponse, Version};

use self::deadline::{DeadlineStream, cancelled};
use crate::proto::{
    HandshakeC2s, HandshakeNextState, PacketEncoder, ProtoError, StatusRequestC2s,
    StatusResponseS2c, varint_len, write_varint,
};

/// Protocol version sent in the handshake when the caller does not pick one.
/// Servers answer status requests regardless of the version announced.
pub const DEFAULT_PROTOCOL_VERSION: u32 = 0;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Sockets reject a zero timeout, so shorter ones are raised to this.
pub const MIN_TIMEOUT: Duration = Duration::from_millis(1);

/// Builds the handshake packet that switches the connection to `next_state`.
pub fn build_handshake_packet(
    address: &ServerAddress,
    protocol_version: u32,
    next_state: HandshakeNextState,
) -> Result<Vec<u8>, ProtoError> {
    let mut enc = PacketEncoder::new();
    enc.write_packet(&HandshakeC2s {
        protocol_version,
        server_address: &address.host,
        server_port: address.port,
        next_state,
    })?;
    Ok(enc.take())
}

/// Builds the empty status request packet.
pub fn build_status_request_packet() -> Vec<u8> {
    let mut out = Vec::with_capacity(2);
    write_varint(&mut out, varint_len(StatusRequestC2s::ID) as u32);
    write_varint(&mut out, StatusRequestC2s::ID);
    out
}

#[derive(Debug, Clone)]
pub struct SlpClient {
    connect_timeout: Duration,
    read_timeout: Duration,
    protocol_version: u32,
}

impl Default for SlpClient {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            protocol_version: DEFAULT_PROTOCOL_VERSION,
        }
    }
}

impl SlpClient {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            connect_timeout: connect_timeout.max(MIN_TIMEOUT),
            read_timeout: read_timeout.max(MIN_TIMEOUT),
            ..Self::default()
        }
    }

    pub fn with_protocol_version(mut self, protocol_version: u32) -> Self {
        self.protocol_version = protocol_version;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn protocol_version(&self) -> u32 {
        self.protocol_version
    }

    /// Pings `address` over a fresh connection and decodes its status.
    ///
    /// `connect_timeout` bounds each connection attempt and `read_timeout`
    /// bounds everything after it, from the first request byte written to the
    /// last response byte read. The socket is shut down on every return path.
    pub fn query(&self, address: &ServerAddress) -> Result<StatusResponse, QueryError> {
        let stream = self.connect(address)?;
        let result = self.exchange(DeadlineStream::new(&stream, self.read_timeout), address);
        let _ = stream.shutdown(Shutdown::Both);
        result
    }

    /// Like [`query`](Self::query), but `cancel` can abort the exchange from
    /// another thread. A cancelled query fails with a `ConnectionAborted`
    /// network error.
    pub fn query_cancellable(
        &self,
        address: &ServerAddress,
        cancel: &CancelHandle,
    ) -> Result<StatusResponse, QueryError> {
        if cancel.is_cancelled() {
            return Err(cancelled().into());
        }

        let stream = self.connect(address)?;
        if let Err(err) = cancel.attach(&stream) {
            let _ = stream.shutdown(Shutdown::Both);
            return Err(err.into());
        }

        let result = self.exchange(DeadlineStream::new(&stream, self.read_timeout), address);
        cancel.detach();
        let _ = stream.shutdown(Shutdown::Both);

        match result {
            Err(_) if cancel.is_cancelled() => Err(cancelled().into()),
            other => other,
        }
    }

    /// Runs the handshake, status request and response read over `stream`.
    pub fn exchange<S: Read + Write>(
        &self,
        mut stream: S,
        address: &ServerAddress,
    ) -> Result<StatusResponse, QueryError> {
        let mut outbound =
            build_handshake_packet(address, self.protocol_version, HandshakeNextState::Status)?;
        outbound.extend_from_slice(&build_status_request_packet());
        stream.write_all(&outbound)?;
        stream.flush()?;
        trace!("sent handshake and status request to {address}");

        let header = read_frame_header(&mut stream)?;
        if header.id != StatusResponseS2c::ID {
            return Err(ProtoError::InvalidPacketId {
                expected: StatusResponseS2c::ID,
                actual: header.id,
            }
            .into());
        }

        let json = read_status_json(&mut stream)?;
        trace!(
            "status response from {address}: {} bytes (frame length {})",
            json.len(),
            header.length
        );
        Ok(StatusResponse::from_json(&json)?)
    }

    fn connect(&self, address: &ServerAddress) -> Result<TcpStream, QueryError> {
        let candidates: Vec<SocketAddr> = (address.host.as_str(), address.port)
            .to_socket_addrs()?
            .collect();

        let mut last_err = io::Error::new(
            io::ErrorKind::NotFound,
            format!("{address} did not resolve to any socket address"),
        );
        for candidate in candidates {
            match TcpStream::connect_timeout(&candidate, self.connect_timeout) {
                Ok(stream) => {
                    debug!("connected to {address} via {candidate}");
                    stream.set_read_timeout(Some(self.read_timeout))?;
                    stream.set_write_timeout(Some(self.read_timeout))?;
                    stream.set_nodelay(true)?;
                    return Ok(stream);
                }
                Err(err) => {
                    debug!("connect to {candidate} for {address} failed: {err}");
                    last_err = err;
                }
            }
        }

        Err(last_err.into())
    }
}

/// One-shot status query.
pub fn query(
    host: &str,
    port: u16,
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<StatusResponse, QueryError> {
    SlpClient::new(connect_timeout, read_timeout).query(&ServerAddress::new(host, port))
}
