//! TCP transport and encapsulation session management.
//!
//! This module provides the [`TcpTransport`] struct which owns the TCP
//! socket and the encapsulation session handle. It frames and unframes
//! whole encapsulation packets and manages the RegisterSession /
//! UnregisterSession lifecycle. It knows nothing about CIP.
//!
//! # Session Lifecycle
//!
//! A session is either fully registered (socket open, handle non-zero) or
//! fully unregistered (no socket, handle zero) — never partially valid.
//! Any transport or protocol failure drops the session; the caller must
//! reconnect before issuing further requests. The transport itself never
//! retries.
//!
//! # Constants
//!
//! - [`DEFAULT_ENIP_PORT`] - Default EtherNet/IP TCP port (44818)
//! - [`DEFAULT_TIMEOUT`] - Default socket timeout (2 seconds)
//!
//! # Example
//!
//! ```no_run
//! use promass_enip::TcpTransport;
//! use std::time::Duration;
//!
//! let mut transport = TcpTransport::new(
//!     "192.168.1.100:44818".parse().unwrap(),
//!     Duration::from_secs(2),
//! );
//! transport.connect()?;
//!
//! let cip_request = [0x0E, 0x03, 0x20, 0x01, 0x24, 0x01, 0x30, 0x01];
//! let cip_reply = transport.send_unconnected_request(&cip_request)?;
//! transport.close()?;
//! # Ok::<(), promass_enip::EipError>(())
//! ```

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use log::{debug, info, warn};

use crate::cpf;
use crate::encap::{EncapCommand, EncapHeader, ENCAP_HEADER_SIZE, PROTOCOL_VERSION};
use crate::error::{EipError, Result};

/// Default EtherNet/IP TCP port.
pub const DEFAULT_ENIP_PORT: u16 = 44818;

/// Default timeout applied to connect, send, and receive independently.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// TCP transport owning the socket and the encapsulation session.
///
/// All I/O methods take `&mut self`: exactly one transaction may be in
/// flight per session, and exclusive access enforces that at compile time.
pub struct TcpTransport {
    addr: SocketAddr,
    timeout: Duration,
    stream: Option<TcpStream>,
    session_handle: u32,
}

impl TcpTransport {
    /// Creates a transport for the given device address. No I/O happens
    /// until [`connect`](Self::connect) is called.
    pub fn new(addr: SocketAddr, timeout: Duration) -> Self {
        Self {
            addr,
            timeout,
            stream: None,
            session_handle: 0,
        }
    }

    /// Creates a transport with the default timeout.
    pub fn with_default_timeout(addr: SocketAddr) -> Self {
        Self::new(addr, DEFAULT_TIMEOUT)
    }

    /// Returns the remote device address.
    pub fn remote_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the current session handle (0 when unregistered).
    pub fn session_handle(&self) -> u32 {
        self.session_handle
    }

    /// Returns whether a session is registered.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some() && self.session_handle != 0
    }

    /// Opens the TCP connection and registers an encapsulation session.
    ///
    /// Idempotent: calling while already registered is a no-op and does
    /// not perform a second RegisterSession exchange.
    ///
    /// # Errors
    ///
    /// Returns `EipError::Io`/`EipError::Timeout` if the TCP connect
    /// fails, or `EipError::Transport` if the device rejects the
    /// RegisterSession. On any failure the transport is left unregistered
    /// with the socket closed.
    pub fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        debug!("connecting to {}", self.addr);
        let stream = TcpStream::connect_timeout(&self.addr, self.timeout)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        self.stream = Some(stream);

        match self.register_session() {
            Ok(handle) => {
                self.session_handle = handle;
                info!("session registered with {} (handle 0x{:08X})", self.addr, handle);
                Ok(())
            }
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    /// Closes the session and the socket.
    ///
    /// When registered, an UnregisterSession is sent best-effort; transport
    /// errors during unregister are swallowed. The socket is always closed
    /// and the handle zeroed. Idempotent when already unregistered.
    pub fn close(&mut self) -> Result<()> {
        if self.is_connected() {
            debug!("unregistering session with {}", self.addr);
            if let Err(e) = self.write_frame(EncapCommand::UnregisterSession, &[]) {
                warn!("UnregisterSession failed, dropping socket anyway: {}", e);
            }
        }
        self.reset();
        Ok(())
    }

    /// Sends one encapsulation frame and reads the whole response frame.
    ///
    /// Writes the 24-byte header followed by `payload`, then reads exactly
    /// 24 header bytes and exactly `length` payload bytes, looping on
    /// partial reads.
    ///
    /// # Errors
    ///
    /// Returns `EipError::Transport` if the peer closes the connection
    /// before the expected byte count arrives (short read), and
    /// `EipError::Timeout`/`EipError::Io` on socket failures. Any such
    /// failure invalidates the session.
    pub fn send_frame(
        &mut self,
        command: EncapCommand,
        payload: &[u8],
    ) -> Result<(EncapHeader, Vec<u8>)> {
        match self.exchange(command, payload) {
            Ok(response) => Ok(response),
            Err(e) => {
                if e.invalidates_session() {
                    self.reset();
                }
                Err(e)
            }
        }
    }

    /// Sends an unconnected explicit CIP message via SendRRData and
    /// returns the raw CIP reply bytes.
    ///
    /// # Errors
    ///
    /// Returns `EipError::NotConnected` without a registered session,
    /// `EipError::InvalidParameter` if `cip` exceeds the 65,535-byte
    /// item limit (nothing is sent and the session stays up),
    /// `EipError::Transport` on a non-zero encapsulation status, and
    /// `EipError::Protocol` if the response CPF carries no unconnected
    /// data item.
    pub fn send_unconnected_request(&mut self, cip: &[u8]) -> Result<Vec<u8>> {
        if !self.is_connected() {
            return Err(EipError::NotConnected);
        }

        let payload = cpf::build_send_rr_data(cip)?;
        let (header, response) = self.send_frame(EncapCommand::SendRRData, &payload)?;
        if header.status != 0 {
            self.reset();
            return Err(EipError::transport(format!(
                "SendRRData failed with encapsulation status {}",
                header.status
            )));
        }

        match cpf::parse_send_rr_data(&response) {
            Ok(cip_reply) => Ok(cip_reply),
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    /// Sends a ListIdentity frame and returns the raw response payload.
    ///
    /// The payload is passed through unparsed; decoding the identity items
    /// is left to the caller.
    pub fn list_identity(&mut self) -> Result<Vec<u8>> {
        let (header, payload) = self.send_frame(EncapCommand::ListIdentity, &[])?;
        if header.status != 0 {
            self.reset();
            return Err(EipError::transport(format!(
                "ListIdentity failed with encapsulation status {}",
                header.status
            )));
        }
        Ok(payload)
    }

    /// Drops the socket and zeroes the session handle. Both change
    /// together so the session is never partially valid.
    fn reset(&mut self) {
        self.stream = None;
        self.session_handle = 0;
    }

    fn register_session(&mut self) -> Result<u32> {
        let mut payload = Vec::with_capacity(4);
        payload.extend_from_slice(&PROTOCOL_VERSION.to_le_bytes());
        payload.extend_from_slice(&0u16.to_le_bytes()); // option flags

        let (header, response) = self.exchange(EncapCommand::RegisterSession, &payload)?;
        if header.status != 0 {
            return Err(EipError::transport(format!(
                "RegisterSession failed with status {}",
                header.status
            )));
        }
        if response.len() < 4 {
            return Err(EipError::transport("RegisterSession response too short"));
        }
        let handle = u32::from_le_bytes([response[0], response[1], response[2], response[3]]);
        if handle == 0 {
            // A zero handle is unusable: it is the unregistered sentinel.
            return Err(EipError::transport(
                "RegisterSession returned a zero session handle",
            ));
        }
        Ok(handle)
    }

    fn exchange(
        &mut self,
        command: EncapCommand,
        payload: &[u8],
    ) -> Result<(EncapHeader, Vec<u8>)> {
        self.write_frame(command, payload)?;

        let mut header_bytes = [0u8; ENCAP_HEADER_SIZE];
        self.read_exact(&mut header_bytes)?;
        let header = EncapHeader::from_bytes(&header_bytes)?;

        let mut response = vec![0u8; header.length as usize];
        self.read_exact(&mut response)?;
        Ok((header, response))
    }

    fn write_frame(&mut self, command: EncapCommand, payload: &[u8]) -> Result<()> {
        if payload.len() > u16::MAX as usize {
            return Err(EipError::invalid_parameter(
                "payload",
                format!(
                    "{} bytes exceeds the {}-byte encapsulation limit",
                    payload.len(),
                    u16::MAX
                ),
            ));
        }
        let header = EncapHeader::new(command, payload.len() as u16, self.session_handle);

        let mut frame = Vec::with_capacity(ENCAP_HEADER_SIZE + payload.len());
        frame.extend_from_slice(&header.to_bytes());
        frame.extend_from_slice(payload);

        let stream = self.stream.as_mut().ok_or(EipError::NotConnected)?;
        match stream.write_all(&frame) {
            Ok(()) => Ok(()),
            Err(e) => Err(map_io_error(e)),
        }
    }

    /// Fills `buf` completely, looping on partial reads. A connection
    /// closed before the expected byte count is a short read.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(EipError::NotConnected)?;
        let mut filled = 0;
        while filled < buf.len() {
            match stream.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(EipError::transport(format!(
                        "connection closed after {} of {} expected bytes",
                        filled,
                        buf.len()
                    )));
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(map_io_error(e)),
            }
        }
        Ok(())
    }
}

fn map_io_error(e: std::io::Error) -> EipError {
    match e.kind() {
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => EipError::Timeout,
        _ => EipError::Io(e),
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        if self.is_connected() {
            let _ = self.close();
        }
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("addr", &self.addr)
            .field("session_handle", &self.session_handle)
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_ENIP_PORT, 44818);
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(2));
    }

    #[test]
    fn test_new_is_unregistered() {
        let transport = TcpTransport::with_default_timeout("127.0.0.1:44818".parse().unwrap());
        assert!(!transport.is_connected());
        assert_eq!(transport.session_handle(), 0);
    }

    #[test]
    fn test_request_without_session_fails() {
        let mut transport = TcpTransport::with_default_timeout("127.0.0.1:44818".parse().unwrap());
        let result = transport.send_unconnected_request(&[0x0E]);
        assert!(matches!(result, Err(EipError::NotConnected)));
    }

    #[test]
    fn test_oversized_frame_rejected_before_io() {
        let mut transport = TcpTransport::with_default_timeout("127.0.0.1:44818".parse().unwrap());
        let payload = vec![0u8; u16::MAX as usize + 1];
        let result = transport.send_frame(EncapCommand::SendRRData, &payload);
        assert!(matches!(result, Err(EipError::InvalidParameter { .. })));
    }

    #[test]
    fn test_close_when_unregistered_is_safe() {
        let mut transport = TcpTransport::with_default_timeout("127.0.0.1:44818".parse().unwrap());
        assert!(transport.close().is_ok());
        assert!(transport.close().is_ok());
        assert_eq!(transport.session_handle(), 0);
    }

    #[test]
    fn test_transport_debug() {
        let transport = TcpTransport::with_default_timeout("127.0.0.1:44818".parse().unwrap());
        let debug_str = format!("{:?}", transport);
        assert!(debug_str.contains("TcpTransport"));
        assert!(debug_str.contains("127.0.0.1:44818"));
    }
}
