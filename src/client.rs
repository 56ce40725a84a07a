//! CIP messaging client for explicit Get/Set Attribute Single services.
//!
//! [`CipClient`] sits between the device façade and the transport: it
//! encodes CIP service requests, exchanges them via SendRRData, and
//! decodes the responses. Each call produces exactly 1 request and 1
//! response; there is no retry, caching, or reconnection at this level.
//!
//! # Example
//!
//! ```no_run
//! use promass_enip::{CipClient, TcpTransport};
//! use std::time::Duration;
//!
//! let transport = TcpTransport::new(
//!     "192.168.1.100:44818".parse().unwrap(),
//!     Duration::from_secs(2),
//! );
//! let mut client = CipClient::new(transport);
//! client.connect()?;
//!
//! // Identity object, instance 1, attribute 1 = vendor id.
//! let raw = client.get_attribute_single(0x01, 1, 1)?;
//! client.close()?;
//! # Ok::<(), promass_enip::EipError>(())
//! ```

use crate::cip::{self, CipService};
use crate::error::Result;
use crate::path::CipPath;
use crate::transport::TcpTransport;

/// Explicit-messaging CIP client on top of a [`TcpTransport`].
#[derive(Debug)]
pub struct CipClient {
    transport: TcpTransport,
}

impl CipClient {
    /// Creates a client over the given transport. No I/O happens until
    /// [`connect`](Self::connect).
    pub fn new(transport: TcpTransport) -> Self {
        Self { transport }
    }

    /// Opens the connection and registers a session. Idempotent.
    pub fn connect(&mut self) -> Result<()> {
        self.transport.connect()
    }

    /// Closes the session and socket. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        self.transport.close()
    }

    /// Returns whether a session is registered.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &TcpTransport {
        &self.transport
    }

    /// Reads a single attribute via GetAttributeSingle (0x0E).
    ///
    /// # Errors
    ///
    /// Returns `EipError::Cip` if the device rejects the request (the
    /// session stays valid), or a transport/protocol error on a broken
    /// exchange (the session is invalidated).
    pub fn get_attribute_single(
        &mut self,
        class_id: u32,
        instance_id: u32,
        attribute_id: u32,
    ) -> Result<Vec<u8>> {
        let path = CipPath::new(class_id, instance_id, Some(attribute_id));
        self.send(CipService::GetAttributeSingle, &path, &[])
    }

    /// Writes a single attribute via SetAttributeSingle (0x10).
    ///
    /// Response data is discarded; only success is validated.
    ///
    /// # Errors
    ///
    /// Same as [`get_attribute_single`](Self::get_attribute_single).
    pub fn set_attribute_single(
        &mut self,
        class_id: u32,
        instance_id: u32,
        attribute_id: u32,
        data: &[u8],
    ) -> Result<()> {
        let path = CipPath::new(class_id, instance_id, Some(attribute_id));
        self.send(CipService::SetAttributeSingle, &path, data)?;
        Ok(())
    }

    fn send(&mut self, service: CipService, path: &CipPath, data: &[u8]) -> Result<Vec<u8>> {
        let request = cip::encode_request(service, path, data)?;
        let reply = self.transport.send_unconnected_request(&request)?;
        cip::decode_response(service, &reply)
    }
}
