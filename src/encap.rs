//! EtherNet/IP encapsulation header and command codes.
//!
//! Every EtherNet/IP exchange starts with a fixed 24-byte encapsulation
//! header, followed by a command-specific payload. All integers are
//! little-endian.
//!
//! # Header Structure
//!
//! | Bytes | Field | Description |
//! |-------|-------|-------------|
//! | 0-1 | Command | Encapsulation command code |
//! | 2-3 | Length | Byte count of the payload that follows |
//! | 4-7 | Session Handle | Token issued by RegisterSession |
//! | 8-11 | Status | 0 = success |
//! | 12-19 | Sender Context | 8 opaque bytes, echoed by the peer |
//! | 20-23 | Options | Reserved, always 0 |
//!
//! # Example
//!
//! ```
//! use promass_enip::{EncapCommand, EncapHeader};
//!
//! let header = EncapHeader::new(EncapCommand::RegisterSession, 4, 0);
//! let bytes = header.to_bytes();
//! assert_eq!(bytes.len(), 24);
//!
//! let parsed = EncapHeader::from_bytes(&bytes).unwrap();
//! assert_eq!(parsed, header);
//! ```

use crate::error::{EipError, Result};

/// Encapsulation header size in bytes.
pub const ENCAP_HEADER_SIZE: usize = 24;

/// Encapsulation protocol version sent in RegisterSession.
pub const PROTOCOL_VERSION: u16 = 1;

/// Encapsulation command codes used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncapCommand {
    /// Open an encapsulation session and obtain a session handle.
    RegisterSession,
    /// Close the current encapsulation session.
    UnregisterSession,
    /// Exchange an unconnected explicit message (request/response).
    SendRRData,
    /// Connected (implicit) data transfer. Unused by this client.
    SendUnitData,
    /// Identity broadcast/query. Frame passthrough only.
    ListIdentity,
}

impl EncapCommand {
    /// Returns the wire code for this command.
    pub fn code(self) -> u16 {
        match self {
            EncapCommand::RegisterSession => 0x0065,
            EncapCommand::UnregisterSession => 0x0066,
            EncapCommand::SendRRData => 0x006F,
            EncapCommand::SendUnitData => 0x0070,
            EncapCommand::ListIdentity => 0x0063,
        }
    }

    /// Parses a wire code into a command.
    ///
    /// Returns `None` for codes this client does not handle.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0x0065 => Some(EncapCommand::RegisterSession),
            0x0066 => Some(EncapCommand::UnregisterSession),
            0x006F => Some(EncapCommand::SendRRData),
            0x0070 => Some(EncapCommand::SendUnitData),
            0x0063 => Some(EncapCommand::ListIdentity),
            _ => None,
        }
    }
}

impl std::fmt::Display for EncapCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EncapCommand::RegisterSession => "RegisterSession",
            EncapCommand::UnregisterSession => "UnregisterSession",
            EncapCommand::SendRRData => "SendRRData",
            EncapCommand::SendUnitData => "SendUnitData",
            EncapCommand::ListIdentity => "ListIdentity",
        };
        write!(f, "{}", name)
    }
}

/// EtherNet/IP encapsulation header (24 bytes).
///
/// Invariant: `length` equals the byte length of the payload that follows
/// the header on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncapHeader {
    /// Encapsulation command.
    pub command: EncapCommand,
    /// Byte count of the payload following the header.
    pub length: u16,
    /// Session handle (0 until RegisterSession succeeds).
    pub session_handle: u32,
    /// Encapsulation status (0 = success).
    pub status: u32,
    /// Opaque context bytes, echoed unchanged by the peer.
    pub sender_context: [u8; 8],
    /// Reserved options field, always 0.
    pub options: u32,
}

impl EncapHeader {
    /// Creates a request header with zeroed status, context, and options.
    pub fn new(command: EncapCommand, length: u16, session_handle: u32) -> Self {
        Self {
            command,
            length,
            session_handle,
            status: 0,
            sender_context: [0u8; 8],
            options: 0,
        }
    }

    /// Serializes the header to its 24-byte wire form.
    pub fn to_bytes(self) -> [u8; ENCAP_HEADER_SIZE] {
        let mut bytes = [0u8; ENCAP_HEADER_SIZE];
        bytes[0..2].copy_from_slice(&self.command.code().to_le_bytes());
        bytes[2..4].copy_from_slice(&self.length.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.session_handle.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.status.to_le_bytes());
        bytes[12..20].copy_from_slice(&self.sender_context);
        bytes[20..24].copy_from_slice(&self.options.to_le_bytes());
        bytes
    }

    /// Parses a header from bytes.
    ///
    /// # Errors
    ///
    /// Returns `EipError::Protocol` if the slice is shorter than 24 bytes
    /// or carries an unknown command code.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < ENCAP_HEADER_SIZE {
            return Err(EipError::protocol(format!(
                "encapsulation header too short: expected {} bytes, got {}",
                ENCAP_HEADER_SIZE,
                data.len()
            )));
        }

        let code = u16::from_le_bytes([data[0], data[1]]);
        let command = EncapCommand::from_code(code).ok_or_else(|| {
            EipError::protocol(format!("unknown encapsulation command 0x{:04X}", code))
        })?;

        let mut sender_context = [0u8; 8];
        sender_context.copy_from_slice(&data[12..20]);

        Ok(Self {
            command,
            length: u16::from_le_bytes([data[2], data[3]]),
            session_handle: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
            status: u32::from_le_bytes([data[8], data[9], data[10], data[11]]),
            sender_context,
            options: u32::from_le_bytes([data[20], data[21], data[22], data[23]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_codes() {
        assert_eq!(EncapCommand::RegisterSession.code(), 0x0065);
        assert_eq!(EncapCommand::UnregisterSession.code(), 0x0066);
        assert_eq!(EncapCommand::SendRRData.code(), 0x006F);
        assert_eq!(EncapCommand::SendUnitData.code(), 0x0070);
        assert_eq!(EncapCommand::ListIdentity.code(), 0x0063);
    }

    #[test]
    fn test_command_from_code() {
        assert_eq!(
            EncapCommand::from_code(0x0065),
            Some(EncapCommand::RegisterSession)
        );
        assert_eq!(
            EncapCommand::from_code(0x006F),
            Some(EncapCommand::SendRRData)
        );
        assert_eq!(EncapCommand::from_code(0x1234), None);
    }

    #[test]
    fn test_header_to_bytes_layout() {
        let header = EncapHeader::new(EncapCommand::SendRRData, 0x0010, 0xDEAD_BEEF);
        let bytes = header.to_bytes();

        assert_eq!(&bytes[0..2], &[0x6F, 0x00]);
        assert_eq!(&bytes[2..4], &[0x10, 0x00]);
        assert_eq!(&bytes[4..8], &[0xEF, 0xBE, 0xAD, 0xDE]);
        assert_eq!(&bytes[8..12], &[0x00; 4]);
        assert_eq!(&bytes[12..20], &[0x00; 8]);
        assert_eq!(&bytes[20..24], &[0x00; 4]);
    }

    #[test]
    fn test_header_roundtrip() {
        let original = EncapHeader {
            command: EncapCommand::RegisterSession,
            length: 4,
            session_handle: 0x1122_3344,
            status: 0x0000_0069,
            sender_context: [1, 2, 3, 4, 5, 6, 7, 8],
            options: 0,
        };
        let parsed = EncapHeader::from_bytes(&original.to_bytes()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_header_from_bytes_too_short() {
        let result = EncapHeader::from_bytes(&[0x65, 0x00, 0x04]);
        assert!(matches!(result, Err(EipError::Protocol { .. })));
    }

    #[test]
    fn test_header_from_bytes_unknown_command() {
        let mut bytes = EncapHeader::new(EncapCommand::SendRRData, 0, 0).to_bytes();
        bytes[0] = 0xFF;
        bytes[1] = 0xFF;
        let result = EncapHeader::from_bytes(&bytes);
        assert!(matches!(result, Err(EipError::Protocol { .. })));
    }
}
