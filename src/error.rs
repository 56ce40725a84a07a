//! Error types for EtherNet/IP communication.

use std::io;
use thiserror::Error;

/// Result type alias for EtherNet/IP operations.
pub type Result<T> = std::result::Result<T, EipError>;

/// Errors that can occur during EtherNet/IP communication.
#[derive(Debug, Error)]
pub enum EipError {
    /// Operation attempted without a registered session.
    #[error("Not connected: no registered session")]
    NotConnected,

    /// Communication timeout.
    #[error("Communication timeout")]
    Timeout,

    /// I/O error during communication.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport-level failure: short read, connection closed mid-frame,
    /// or a non-zero encapsulation status from the device.
    #[error("Transport error: {reason}")]
    Transport {
        /// Description of the transport failure.
        reason: String,
    },

    /// Malformed response structure: bad CPF items, unexpected service
    /// code, or a frame shorter than its fixed header.
    #[error("Protocol violation: {reason}")]
    Protocol {
        /// Description of the protocol violation.
        reason: String,
    },

    /// CIP-level error returned by the device (non-zero general status).
    ///
    /// A rejected explicit message does not imply a broken connection;
    /// the session stays valid.
    #[error("CIP error: general status 0x{status:02X}, additional {additional:04X?}")]
    Cip {
        /// General status byte from the CIP response.
        status: u8,
        /// Additional status words (16-bit, little-endian on the wire).
        additional: Vec<u16>,
    },

    /// Payload shorter than required for a fixed-layout decode.
    #[error("Decode error: {reason}")]
    Decode {
        /// Description of the decode failure.
        reason: String,
    },

    /// Invalid parameter provided by the caller.
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter.
        parameter: String,
        /// Description of why the parameter is invalid.
        reason: String,
    },
}

impl EipError {
    /// Creates a new `Transport` error.
    ///
    /// # Example
    ///
    /// ```
    /// use promass_enip::EipError;
    ///
    /// let err = EipError::transport("connection closed while reading header");
    /// ```
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Creates a new `Protocol` error.
    ///
    /// # Example
    ///
    /// ```
    /// use promass_enip::EipError;
    ///
    /// let err = EipError::protocol("response too short");
    /// ```
    pub fn protocol(reason: impl Into<String>) -> Self {
        Self::Protocol {
            reason: reason.into(),
        }
    }

    /// Creates a new `Cip` error from a general status and additional words.
    ///
    /// # Example
    ///
    /// ```
    /// use promass_enip::EipError;
    ///
    /// let err = EipError::cip(0x05, vec![]);
    /// ```
    pub fn cip(status: u8, additional: Vec<u16>) -> Self {
        Self::Cip { status, additional }
    }

    /// Creates a new `Decode` error.
    ///
    /// # Example
    ///
    /// ```
    /// use promass_enip::EipError;
    ///
    /// let err = EipError::decode("input assembly data too short");
    /// ```
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// Creates a new `InvalidParameter` error.
    ///
    /// # Example
    ///
    /// ```
    /// use promass_enip::EipError;
    ///
    /// let err = EipError::invalid_parameter("class_id", "must fit in 16 bits");
    /// ```
    pub fn invalid_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Returns whether this error invalidates the current session.
    ///
    /// Transport and protocol failures leave the connection in an unknown
    /// state and require a full reconnect. A CIP rejection or a decode
    /// failure does not; the session remains usable.
    ///
    /// # Example
    ///
    /// ```
    /// use promass_enip::EipError;
    ///
    /// assert!(EipError::Timeout.invalidates_session());
    /// assert!(!EipError::cip(0x05, vec![]).invalidates_session());
    /// ```
    pub fn invalidates_session(&self) -> bool {
        matches!(
            self,
            Self::NotConnected
                | Self::Timeout
                | Self::Io(_)
                | Self::Transport { .. }
                | Self::Protocol { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display() {
        let err = EipError::transport("short read");
        assert_eq!(err.to_string(), "Transport error: short read");
    }

    #[test]
    fn test_cip_display() {
        let err = EipError::cip(0x05, vec![0x0001]);
        assert_eq!(
            err.to_string(),
            "CIP error: general status 0x05, additional [0001]"
        );
    }

    #[test]
    fn test_not_connected_display() {
        let err = EipError::NotConnected;
        assert_eq!(err.to_string(), "Not connected: no registered session");
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = EipError::invalid_parameter("instance_id", "must fit in 16 bits");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'instance_id': must fit in 16 bits"
        );
    }

    #[test]
    fn test_session_fatal_errors() {
        assert!(EipError::NotConnected.invalidates_session());
        assert!(EipError::Timeout.invalidates_session());
        assert!(EipError::transport("short read").invalidates_session());
        assert!(EipError::protocol("no CIP reply item").invalidates_session());
        assert!(EipError::Io(io::Error::from(io::ErrorKind::BrokenPipe)).invalidates_session());
    }

    #[test]
    fn test_session_preserving_errors() {
        assert!(!EipError::cip(0x05, vec![]).invalidates_session());
        assert!(!EipError::decode("too short").invalidates_session());
        assert!(!EipError::invalid_parameter("x", "y").invalidates_session());
    }
}
