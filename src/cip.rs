//! CIP explicit message request encoding and response decoding.
//!
//! # Request Structure
//!
//! | Field | Size | Description |
//! |-------|------|-------------|
//! | Service | 1 byte | CIP service code |
//! | Path Size | 1 byte | EPATH length in 16-bit words |
//! | EPATH | Variable | Padded to an even byte count |
//! | Data | Variable | Service-specific request data |
//!
//! # Response Structure
//!
//! | Field | Size | Description |
//! |-------|------|-------------|
//! | Service | 1 byte | Request service code OR'd with 0x80 |
//! | Reserved | 1 byte | |
//! | General Status | 1 byte | 0 = success |
//! | Additional Size | 1 byte | Count of 16-bit additional status words |
//! | Additional Status | 2×count | Little-endian words |
//! | Data | Variable | Response data on success |
//!
//! A response whose service byte does not carry the reply bit for the
//! request's service code is a protocol violation, not a CIP error.
//!
//! # Example
//!
//! ```
//! use promass_enip::{cip, CipPath, CipService};
//!
//! let path = CipPath::new(0x01, 1, Some(1));
//! let request = cip::encode_request(CipService::GetAttributeSingle, &path, &[]).unwrap();
//! assert_eq!(request, vec![0x0E, 0x03, 0x20, 0x01, 0x24, 0x01, 0x30, 0x01]);
//!
//! // Successful reply carrying a vendor id of 1.
//! let reply = [0x8E, 0x00, 0x00, 0x00, 0x01, 0x00];
//! let data = cip::decode_response(CipService::GetAttributeSingle, &reply).unwrap();
//! assert_eq!(data, vec![0x01, 0x00]);
//! ```

use crate::error::{EipError, Result};
use crate::path::CipPath;

/// Reply bit OR'd into the service code of every CIP response.
const REPLY_BIT: u8 = 0x80;

/// Minimum CIP response: service, reserved, status, additional size.
const MIN_RESPONSE_SIZE: usize = 4;

/// CIP explicit services used by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipService {
    /// Get Attribute Single (0x0E).
    GetAttributeSingle,
    /// Set Attribute Single (0x10).
    SetAttributeSingle,
}

impl CipService {
    /// Returns the wire code for this service.
    pub fn code(self) -> u8 {
        match self {
            CipService::GetAttributeSingle => 0x0E,
            CipService::SetAttributeSingle => 0x10,
        }
    }

    /// Returns the service code with the reply bit set.
    pub fn reply_code(self) -> u8 {
        self.code() | REPLY_BIT
    }
}

impl std::fmt::Display for CipService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CipService::GetAttributeSingle => "GetAttributeSingle",
            CipService::SetAttributeSingle => "SetAttributeSingle",
        };
        write!(f, "{}", name)
    }
}

/// Encodes a CIP explicit request.
///
/// The EPATH is padded to an even byte count and its size is expressed in
/// 16-bit words.
///
/// # Errors
///
/// Returns `EipError::InvalidParameter` if a path segment does not fit in
/// 16 bits.
pub fn encode_request(service: CipService, path: &CipPath, data: &[u8]) -> Result<Vec<u8>> {
    let mut path_bytes = path.encode()?;
    if path_bytes.len() % 2 != 0 {
        path_bytes.push(0x00);
    }

    let mut request = Vec::with_capacity(2 + path_bytes.len() + data.len());
    request.push(service.code());
    request.push((path_bytes.len() / 2) as u8);
    request.extend_from_slice(&path_bytes);
    request.extend_from_slice(data);
    Ok(request)
}

/// Decodes a CIP response and returns the response data on success.
///
/// # Errors
///
/// - `EipError::Protocol` if the response is shorter than 4 bytes, the
///   service byte does not match `service | 0x80`, or the additional
///   status words are truncated.
/// - `EipError::Cip` if the general status is non-zero; the error carries
///   the status code and the additional status words, and any trailing
///   data is discarded.
pub fn decode_response(service: CipService, response: &[u8]) -> Result<Vec<u8>> {
    if response.len() < MIN_RESPONSE_SIZE {
        return Err(EipError::protocol(format!(
            "CIP response too short: expected at least {} bytes, got {}",
            MIN_RESPONSE_SIZE,
            response.len()
        )));
    }

    if response[0] != service.reply_code() {
        return Err(EipError::protocol(format!(
            "unexpected CIP service in response: expected 0x{:02X}, got 0x{:02X}",
            service.reply_code(),
            response[0]
        )));
    }

    let general_status = response[2];
    let additional_count = response[3] as usize;
    let data_offset = MIN_RESPONSE_SIZE + additional_count * 2;

    if response.len() < data_offset {
        return Err(EipError::protocol(format!(
            "truncated additional status: {} words declared, {} bytes available",
            additional_count,
            response.len() - MIN_RESPONSE_SIZE
        )));
    }

    if general_status != 0 {
        let additional = response[MIN_RESPONSE_SIZE..data_offset]
            .chunks_exact(2)
            .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
            .collect();
        return Err(EipError::cip(general_status, additional));
    }

    Ok(response[data_offset..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_codes() {
        assert_eq!(CipService::GetAttributeSingle.code(), 0x0E);
        assert_eq!(CipService::SetAttributeSingle.code(), 0x10);
        assert_eq!(CipService::GetAttributeSingle.reply_code(), 0x8E);
        assert_eq!(CipService::SetAttributeSingle.reply_code(), 0x90);
    }

    #[test]
    fn test_encode_get_request() {
        let path = CipPath::new(0x01, 1, Some(1));
        let request = encode_request(CipService::GetAttributeSingle, &path, &[]).unwrap();
        assert_eq!(request, vec![0x0E, 0x03, 0x20, 0x01, 0x24, 0x01, 0x30, 0x01]);
    }

    #[test]
    fn test_encode_set_request_with_data() {
        let path = CipPath::new(0x04, 150, Some(3));
        let request =
            encode_request(CipService::SetAttributeSingle, &path, &[0x01, 0x00]).unwrap();
        assert_eq!(
            request,
            vec![0x10, 0x03, 0x20, 0x04, 0x24, 0x96, 0x30, 0x03, 0x01, 0x00]
        );
    }

    #[test]
    fn test_encode_word_count_matches_path_length() {
        let path = CipPath::new(0x04, 300, Some(3));
        let request = encode_request(CipService::GetAttributeSingle, &path, &[]).unwrap();
        assert_eq!(request[1] as usize * 2, request.len() - 2);
    }

    #[test]
    fn test_decode_success_with_data() {
        let reply = [0x8E, 0x00, 0x00, 0x00, 0x01, 0x00];
        let data = decode_response(CipService::GetAttributeSingle, &reply).unwrap();
        assert_eq!(data, vec![0x01, 0x00]);
    }

    #[test]
    fn test_decode_success_no_data() {
        let reply = [0x90, 0x00, 0x00, 0x00];
        let data = decode_response(CipService::SetAttributeSingle, &reply).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_decode_cip_error_no_additional() {
        let reply = [0x8E, 0x00, 0x05, 0x00];
        let err = decode_response(CipService::GetAttributeSingle, &reply).unwrap_err();
        match err {
            EipError::Cip { status, additional } => {
                assert_eq!(status, 0x05);
                assert!(additional.is_empty());
            }
            other => panic!("expected Cip error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_cip_error_with_additional() {
        let reply = [0x8E, 0x00, 0x1F, 0x02, 0x34, 0x12, 0x78, 0x56, 0xFF];
        let err = decode_response(CipService::GetAttributeSingle, &reply).unwrap_err();
        match err {
            EipError::Cip { status, additional } => {
                assert_eq!(status, 0x1F);
                assert_eq!(additional, vec![0x1234, 0x5678]);
            }
            other => panic!("expected Cip error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_service_mismatch() {
        // A raw 0x10 up front is not 0x0E | 0x80.
        let reply = [0x10, 0x00, 0x00, 0x00];
        let result = decode_response(CipService::GetAttributeSingle, &reply);
        assert!(matches!(result, Err(EipError::Protocol { .. })));
    }

    #[test]
    fn test_decode_too_short() {
        let result = decode_response(CipService::GetAttributeSingle, &[0x8E, 0x00, 0x05]);
        assert!(matches!(result, Err(EipError::Protocol { .. })));
    }

    #[test]
    fn test_decode_truncated_additional_status() {
        let reply = [0x8E, 0x00, 0x05, 0x02, 0x34];
        let result = decode_response(CipService::GetAttributeSingle, &reply);
        assert!(matches!(result, Err(EipError::Protocol { .. })));
    }
}
