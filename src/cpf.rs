//! Common Packet Format (CPF) framing for SendRRData payloads.
//!
//! A SendRRData payload wraps the CIP message in a list of typed,
//! length-prefixed items:
//!
//! | Field | Size | Description |
//! |-------|------|-------------|
//! | Interface Handle | 4 bytes | 0 for CIP |
//! | Timeout | 2 bytes | 0 (handled at the CIP level) |
//! | Item Count | 2 bytes | Always 2 for unconnected messaging |
//! | Items | Variable | (type id, length, data) tuples |
//!
//! Unconnected explicit messaging always uses exactly two items: a null
//! address item (type 0x0000, length 0) and an unconnected data item
//! (type 0x00B2) carrying the CIP request or response bytes.
//!
//! # Example
//!
//! ```
//! use promass_enip::cpf;
//!
//! let cip = [0x0E, 0x03, 0x20, 0x01, 0x24, 0x01, 0x30, 0x01];
//! let payload = cpf::build_send_rr_data(&cip).unwrap();
//! let reply = cpf::parse_send_rr_data(&payload).unwrap();
//! assert_eq!(reply, cip);
//! ```

use crate::error::{EipError, Result};

/// Null address item type id.
pub const ITEM_NULL_ADDRESS: u16 = 0x0000;

/// Unconnected data item type id.
pub const ITEM_UNCONNECTED_DATA: u16 = 0x00B2;

/// Fixed prefix: interface handle (4) + timeout (2) + item count (2).
const CPF_PREFIX_SIZE: usize = 8;

/// Largest payload a single CPF item can carry (16-bit length field).
pub const MAX_ITEM_SIZE: usize = u16::MAX as usize;

/// A single CPF item: type id plus opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpfItem {
    /// Item type id.
    pub type_id: u16,
    /// Item payload of the length given on the wire.
    pub data: Vec<u8>,
}

/// Builds a SendRRData payload carrying `cip` in an unconnected data item.
///
/// # Errors
///
/// Returns `EipError::InvalidParameter` if `cip` does not fit in the
/// item's 16-bit length field.
pub fn build_send_rr_data(cip: &[u8]) -> Result<Vec<u8>> {
    if cip.len() > MAX_ITEM_SIZE {
        return Err(EipError::invalid_parameter(
            "cip",
            format!(
                "payload of {} bytes exceeds the {}-byte item limit",
                cip.len(),
                MAX_ITEM_SIZE
            ),
        ));
    }

    let mut payload = Vec::with_capacity(CPF_PREFIX_SIZE + 8 + cip.len());
    payload.extend_from_slice(&0u32.to_le_bytes()); // interface handle
    payload.extend_from_slice(&0u16.to_le_bytes()); // timeout
    payload.extend_from_slice(&2u16.to_le_bytes()); // item count
    payload.extend_from_slice(&ITEM_NULL_ADDRESS.to_le_bytes());
    payload.extend_from_slice(&0u16.to_le_bytes()); // null address length
    payload.extend_from_slice(&ITEM_UNCONNECTED_DATA.to_le_bytes());
    payload.extend_from_slice(&(cip.len() as u16).to_le_bytes());
    payload.extend_from_slice(cip);
    Ok(payload)
}

/// Parses a SendRRData response payload and returns the CIP reply bytes.
///
/// The reply is the payload of the single unconnected data (0x00B2) item.
/// A response with no such item, a truncated item, or more than one
/// 0x00B2 item is malformed.
///
/// # Errors
///
/// Returns `EipError::Protocol` on any structural problem.
pub fn parse_send_rr_data(payload: &[u8]) -> Result<Vec<u8>> {
    let items = parse_items(payload)?;

    let mut cip_reply: Option<Vec<u8>> = None;
    for item in items {
        if item.type_id == ITEM_UNCONNECTED_DATA {
            if cip_reply.is_some() {
                return Err(EipError::protocol(
                    "multiple unconnected data items in SendRRData response",
                ));
            }
            cip_reply = Some(item.data);
        }
    }

    cip_reply.ok_or_else(|| EipError::protocol("no CIP reply item in SendRRData response"))
}

/// Parses the CPF item list out of a SendRRData payload.
pub fn parse_items(payload: &[u8]) -> Result<Vec<CpfItem>> {
    if payload.len() < CPF_PREFIX_SIZE {
        return Err(EipError::protocol(format!(
            "SendRRData payload too short: expected at least {} bytes, got {}",
            CPF_PREFIX_SIZE,
            payload.len()
        )));
    }

    let item_count = u16::from_le_bytes([payload[6], payload[7]]) as usize;
    let mut offset = CPF_PREFIX_SIZE;
    let mut items = Vec::with_capacity(item_count);

    for _ in 0..item_count {
        if payload.len() < offset + 4 {
            return Err(EipError::protocol("truncated CPF item header"));
        }
        let type_id = u16::from_le_bytes([payload[offset], payload[offset + 1]]);
        let length = u16::from_le_bytes([payload[offset + 2], payload[offset + 3]]) as usize;
        offset += 4;

        if payload.len() < offset + length {
            return Err(EipError::protocol(format!(
                "truncated CPF item 0x{:04X}: declared {} bytes, {} available",
                type_id,
                length,
                payload.len() - offset
            )));
        }
        items.push(CpfItem {
            type_id,
            data: payload[offset..offset + length].to_vec(),
        });
        offset += length;
    }

    Ok(items)
}
