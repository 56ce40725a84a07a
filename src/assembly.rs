//! Fixed-layout assembly data for Promass/Promag devices.
//!
//! The Assembly object (class 0x04) aggregates process data into one
//! read/write transaction. The layouts here follow the common Proline
//! configuration but are not verified against vendor documentation for
//! every model — check the instrument's EtherNet/IP manual and adjust the
//! assembly instances if your meter is configured differently.
//!
//! # Input Assembly (device → client)
//!
//! 16 bytes, four little-endian IEEE-754 floats:
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0 | Mass flow |
//! | 4 | Volume flow |
//! | 8 | Density |
//! | 12 | Temperature |
//!
//! # Output Assembly (client → device)
//!
//! 2 bytes, a little-endian command bitfield; bit 0 resets the totalizer.
//!
//! # Example
//!
//! ```
//! use promass_enip::{OutputCommand, ProcessValues};
//!
//! let mut raw = Vec::new();
//! for value in [12.5f32, 3.2, 998.2, 21.4] {
//!     raw.extend_from_slice(&value.to_le_bytes());
//! }
//! let values = ProcessValues::from_bytes(&raw).unwrap();
//! assert_eq!(values.density, 998.2);
//!
//! let cmd = OutputCommand::new().with_reset_totalizer(true);
//! assert_eq!(cmd.to_bytes(), [0x01, 0x00]);
//! ```

use crate::error::{EipError, Result};

/// Byte length of the input assembly process-value block.
pub const PROCESS_VALUES_SIZE: usize = 16;

/// Reset-totalizer bit in the output command word.
const CMD_RESET_TOTALIZER: u16 = 0x0001;

/// Process values decoded from the input assembly.
///
/// Only produced whole from a successful read; never partially updated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessValues {
    /// Mass flow in the device's configured unit.
    pub mass_flow: f32,
    /// Volume flow in the device's configured unit.
    pub volume_flow: f32,
    /// Fluid density in the device's configured unit.
    pub density: f32,
    /// Fluid temperature in the device's configured unit.
    pub temperature: f32,
}

impl ProcessValues {
    /// Decodes process values from raw input assembly bytes.
    ///
    /// # Errors
    ///
    /// Returns `EipError::Decode` if fewer than 16 bytes are provided.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < PROCESS_VALUES_SIZE {
            return Err(EipError::decode(format!(
                "input assembly data too short: expected {} bytes, got {}",
                PROCESS_VALUES_SIZE,
                data.len()
            )));
        }

        Ok(Self {
            mass_flow: f32_at(data, 0),
            volume_flow: f32_at(data, 4),
            density: f32_at(data, 8),
            temperature: f32_at(data, 12),
        })
    }
}

fn f32_at(data: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Output assembly command word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputCommand {
    bits: u16,
}

impl OutputCommand {
    /// Creates a command word with no bits set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or clears the reset-totalizer bit.
    pub fn with_reset_totalizer(mut self, reset: bool) -> Self {
        if reset {
            self.bits |= CMD_RESET_TOTALIZER;
        } else {
            self.bits &= !CMD_RESET_TOTALIZER;
        }
        self
    }

    /// Returns whether the reset-totalizer bit is set.
    pub fn reset_totalizer(self) -> bool {
        self.bits & CMD_RESET_TOTALIZER != 0
    }

    /// Serializes the command word to its 2-byte little-endian wire form.
    pub fn to_bytes(self) -> [u8; 2] {
        self.bits.to_le_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_floats(values: [f32; 4]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PROCESS_VALUES_SIZE);
        for value in values {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_decode_known_values() {
        let raw = encode_floats([12.5, 3.25, 998.2, -7.75]);
        let values = ProcessValues::from_bytes(&raw).unwrap();

        assert_eq!(values.mass_flow, 12.5);
        assert_eq!(values.volume_flow, 3.25);
        assert_eq!(values.density, 998.2);
        assert_eq!(values.temperature, -7.75);
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut raw = encode_floats([1.0, 2.0, 3.0, 4.0]);
        raw.extend_from_slice(&[0xDE, 0xAD]);
        let values = ProcessValues::from_bytes(&raw).unwrap();
        assert_eq!(values.mass_flow, 1.0);
        assert_eq!(values.temperature, 4.0);
    }

    #[test]
    fn test_decode_too_short() {
        let raw = [0u8; 15];
        let result = ProcessValues::from_bytes(&raw);
        assert!(matches!(result, Err(EipError::Decode { .. })));
    }

    #[test]
    fn test_output_command_empty() {
        let cmd = OutputCommand::new();
        assert!(!cmd.reset_totalizer());
        assert_eq!(cmd.to_bytes(), [0x00, 0x00]);
    }

    #[test]
    fn test_output_command_reset_totalizer() {
        let cmd = OutputCommand::new().with_reset_totalizer(true);
        assert!(cmd.reset_totalizer());
        assert_eq!(cmd.to_bytes(), [0x01, 0x00]);
    }

    #[test]
    fn test_output_command_clear_bit() {
        let cmd = OutputCommand::new()
            .with_reset_totalizer(true)
            .with_reset_totalizer(false);
        assert_eq!(cmd.to_bytes(), [0x00, 0x00]);
    }
}
