//! CIP EPATH encoding for class/instance/attribute addressing.
//!
//! An EPATH is a sequence of logical segments addressing an object in the
//! CIP object model. This module implements the 8-bit and 16-bit logical
//! segment forms used for explicit messaging:
//!
//! | Segment | 8-bit type | 16-bit type |
//! |-----------|:----------:|:-----------:|
//! | Class | 0x20 | 0x21 |
//! | Instance | 0x24 | 0x25 |
//! | Attribute | 0x30 | 0x31 |
//!
//! The 8-bit form `[type, value]` is used for values below 256; the
//! 16-bit form `[type + 1, 0x00, lo, hi]` (value little-endian, with a
//! pad byte) for values up to 0xFFFF. Larger values are a caller error.
//!
//! # Example
//!
//! ```
//! use promass_enip::CipPath;
//!
//! // Assembly object, instance 100, data attribute.
//! let path = CipPath::new(0x04, 100, Some(3));
//! assert_eq!(path.encode().unwrap(), vec![0x20, 0x04, 0x24, 0x64, 0x30, 0x03]);
//! ```

use crate::error::{EipError, Result};

const SEG_CLASS: u8 = 0x20;
const SEG_INSTANCE: u8 = 0x24;
const SEG_ATTRIBUTE: u8 = 0x30;

/// CIP path addressing a class, instance, and optionally an attribute.
///
/// Segments are always emitted in class, instance, attribute order; each
/// is optional. Values are validated to fit in 16 bits at encode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipPath {
    /// Class id, if addressed.
    pub class_id: Option<u32>,
    /// Instance id, if addressed.
    pub instance_id: Option<u32>,
    /// Attribute id, if addressed.
    pub attribute_id: Option<u32>,
}

impl CipPath {
    /// Creates a path with class, instance, and optional attribute.
    ///
    /// # Example
    ///
    /// ```
    /// use promass_enip::CipPath;
    ///
    /// // Identity object, instance 1, vendor id attribute.
    /// let path = CipPath::new(0x01, 1, Some(1));
    /// ```
    pub fn new(class_id: u32, instance_id: u32, attribute_id: Option<u32>) -> Self {
        Self {
            class_id: Some(class_id),
            instance_id: Some(instance_id),
            attribute_id,
        }
    }

    /// Creates a path addressing only a class.
    pub fn class(class_id: u32) -> Self {
        Self {
            class_id: Some(class_id),
            instance_id: None,
            attribute_id: None,
        }
    }

    /// Creates a path addressing only an instance.
    pub fn instance(instance_id: u32) -> Self {
        Self {
            class_id: None,
            instance_id: Some(instance_id),
            attribute_id: None,
        }
    }

    /// Encodes the path into EPATH bytes.
    ///
    /// # Errors
    ///
    /// Returns `EipError::InvalidParameter` if any segment value exceeds
    /// 0xFFFF.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut path = Vec::with_capacity(12);
        if let Some(class_id) = self.class_id {
            encode_segment(&mut path, SEG_CLASS, "class_id", class_id)?;
        }
        if let Some(instance_id) = self.instance_id {
            encode_segment(&mut path, SEG_INSTANCE, "instance_id", instance_id)?;
        }
        if let Some(attribute_id) = self.attribute_id {
            encode_segment(&mut path, SEG_ATTRIBUTE, "attribute_id", attribute_id)?;
        }
        Ok(path)
    }
}

fn encode_segment(out: &mut Vec<u8>, seg_type: u8, name: &str, value: u32) -> Result<()> {
    if value > 0xFFFF {
        return Err(EipError::invalid_parameter(name, "must fit in 16 bits"));
    }
    if value < 256 {
        out.push(seg_type);
        out.push(value as u8);
    } else {
        out.push(seg_type + 1);
        out.push(0x00);
        out.extend_from_slice(&(value as u16).to_le_bytes());
    }
    Ok(())
}
