//! # Promass EtherNet/IP Client Library
//!
//! A Rust library for communicating with Endress+Hauser Promass and ProMag
//! flow meters over EtherNet/IP explicit (unconnected) CIP messaging.
//!
//! This is a **protocol-only** library—no polling loops, schedulers, or
//! application-level features. Each call produces exactly 1 request and
//! 1 response. Reconnection policy lives in one place, the device driver,
//! and is bounded and explicit.
//!
//! ## Features
//!
//! - **Explicit messaging only** — Get/Set Attribute Single over SendRRData
//! - **Deterministic** — each call produces exactly 1 request and 1 response
//! - **Type-safe** — encapsulation commands and CIP services as enums
//! - **No panics** — all errors returned as `Result<T, EipError>`
//! - **Layered** — transport, CIP framing, and device driver are separate
//!
//! ## Quick Start
//!
//! ```no_run
//! use promass_enip::{DeviceConfig, PromassDevice};
//! use std::net::Ipv4Addr;
//!
//! fn main() -> promass_enip::Result<()> {
//!     let config = DeviceConfig::new(Ipv4Addr::new(192, 168, 1, 100).into());
//!     let mut device = PromassDevice::new(config);
//!     device.connect_with_retry()?;
//!
//!     let vendor = device.read_identity_vendor_id()?;
//!     println!("vendor id: {}", vendor);
//!
//!     let values = device.read_process_values()?;
//!     println!(
//!         "mass flow {} | volume flow {} | density {} | temperature {}",
//!         values.mass_flow, values.volume_flow, values.density, values.temperature
//!     );
//!
//!     device.reset_totalizer()?;
//!     device.disconnect()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Layers
//!
//! | Layer | Module | Responsibility |
//! |-------|--------|----------------|
//! | Device driver | [`PromassDevice`] | Identity/assembly operations, retry policy |
//! | CIP client | [`CipClient`] | Explicit service requests and responses |
//! | CIP framing | [`cip`], [`path`], [`cpf`] | Byte-level message construction |
//! | Transport | [`TcpTransport`] | TCP socket, encapsulation frames, session |
//!
//! Lower layers can be used directly when the device façade does not fit:
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
//! // Any class/instance/attribute triple is reachable.
//! let raw = client.get_attribute_single(0x01, 1, 7)?; // product name
//! println!("{} bytes", raw.len());
//! # Ok::<(), promass_enip::EipError>(())
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, EipError>`]. The library never panics
//! in public code. [`EipError::invalidates_session`] tells reconnect-vs-
//! surface apart: transport and protocol failures require a reconnect,
//! while a CIP rejection leaves the session valid.
//!
//! ```no_run
//! use promass_enip::{DeviceConfig, EipError, PromassDevice};
//! use std::net::Ipv4Addr;
//!
//! let mut device = PromassDevice::new(DeviceConfig::new(
//!     Ipv4Addr::new(192, 168, 1, 100).into(),
//! ));
//!
//! match device.read_process_values() {
//!     Ok(values) => println!("mass flow: {}", values.mass_flow),
//!     Err(EipError::Cip { status, additional }) => {
//!         println!("device rejected request: status={}, additional={:?}", status, additional);
//!     }
//!     Err(e) if e.invalidates_session() => {
//!         device.connect_with_retry()?;
//!     }
//!     Err(e) => println!("error: {}", e),
//! }
//! # Ok::<(), EipError>(())
//! ```
//!
//! ## Concurrency
//!
//! All I/O is synchronous and blocking, and exactly one CIP transaction may
//! be in flight per session: the protocol is strictly request/response over
//! a single TCP stream. All I/O methods take `&mut self`, so exclusive
//! access is enforced at compile time. For concurrent device access, run
//! one driver per thread or open independent sessions.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod assembly;
pub mod cip;
mod client;
pub mod cpf;
mod device;
mod encap;
mod error;
mod path;
mod transport;

// Public re-exports
pub use assembly::{OutputCommand, ProcessValues, PROCESS_VALUES_SIZE};
pub use cip::CipService;
pub use client::CipClient;
pub use device::{
    DeviceConfig, PromassDevice, DEFAULT_INPUT_INSTANCE, DEFAULT_OUTPUT_INSTANCE,
};
pub use encap::{EncapCommand, EncapHeader, ENCAP_HEADER_SIZE, PROTOCOL_VERSION};
pub use error::{EipError, Result};
pub use path::CipPath;
pub use transport::{TcpTransport, DEFAULT_ENIP_PORT, DEFAULT_TIMEOUT};
