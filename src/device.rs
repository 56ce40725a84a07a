//! High-level driver for Endress+Hauser Promass/Promag flow meters.
//!
//! [`PromassDevice`] builds domain operations (identity reads, process
//! values, totalizer reset) from explicit CIP messaging, and owns the
//! connection-resilience policy: bounded reconnect attempts with a fixed
//! delay. The transport below it never retries.
//!
//! # Object Addresses
//!
//! | Object | Class | Instance | Attribute |
//! |--------|:-----:|:--------:|-----------|
//! | Identity | 0x01 | 1 | 1 = vendor id, 3 = product code |
//! | Assembly (input) | 0x04 | configurable (default 100) | 3 = data |
//! | Assembly (output) | 0x04 | configurable (default 150) | 3 = data |
//!
//! # Failure Model
//!
//! A transport or protocol failure during any operation drops the session;
//! the device reports disconnected and the caller triggers reconnection
//! before the next operation. A CIP rejection (`EipError::Cip`) or a
//! decode failure leaves the session up.
//!
//! # Example
//!
//! ```no_run
//! use promass_enip::{DeviceConfig, PromassDevice};
//! use std::net::Ipv4Addr;
//!
//! let config = DeviceConfig::new(Ipv4Addr::new(192, 168, 1, 100).into());
//! let mut device = PromassDevice::new(config);
//! device.connect_with_retry()?;
//!
//! let vendor = device.read_identity_vendor_id()?;
//! let values = device.read_process_values()?;
//! println!("vendor {}: mass flow {}", vendor, values.mass_flow);
//!
//! device.reset_totalizer()?;
//! device.disconnect()?;
//! # Ok::<(), promass_enip::EipError>(())
//! ```

use std::net::{IpAddr, SocketAddr};
use std::thread;
use std::time::Duration;

use log::{info, warn};

use crate::assembly::{OutputCommand, ProcessValues};
use crate::client::CipClient;
use crate::error::{EipError, Result};
use crate::transport::{TcpTransport, DEFAULT_ENIP_PORT, DEFAULT_TIMEOUT};

/// Identity object class id.
const IDENTITY_CLASS: u32 = 0x01;
/// Identity object instance used for device-level attributes.
const IDENTITY_INSTANCE: u32 = 1;
/// Identity attribute 1: vendor id.
const ATTR_VENDOR_ID: u32 = 1;
/// Identity attribute 3: product code.
const ATTR_PRODUCT_CODE: u32 = 3;

/// Assembly object class id.
const ASSEMBLY_CLASS: u32 = 0x04;
/// Assembly attribute 3: instance data.
const ASSEMBLY_DATA_ATTRIBUTE: u32 = 3;

/// Default input assembly instance for Proline meters.
pub const DEFAULT_INPUT_INSTANCE: u32 = 100;
/// Default output assembly instance for Proline meters.
pub const DEFAULT_OUTPUT_INSTANCE: u32 = 150;

/// Configuration for a Promass/Promag device connection.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Device socket address.
    pub addr: SocketAddr,
    /// Socket timeout for connect, send, and receive.
    pub timeout: Duration,
    /// Input assembly instance (device → client data).
    pub input_instance: u32,
    /// Output assembly instance (client → device commands).
    pub output_instance: u32,
    /// Reconnect attempts after the first failure.
    pub retry_count: u32,
    /// Delay between reconnect attempts.
    pub retry_delay: Duration,
}

impl DeviceConfig {
    /// Creates a configuration with defaults: port 44818, 2 s timeout,
    /// assembly instances 100/150, 3 retries with 1 s delay.
    ///
    /// # Example
    ///
    /// ```
    /// use promass_enip::DeviceConfig;
    /// use std::net::Ipv4Addr;
    ///
    /// let config = DeviceConfig::new(Ipv4Addr::new(192, 168, 1, 100).into());
    /// assert_eq!(config.addr.port(), 44818);
    /// ```
    pub fn new(ip: IpAddr) -> Self {
        Self {
            addr: SocketAddr::new(ip, DEFAULT_ENIP_PORT),
            timeout: DEFAULT_TIMEOUT,
            input_instance: DEFAULT_INPUT_INSTANCE,
            output_instance: DEFAULT_OUTPUT_INSTANCE,
            retry_count: 3,
            retry_delay: Duration::from_secs(1),
        }
    }

    /// Sets a custom TCP port (default is 44818).
    pub fn with_port(mut self, port: u16) -> Self {
        self.addr.set_port(port);
        self
    }

    /// Sets a custom socket timeout (default is 2 seconds).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the input assembly instance (default is 100).
    pub fn with_input_instance(mut self, instance: u32) -> Self {
        self.input_instance = instance;
        self
    }

    /// Sets the output assembly instance (default is 150).
    pub fn with_output_instance(mut self, instance: u32) -> Self {
        self.output_instance = instance;
        self
    }

    /// Sets the number of reconnect attempts after the first failure.
    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    /// Sets the delay between reconnect attempts (default is 1 second).
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

/// Driver for a Promass/Promag flow meter over explicit CIP messaging.
#[derive(Debug)]
pub struct PromassDevice {
    client: CipClient,
    input_instance: u32,
    output_instance: u32,
    retry_count: u32,
    retry_delay: Duration,
}

impl PromassDevice {
    /// Creates a device driver. No I/O happens until a connect call.
    pub fn new(config: DeviceConfig) -> Self {
        let transport = TcpTransport::new(config.addr, config.timeout);
        Self {
            client: CipClient::new(transport),
            input_instance: config.input_instance,
            output_instance: config.output_instance,
            retry_count: config.retry_count,
            retry_delay: config.retry_delay,
        }
    }

    /// Performs a single connect attempt. Idempotent while connected.
    pub fn connect(&mut self) -> Result<()> {
        self.client.connect()
    }

    /// Connects with the configured retry policy: up to `retry_count + 1`
    /// attempts, sleeping `retry_delay` between them. Each attempt either
    /// fully registers a session or leaves the device disconnected; the
    /// last failure is returned only after all attempts are exhausted.
    pub fn connect_with_retry(&mut self) -> Result<()> {
        let attempts = self.retry_count + 1;
        let mut last_err = None;

        for attempt in 1..=attempts {
            match self.client.connect() {
                Ok(()) => {
                    info!(
                        "connected to {} on attempt {}",
                        self.client.transport().remote_addr(),
                        attempt
                    );
                    return Ok(());
                }
                Err(e) => {
                    warn!("connection attempt {}/{} failed: {}", attempt, attempts, e);
                    last_err = Some(e);
                    if attempt < attempts {
                        thread::sleep(self.retry_delay);
                    }
                }
            }
        }

        Err(last_err.unwrap_or(EipError::NotConnected))
    }

    /// Closes the session and socket. Idempotent.
    pub fn disconnect(&mut self) -> Result<()> {
        self.client.close()
    }

    /// Returns whether a session is registered.
    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    /// Reads the vendor id from the Identity object.
    ///
    /// # Errors
    ///
    /// Returns `EipError::Decode` if fewer than 2 bytes come back.
    pub fn read_identity_vendor_id(&mut self) -> Result<u16> {
        let raw = self
            .client
            .get_attribute_single(IDENTITY_CLASS, IDENTITY_INSTANCE, ATTR_VENDOR_ID)?;
        decode_u16_le(&raw, "vendor id")
    }

    /// Reads the product code from the Identity object.
    ///
    /// # Errors
    ///
    /// Returns `EipError::Decode` if fewer than 2 bytes come back.
    pub fn read_identity_product_code(&mut self) -> Result<u16> {
        let raw = self
            .client
            .get_attribute_single(IDENTITY_CLASS, IDENTITY_INSTANCE, ATTR_PRODUCT_CODE)?;
        decode_u16_le(&raw, "product code")
    }

    /// Reads the raw input assembly data.
    pub fn read_input_assembly_raw(&mut self) -> Result<Vec<u8>> {
        self.client.get_attribute_single(
            ASSEMBLY_CLASS,
            self.input_instance,
            ASSEMBLY_DATA_ATTRIBUTE,
        )
    }

    /// Reads and decodes the process values from the input assembly.
    pub fn read_process_values(&mut self) -> Result<ProcessValues> {
        let raw = self.read_input_assembly_raw()?;
        ProcessValues::from_bytes(&raw)
    }

    /// Writes raw data to the output assembly.
    pub fn write_output_assembly_raw(&mut self, data: &[u8]) -> Result<()> {
        self.client.set_attribute_single(
            ASSEMBLY_CLASS,
            self.output_instance,
            ASSEMBLY_DATA_ATTRIBUTE,
            data,
        )
    }

    /// Raises the reset-totalizer bit in the output assembly.
    ///
    /// Whether the device treats the bit as edge or level triggered is
    /// model specific; consult the instrument manual.
    pub fn reset_totalizer(&mut self) -> Result<()> {
        let command = OutputCommand::new().with_reset_totalizer(true);
        self.write_output_assembly_raw(&command.to_bytes())
    }
}

fn decode_u16_le(raw: &[u8], what: &str) -> Result<u16> {
    if raw.len() < 2 {
        return Err(EipError::decode(format!(
            "{} response too short: expected 2 bytes, got {}",
            what,
            raw.len()
        )));
    }
    Ok(u16::from_le_bytes([raw[0], raw[1]]))
}
