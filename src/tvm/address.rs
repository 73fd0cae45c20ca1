//! TON address handling
//!
//! An address is a workchain id plus the 256-bit account id. Both the raw
//! hex form ("workchain:hash") and the user-friendly base64 form (with tag
//! byte and CRC16) are supported.

use anyhow::{Result, bail};
use base64::Engine;
use std::fmt;

/// CRC16/XMODEM over the tag, workchain, and account id bytes
fn crc16(data: &[u8]) -> [u8; 2] {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc.to_be_bytes()
}

/// Represents an account address on the ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    /// Workchain ID (-1 for masterchain, 0 for basechain)
    pub workchain: i8,
    /// 32-byte account id
    pub hash_part: [u8; 32],
    /// Whether the address is bounceable
    pub is_bounceable: bool,
    /// Whether this is a test-only address
    pub is_test_only: bool,
}

impl Address {
    /// Creates a new address from workchain and account id
    pub fn new(workchain: i8, hash_part: [u8; 32]) -> Self {
        Self {
            workchain,
            hash_part,
            is_bounceable: true,
            is_test_only: false,
        }
    }

    /// Parses an address from either the hex or the base64 format
    pub fn parse(address: &str) -> Result<Self> {
        if let Ok(addr) = Self::from_hex(address) {
            return Ok(addr);
        }
        if let Ok(addr) = Self::from_base64(address) {
            return Ok(addr);
        }

        bail!("Invalid address format")
    }

    /// Parses an address from the raw format "workchain:hash"
    pub fn from_hex(address: &str) -> Result<Self> {
        let parts: Vec<&str> = address.split(':').collect();
        if parts.len() != 2 {
            bail!("Invalid hex address format");
        }

        let workchain = parts[0].parse::<i8>()?;
        let hash_hex = parts[1];
        if hash_hex.len() != 64 {
            bail!("Hash part must be 64 hex characters");
        }

        let hash_bytes = hex::decode(hash_hex)?;
        let mut hash_part = [0u8; 32];
        hash_part.copy_from_slice(&hash_bytes);

        Ok(Self::new(workchain, hash_part))
    }

    /// Parses an address from the user-friendly base64 format
    pub fn from_base64(address: &str) -> Result<Self> {
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(address)
            .or_else(|_| base64::engine::general_purpose::STANDARD.decode(address))?;

        if decoded.len() != 36 {
            bail!("Invalid base64 address length");
        }

        let mut tag = decoded[0];
        let mut is_test_only = false;
        if tag & 0x80 != 0 {
            is_test_only = true;
            tag ^= 0x80;
        }

        let is_bounceable = match tag {
            0x11 => true,
            0x51 => false,
            _ => bail!("Invalid address tag"),
        };

        let workchain = decoded[1] as i8;
        let mut hash_part = [0u8; 32];
        hash_part.copy_from_slice(&decoded[2..34]);

        let expected_crc = &decoded[34..36];
        let actual_crc = crc16(&decoded[0..34]);
        if expected_crc != actual_crc {
            bail!("Invalid address CRC");
        }

        Ok(Self {
            workchain,
            hash_part,
            is_bounceable,
            is_test_only,
        })
    }

    /// Formats the address with explicit flag choices
    pub fn to_string_with(
        &self,
        user_friendly: bool,
        url_safe: bool,
        bounceable: bool,
        test_only: bool,
    ) -> String {
        if !user_friendly {
            return format!("{}:{}", self.workchain, hex::encode(self.hash_part));
        }

        let mut tag = if bounceable { 0x11u8 } else { 0x51u8 };
        if test_only {
            tag |= 0x80;
        }

        let mut data = Vec::with_capacity(36);
        data.push(tag);
        data.push(self.workchain as u8);
        data.extend_from_slice(&self.hash_part);
        data.extend_from_slice(&crc16(&data));

        if url_safe {
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&data)
        } else {
            base64::engine::general_purpose::STANDARD.encode(&data)
        }
    }

    /// Formats as the raw "workchain:hash" form
    pub fn to_hex(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash_part))
    }

    /// Formats as the user-friendly base64 form
    pub fn to_base64(&self) -> String {
        self.to_string_with(true, true, self.is_bounceable, self.is_test_only)
    }

    /// Sets the bounceable flag
    pub fn set_bounceable(&mut self, bounceable: bool) {
        self.is_bounceable = bounceable;
    }

    /// Sets the test-only flag
    pub fn set_test_only(&mut self, test_only: bool) {
        self.is_test_only = test_only;
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base64())
    }
}

impl std::str::FromStr for Address {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
