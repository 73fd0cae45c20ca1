//! Slice implementation for reading data from cells
//!
//! A Slice reads a cell sequentially, tracking the current position in both
//! bits and references.

use crate::tvm::address::Address;
use crate::tvm::cell::Cell;
use anyhow::{Result, bail};
use std::sync::Arc;

/// A slice for reading data from a cell
#[derive(Debug, Clone)]
pub struct Slice {
    /// The cell being read
    cell: Arc<Cell>,
    /// Current bit position in the cell
    bit_pos: usize,
    /// Current reference position
    ref_pos: usize,
}

impl Slice {
    /// Creates a new slice from a cell
    pub fn new(cell: Arc<Cell>) -> Self {
        Self {
            cell,
            bit_pos: 0,
            ref_pos: 0,
        }
    }

    /// Returns the number of remaining bits
    pub fn remaining_bits(&self) -> usize {
        self.cell.bit_len().saturating_sub(self.bit_pos)
    }

    /// Returns the number of remaining references
    pub fn remaining_refs(&self) -> usize {
        self.cell.reference_count().saturating_sub(self.ref_pos)
    }

    /// Checks whether both bits and references are exhausted
    pub fn is_empty(&self) -> bool {
        self.remaining_bits() == 0 && self.remaining_refs() == 0
    }

    /// Loads a single bit
    pub fn load_bit(&mut self) -> Result<bool> {
        if self.remaining_bits() == 0 {
            bail!("No more bits to read");
        }

        let byte_idx = self.bit_pos / 8;
        let data = self.cell.data();
        if byte_idx >= data.len() {
            bail!("Bit position out of bounds");
        }

        let bit = (data[byte_idx] >> (7 - self.bit_pos % 8)) & 1;
        self.bit_pos += 1;

        Ok(bit == 1)
    }

    /// Loads `n` bits into a byte vector (most significant bit first)
    pub fn load_bits(&mut self, n: usize) -> Result<Vec<u8>> {
        if n > self.remaining_bits() {
            bail!(
                "Not enough bits remaining: requested {}, available {}",
                n,
                self.remaining_bits()
            );
        }

        let mut result = vec![0u8; n.div_ceil(8)];
        for i in 0..n {
            if self.load_bit()? {
                result[i / 8] |= 1 << (7 - i % 8);
            }
        }

        Ok(result)
    }

    /// Loads a byte (8 bits)
    pub fn load_byte(&mut self) -> Result<u8> {
        let bits = self.load_bits(8)?;
        Ok(bits[0])
    }

    /// Loads multiple bytes
    pub fn load_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        self.load_bits(n * 8)
    }

    /// Loads a u16 value (16 bits, big-endian)
    pub fn load_u16(&mut self) -> Result<u16> {
        let bytes = self.load_bits(16)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Loads a u32 value (32 bits, big-endian)
    pub fn load_u32(&mut self) -> Result<u32> {
        let bytes = self.load_bits(32)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Loads a u64 value (64 bits, big-endian)
    pub fn load_u64(&mut self) -> Result<u64> {
        let bytes = self.load_bits(64)?;
        Ok(u64::from_be_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    /// Loads an unsigned integer with a specific number of bits
    pub fn load_uint(&mut self, bits: usize) -> Result<u64> {
        if bits > 64 {
            bail!("Cannot load more than 64 bits into u64");
        }
        if bits == 0 {
            return Ok(0);
        }

        let bytes = self.load_bits(bits)?;
        let mut result = 0u64;
        for (i, &byte) in bytes.iter().enumerate() {
            result |= (byte as u64) << ((bytes.len() - 1 - i) * 8);
        }

        // The loaded value sits in the high bits of the last byte
        result >>= bytes.len() * 8 - bits;

        Ok(result)
    }

    /// Loads a signed integer with a specific number of bits
    pub fn load_int(&mut self, bits: usize) -> Result<i64> {
        if bits > 64 {
            bail!("Cannot load more than 64 bits into i64");
        }
        if bits == 0 {
            return Ok(0);
        }

        let unsigned = self.load_uint(bits)?;

        let sign_bit = 1u64 << (bits - 1);
        if unsigned & sign_bit != 0 {
            let mask = !0u64 << bits;
            Ok((unsigned | mask) as i64)
        } else {
            Ok(unsigned as i64)
        }
    }

    /// Loads coins (VarUInteger 16: 4-bit byte length, then that many bytes)
    pub fn load_coins(&mut self) -> Result<u128> {
        let len = self.load_uint(4)? as usize;
        if len > 15 {
            bail!("Coins length {} exceeds maximum 15", len);
        }
        if len == 0 {
            return Ok(0);
        }

        let bytes = self.load_bytes(len)?;
        let mut result = 0u128;
        for &byte in &bytes {
            result = (result << 8) | (byte as u128);
        }

        Ok(result)
    }

    /// Loads an internal address
    ///
    /// Understands addr_none$00 and addr_std$10 without anycast, the only
    /// forms the marketplace contracts produce.
    pub fn load_address(&mut self) -> Result<Option<Address>> {
        match self.load_uint(2)? {
            0b00 => Ok(None),
            0b10 => {
                if self.load_bit()? {
                    bail!("Anycast addresses are not supported");
                }
                let workchain = self.load_int(8)? as i8;
                let bytes = self.load_bytes(32)?;
                let mut hash_part = [0u8; 32];
                hash_part.copy_from_slice(&bytes);
                Ok(Some(Address::new(workchain, hash_part)))
            }
            tag => bail!("Unsupported address tag {:#04b}", tag),
        }
    }

    /// Loads a reference to another cell
    pub fn load_reference(&mut self) -> Result<Arc<Cell>> {
        if self.remaining_refs() == 0 {
            bail!("No more references to read");
        }

        let reference = self
            .cell
            .reference(self.ref_pos)
            .ok_or_else(|| anyhow::anyhow!("Reference not found"))?
            .clone();

        self.ref_pos += 1;
        Ok(reference)
    }

    /// Skips a number of bits
    pub fn skip_bits(&mut self, n: usize) -> Result<()> {
        if n > self.remaining_bits() {
            bail!(
                "Cannot skip {} bits: only {} remaining",
                n,
                self.remaining_bits()
            );
        }
        self.bit_pos += n;
        Ok(())
    }

    /// Loads all remaining bits
    pub fn load_remaining_bits(&mut self) -> Result<Vec<u8>> {
        let remaining = self.remaining_bits();
        self.load_bits(remaining)
    }

    /// Gets the underlying cell
    pub fn cell(&self) -> &Arc<Cell> {
        &self.cell
    }
}

impl From<Arc<Cell>> for Slice {
    fn from(cell: Arc<Cell>) -> Self {
        Self::new(cell)
    }
}
