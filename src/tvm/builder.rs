//! Enhanced builder for constructing cells with convenient methods
//!
//! [`CellBuilder`] (in `cell.rs`) provides the minimal bit/byte operations.
//! `Builder` wraps it with the format-level methods the message protocol
//! needs: addresses, coin amounts, optional references, dictionaries.
//!
//! # Example
//!
//! ```rust
//! use nftmarket_rs::tvm::{Address, Builder};
//!
//! let mut builder = Builder::new();
//! builder.store_address(Some(&Address::new(0, [0u8; 32]))).unwrap();
//! builder.store_coins(1_000_000_000).unwrap();
//! let cell = builder.build().unwrap();
//! assert!(cell.bit_len() > 0);
//! ```

use crate::tvm::address::Address;
use crate::tvm::cell::{Cell, CellBuilder, MAX_CELL_BITS, MAX_CELL_REFS};
use crate::tvm::slice::Slice;
use anyhow::{Result, bail};
use std::sync::Arc;

/// Extended builder with format-level convenience methods
pub struct Builder {
    inner: CellBuilder,
}

impl Builder {
    /// Creates a new builder
    pub fn new() -> Self {
        Self {
            inner: CellBuilder::new(),
        }
    }

    /// Returns the number of bits written so far
    pub fn bit_len(&self) -> usize {
        self.inner.bit_len()
    }

    /// Returns the number of bits still available
    pub fn available_bits(&self) -> usize {
        MAX_CELL_BITS - self.bit_len()
    }

    /// Returns the number of references stored so far
    pub fn ref_count(&self) -> usize {
        self.inner.reference_count()
    }

    /// Returns the number of references still available
    pub fn available_refs(&self) -> usize {
        MAX_CELL_REFS - self.ref_count()
    }

    /// Stores a single bit
    pub fn store_bit(&mut self, bit: bool) -> Result<&mut Self> {
        self.inner.store_bit(bit)?;
        Ok(self)
    }

    /// Stores multiple bits from a byte slice
    pub fn store_bits(&mut self, bits: &[u8], bit_len: usize) -> Result<&mut Self> {
        self.inner.store_bits(bits, bit_len)?;
        Ok(self)
    }

    /// Stores a byte
    pub fn store_byte(&mut self, byte: u8) -> Result<&mut Self> {
        self.inner.store_byte(byte)?;
        Ok(self)
    }

    /// Stores multiple bytes
    pub fn store_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.inner.store_bytes(bytes)?;
        Ok(self)
    }

    /// Stores a u32 value
    pub fn store_u32(&mut self, value: u32) -> Result<&mut Self> {
        self.inner.store_u32(value)?;
        Ok(self)
    }

    /// Stores a u64 value
    pub fn store_u64(&mut self, value: u64) -> Result<&mut Self> {
        self.inner.store_u64(value)?;
        Ok(self)
    }

    /// Stores an unsigned integer with a specific bit length
    pub fn store_uint(&mut self, value: u64, bits: usize) -> Result<&mut Self> {
        self.inner.store_uint(value, bits)?;
        Ok(self)
    }

    /// Stores a signed integer with a specific bit length
    pub fn store_int(&mut self, value: i64, bits: usize) -> Result<&mut Self> {
        if bits > 64 {
            bail!("Cannot store more than 64 bits");
        }

        let unsigned = if value < 0 && bits < 64 {
            (value as u64) & ((1u64 << bits) - 1)
        } else {
            value as u64
        };

        self.store_uint(unsigned, bits)
    }

    /// Stores a boolean value as a single bit
    pub fn store_bool(&mut self, value: bool) -> Result<&mut Self> {
        self.store_bit(value)
    }

    /// Stores a reference to another cell
    pub fn store_ref(&mut self, cell: Arc<Cell>) -> Result<&mut Self> {
        self.inner.store_reference(cell)?;
        Ok(self)
    }

    /// Stores an optional reference (Maybe ^Cell)
    pub fn store_maybe_ref(&mut self, cell: Option<Arc<Cell>>) -> Result<&mut Self> {
        match cell {
            Some(c) => {
                self.store_bit(true)?;
                self.store_ref(c)?;
            }
            None => {
                self.store_bit(false)?;
            }
        }
        Ok(self)
    }

    /// Stores a coin amount (VarUInteger 16)
    ///
    /// 4-bit byte length followed by the value in big-endian bytes. The
    /// format caps values at 120 bits.
    pub fn store_coins(&mut self, amount: u128) -> Result<&mut Self> {
        if amount == 0 {
            return self.store_uint(0, 4);
        }

        let byte_len = ((128 - amount.leading_zeros()) as usize).div_ceil(8);
        if byte_len > 15 {
            bail!("Coin amount exceeds 120 bits");
        }

        self.store_uint(byte_len as u64, 4)?;
        self.store_bytes(&amount.to_be_bytes()[16 - byte_len..])?;

        Ok(self)
    }

    /// Stores a short string (must fit in the current cell)
    pub fn store_string(&mut self, s: &str) -> Result<&mut Self> {
        let bytes = s.as_bytes();
        if bytes.len() * 8 > self.available_bits() {
            bail!("String too long for a single cell, use the snake encoding");
        }
        self.store_bytes(bytes)
    }

    /// Stores an internal address
    ///
    /// `None` encodes addr_none$00; `Some` encodes addr_std$10 with no
    /// anycast, an 8-bit workchain, and the 256-bit account id.
    pub fn store_address(&mut self, address: Option<&Address>) -> Result<&mut Self> {
        match address {
            None => {
                self.store_bits(&[0], 2)?;
            }
            Some(addr) => {
                self.store_uint(0b10, 2)?;
                self.store_bit(false)?;
                self.store_int(addr.workchain as i64, 8)?;
                self.store_bytes(&addr.hash_part)?;
            }
        }
        Ok(self)
    }

    /// Stores a dictionary root (as an optional reference)
    pub fn store_dict(&mut self, dict: Option<Arc<Cell>>) -> Result<&mut Self> {
        self.store_maybe_ref(dict)
    }

    /// Seals the builder into a cell
    pub fn build(self) -> Result<Arc<Cell>> {
        self.inner.build()
    }

    /// Seals the builder into a cell (alias for build)
    pub fn end_cell(self) -> Result<Arc<Cell>> {
        self.build()
    }

    /// Seals the builder and opens the result for reading
    pub fn to_slice(self) -> Result<Slice> {
        Ok(Slice::new(self.build()?))
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basic() {
        let mut builder = Builder::new();
        builder.store_u32(0x12345678).unwrap();
        builder.store_byte(0xFF).unwrap();

        assert_eq!(builder.bit_len(), 40);
        let cell = builder.build().unwrap();
        assert_eq!(cell.bit_len(), 40);
    }

    #[test]
    fn test_builder_address() {
        let addr = Address::new(0, [0u8; 32]);
        let mut builder = Builder::new();
        builder.store_address(Some(&addr)).unwrap();

        // 2 (tag) + 1 (anycast) + 8 (workchain) + 256 (account id)
        let cell = builder.build().unwrap();
        assert_eq!(cell.bit_len(), 267);
    }

    #[test]
    fn test_builder_coins() {
        let mut builder = Builder::new();
        builder.store_coins(50_000_000).unwrap();

        // 0.05 TON fits in 4 bytes: 4 length bits + 32 value bits
        let cell = builder.build().unwrap();
        assert_eq!(cell.bit_len(), 36);
    }

    #[test]
    fn test_builder_coins_too_large() {
        let mut builder = Builder::new();
        assert!(builder.store_coins(u128::MAX).is_err());
    }

    #[test]
    fn test_builder_maybe_ref() {
        let child = Builder::new().build().unwrap();

        let mut builder = Builder::new();
        builder.store_maybe_ref(Some(child)).unwrap();
        builder.store_maybe_ref(None).unwrap();

        let cell = builder.build().unwrap();
        assert_eq!(cell.bit_len(), 2);
        assert_eq!(cell.reference_count(), 1);
    }

    #[test]
    fn test_builder_string() {
        let mut builder = Builder::new();
        builder.store_string("Hello, TON!").unwrap();
        let cell = builder.build().unwrap();
        assert_eq!(cell.bit_len(), 11 * 8);

        let mut too_long = Builder::new();
        assert!(too_long.store_string(&"x".repeat(128)).is_err());
    }

    #[test]
    fn test_builder_negative_int() {
        let mut builder = Builder::new();
        builder.store_int(-1, 8).unwrap();
        let mut slice = Slice::new(builder.build().unwrap());
        assert_eq!(slice.load_int(8).unwrap(), -1);
    }
}
