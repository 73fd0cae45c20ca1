//! Typed cursor over getter result stacks
//!
//! A getter call returns an ordered, untyped stack of values. The layout is
//! positional: reading the wrong count or order silently shifts every later
//! field. [`StackReader`] makes the position explicit and fails with a typed
//! [`StackError`] on arity or type mismatch instead of producing garbage.

use crate::tvm::address::Address;
use crate::tvm::cell::Cell;
use crate::tvm::slice::Slice;
use num_bigint::BigInt;
use std::sync::Arc;
use thiserror::Error;

/// A single value on a getter result stack
#[derive(Debug, Clone)]
pub enum StackValue {
    /// Integer (up to 257 bits on the ledger side)
    Int(BigInt),
    /// Cell value
    Cell(Arc<Cell>),
    /// Slice value
    Slice(Slice),
    /// Null value
    Null,
}

impl StackValue {
    fn kind(&self) -> &'static str {
        match self {
            StackValue::Int(_) => "int",
            StackValue::Cell(_) => "cell",
            StackValue::Slice(_) => "slice",
            StackValue::Null => "null",
        }
    }
}

/// Error produced by a [`StackReader`] on a layout mismatch
#[derive(Debug, Error)]
pub enum StackError {
    #[error("getter stack exhausted at position {position}: expected {expected}")]
    Underflow {
        position: usize,
        expected: &'static str,
    },
    #[error("getter stack type mismatch at position {position}: expected {expected}, found {found}")]
    TypeMismatch {
        position: usize,
        expected: &'static str,
        found: &'static str,
    },
    #[error("malformed {expected} at position {position}: {reason}")]
    Malformed {
        position: usize,
        expected: &'static str,
        reason: String,
    },
}

/// Cursor that consumes a getter result stack in order
pub struct StackReader {
    values: Vec<StackValue>,
    pos: usize,
}

impl StackReader {
    /// Creates a reader over the values in getter return order
    pub fn new(values: Vec<StackValue>) -> Self {
        Self { values, pos: 0 }
    }

    /// Returns the number of unread values
    pub fn remaining(&self) -> usize {
        self.values.len().saturating_sub(self.pos)
    }

    fn next(&mut self, expected: &'static str) -> Result<&StackValue, StackError> {
        let position = self.pos;
        let value = self
            .values
            .get(position)
            .ok_or(StackError::Underflow { position, expected })?;
        self.pos += 1;
        Ok(value)
    }

    /// Reads an integer value
    pub fn read_int(&mut self) -> Result<BigInt, StackError> {
        let position = self.pos;
        match self.next("int")? {
            StackValue::Int(v) => Ok(v.clone()),
            other => Err(StackError::TypeMismatch {
                position,
                expected: "int",
                found: other.kind(),
            }),
        }
    }

    /// Reads an integer as a boolean (non-zero is true)
    pub fn read_bool(&mut self) -> Result<bool, StackError> {
        Ok(self.read_int()? != BigInt::from(0))
    }

    /// Reads an integer that must fit in u64
    pub fn read_u64(&mut self) -> Result<u64, StackError> {
        let position = self.pos;
        let value = self.read_int()?;
        u64::try_from(&value).map_err(|_| StackError::Malformed {
            position,
            expected: "u64",
            reason: format!("value {} out of range", value),
        })
    }

    /// Reads an integer that must fit in u32
    pub fn read_u32(&mut self) -> Result<u32, StackError> {
        let position = self.pos;
        let value = self.read_int()?;
        u32::try_from(&value).map_err(|_| StackError::Malformed {
            position,
            expected: "u32",
            reason: format!("value {} out of range", value),
        })
    }

    /// Reads an integer that must fit in u16
    pub fn read_u16(&mut self) -> Result<u16, StackError> {
        let position = self.pos;
        let value = self.read_int()?;
        u16::try_from(&value).map_err(|_| StackError::Malformed {
            position,
            expected: "u16",
            reason: format!("value {} out of range", value),
        })
    }

    /// Reads a coin amount (non-negative, at most 120 bits)
    pub fn read_coins(&mut self) -> Result<u128, StackError> {
        let position = self.pos;
        let value = self.read_int()?;
        u128::try_from(&value).map_err(|_| StackError::Malformed {
            position,
            expected: "coins",
            reason: format!("value {} out of range", value),
        })
    }

    /// Reads a cell value
    pub fn read_cell(&mut self) -> Result<Arc<Cell>, StackError> {
        let position = self.pos;
        match self.next("cell")? {
            StackValue::Cell(c) => Ok(c.clone()),
            other => Err(StackError::TypeMismatch {
                position,
                expected: "cell",
                found: other.kind(),
            }),
        }
    }

    /// Reads a slice value
    pub fn read_slice(&mut self) -> Result<Slice, StackError> {
        let position = self.pos;
        match self.next("slice")? {
            StackValue::Slice(s) => Ok(s.clone()),
            other => Err(StackError::TypeMismatch {
                position,
                expected: "slice",
                found: other.kind(),
            }),
        }
    }

    /// Reads a slice holding an address, which may be addr_none
    pub fn read_maybe_address(&mut self) -> Result<Option<Address>, StackError> {
        let position = self.pos;
        let mut slice = self.read_slice()?;
        slice.load_address().map_err(|e| StackError::Malformed {
            position,
            expected: "address",
            reason: e.to_string(),
        })
    }

    /// Reads a slice holding a required address
    pub fn read_address(&mut self) -> Result<Address, StackError> {
        let position = self.pos;
        self.read_maybe_address()?.ok_or(StackError::Malformed {
            position,
            expected: "address",
            reason: "addr_none where an address is required".to_string(),
        })
    }
}
