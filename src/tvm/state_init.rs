//! State-init cells and deterministic address derivation
//!
//! An undeployed contract's address is the hash of its initial state: a
//! fixed-shape cell holding the code and data trees. Building the same
//! (code, data) pair always derives the same address, which lets the
//! marketplace predict a sale contract's address before funding it.

use crate::tvm::address::Address;
use crate::tvm::builder::Builder;
use crate::tvm::cell::Cell;
use anyhow::Result;
use std::sync::Arc;

/// Initial state of a contract: code and data cells
#[derive(Debug, Clone)]
pub struct StateInit {
    pub code: Arc<Cell>,
    pub data: Arc<Cell>,
}

impl StateInit {
    /// Creates a state init from code and data cells
    pub fn new(code: Arc<Cell>, data: Arc<Cell>) -> Self {
        Self { code, data }
    }

    /// Builds the state-init cell
    ///
    /// Layout: no split_depth and no special marker (2 zero bits), code and
    /// data as Maybe references, no library (1 zero bit).
    pub fn to_cell(&self) -> Result<Arc<Cell>> {
        let mut builder = Builder::new();
        builder.store_uint(0, 2)?;
        builder.store_maybe_ref(Some(self.code.clone()))?;
        builder.store_maybe_ref(Some(self.data.clone()))?;
        builder.store_bit(false)?;
        builder.build()
    }

    /// Derives the contract address for the given workchain
    pub fn derive_address(&self, workchain: i8) -> Result<Address> {
        Ok(Address::new(workchain, self.to_cell()?.hash()))
    }
}
