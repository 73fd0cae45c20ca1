//! TVM data structures and utilities
//!
//! Implementations of the fundamental ledger data structures:
//! - Cell: bounded bit string (up to 1023 bits) with up to 4 references
//! - Slice: sequential reader over cell data
//! - Builder: cell construction with format-level methods
//! - BoC: Bag of Cells wire serialization
//! - Dict: canonical fixed-key dictionary
//! - StackReader: typed cursor over getter result stacks
//! - StateInit: deterministic contract address derivation
//! - Address: account address handling

pub mod address;
pub mod boc;
pub mod builder;
pub mod cell;
pub mod dict;
pub mod slice;
pub mod stack;
pub mod state_init;
#[cfg(test)]
pub mod tests;

pub use address::Address;
pub use boc::{
    base64_to_boc, boc_to_base64, boc_to_hex, deserialize_boc, hex_to_boc, serialize_boc,
};
pub use builder::Builder;
pub use cell::{Cell, CellBuilder, MAX_CELL_BITS, MAX_CELL_REFS};
pub use dict::Dict;
pub use slice::Slice;
pub use stack::{StackError, StackReader, StackValue};
pub use state_init::StateInit;
