//! Item contract: transfer message and getter decoder

use crate::nft::ops;
use crate::tvm::address::Address;
use crate::tvm::builder::Builder;
use crate::tvm::cell::Cell;
use crate::tvm::stack::{StackError, StackReader};
use anyhow::Result;
use std::sync::Arc;

/// Parameters of a standard item transfer
#[derive(Debug, Clone)]
pub struct TransferParams {
    pub query_id: u64,
    pub new_owner: Address,
    pub response_destination: Address,
    pub forward_amount: u128,
}

/// Builds a transfer body (TEP-62)
///
/// Layout: op, query id, new owner, response destination, null custom
/// payload (1 zero bit), forward amount (coins), inline empty forward
/// payload (1 zero bit).
pub fn transfer_body(params: &TransferParams) -> Result<Arc<Cell>> {
    let mut builder = Builder::new();
    builder.store_u32(ops::TRANSFER)?;
    builder.store_u64(params.query_id)?;
    builder.store_address(Some(&params.new_owner))?;
    builder.store_address(Some(&params.response_destination))?;
    builder.store_bit(false)?;
    builder.store_coins(params.forward_amount)?;
    builder.store_bit(false)?;
    builder.build()
}

/// Decoded get_nft_data result
#[derive(Debug, Clone)]
pub struct NftItemData {
    pub init: bool,
    pub index: u64,
    pub collection: Option<Address>,
    pub owner: Option<Address>,
    pub individual_content: Arc<Cell>,
}

impl NftItemData {
    /// Decodes the getter stack: init flag, index, collection address,
    /// owner address, individual content cell
    pub fn read(reader: &mut StackReader) -> Result<Self, StackError> {
        Ok(Self {
            init: reader.read_bool()?,
            index: reader.read_u64()?,
            collection: reader.read_maybe_address()?,
            owner: reader.read_maybe_address()?,
            individual_content: reader.read_cell()?,
        })
    }
}
