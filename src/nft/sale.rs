//! Sale contract: initial data cell, address derivation, getter decoder
//!
//! Listing an item for sale deploys a fixed-price sale contract whose
//! address is derived from its code and initial data, then transfers the
//! item to that address. The getter layout matches the marketplace's
//! fixed-price sale contract.

use crate::tvm::address::Address;
use crate::tvm::builder::Builder;
use crate::tvm::cell::Cell;
use crate::tvm::stack::{StackError, StackReader};
use crate::tvm::state_init::StateInit;
use anyhow::Result;
use std::sync::Arc;

/// Fee terms of a sale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleFees {
    pub marketplace_fee_address: Address,
    pub marketplace_fee: u128,
    pub royalty_address: Address,
    pub royalty_amount: u128,
}

/// Initial configuration of a sale contract
#[derive(Debug, Clone)]
pub struct SaleConfig {
    pub is_complete: bool,
    pub created_at: u32,
    pub marketplace_address: Address,
    pub nft_address: Address,
    pub nft_owner_address: Address,
    pub full_price: u128,
    pub fees: SaleFees,
}

impl SaleConfig {
    /// Builds the sale data cell
    ///
    /// Layout: completion flag (1), creation timestamp (32), marketplace,
    /// item, and owner addresses, full price (coins), ref to the fee cell
    /// (fee address, fee, royalty address, royalty amount).
    pub fn to_cell(&self) -> Result<Arc<Cell>> {
        let fees = {
            let mut builder = Builder::new();
            builder.store_address(Some(&self.fees.marketplace_fee_address))?;
            builder.store_coins(self.fees.marketplace_fee)?;
            builder.store_address(Some(&self.fees.royalty_address))?;
            builder.store_coins(self.fees.royalty_amount)?;
            builder.build()?
        };

        let mut builder = Builder::new();
        builder.store_bit(self.is_complete)?;
        builder.store_uint(self.created_at as u64, 32)?;
        builder.store_address(Some(&self.marketplace_address))?;
        builder.store_address(Some(&self.nft_address))?;
        builder.store_address(Some(&self.nft_owner_address))?;
        builder.store_coins(self.full_price)?;
        builder.store_ref(fees)?;
        builder.build()
    }

    /// Builds the state init deploying this sale with the given code
    pub fn state_init(&self, code: Arc<Cell>) -> Result<StateInit> {
        Ok(StateInit::new(code, self.to_cell()?))
    }

    /// Derives the address the sale contract will deploy at
    pub fn derive_address(&self, code: Arc<Cell>, workchain: i8) -> Result<Address> {
        self.state_init(code)?.derive_address(workchain)
    }
}

/// Decoded get_sale_data result
#[derive(Debug, Clone)]
pub struct SaleData {
    pub is_complete: bool,
    pub created_at: u32,
    pub marketplace_address: Address,
    pub nft_address: Address,
    pub nft_owner_address: Address,
    pub full_price: u128,
    pub fees: SaleFees,
}

impl SaleData {
    /// Decodes the getter stack
    ///
    /// Order: magic, completion flag, creation timestamp, marketplace
    /// address, item address, owner address, full price, fee address, fee,
    /// royalty address, royalty amount.
    pub fn read(reader: &mut StackReader) -> Result<Self, StackError> {
        reader.read_int()?; // magic
        Ok(Self {
            is_complete: reader.read_bool()?,
            created_at: reader.read_u32()?,
            marketplace_address: reader.read_address()?,
            nft_address: reader.read_address()?,
            nft_owner_address: reader.read_address()?,
            full_price: reader.read_coins()?,
            fees: SaleFees {
                marketplace_fee_address: reader.read_address()?,
                marketplace_fee: reader.read_coins()?,
                royalty_address: reader.read_address()?,
                royalty_amount: reader.read_coins()?,
            },
        })
    }
}
