//! Collection contract: config cell, message bodies, getter decoders

use crate::content::{decode_content, encode_offchain_content, make_snake_cell};
use crate::nft::ops;
use crate::tvm::address::Address;
use crate::tvm::builder::Builder;
use crate::tvm::cell::Cell;
use crate::tvm::stack::{StackError, StackReader};
use anyhow::{Result, bail};
use std::sync::Arc;

/// Royalty terms of a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoyaltyParams {
    pub factor: u16,
    pub base: u16,
    pub address: Address,
}

impl RoyaltyParams {
    /// Builds the royalty cell: factor(16), base(16), address
    pub fn to_cell(&self) -> Result<Arc<Cell>> {
        if self.factor > self.base {
            bail!(
                "Royalty factor {} exceeds base {}",
                self.factor,
                self.base
            );
        }

        let mut builder = Builder::new();
        builder.store_uint(self.factor as u64, 16)?;
        builder.store_uint(self.base as u64, 16)?;
        builder.store_address(Some(&self.address))?;
        builder.build()
    }

    /// Royalty owed on a price, floor of price * factor / base
    pub fn royalty_amount(&self, price: u128) -> u128 {
        price * self.factor as u128 / self.base as u128
    }

    /// Decodes the royalty_params getter result: factor, base, address
    pub fn read(reader: &mut StackReader) -> Result<Self, StackError> {
        Ok(Self {
            factor: reader.read_u16()?,
            base: reader.read_u16()?,
            address: reader.read_address()?,
        })
    }
}

/// Full configuration of a collection contract
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    pub owner: Address,
    pub next_item_index: u64,
    pub collection_content_url: String,
    pub common_content_url: String,
    pub nft_item_code: Arc<Cell>,
    pub royalty: RoyaltyParams,
    pub mint_price: u128,
    pub is_verified: bool,
}

impl CollectionConfig {
    /// Builds the collection data cell
    ///
    /// Layout: owner address, next item index (64), ref to the content pair
    /// (collection content with the off-chain marker, common content raw),
    /// ref to the item code, ref to the royalty cell, mint price (coins),
    /// verified flag (1).
    pub fn to_cell(&self) -> Result<Arc<Cell>> {
        let content = {
            let mut builder = Builder::new();
            builder.store_ref(encode_offchain_content(&self.collection_content_url)?)?;
            builder.store_ref(make_snake_cell(self.common_content_url.as_bytes())?)?;
            builder.build()?
        };

        let mut builder = Builder::new();
        builder.store_address(Some(&self.owner))?;
        builder.store_u64(self.next_item_index)?;
        builder.store_ref(content)?;
        builder.store_ref(self.nft_item_code.clone())?;
        builder.store_ref(self.royalty.to_cell()?)?;
        builder.store_coins(self.mint_price)?;
        builder.store_bit(self.is_verified)?;
        builder.build()
    }
}

/// Builds the per-item cell deployed with a mint: owner plus content ref
///
/// The content path is stored raw, without the off-chain marker; the
/// collection's common content supplies the URI prefix.
pub fn nft_item_cell(owner: &Address, content: &str) -> Result<Arc<Cell>> {
    let mut builder = Builder::new();
    builder.store_address(Some(owner))?;
    builder.store_ref(make_snake_cell(content.as_bytes())?)?;
    builder.build()
}

/// Parameters of a single mint
#[derive(Debug, Clone)]
pub struct MintParams {
    pub query_id: u64,
    pub item_index: u64,
    pub coins_for_storage: u128,
    pub owner: Address,
    pub content: String,
}

/// Builds a mint body: op, query id, item index, storage coins, item ref
pub fn mint_body(params: &MintParams) -> Result<Arc<Cell>> {
    let mut builder = Builder::new();
    builder.store_u32(ops::MINT)?;
    builder.store_u64(params.query_id)?;
    builder.store_u64(params.item_index)?;
    builder.store_coins(params.coins_for_storage)?;
    builder.store_ref(nft_item_cell(&params.owner, &params.content)?)?;
    builder.build()
}

/// Builds a change-owner body
pub fn change_owner_body(query_id: u64, new_owner: &Address) -> Result<Arc<Cell>> {
    let mut builder = Builder::new();
    builder.store_u32(ops::CHANGE_OWNER)?;
    builder.store_u64(query_id)?;
    builder.store_address(Some(new_owner))?;
    builder.build()
}

/// Builds a change-content body carrying the full config cell as a ref
pub fn change_content_body(query_id: u64, config: &CollectionConfig) -> Result<Arc<Cell>> {
    let mut builder = Builder::new();
    builder.store_u32(ops::CHANGE_CONTENT)?;
    builder.store_u64(query_id)?;
    builder.store_ref(config.to_cell()?)?;
    builder.build()
}

/// Builds a change-mint-price body
pub fn change_mint_price_body(query_id: u64, new_mint_price: u128) -> Result<Arc<Cell>> {
    let mut builder = Builder::new();
    builder.store_u32(ops::CHANGE_MINT_PRICE)?;
    builder.store_u64(query_id)?;
    builder.store_coins(new_mint_price)?;
    builder.build()
}

/// Builds a change-nft-item-amount body
pub fn change_nft_item_amount_body(query_id: u64, new_amount: u128) -> Result<Arc<Cell>> {
    let mut builder = Builder::new();
    builder.store_u32(ops::CHANGE_NFT_ITEM_AMOUNT)?;
    builder.store_u64(query_id)?;
    builder.store_coins(new_amount)?;
    builder.build()
}

/// Builds a change-royalties body carrying the royalty cell as a ref
pub fn change_royalties_body(query_id: u64, royalty: &RoyaltyParams) -> Result<Arc<Cell>> {
    let mut builder = Builder::new();
    builder.store_u32(ops::CHANGE_ROYALTIES)?;
    builder.store_u64(query_id)?;
    builder.store_ref(royalty.to_cell()?)?;
    builder.build()
}

/// Builds a change-max-supply body
pub fn change_max_supply_body(query_id: u64, new_max_supply: u64) -> Result<Arc<Cell>> {
    let mut builder = Builder::new();
    builder.store_u32(ops::CHANGE_MAX_SUPPLY)?;
    builder.store_u64(query_id)?;
    builder.store_u64(new_max_supply)?;
    builder.build()
}

/// Builds an emergency-withdraw body: just op and query id
pub fn emergency_withdraw_body(query_id: u64) -> Result<Arc<Cell>> {
    let mut builder = Builder::new();
    builder.store_u32(ops::EMERGENCY_WITHDRAW)?;
    builder.store_u64(query_id)?;
    builder.build()
}

/// Decoded get_collection_data result
#[derive(Debug, Clone)]
pub struct CollectionData {
    pub next_item_index: u64,
    pub content: Arc<Cell>,
    pub owner: Address,
}

impl CollectionData {
    /// Decodes the getter stack: next item index, content cell, owner
    pub fn read(reader: &mut StackReader) -> Result<Self, StackError> {
        Ok(Self {
            next_item_index: reader.read_u64()?,
            content: reader.read_cell()?,
            owner: reader.read_address()?,
        })
    }

    /// Decodes the content cell into its URI
    pub fn content_url(&self) -> Result<String> {
        decode_content(&self.content)
    }
}

/// Decodes the get_minting_price getter result
pub fn read_minting_price(reader: &mut StackReader) -> Result<u128, StackError> {
    reader.read_coins()
}

/// Decodes the get_nft_item_amount getter result
pub fn read_nft_item_amount(reader: &mut StackReader) -> Result<u128, StackError> {
    reader.read_coins()
}

/// Decodes the get_max_supply getter result
pub fn read_max_supply(reader: &mut StackReader) -> Result<u64, StackError> {
    reader.read_u64()
}

/// Decodes the get_is_verified getter result
pub fn read_is_verified(reader: &mut StackReader) -> Result<bool, StackError> {
    reader.read_bool()
}
