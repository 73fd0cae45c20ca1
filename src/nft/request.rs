//! Transaction requests for the external wallet connector
//!
//! The crate stops at producing [`TransactionRequest`] values: destination,
//! attached coins, and the body/state-init cells serialized as base64 BoC.
//! Signing and submitting them is the connector's job. All timestamps are
//! caller-provided; nothing here reads a clock.

use crate::nft::batch::{BatchEntry, batch_mint_body};
use crate::nft::collection::{
    MintParams, RoyaltyParams, change_royalties_body, emergency_withdraw_body, mint_body,
};
use crate::nft::item::{TransferParams, transfer_body};
use crate::nft::sale::SaleConfig;
use crate::tvm::address::Address;
use crate::tvm::boc::boc_to_base64;
use crate::tvm::cell::Cell;
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;

/// Coins attached to a freshly minted item for storage (0.05)
pub const ITEM_STORAGE_AMOUNT: u128 = 50_000_000;

/// Gas attached on top of the mint price (0.05)
pub const MINT_GAS_AMOUNT: u128 = 50_000_000;

/// Gas budgeted per item of a batch mint (0.08)
pub const BATCH_GAS_PER_ITEM: u128 = 80_000_000;

/// Gas for owner-only administration messages (0.05)
pub const ADMIN_GAS_AMOUNT: u128 = 50_000_000;

/// Gas for an item transfer (0.1)
pub const TRANSFER_GAS_AMOUNT: u128 = 100_000_000;

/// Default amount forwarded to the new owner on transfer (0.01)
pub const DEFAULT_FORWARD_AMOUNT: u128 = 10_000_000;

/// One outbound message of a transaction request
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    /// Destination address in user-friendly form
    pub address: String,
    /// Attached coins as a decimal string of nanocoins
    pub amount: String,
    /// Message body as base64 BoC
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    /// State init as base64 BoC, present only for deployments
    #[serde(rename = "stateInit", skip_serializing_if = "Option::is_none")]
    pub state_init: Option<String>,
}

impl OutboundMessage {
    /// Builds a message, serializing the given cells to base64 BoC
    pub fn new(
        destination: &Address,
        amount: u128,
        body: Option<&Arc<Cell>>,
        state_init: Option<&Arc<Cell>>,
    ) -> Result<Self> {
        Ok(Self {
            address: destination.to_base64(),
            amount: amount.to_string(),
            payload: body.map(|c| boc_to_base64(c, true)).transpose()?,
            state_init: state_init.map(|c| boc_to_base64(c, true)).transpose()?,
        })
    }
}

/// A transaction request ready for the wallet connector
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRequest {
    #[serde(rename = "validUntil")]
    pub valid_until: u64,
    pub messages: Vec<OutboundMessage>,
}

impl TransactionRequest {
    /// Wraps a single message
    pub fn single(valid_until: u64, message: OutboundMessage) -> Self {
        Self {
            valid_until,
            messages: vec![message],
        }
    }

    /// Serializes the request as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Builds a mint request against a collection
pub fn mint_request(
    collection: &Address,
    params: &MintParams,
    mint_price: u128,
    valid_until: u64,
) -> Result<TransactionRequest> {
    let body = mint_body(params)?;
    let message = OutboundMessage::new(
        collection,
        mint_price + params.coins_for_storage + MINT_GAS_AMOUNT,
        Some(&body),
        None,
    )?;
    Ok(TransactionRequest::single(valid_until, message))
}

/// Builds a batch-mint request against a collection
pub fn batch_mint_request(
    collection: &Address,
    query_id: u64,
    entries: &[BatchEntry],
    valid_until: u64,
) -> Result<TransactionRequest> {
    let body = batch_mint_body(query_id, entries)?;
    let message = OutboundMessage::new(
        collection,
        BATCH_GAS_PER_ITEM * entries.len() as u128,
        Some(&body),
        None,
    )?;
    Ok(TransactionRequest::single(valid_until, message))
}

/// Builds an emergency-withdraw request (owner only)
pub fn withdraw_request(
    collection: &Address,
    query_id: u64,
    valid_until: u64,
) -> Result<TransactionRequest> {
    let body = emergency_withdraw_body(query_id)?;
    let message = OutboundMessage::new(collection, ADMIN_GAS_AMOUNT, Some(&body), None)?;
    Ok(TransactionRequest::single(valid_until, message))
}

/// Builds a royalty-update request (owner only)
pub fn update_royalties_request(
    collection: &Address,
    query_id: u64,
    royalty: &RoyaltyParams,
    valid_until: u64,
) -> Result<TransactionRequest> {
    let body = change_royalties_body(query_id, royalty)?;
    let message = OutboundMessage::new(collection, ADMIN_GAS_AMOUNT, Some(&body), None)?;
    Ok(TransactionRequest::single(valid_until, message))
}

/// Builds an item-transfer request
pub fn transfer_request(
    nft: &Address,
    params: &TransferParams,
    valid_until: u64,
) -> Result<TransactionRequest> {
    let body = transfer_body(params)?;
    let message = OutboundMessage::new(nft, TRANSFER_GAS_AMOUNT, Some(&body), None)?;
    Ok(TransactionRequest::single(valid_until, message))
}

/// Builds a sale deployment request and returns the derived sale address
///
/// After the deployment confirms, transfer the item to the returned address
/// to put it on sale.
pub fn deploy_sale_request(
    code: Arc<Cell>,
    config: &SaleConfig,
    workchain: i8,
    valid_until: u64,
) -> Result<(TransactionRequest, Address)> {
    let state_init = config.state_init(code)?;
    let sale_address = state_init.derive_address(workchain)?;

    let message = OutboundMessage::new(
        &sale_address,
        ADMIN_GAS_AMOUNT,
        None,
        Some(&state_init.to_cell()?),
    )?;
    Ok((
        TransactionRequest::single(valid_until, message),
        sale_address,
    ))
}
