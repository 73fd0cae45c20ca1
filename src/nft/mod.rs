//! Marketplace message protocol
//!
//! Typed builders for every collection, item, and sale operation, the batch
//! minting dictionary, and decoders for the contracts' getter results. The
//! wire layouts here are fixed by the deployed contracts; every numeric
//! width and reference placement is bit-exact.

pub mod batch;
pub mod collection;
pub mod item;
pub mod ops;
pub mod request;
pub mod sale;
#[cfg(test)]
pub mod tests;

pub use batch::{BatchEntry, MAX_BATCH_ENTRIES, batch_mint_body, build_batch_dict};
pub use collection::{CollectionConfig, CollectionData, MintParams, RoyaltyParams};
pub use item::{NftItemData, TransferParams};
pub use request::{OutboundMessage, TransactionRequest};
pub use sale::{SaleConfig, SaleData, SaleFees};
