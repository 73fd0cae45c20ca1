//! Cell-tree codec and message builders for a TON NFT marketplace.
//!
//! The crate covers the off-chain half of the marketplace protocol:
//! - `tvm`: the cell primitive (bounded bit strings with up to 4 child
//!   references), builders, slices, Bag-of-Cells wire serialization,
//!   canonical dictionaries, getter-result stacks, and state-init address
//!   derivation
//! - `content`: chunked "snake" encoding for long byte content and the
//!   off-chain metadata marker
//! - `nft`: typed message bodies for every collection/item/sale operation
//!   and decoders for the contracts' getter results
//!
//! Signing and submitting the produced messages is the job of an external
//! wallet connector; this crate stops at [`nft::TransactionRequest`].

pub mod content;
pub mod crc;
pub mod nft;
pub mod tvm;
pub mod utils;
