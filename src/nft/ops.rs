//! Operation codes understood by the marketplace contracts
//!
//! These values select the message layout on the receiving side and must
//! match the deployed contracts exactly.

pub const MINT: u32 = 1;
pub const BATCH_MINT: u32 = 2;
pub const CHANGE_OWNER: u32 = 3;
pub const CHANGE_CONTENT: u32 = 4;
pub const CHANGE_MINT_PRICE: u32 = 5;
pub const CHANGE_NFT_ITEM_AMOUNT: u32 = 6;
pub const CHANGE_ROYALTIES: u32 = 7;
pub const CHANGE_MAX_SUPPLY: u32 = 8;
pub const EMERGENCY_WITHDRAW: u32 = 10;

/// Standard item transfer (TEP-62)
pub const TRANSFER: u32 = 0x5fcc3d14;
