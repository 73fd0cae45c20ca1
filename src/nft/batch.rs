//! Batch minting dictionary
//!
//! A batch mint carries one dictionary keyed by the 64-bit item index. The
//! value under each key is a cell holding the storage coins for that item
//! and a reference to the item cell (owner plus content).

use crate::nft::collection::nft_item_cell;
use crate::nft::ops;
use crate::tvm::address::Address;
use crate::tvm::builder::Builder;
use crate::tvm::cell::Cell;
use crate::tvm::dict::Dict;
use anyhow::{Result, bail};
use std::sync::Arc;

/// Maximum entries per batch; the collection contract rejects larger batches
pub const MAX_BATCH_ENTRIES: usize = 80;

/// One item of a batch mint
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub index: u64,
    pub coins_for_storage: u128,
    pub item: Arc<Cell>,
}

impl BatchEntry {
    /// Creates an entry from a prebuilt item cell
    pub fn new(index: u64, coins_for_storage: u128, item: Arc<Cell>) -> Self {
        Self {
            index,
            coins_for_storage,
            item,
        }
    }

    /// Creates an entry minting `content` to `owner`
    pub fn for_owner(
        index: u64,
        coins_for_storage: u128,
        owner: &Address,
        content: &str,
    ) -> Result<Self> {
        Ok(Self::new(
            index,
            coins_for_storage,
            nft_item_cell(owner, content)?,
        ))
    }
}

/// Builds the batch dictionary root, `None` when the batch is empty
///
/// Rejects more than [`MAX_BATCH_ENTRIES`] entries and duplicate indices
/// before any cell is built.
pub fn build_batch_dict(entries: &[BatchEntry]) -> Result<Option<Arc<Cell>>> {
    if entries.len() > MAX_BATCH_ENTRIES {
        bail!(
            "Batch mint is limited to {} items, got {}",
            MAX_BATCH_ENTRIES,
            entries.len()
        );
    }

    let mut dict = Dict::new(64);
    for entry in entries {
        if dict.contains_key(entry.index) {
            bail!("Duplicate batch index {}", entry.index);
        }

        let mut value = Builder::new();
        value.store_coins(entry.coins_for_storage)?;
        value.store_ref(entry.item.clone())?;
        dict.set(entry.index, value.build()?)?;
    }

    dict.serialize()
}

/// Builds a batch-mint body: op, query id, dictionary
pub fn batch_mint_body(query_id: u64, entries: &[BatchEntry]) -> Result<Arc<Cell>> {
    let dict = build_batch_dict(entries)?;

    let mut builder = Builder::new();
    builder.store_u32(ops::BATCH_MINT)?;
    builder.store_u64(query_id)?;
    builder.store_dict(dict)?;
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::decode_content;
    use crate::tvm::slice::Slice;

    fn entries(count: usize) -> Vec<BatchEntry> {
        (0..count)
            .map(|i| {
                BatchEntry::for_owner(
                    i as u64,
                    50_000_000,
                    &Address::new(0, [i as u8; 32]),
                    "/nft.json",
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_batch_at_limit_succeeds() {
        let dict = build_batch_dict(&entries(MAX_BATCH_ENTRIES)).unwrap();
        assert!(dict.is_some());
    }

    #[test]
    fn test_batch_over_limit_rejected() {
        let err = build_batch_dict(&entries(MAX_BATCH_ENTRIES + 1)).unwrap_err();
        assert!(err.to_string().contains("limited to 80"));
    }

    #[test]
    fn test_duplicate_index_rejected() {
        let mut batch = entries(2);
        batch[1].index = batch[0].index;
        let err = build_batch_dict(&batch).unwrap_err();
        assert!(err.to_string().contains("Duplicate batch index"));
    }

    #[test]
    fn test_empty_batch_is_empty_dict() {
        assert!(build_batch_dict(&[]).unwrap().is_none());
    }

    #[test]
    fn test_insertion_order_does_not_change_bits() {
        let forward = entries(10);
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = build_batch_dict(&forward).unwrap().unwrap();
        let b = build_batch_dict(&reversed).unwrap().unwrap();
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn test_batch_body_layout() {
        let body = batch_mint_body(5, &entries(3)).unwrap();

        let mut slice = Slice::new(body);
        assert_eq!(slice.load_u32().unwrap(), ops::BATCH_MINT);
        assert_eq!(slice.load_u64().unwrap(), 5);
        assert!(slice.load_bit().unwrap());
        let root = slice.load_reference().unwrap();

        let dict = crate::tvm::dict::Dict::parse(&root, 64).unwrap();
        assert_eq!(dict.len(), 3);

        // Each value: storage coins, then a ref to the item cell
        let mut value = Slice::new(dict.get(1).unwrap().clone());
        assert_eq!(value.load_coins().unwrap(), 50_000_000);
        let item = value.load_reference().unwrap();
        let mut item_slice = Slice::new(item);
        assert_eq!(
            item_slice.load_address().unwrap(),
            Some(Address::new(0, [1u8; 32]))
        );
        let content = item_slice.load_reference().unwrap();
        assert_eq!(decode_content(&content).unwrap(), "/nft.json");
    }
}
